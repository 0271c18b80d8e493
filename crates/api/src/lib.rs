mod auth;
mod error;
pub mod routes;

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use common::CandleSource;
use strategy::StrategyRegistry;

pub use error::ApiError;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<StrategyRegistry>,
    /// Candle sources keyed by lower-case exchange id.
    pub sources: Arc<HashMap<String, Arc<dyn CandleSource>>>,
    /// Bearer token for `/api/*`; `None` leaves the API open.
    pub api_token: Option<String>,
    /// Bars fetched when a request does not give a limit.
    pub default_limit: usize,
}

impl AppState {
    pub fn new(registry: Arc<StrategyRegistry>, default_limit: usize) -> Self {
        Self {
            registry,
            sources: Arc::new(HashMap::new()),
            api_token: None,
            default_limit,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn CandleSource>) -> Self {
        Arc::make_mut(&mut self.sources).insert(source.exchange().to_lowercase(), source);
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.api_token = token;
        self
    }
}

/// The full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .merge(routes::api_router(state.clone()))
        .merge(routes::health_router())
        .merge(routes::static_router())
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(cors)
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> common::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, strategies = state.registry.len(), "API listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
