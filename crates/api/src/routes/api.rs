use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use common::{BarSeries, Candle, Overlays, PositionContext, SignalDecision};
use strategy::{ParamSet, StrategyInfo};

use crate::{auth::require_auth, ApiError, AppState};

pub fn api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/strategies", get(list_strategies))
        .route("/api/strategies/:slug", get(get_strategy))
        .route("/api/analyze", post(analyze))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

// ─── Directory ────────────────────────────────────────────────────────────────

async fn list_strategies(State(state): State<AppState>) -> Json<Vec<StrategyInfo>> {
    Json(state.registry.directory())
}

async fn get_strategy(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<StrategyInfo>, ApiError> {
    state
        .registry
        .directory()
        .into_iter()
        .find(|info| info.slug == slug)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(strategy::RegistryError::Unavailable(slug)))
}

// ─── Analysis ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default = "default_exchange")]
    exchange: String,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    timeframe: Option<String>,
    strategy: String,
    #[serde(default)]
    params: ParamSet,
    /// `null` and absent both mean no position.
    #[serde(default)]
    position: Option<PositionContext>,
    #[serde(default)]
    limit: Option<usize>,
    /// Inline candles, oldest first. When present no exchange is queried.
    #[serde(default)]
    bars: Option<Vec<Candle>>,
}

fn default_exchange() -> String {
    "binance".to_string()
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    strategy: &'static str,
    exchange: String,
    symbol: Option<String>,
    timeframe: Option<String>,
    bars: usize,
    decision: SignalDecision,
    overlays: Overlays,
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    // Unknown strategies fail before any market request.
    state.registry.get(&req.strategy)?;

    let exchange = req.exchange.trim().to_lowercase();
    let candles = match req.bars {
        Some(bars) => {
            debug!(strategy = %req.strategy, bars = bars.len(), "Analyzing inline bars");
            bars
        }
        None => fetch(&state, &exchange, &req.symbol, &req.timeframe, req.limit).await?,
    };

    let series = BarSeries::from_candles(&candles);
    let analysis = state
        .registry
        .analyze(&req.strategy, series, &req.params, req.position.unwrap_or_default())?;

    info!(
        strategy = analysis.strategy,
        exchange = %exchange,
        signal = ?analysis.decision.signal,
        "Analyze request served"
    );

    Ok(Json(AnalyzeResponse {
        strategy: analysis.strategy,
        exchange,
        symbol: req.symbol,
        timeframe: req.timeframe,
        bars: analysis.bars,
        decision: analysis.decision,
        overlays: analysis.overlays,
    }))
}

async fn fetch(
    state: &AppState,
    exchange: &str,
    symbol: &Option<String>,
    timeframe: &Option<String>,
    limit: Option<usize>,
) -> Result<Vec<Candle>, ApiError> {
    let symbol = symbol
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("'symbol' is required without inline bars".into()))?;
    let timeframe = timeframe
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("'timeframe' is required without inline bars".into()))?;
    let source = state
        .sources
        .get(exchange)
        .ok_or_else(|| common::Error::UnsupportedExchange(exchange.to_string()))?;

    let limit = limit.unwrap_or(state.default_limit);
    Ok(source.fetch_candles(symbol, timeframe, limit).await?)
}
