use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::Config;
use market::BinanceKlines;
use strategy::{builtin, StrategyFileConfig, StrategyRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("invalid environment configuration")?;
    info!(port = cfg.port, "StratDesk starting");

    // ── Strategy registry ─────────────────────────────────────────────────────
    let allow_list = if Path::new(&cfg.strategy_config_path).exists() {
        StrategyFileConfig::load(&cfg.strategy_config_path)?
    } else {
        warn!(
            path = %cfg.strategy_config_path,
            "Strategy config not found; enabling every built-in strategy"
        );
        StrategyFileConfig::default()
    };
    let registry = Arc::new(StrategyRegistry::new(builtin(), &allow_list));
    if registry.is_empty() {
        warn!("No strategies enabled; the API will report every strategy as unavailable");
    }

    // ── Market data ───────────────────────────────────────────────────────────
    let binance = BinanceKlines::new(&cfg.binance_base_url)?;
    info!(base_url = %cfg.binance_base_url, "Binance klines source ready");

    // ── API ───────────────────────────────────────────────────────────────────
    if cfg.api_token.is_none() {
        warn!("API_TOKEN not set; /api routes are unauthenticated");
    }
    let state = api::AppState::new(registry, cfg.default_candle_limit)
        .with_source(Arc::new(binance))
        .with_token(cfg.api_token.clone());

    let addr = SocketAddr::new(cfg.bind_addr, cfg.port);
    api::serve(state, addr, shutdown_signal())
        .await
        .context("API server failed")?;

    info!("StratDesk stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl-C received; shutting down"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C; shutting down"),
    }
}
