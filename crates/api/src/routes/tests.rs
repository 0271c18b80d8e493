use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{Candle, CandleSource, Error};
use strategy::{builtin, StrategyFileConfig, StrategyRegistry};

use crate::{app, AppState};

struct FixedCandles;

#[async_trait]
impl CandleSource for FixedCandles {
    fn exchange(&self) -> &str {
        "binance"
    }

    async fn fetch_candles(
        &self,
        _symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> common::Result<Vec<Candle>> {
        if timeframe == "7m" {
            return Err(Error::UnsupportedTimeframe(timeframe.to_string()));
        }
        Ok(candles(limit.min(120)))
    }
}

struct Offline;

#[async_trait]
impl CandleSource for Offline {
    fn exchange(&self) -> &str {
        "offline"
    }

    async fn fetch_candles(&self, _: &str, _: &str, _: usize) -> common::Result<Vec<Candle>> {
        Err(Error::Http("connection refused".into()))
    }
}

fn candles(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let close = 100.0 + 10.0 * (i as f64 / 6.0).sin();
            let time = Utc
                .timestamp_millis_opt(1_700_000_000_000 + i as i64 * 60_000)
                .unwrap();
            Candle::ohlcv(time, close - 0.5, close + 1.0, close - 1.0, close, 1_000.0)
        })
        .collect()
}

fn state(enabled: &[&str], token: Option<&str>) -> AppState {
    let cfg = StrategyFileConfig {
        enabled: enabled.iter().map(|s| s.to_string()).collect(),
    };
    AppState::new(Arc::new(StrategyRegistry::new(builtin(), &cfg)), 200)
        .with_source(Arc::new(FixedCandles))
        .with_source(Arc::new(Offline))
        .with_token(token.map(String::from))
}

fn router() -> Router {
    app(state(&["sma_crossover", "rsi_mean_reversion"], None))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn healthz_reports_loaded_strategies() {
    let (status, body) = send(router(), get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "strategies": 2}));
}

#[tokio::test]
async fn directory_lists_only_enabled_strategies() {
    let (status, body) = send(router(), get("/api/strategies")).await;
    assert_eq!(status, StatusCode::OK);
    let slugs: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, ["sma_crossover", "rsi_mean_reversion"]);
    assert_eq!(body[0]["params"]["short_sma_period"]["type"], "number");
}

#[tokio::test]
async fn disabled_strategy_is_not_found() {
    let (status, body) = send(router(), get("/api/strategies/vwap_cross")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("vwap_cross"));
}

#[tokio::test]
async fn analyze_fetches_from_the_exchange() {
    let request = post_json(
        "/api/analyze",
        json!({
            "exchange": "Binance",
            "symbol": "BTC/USDT",
            "timeframe": "1h",
            "strategy": "sma_crossover",
            "params": {"short_sma_period": 5, "long_sma_period": "15"},
            "position": "NONE",
            "limit": 80
        }),
    );
    let (status, body) = send(router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bars"], 80);
    assert_eq!(body["exchange"], "binance");
    assert!(body["decision"]["signal"].is_string());
    assert_eq!(body["overlays"]["sma_short"].as_array().unwrap().len(), 76);
}

#[tokio::test]
async fn analyze_accepts_inline_bars() {
    let bars = serde_json::to_value(candles(3)).unwrap();
    let request = post_json(
        "/api/analyze",
        json!({"strategy": "rsi_mean_reversion", "bars": bars}),
    );
    let (status, body) = send(router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decision"]["signal"], "HOLD");
    assert!(body["decision"]["details"]
        .as_str()
        .unwrap()
        .starts_with("Insufficient data"));
}

#[tokio::test]
async fn null_position_means_no_position() {
    let bars = serde_json::to_value(candles(60)).unwrap();
    let request = post_json(
        "/api/analyze",
        json!({"strategy": "sma_crossover", "position": null, "bars": bars}),
    );
    let (status, body) = send(router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bars"], 60);
    let signal = body["decision"]["signal"].as_str().unwrap();
    assert!(signal != "CLOSE_LONG" && signal != "CLOSE_SHORT");
}

#[tokio::test]
async fn analyze_rejects_bad_requests() {
    let unknown_exchange = post_json(
        "/api/analyze",
        json!({"exchange": "kraken", "symbol": "BTCUSDT", "timeframe": "1h", "strategy": "sma_crossover"}),
    );
    assert_eq!(send(router(), unknown_exchange).await.0, StatusCode::BAD_REQUEST);

    let no_symbol = post_json(
        "/api/analyze",
        json!({"timeframe": "1h", "strategy": "sma_crossover"}),
    );
    assert_eq!(send(router(), no_symbol).await.0, StatusCode::BAD_REQUEST);

    let bad_timeframe = post_json(
        "/api/analyze",
        json!({"symbol": "BTCUSDT", "timeframe": "7m", "strategy": "sma_crossover"}),
    );
    assert_eq!(send(router(), bad_timeframe).await.0, StatusCode::BAD_REQUEST);

    let disabled = post_json(
        "/api/analyze",
        json!({"symbol": "BTCUSDT", "timeframe": "1h", "strategy": "vwap_cross"}),
    );
    assert_eq!(send(router(), disabled).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn exchange_failure_is_a_bad_gateway() {
    let request = post_json(
        "/api/analyze",
        json!({"exchange": "offline", "symbol": "BTCUSDT", "timeframe": "1h", "strategy": "sma_crossover"}),
    );
    let (status, body) = send(router(), request).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn token_guards_the_api_but_not_health() {
    let app = app(state(&["sma_crossover"], Some("s3cret")));

    let (status, _) = send(app.clone(), get("/api/strategies")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let authorized = Request::get("/api/strategies")
        .header(header::AUTHORIZATION, "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(app.clone(), authorized).await.0, StatusCode::OK);

    assert_eq!(send(app, get("/healthz")).await.0, StatusCode::OK);
}

#[tokio::test]
async fn unknown_paths_serve_the_ui() {
    let response = router().oneshot(get("/some/page")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}
