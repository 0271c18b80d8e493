use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use common::{Candle, CandleSource, Error, Result};

/// Intervals accepted by `GET /api/v3/klines`.
pub const INTERVALS: &[&str] = &[
    "1s", "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w",
    "1M",
];

/// Most rows Binance returns for one klines request.
pub const MAX_LIMIT: usize = 1000;

/// Public (unsigned) klines client for Binance spot.
pub struct BinanceKlines {
    base_url: String,
    http: Client,
}

impl BinanceKlines {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .user_agent(concat!("stratdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn klines_url(&self, symbol: &str, interval: &str, limit: usize) -> String {
        format!(
            "{}/api/v3/klines?symbol={symbol}&interval={interval}&limit={limit}",
            self.base_url
        )
    }
}

#[async_trait]
impl CandleSource for BinanceKlines {
    fn exchange(&self) -> &str {
        "binance"
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let symbol = normalize_symbol(symbol)?;
        let interval = check_interval(timeframe)?;
        let limit = limit.clamp(1, MAX_LIMIT);
        let url = self.klines_url(&symbol, interval, limit);

        debug!(%symbol, interval, limit, "Fetching klines");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            warn!(%symbol, interval, %status, "Klines request rejected");
            return Err(Error::Exchange(format!("HTTP {status}: {body}")));
        }

        parse_klines(&body, Utc::now())
    }
}

/// `btc/usdt`, `BTC-USDT` and `btcusdt` all become `BTCUSDT`.
fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol: String = raw
        .chars()
        .filter(|c| !matches!(c, '/' | '-' | '_' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::Exchange(format!("invalid symbol '{raw}'")));
    }
    Ok(symbol)
}

fn check_interval(timeframe: &str) -> Result<&str> {
    INTERVALS
        .iter()
        .find(|i| **i == timeframe)
        .copied()
        .ok_or_else(|| Error::UnsupportedTimeframe(timeframe.to_string()))
}

/// Parse the `[[openTime, "open", "high", "low", "close", "volume", closeTime, ...], ...]`
/// array Binance answers with, keeping only bars closed before `now`.
fn parse_klines(body: &str, now: DateTime<Utc>) -> Result<Vec<Candle>> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;
    let now_ms = now.timestamp_millis();
    let mut candles = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let (candle, close_time) =
            parse_row(row).ok_or_else(|| Error::Exchange(format!("malformed kline row {i}")))?;
        if close_time < now_ms {
            candles.push(candle);
        }
    }
    Ok(candles)
}

fn parse_row(row: &[Value]) -> Option<(Candle, i64)> {
    let open_time = row.first()?.as_i64()?;
    let close_time = row.get(6)?.as_i64()?;
    let time = Utc.timestamp_millis_opt(open_time).single()?;
    let field = |i: usize| -> Option<f64> {
        match row.get(i)? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    };
    let candle = Candle::ohlcv(time, field(1)?, field(2)?, field(3)?, field(4)?, field(5)?);
    Some((candle, close_time))
}
