use async_trait::async_trait;

use crate::{Candle, Result};

/// Abstraction over a source of historical candles.
///
/// `BinanceKlines` in `crates/market` implements this against the public
/// REST API. Request handlers only ever see a `dyn CandleSource`, so tests
/// and alternative exchanges can be plugged in without touching the API.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Lower-case exchange identifier this source answers for (e.g. "binance").
    fn exchange(&self) -> &str;

    /// Fetch up to `limit` closed candles, oldest first.
    async fn fetch_candles(&self, symbol: &str, timeframe: &str, limit: usize)
        -> Result<Vec<Candle>>;
}
