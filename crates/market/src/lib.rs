//! Historical candle sources.

mod binance;

pub use binance::BinanceKlines;
