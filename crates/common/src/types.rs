use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DataGap;

/// One OHLCV sample as received from an exchange or a request body.
///
/// Every field is optional: a caller may omit whole input columns, and a
/// strategy whose required columns are absent simply skips its indicators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time, milliseconds since the Unix epoch on the wire.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl Candle {
    pub fn ohlcv(
        time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            time: Some(time),
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
        }
    }
}

/// Discrete trading signal emitted by a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    CloseLong,
    CloseShort,
}

impl Signal {
    /// True for every signal except `Hold`.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Signal::Hold)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
            Signal::CloseLong => write!(f, "CLOSE_LONG"),
            Signal::CloseShort => write!(f, "CLOSE_SHORT"),
        }
    }
}

/// Informational market lean reported alongside a HOLD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    Bullish,
    Bearish,
}

/// Result of one signal evaluation. Built fresh per call, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDecision {
    pub signal: Signal,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias: Option<Bias>,
}

impl SignalDecision {
    pub fn new(signal: Signal, details: impl Into<String>) -> Self {
        Self {
            signal,
            details: details.into(),
            bias: None,
        }
    }

    pub fn hold(details: impl Into<String>) -> Self {
        Self::new(Signal::Hold, details)
    }

    pub fn buy(details: impl Into<String>) -> Self {
        Self::new(Signal::Buy, details)
    }

    pub fn sell(details: impl Into<String>) -> Self {
        Self::new(Signal::Sell, details)
    }

    pub fn close_long(details: impl Into<String>) -> Self {
        Self::new(Signal::CloseLong, details)
    }

    pub fn close_short(details: impl Into<String>) -> Self {
        Self::new(Signal::CloseShort, details)
    }

    /// HOLD explaining which lookback could not be satisfied.
    pub fn insufficient(gap: &DataGap) -> Self {
        Self::hold(gap.to_string())
    }

    /// HOLD explaining a rejected parameter combination.
    pub fn invalid_params(reason: impl std::fmt::Display) -> Self {
        Self::hold(format!("Invalid parameters: {reason}"))
    }

    pub fn with_bias(mut self, bias: Bias) -> Self {
        self.bias = Some(bias);
        self
    }
}

/// Position currently held by the caller. Purely an input: never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PositionContext {
    #[default]
    #[serde(rename = "NONE", alias = "none")]
    Flat,
    #[serde(rename = "LONG", alias = "long")]
    Long,
    #[serde(rename = "SHORT", alias = "short")]
    Short,
}

impl std::fmt::Display for PositionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionContext::Flat => write!(f, "none"),
            PositionContext::Long => write!(f, "LONG"),
            PositionContext::Short => write!(f, "SHORT"),
        }
    }
}

/// A single chart point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayPoint {
    /// Milliseconds since the Unix epoch.
    pub time: i64,
    pub value: f64,
}

/// Named overlay series, ordered by name for stable output.
pub type Overlays = BTreeMap<String, Vec<OverlayPoint>>;
