use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::Candle;

pub const OPEN: &str = "open";
pub const HIGH: &str = "high";
pub const LOW: &str = "low";
pub const CLOSE: &str = "close";
pub const VOLUME: &str = "volume";

/// A column of values aligned 1:1 with the bars. `None` = not available.
pub type Column = Vec<Option<f64>>;

/// Why a strategy could not read the values it needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataGap {
    #[error("Insufficient data: need {needed} bars, have {available}.")]
    TooShort { needed: usize, available: usize },

    #[error("Insufficient data: column '{0}' is missing.")]
    MissingColumn(String),

    #[error("Insufficient data: '{0}' is not available for the latest bars.")]
    NotAvailable(String),
}

/// Time-ordered OHLCV table with named indicator columns appended to it.
///
/// Built fresh per request, augmented in place by indicator attachment and
/// dropped once the response is assembled. Signal logic reads it from the
/// end (latest bar, previous bar) through [`BarSeries::recent`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    len: usize,
    times: Option<Vec<DateTime<Utc>>>,
    columns: BTreeMap<String, Column>,
}

impl BarSeries {
    /// An empty table of `len` bars with no columns and no time index.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            times: None,
            columns: BTreeMap::new(),
        }
    }

    /// Build the base columns from candles (oldest first).
    ///
    /// A base column is present when at least one candle supplies it; the
    /// time index is present only when every candle carries a time.
    /// Non-finite values are stored as not available.
    pub fn from_candles(candles: &[Candle]) -> Self {
        let mut series = Self::new(candles.len());

        let base: [(&str, fn(&Candle) -> Option<f64>); 5] = [
            (OPEN, |c| c.open),
            (HIGH, |c| c.high),
            (LOW, |c| c.low),
            (CLOSE, |c| c.close),
            (VOLUME, |c| c.volume),
        ];
        for (name, field) in base {
            if candles.iter().any(|c| field(c).is_some()) {
                let values = candles
                    .iter()
                    .map(|c| field(c).filter(|v| v.is_finite()))
                    .collect();
                series.columns.insert(name.to_string(), values);
            }
        }

        series.times = candles.iter().map(|c| c.time).collect();
        series
    }

    /// Builder-style column insertion; `NaN`/infinite values become `None`.
    /// A column of the wrong length is ignored.
    pub fn with_column(mut self, name: &str, values: Vec<f64>) -> Self {
        let column = values
            .into_iter()
            .map(|v| Some(v).filter(|v| v.is_finite()))
            .collect();
        self.insert_column(name, column);
        self
    }

    /// Attach a time index. Ignored when the length does not match.
    pub fn with_times(mut self, times: Vec<DateTime<Utc>>) -> Self {
        if times.len() == self.len {
            self.times = Some(times);
        }
        self
    }

    /// Insert or replace a column. Returns `false` (and leaves the table
    /// untouched) when the column length does not match the bar count.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Column) -> bool {
        if values.len() != self.len {
            return false;
        }
        self.columns.insert(name.into(), values);
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.has_column(n))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// The last `N` values of a column in chronological order
    /// (`[.., previous, latest]`).
    pub fn recent<const N: usize>(&self, name: &str) -> Result<[f64; N], DataGap> {
        if self.len < N {
            return Err(DataGap::TooShort {
                needed: N,
                available: self.len,
            });
        }
        let column = self
            .column(name)
            .ok_or_else(|| DataGap::MissingColumn(name.to_string()))?;

        let mut out = [0.0; N];
        for (slot, value) in out.iter_mut().zip(&column[self.len - N..]) {
            *slot = value.ok_or_else(|| DataGap::NotAvailable(name.to_string()))?;
        }
        Ok(out)
    }

    /// Millisecond timestamps of every bar, if the series has a time index.
    pub fn times_ms(&self) -> Option<Vec<i64>> {
        self.times
            .as_ref()
            .map(|t| t.iter().map(DateTime::timestamp_millis).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle(ms: i64, close: f64) -> Candle {
        Candle {
            time: Utc.timestamp_millis_opt(ms).single(),
            close: Some(close),
            ..Default::default()
        }
    }

    #[test]
    fn from_candles_only_creates_supplied_columns() {
        let series = BarSeries::from_candles(&[candle(0, 1.0), candle(60_000, 2.0)]);
        assert_eq!(series.len(), 2);
        assert!(series.has_column(CLOSE));
        assert!(!series.has_column(HIGH));
        assert_eq!(series.times_ms(), Some(vec![0, 60_000]));
    }

    #[test]
    fn time_index_requires_every_candle_to_carry_a_time() {
        let mut second = candle(60_000, 2.0);
        second.time = None;
        let series = BarSeries::from_candles(&[candle(0, 1.0), second]);
        assert!(series.times_ms().is_none());
    }

    #[test]
    fn non_finite_values_are_not_available() {
        let series = BarSeries::new(3).with_column("x", vec![1.0, f64::NAN, f64::INFINITY]);
        assert_eq!(series.column("x"), Some(&[Some(1.0), None, None][..]));
    }

    #[test]
    fn recent_returns_values_oldest_first() {
        let series = BarSeries::new(4).with_column("x", vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(series.recent::<2>("x"), Ok([3.0, 4.0]));
    }

    #[test]
    fn recent_reports_each_kind_of_gap() {
        let series = BarSeries::new(2).with_column("x", vec![1.0, f64::NAN]);
        assert_eq!(
            series.recent::<3>("x"),
            Err(DataGap::TooShort { needed: 3, available: 2 })
        );
        assert_eq!(
            series.recent::<1>("y"),
            Err(DataGap::MissingColumn("y".into()))
        );
        assert_eq!(
            series.recent::<1>("x"),
            Err(DataGap::NotAvailable("x".into()))
        );
    }

    #[test]
    fn gap_messages_mention_insufficient_data() {
        let gap = DataGap::TooShort { needed: 2, available: 1 };
        assert!(gap.to_string().starts_with("Insufficient data"));
    }

    #[test]
    fn mismatched_column_length_is_rejected() {
        let mut series = BarSeries::new(2);
        assert!(!series.insert_column("x", vec![Some(1.0)]));
        assert!(!series.has_column("x"));
    }

    #[test]
    fn insert_column_replaces_existing_values() {
        let mut series = BarSeries::new(1).with_column("x", vec![1.0]);
        assert!(series.insert_column("x", vec![Some(5.0)]));
        assert_eq!(series.recent::<1>("x"), Ok([5.0]));
    }
}
