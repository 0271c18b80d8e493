//! The built-in rule sets. Each module holds one unit implementing
//! [`Strategy`](crate::Strategy).

mod awesome;
mod bollinger;
mod candle_filter;
mod cci;
mod cmf;
mod donchian;
mod ema_cross;
mod hma_slope;
mod keltner;
mod macd_trend;
mod roc;
mod rsi_reversion;
mod sma_crossover;
mod stochastic;
mod supertrend;
mod trix;
mod vwap;

pub use awesome::AoZeroCross;
pub use bollinger::BollingerReversion;
pub use candle_filter::CandleEmaFilter;
pub use cci::CciCyclical;
pub use cmf::CmfThreshold;
pub use donchian::DonchianBreakout;
pub use ema_cross::EmaCrossover;
pub use hma_slope::HmaSlope;
pub use keltner::KeltnerBreakout;
pub use macd_trend::MacdTrend;
pub use roc::RocBreakout;
pub use rsi_reversion::RsiMeanReversion;
pub use sma_crossover::SmaCrossover;
pub use stochastic::StochasticMomentum;
pub use supertrend::SupertrendFollowing;
pub use trix::TrixSignalCross;
pub use vwap::VwapCross;

use common::{BarSeries, DataGap, SignalDecision};
use tracing::{debug, warn};

use crate::indicators::{IndicatorError, Series};

/// Computed columns ready to be attached.
pub(crate) type Computed = Result<Vec<(String, Series)>, IndicatorError>;

/// Input columns by name, in the order requested, cut down to the trailing
/// run of bars where every one of them has a value.
///
/// A gap only hides the bars before it; [`store`] re-aligns the shorter
/// computed columns to the table. A gap on the latest bar leaves nothing.
pub(crate) fn inputs<const N: usize>(
    bars: &BarSeries,
    names: [&str; N],
) -> Result<[Vec<f64>; N], IndicatorError> {
    let mut columns = Vec::with_capacity(N);
    for name in names {
        let column = bars
            .column(name)
            .ok_or_else(|| IndicatorError::MissingColumn(name.to_string()))?;
        columns.push(column);
    }

    let start = columns
        .iter()
        .filter_map(|c| c.iter().rposition(Option::is_none))
        .map(|last_gap| last_gap + 1)
        .max()
        .unwrap_or(0);
    if start == bars.len() && !bars.is_empty() {
        let name = names
            .iter()
            .zip(&columns)
            .find(|(_, c)| matches!(c.last(), Some(None)))
            .map_or(names[0], |(name, _)| *name);
        return Err(IndicatorError::MissingInput(name.to_string()));
    }

    Ok(std::array::from_fn(|i| {
        columns[i][start..].iter().flatten().copied().collect()
    }))
}

/// Attach computed columns, or log why nothing was attached. Columns
/// computed over a trailing run of bars are padded back to full length.
pub(crate) fn store(bars: &mut BarSeries, strategy: &str, computed: Computed) {
    match computed {
        Ok(columns) => {
            for (name, values) in columns {
                let values = left_pad(values, bars.len());
                if !bars.insert_column(name.as_str(), values) {
                    warn!(strategy, column = %name, "Indicator length mismatch; column not attached");
                } else {
                    debug!(strategy, column = %name, "Attached indicator column");
                }
            }
        }
        Err(IndicatorError::MissingColumn(column)) => {
            warn!(strategy, %column, "Required input column missing; indicators skipped");
        }
        Err(e) => {
            warn!(strategy, error = %e, "Indicator computation failed; columns left absent");
        }
    }
}

fn left_pad(values: Series, len: usize) -> Series {
    if values.len() >= len {
        return values;
    }
    let mut padded = vec![None; len - values.len()];
    padded.extend(values);
    padded
}

/// Collapse a lookup failure into an "insufficient data" HOLD.
pub(crate) fn settle(result: Result<SignalDecision, DataGap>) -> SignalDecision {
    result.unwrap_or_else(|gap| SignalDecision::insufficient(&gap))
}
