use common::series::{CLOSE, HIGH, LOW};
use common::{BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{channels, columns};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{route, Event};
use crate::Strategy;

const UPPER: ParamSpec =
    ParamSpec::number("donchian_upper_length", "Upper Band Length", 20.0, 2.0, 100.0);
const LOWER: ParamSpec =
    ParamSpec::number("donchian_lower_length", "Lower Band Length", 20.0, 2.0, 100.0);

/// Close breaking out of the channel formed by the preceding bars.
pub struct DonchianBreakout;

impl DonchianBreakout {
    fn columns(params: &ParamSet) -> (usize, usize, columns::BandColumns) {
        let (upper, lower) = (params.period(&UPPER), params.period(&LOWER));
        (upper, lower, columns::donchian(upper, lower))
    }

    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let (upper_len, lower_len, cols) = Self::columns(params);
        if upper_len == 0 || lower_len == 0 {
            return Ok(SignalDecision::invalid_params("Donchian lengths must be at least 1"));
        }

        let [close] = bars.recent::<1>(CLOSE)?;
        let [upper] = bars.recent::<1>(&cols.upper)?;
        let [lower] = bars.recent::<1>(&cols.lower)?;

        let event = if close > upper {
            Some(Event::Bullish(format!(
                "Price ({close:.2}) broke ABOVE Upper Donchian ({upper:.2})"
            )))
        } else if close < lower {
            Some(Event::Bearish(format!(
                "Price ({close:.2}) broke BELOW Lower Donchian ({lower:.2})"
            )))
        } else {
            None
        };

        Ok(route(position, event).unwrap_or_else(|| {
            SignalDecision::hold(format!(
                "Price ({close:.2}) is within Donchian Channels ({lower:.2} - {upper:.2})."
            ))
        }))
    }
}

impl Strategy for DonchianBreakout {
    fn name(&self) -> &'static str {
        "Donchian Channel Breakout"
    }

    fn slug(&self) -> &'static str {
        "donchian_breakout"
    }

    fn description(&self) -> &'static str {
        "Enters when the close breaks the highest high or lowest low of the preceding bars."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[UPPER, LOWER]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let (upper_len, lower_len, cols) = Self::columns(params);
        let computed = inputs(bars, [HIGH, LOW, CLOSE]).and_then(|[high, low, _close]| {
            let bands = channels::donchian(&high, &low, upper_len, lower_len)?;
            Ok(vec![
                (cols.lower, bands.lower),
                (cols.middle, bands.middle),
                (cols.upper, bands.upper),
            ])
        });
        store(bars, self.slug(), computed);
    }

    fn evaluate(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> SignalDecision {
        settle(self.decide(bars, params, position))
    }

    fn overlays(&self, bars: &BarSeries, params: &ParamSet) -> Overlays {
        let (_, _, cols) = Self::columns(params);
        overlay::collect(
            bars,
            &[
                (cols.upper, "donchian_upper"),
                (cols.middle, "donchian_middle"),
                (cols.lower, "donchian_lower"),
            ],
        )
    }
}
