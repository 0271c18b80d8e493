use common::series::{CLOSE, HIGH, LOW};
use common::{Bias, BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{channels, columns};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{route, Event};
use crate::Strategy;

const ATR_LENGTH: ParamSpec =
    ParamSpec::number("supertrend_atr_length", "ATR Length", 10.0, 1.0, 50.0);
const MULTIPLIER: ParamSpec =
    ParamSpec::stepped("supertrend_multiplier", "ATR Multiplier", 3.0, 0.1, 10.0, 0.1);

/// Trades flips of the Supertrend direction.
pub struct SupertrendFollowing;

impl SupertrendFollowing {
    fn settings(params: &ParamSet) -> (usize, f64) {
        (params.period(&ATR_LENGTH), params.number(&MULTIPLIER))
    }

    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let (length, multiplier) = Self::settings(params);
        if length == 0 || !(multiplier > 0.0) {
            return Ok(SignalDecision::invalid_params(format!(
                "ATR length ({length}) and multiplier ({multiplier}) must be positive"
            )));
        }
        let cols = columns::supertrend(length, multiplier);

        let [prev, latest] = bars.recent::<2>(&cols.direction)?;
        let [close] = bars.recent::<1>(CLOSE)?;

        let event = if prev < 0.0 && latest > 0.0 {
            Some(Event::Bullish("Supertrend flipped to BULLISH".to_string()))
        } else if prev > 0.0 && latest < 0.0 {
            Some(Event::Bearish("Supertrend flipped to BEARISH".to_string()))
        } else {
            None
        };

        Ok(route(position, event).unwrap_or_else(|| {
            if latest > 0.0 {
                SignalDecision::hold(format!("Supertrend currently BULLISH. Price: {close:.2}."))
                    .with_bias(Bias::Bullish)
            } else {
                SignalDecision::hold(format!("Supertrend currently BEARISH. Price: {close:.2}."))
                    .with_bias(Bias::Bearish)
            }
        }))
    }
}

impl Strategy for SupertrendFollowing {
    fn name(&self) -> &'static str {
        "Supertrend Following"
    }

    fn slug(&self) -> &'static str {
        "supertrend_following"
    }

    fn description(&self) -> &'static str {
        "Follows the trend reported by the ATR-based Supertrend line and acts when it changes direction."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[ATR_LENGTH, MULTIPLIER]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let (length, multiplier) = Self::settings(params);
        let cols = columns::supertrend(length, multiplier);
        let computed = inputs(bars, [HIGH, LOW, CLOSE]).and_then(|[high, low, close]| {
            let lines = channels::supertrend(&high, &low, &close, length, multiplier)?;
            Ok(vec![(cols.line, lines.line), (cols.direction, lines.direction)])
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
        let (length, multiplier) = Self::settings(params);
        let cols = columns::supertrend(length, multiplier);
        overlay::collect(bars, &[(cols.line, "supertrend_line")])
    }
}
