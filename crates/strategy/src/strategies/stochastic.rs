use common::series::{CLOSE, HIGH, LOW};
use common::{Bias, BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{columns, oscillators};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{cross, route, Cross, Event};
use crate::Strategy;

const K_PERIOD: ParamSpec = ParamSpec::number("stoch_k_period", "%K Period", 14.0, 1.0, 50.0);
const D_PERIOD: ParamSpec = ParamSpec::number("stoch_d_period", "%D Period", 3.0, 1.0, 50.0);
const SMOOTH_K: ParamSpec =
    ParamSpec::number("stoch_smooth_k_period", "%K Smoothing", 3.0, 1.0, 50.0);
const OVERSOLD: ParamSpec = ParamSpec::number("oversold_level", "Oversold Level", 20.0, 1.0, 49.0);
const OVERBOUGHT: ParamSpec =
    ParamSpec::number("overbought_level", "Overbought Level", 80.0, 51.0, 99.0);

/// %K crossing %D, but only when the cross starts from an extreme zone.
pub struct StochasticMomentum;

impl StochasticMomentum {
    fn periods(params: &ParamSet) -> (usize, usize, usize) {
        (
            params.period(&K_PERIOD),
            params.period(&D_PERIOD),
            params.period(&SMOOTH_K),
        )
    }

    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let (k_period, d_period, smooth_k) = Self::periods(params);
        let oversold = params.number(&OVERSOLD);
        let overbought = params.number(&OVERBOUGHT);
        if k_period == 0 || d_period == 0 || smooth_k == 0 {
            return Ok(SignalDecision::invalid_params("Stochastic periods must be at least 1"));
        }
        if oversold >= overbought {
            return Ok(SignalDecision::invalid_params(format!(
                "oversold level ({oversold}) must be below overbought level ({overbought})"
            )));
        }

        let cols = columns::stoch(k_period, d_period, smooth_k);
        let k = bars.recent::<2>(&cols.k)?;
        let d = bars.recent::<2>(&cols.d)?;
        let (k_now, d_now) = (k[1], d[1]);

        let event = match cross(k, d) {
            Some(Cross::Above) if k[0] < oversold && d[0] < oversold => Some(Event::Bullish(
                format!("Stochastic %K ({k_now:.2}) crossed ABOVE %D ({d_now:.2}) from OVERSOLD"),
            )),
            Some(Cross::Below) if k[0] > overbought && d[0] > overbought => Some(Event::Bearish(
                format!("Stochastic %K ({k_now:.2}) crossed BELOW %D ({d_now:.2}) from OVERBOUGHT"),
            )),
            _ => None,
        };

        Ok(route(position, event).unwrap_or_else(|| {
            if k_now < oversold {
                SignalDecision::hold(format!("Stochastic %K ({k_now:.2}) in OVERSOLD zone."))
            } else if k_now > overbought {
                SignalDecision::hold(format!("Stochastic %K ({k_now:.2}) in OVERBOUGHT zone."))
            } else if k_now > d_now {
                SignalDecision::hold("%K > %D (Bullish momentum)").with_bias(Bias::Bullish)
            } else {
                SignalDecision::hold("%K < %D (Bearish momentum)").with_bias(Bias::Bearish)
            }
        }))
    }
}

impl Strategy for StochasticMomentum {
    fn name(&self) -> &'static str {
        "Stochastic Oscillator Momentum"
    }

    fn slug(&self) -> &'static str {
        "stochastic_momentum"
    }

    fn description(&self) -> &'static str {
        "Enters on %K/%D crossovers that leave the oversold or overbought zone."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[K_PERIOD, D_PERIOD, SMOOTH_K, OVERSOLD, OVERBOUGHT]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let (k_period, d_period, smooth_k) = Self::periods(params);
        let cols = columns::stoch(k_period, d_period, smooth_k);
        let computed = inputs(bars, [HIGH, LOW, CLOSE]).and_then(|[high, low, close]| {
            let lines = oscillators::stochastic(&high, &low, &close, k_period, d_period, smooth_k)?;
            Ok(vec![(cols.k, lines.k), (cols.d, lines.d)])
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
        let (k_period, d_period, smooth_k) = Self::periods(params);
        let cols = columns::stoch(k_period, d_period, smooth_k);
        overlay::collect(bars, &[(cols.k, "stoch_k_line"), (cols.d, "stoch_d_line")])
    }
}
