use common::series::{HIGH, LOW};
use common::{Bias, BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{columns, oscillators};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{cross_level, route, Event};
use crate::Strategy;

const FAST: ParamSpec = ParamSpec::number("ao_fast_length", "AO Fast Length", 5.0, 1.0, 50.0);
const SLOW: ParamSpec = ParamSpec::number("ao_slow_length", "AO Slow Length", 34.0, 2.0, 100.0);

pub struct AoZeroCross;

impl AoZeroCross {
    fn lengths(params: &ParamSet) -> (usize, usize) {
        (params.period(&FAST), params.period(&SLOW))
    }

    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let (fast, slow) = Self::lengths(params);
        if fast == 0 || fast >= slow {
            return Ok(SignalDecision::invalid_params(format!(
                "AO fast length ({fast}) must be at least 1 and below slow length ({slow})"
            )));
        }

        let ao = bars.recent::<2>(&columns::ao(fast, slow))?;
        let latest = ao[1];
        let event = Event::from_cross(
            cross_level(ao, 0.0),
            format!("AO ({latest:.4}) crossed ABOVE zero"),
            format!("AO ({latest:.4}) crossed BELOW zero"),
        );

        Ok(route(position, event).unwrap_or_else(|| {
            if latest > 0.0 {
                SignalDecision::hold(format!("AO ({latest:.4}) above zero (Bullish Momentum)."))
                    .with_bias(Bias::Bullish)
            } else {
                SignalDecision::hold(format!("AO ({latest:.4}) at or below zero (Bearish Momentum)."))
                    .with_bias(Bias::Bearish)
            }
        }))
    }
}

impl Strategy for AoZeroCross {
    fn name(&self) -> &'static str {
        "Awesome Oscillator Zero Cross"
    }

    fn slug(&self) -> &'static str {
        "ao_zero_cross"
    }

    fn description(&self) -> &'static str {
        "Trades the Awesome Oscillator crossing its zero line."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[FAST, SLOW]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let (fast, slow) = Self::lengths(params);
        let computed = inputs(bars, [HIGH, LOW]).and_then(|[high, low]| {
            Ok(vec![(
                columns::ao(fast, slow),
                oscillators::awesome(&high, &low, fast, slow)?,
            )])
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
        let (fast, slow) = Self::lengths(params);
        overlay::collect(bars, &[(columns::ao(fast, slow), "ao_line")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::testing::table;
    use common::Signal;

    fn ao(values: [f64; 2]) -> BarSeries {
        table(&[("AO_5_34", &values)])
    }

    #[test]
    fn zero_cross_up_buys() {
        let decision = AoZeroCross.evaluate(&ao([-0.3, 0.2]), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Buy);
    }

    #[test]
    fn zero_cross_up_closes_a_short() {
        let decision = AoZeroCross.evaluate(&ao([0.0, 0.2]), &ParamSet::new(), PositionContext::Short);
        assert_eq!(decision.signal, Signal::CloseShort);
    }

    #[test]
    fn staying_positive_holds() {
        let decision = AoZeroCross.evaluate(&ao([0.1, 0.2]), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Hold);
        assert_eq!(decision.bias, Some(Bias::Bullish));
    }
}
