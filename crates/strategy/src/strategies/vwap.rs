use common::series::{CLOSE, HIGH, LOW, VOLUME};
use common::{Bias, BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{columns, volume};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{cross, route, Event};
use crate::Strategy;

const LENGTH: ParamSpec = ParamSpec::number("vwap_length", "VWAP Length", 20.0, 1.0, 200.0);

pub struct VwapCross;

impl VwapCross {
    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let length = params.period(&LENGTH);
        if length == 0 {
            return Ok(SignalDecision::invalid_params("VWAP length must be at least 1"));
        }

        let close = bars.recent::<2>(CLOSE)?;
        let vwap = bars.recent::<2>(&columns::vwap(length))?;
        let (price, level) = (close[1], vwap[1]);

        let event = Event::from_cross(
            cross(close, vwap),
            format!("Price ({price:.2}) crossed ABOVE VWAP ({level:.2})"),
            format!("Price ({price:.2}) crossed BELOW VWAP ({level:.2})"),
        );

        Ok(route(position, event).unwrap_or_else(|| {
            if price > level {
                SignalDecision::hold(format!("Price ({price:.2}) currently ABOVE VWAP ({level:.2})."))
                    .with_bias(Bias::Bullish)
            } else if price < level {
                SignalDecision::hold(format!("Price ({price:.2}) currently BELOW VWAP ({level:.2})."))
                    .with_bias(Bias::Bearish)
            } else {
                SignalDecision::hold(format!("Price ({price:.2}) at VWAP ({level:.2})."))
            }
        }))
    }
}

impl Strategy for VwapCross {
    fn name(&self) -> &'static str {
        "VWAP Cross"
    }

    fn slug(&self) -> &'static str {
        "vwap_cross"
    }

    fn description(&self) -> &'static str {
        "Trades price crossing its rolling volume-weighted average price."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[LENGTH]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let length = params.period(&LENGTH);
        let computed =
            inputs(bars, [HIGH, LOW, CLOSE, VOLUME]).and_then(|[high, low, close, vol]| {
                Ok(vec![(
                    columns::vwap(length),
                    volume::vwap(&high, &low, &close, &vol, length)?,
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
        overlay::collect(bars, &[(columns::vwap(params.period(&LENGTH)), "vwap_line")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::testing::{bars, table, wave};
    use common::Signal;

    fn prices(close: [f64; 2], vwap: [f64; 2]) -> BarSeries {
        table(&[("close", &close), ("VWAP_20", &vwap)])
    }

    #[test]
    fn price_crossing_above_vwap_buys() {
        let decision = VwapCross.evaluate(
            &prices([99.0, 101.0], [100.0, 100.0]),
            &ParamSet::new(),
            PositionContext::Flat,
        );
        assert_eq!(decision.signal, Signal::Buy);
        assert_eq!(decision.details, "Price (101.00) crossed ABOVE VWAP (100.00).");
    }

    #[test]
    fn price_crossing_below_vwap_closes_a_long() {
        let decision = VwapCross.evaluate(
            &prices([101.0, 99.0], [100.0, 100.0]),
            &ParamSet::new(),
            PositionContext::Long,
        );
        assert_eq!(decision.signal, Signal::CloseLong);
    }

    #[test]
    fn price_staying_above_holds_with_bullish_bias() {
        let decision = VwapCross.evaluate(
            &prices([101.0, 102.0], [100.0, 100.0]),
            &ParamSet::new(),
            PositionContext::Flat,
        );
        assert_eq!(decision.signal, Signal::Hold);
        assert_eq!(decision.bias, Some(Bias::Bullish));
    }

    #[test]
    fn attach_produces_a_vwap_line() {
        let mut series = bars(&wave(40));
        VwapCross.attach_indicators(&mut series, &ParamSet::new());
        assert_eq!(VwapCross.overlays(&series, &ParamSet::new())["vwap_line"].len(), 21);
    }
}
