use common::series::{CLOSE, HIGH, LOW};
use common::{Bias, BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{columns, oscillators};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{cross_level, route, Cross, Event};
use crate::Strategy;

const LENGTH: ParamSpec = ParamSpec::number("cci_length", "CCI Length", 20.0, 2.0, 100.0);
const LOWER: ParamSpec =
    ParamSpec::number("cci_lower_threshold", "Lower Threshold", -100.0, -300.0, -1.0);
const UPPER: ParamSpec =
    ParamSpec::number("cci_upper_threshold", "Upper Threshold", 100.0, 1.0, 300.0);

/// CCI turning back from its extremes.
pub struct CciCyclical;

impl CciCyclical {
    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let length = params.period(&LENGTH);
        let lower = params.number(&LOWER);
        let upper = params.number(&UPPER);
        if !(lower < 0.0 && 0.0 < upper) {
            return Ok(SignalDecision::invalid_params(format!(
                "thresholds must satisfy lower ({lower}) < 0 < upper ({upper})"
            )));
        }

        let cci = bars.recent::<2>(&columns::cci(length))?;
        let latest = cci[1];
        let event = match (cross_level(cci, lower), cross_level(cci, upper)) {
            (Some(Cross::Above), _) => Some(Event::Bullish(format!(
                "CCI ({latest:.2}) crossed ABOVE {lower}"
            ))),
            (_, Some(Cross::Below)) => Some(Event::Bearish(format!(
                "CCI ({latest:.2}) crossed BELOW {upper}"
            ))),
            _ => None,
        };

        Ok(route(position, event).unwrap_or_else(|| {
            if latest < lower {
                SignalDecision::hold(format!("CCI ({latest:.2}) below {lower} (Oversold)."))
                    .with_bias(Bias::Bullish)
            } else if latest > upper {
                SignalDecision::hold(format!("CCI ({latest:.2}) above {upper} (Overbought)."))
                    .with_bias(Bias::Bearish)
            } else {
                SignalDecision::hold(format!("CCI ({latest:.2}) neutral."))
            }
        }))
    }
}

impl Strategy for CciCyclical {
    fn name(&self) -> &'static str {
        "CCI Cyclical Trade"
    }

    fn slug(&self) -> &'static str {
        "cci_cyclical"
    }

    fn description(&self) -> &'static str {
        "Buys when the commodity channel index recovers above its lower threshold and sells when it drops back below the upper one."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[LENGTH, LOWER, UPPER]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let length = params.period(&LENGTH);
        let computed = inputs(bars, [HIGH, LOW, CLOSE]).and_then(|[high, low, close]| {
            Ok(vec![(
                columns::cci(length),
                oscillators::cci(&high, &low, &close, length)?,
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
        overlay::collect(bars, &[(columns::cci(params.period(&LENGTH)), "cci_line")])
    }
}
