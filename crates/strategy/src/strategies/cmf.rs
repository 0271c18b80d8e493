use common::series::{CLOSE, HIGH, LOW, VOLUME};
use common::{Bias, BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{columns, volume};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{cross_level, route, Cross, Event};
use crate::Strategy;

const LENGTH: ParamSpec = ParamSpec::number("cmf_length", "CMF Length", 20.0, 2.0, 100.0);
const THRESHOLD: ParamSpec =
    ParamSpec::stepped("cmf_entry_threshold", "Entry Threshold", 0.05, 0.01, 0.5, 0.01);

/// Chaikin money flow crossing a symmetric threshold.
pub struct CmfThreshold;

impl CmfThreshold {
    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let length = params.period(&LENGTH);
        let threshold = params.number(&THRESHOLD);
        if !(threshold > 0.0) {
            return Ok(SignalDecision::invalid_params(format!(
                "CMF threshold ({threshold}) must be positive"
            )));
        }

        let cmf = bars.recent::<2>(&columns::cmf(length))?;
        let latest = cmf[1];
        let event = match (cross_level(cmf, threshold), cross_level(cmf, -threshold)) {
            (Some(Cross::Above), _) => Some(Event::Bullish(format!(
                "CMF ({latest:.3}) crossed ABOVE +{threshold}"
            ))),
            (_, Some(Cross::Below)) => Some(Event::Bearish(format!(
                "CMF ({latest:.3}) crossed BELOW -{threshold}"
            ))),
            _ => None,
        };

        Ok(route(position, event).unwrap_or_else(|| {
            if latest > 0.0 {
                SignalDecision::hold(format!("CMF ({latest:.3}) shows buying pressure."))
                    .with_bias(Bias::Bullish)
            } else {
                SignalDecision::hold(format!("CMF ({latest:.3}) shows selling pressure."))
                    .with_bias(Bias::Bearish)
            }
        }))
    }
}

impl Strategy for CmfThreshold {
    fn name(&self) -> &'static str {
        "Chaikin Money Flow (CMF) Threshold"
    }

    fn slug(&self) -> &'static str {
        "cmf_threshold"
    }

    fn description(&self) -> &'static str {
        "Uses volume-weighted buying and selling pressure: enters when money flow crosses a threshold."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[LENGTH, THRESHOLD]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let length = params.period(&LENGTH);
        let computed =
            inputs(bars, [HIGH, LOW, CLOSE, VOLUME]).and_then(|[high, low, close, vol]| {
                Ok(vec![(
                    columns::cmf(length),
                    volume::cmf(&high, &low, &close, &vol, length)?,
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
        overlay::collect(bars, &[(columns::cmf(params.period(&LENGTH)), "cmf_line")])
    }
}
