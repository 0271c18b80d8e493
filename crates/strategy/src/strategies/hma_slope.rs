use common::series::CLOSE;
use common::{Bias, BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{columns, moving};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{cross_level, route, Event};
use crate::Strategy;

const LENGTH: ParamSpec = ParamSpec::number("hma_length", "HMA Length", 20.0, 2.0, 200.0);

/// Turns in the slope of the Hull moving average.
pub struct HmaSlope;

impl HmaSlope {
    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let length = params.period(&LENGTH);
        if length < 2 {
            return Ok(SignalDecision::invalid_params(format!(
                "HMA length ({length}) must be at least 2"
            )));
        }

        let [h0, h1, h2] = bars.recent::<3>(&columns::hma(length))?;
        let slopes = [h1 - h0, h2 - h1];

        let event = Event::from_cross(
            cross_level(slopes, 0.0),
            format!("HMA({length}) slope turned POSITIVE (HMA: {h2:.2})"),
            format!("HMA({length}) slope turned NEGATIVE (HMA: {h2:.2})"),
        );

        Ok(route(position, event).unwrap_or_else(|| match slopes[1] {
            s if s > 0.0 => {
                SignalDecision::hold(format!("HMA({length}) currently RISING (HMA: {h2:.2})."))
                    .with_bias(Bias::Bullish)
            }
            s if s < 0.0 => {
                SignalDecision::hold(format!("HMA({length}) currently FALLING (HMA: {h2:.2})."))
                    .with_bias(Bias::Bearish)
            }
            _ => SignalDecision::hold(format!("HMA({length}) slope is FLAT (HMA: {h2:.2}).")),
        }))
    }
}

impl Strategy for HmaSlope {
    fn name(&self) -> &'static str {
        "HMA Slope Trend"
    }

    fn slug(&self) -> &'static str {
        "hma_slope_trend"
    }

    fn description(&self) -> &'static str {
        "Enters when the Hull moving average turns up or down."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[LENGTH]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let length = params.period(&LENGTH);
        let computed = inputs(bars, [CLOSE])
            .and_then(|[close]| Ok(vec![(columns::hma(length), moving::hma(&close, length)?)]));
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
        overlay::collect(bars, &[(columns::hma(params.period(&LENGTH)), "hma_line")])
    }
}
