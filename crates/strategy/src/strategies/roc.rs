use common::series::CLOSE;
use common::{Bias, BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{columns, oscillators};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{route, Event};
use crate::Strategy;

const LENGTH: ParamSpec = ParamSpec::number("roc_length", "ROC Length", 12.0, 1.0, 100.0);
const THRESHOLD: ParamSpec =
    ParamSpec::stepped("roc_threshold_percent", "ROC Threshold (%)", 0.5, 0.01, 10.0, 0.01);

pub struct RocBreakout;

impl RocBreakout {
    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let length = params.period(&LENGTH);
        let threshold = params.number(&THRESHOLD);
        if length == 0 || !(threshold > 0.0) {
            return Ok(SignalDecision::invalid_params(format!(
                "ROC threshold ({threshold}) must be positive"
            )));
        }

        let [roc] = bars.recent::<1>(&columns::roc(length))?;
        let event = if roc > threshold {
            Some(Event::Bullish(format!("ROC ({roc:.2}%) > +{threshold}%")))
        } else if roc < -threshold {
            Some(Event::Bearish(format!("ROC ({roc:.2}%) < -{threshold}%")))
        } else {
            None
        };

        Ok(route(position, event).unwrap_or_else(|| match roc {
            r if r > 0.0 => SignalDecision::hold(format!("ROC ({r:.2}%) positive, below threshold."))
                .with_bias(Bias::Bullish),
            r if r < 0.0 => SignalDecision::hold(format!("ROC ({r:.2}%) negative, above -threshold."))
                .with_bias(Bias::Bearish),
            _ => SignalDecision::hold("ROC flat."),
        }))
    }
}

impl Strategy for RocBreakout {
    fn name(&self) -> &'static str {
        "Rate of Change (ROC) Threshold Breakout"
    }

    fn slug(&self) -> &'static str {
        "roc_threshold_breakout"
    }

    fn description(&self) -> &'static str {
        "Acts when the percentage rate of change moves beyond a symmetric threshold."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[LENGTH, THRESHOLD]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let length = params.period(&LENGTH);
        let computed = inputs(bars, [CLOSE])
            .and_then(|[close]| Ok(vec![(columns::roc(length), oscillators::roc(&close, length)?)]));
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
        overlay::collect(bars, &[(columns::roc(params.period(&LENGTH)), "roc_line")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::testing::table;
    use common::Signal;

    fn roc(value: f64) -> BarSeries {
        table(&[("ROC_12", &[value])])
    }

    #[test]
    fn strong_positive_roc_buys() {
        let decision = RocBreakout.evaluate(&roc(1.2), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Buy);
    }

    #[test]
    fn strong_negative_roc_closes_a_long() {
        let decision = RocBreakout.evaluate(&roc(-0.8), &ParamSet::new(), PositionContext::Long);
        assert_eq!(decision.signal, Signal::CloseLong);
    }

    #[test]
    fn small_roc_holds() {
        let decision = RocBreakout.evaluate(&roc(0.2), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Hold);
        assert_eq!(decision.bias, Some(Bias::Bullish));
    }

    #[test]
    fn threshold_must_be_positive() {
        let params = ParamSet::new().with("roc_threshold_percent", 0.0);
        let decision = RocBreakout.evaluate(&roc(5.0), &params, PositionContext::Flat);
        assert!(decision.details.starts_with("Invalid parameters"));
    }
}
