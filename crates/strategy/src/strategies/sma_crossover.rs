use common::series::CLOSE;
use common::{BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{columns, moving};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{cross, lean, route, Event};
use crate::Strategy;

const SHORT: ParamSpec =
    ParamSpec::number("short_sma_period", "Short SMA Period", 10.0, 1.0, 100.0);
const LONG: ParamSpec = ParamSpec::number("long_sma_period", "Long SMA Period", 20.0, 2.0, 200.0);

/// Short SMA crossing the long SMA.
pub struct SmaCrossover;

struct Settings {
    short: usize,
    long: usize,
}

impl Settings {
    fn resolve(params: &ParamSet) -> Self {
        Self {
            short: params.period(&SHORT),
            long: params.period(&LONG),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.short == 0 || self.short >= self.long {
            return Err(format!(
                "short SMA period ({}) must be at least 1 and below the long period ({})",
                self.short, self.long
            ));
        }
        Ok(())
    }
}

impl SmaCrossover {
    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let s = Settings::resolve(params);
        if let Err(reason) = s.validate() {
            return Ok(SignalDecision::invalid_params(reason));
        }

        let short = bars.recent::<2>(&columns::sma(s.short))?;
        let long = bars.recent::<2>(&columns::sma(s.long))?;
        let (short_label, long_label) = (format!("SMA({})", s.short), format!("SMA({})", s.long));

        let event = Event::from_cross(
            cross(short, long),
            format!("{short_label} crossed ABOVE {long_label}"),
            format!("{short_label} crossed BELOW {long_label}"),
        );
        Ok(route(position, event)
            .unwrap_or_else(|| lean(&short_label, short[1], &long_label, long[1])))
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &'static str {
        "SMA Crossover"
    }

    fn slug(&self) -> &'static str {
        "sma_crossover"
    }

    fn description(&self) -> &'static str {
        "Buys when the short simple moving average crosses above the long one and sells on the opposite cross."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[SHORT, LONG]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let s = Settings::resolve(params);
        let computed = inputs(bars, [CLOSE]).and_then(|[close]| {
            Ok(vec![
                (columns::sma(s.short), moving::sma(&close, s.short)?),
                (columns::sma(s.long), moving::sma(&close, s.long)?),
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
        let s = Settings::resolve(params);
        overlay::collect(
            bars,
            &[
                (columns::sma(s.short), "sma_short"),
                (columns::sma(s.long), "sma_long"),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::testing::{bars, table, wave};
    use common::{Bias, Signal};

    fn crossing(short: [f64; 2], long: [f64; 2]) -> BarSeries {
        table(&[("SMA_10", &short), ("SMA_20", &long)])
    }

    #[test]
    fn cross_above_buys_when_flat() {
        let bars = crossing([19.8, 20.3], [20.0, 20.1]);
        let decision = SmaCrossover.evaluate(&bars, &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Buy);
        assert_eq!(decision.details, "SMA(10) crossed ABOVE SMA(20).");
    }

    #[test]
    fn cross_below_closes_a_long() {
        let bars = crossing([20.3, 19.8], [20.1, 20.0]);
        let decision = SmaCrossover.evaluate(&bars, &ParamSet::new(), PositionContext::Long);
        assert_eq!(decision.signal, Signal::CloseLong);
    }

    #[test]
    fn cross_above_while_long_is_an_informational_hold() {
        let bars = crossing([19.8, 20.3], [20.0, 20.1]);
        let decision = SmaCrossover.evaluate(&bars, &ParamSet::new(), PositionContext::Long);
        assert_eq!(decision.signal, Signal::Hold);
        assert_eq!(decision.bias, Some(Bias::Bullish));
        assert!(decision.details.contains("Long Bias"));
    }

    #[test]
    fn single_bar_is_insufficient() {
        let bars = table(&[("SMA_10", &[20.0]), ("SMA_20", &[19.0])]);
        let decision = SmaCrossover.evaluate(&bars, &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Hold);
        assert!(decision.details.starts_with("Insufficient data"));
    }

    #[test]
    fn inverted_periods_are_rejected() {
        let params = ParamSet::new()
            .with("short_sma_period", 30.0)
            .with("long_sma_period", 20.0);
        let decision = SmaCrossover.evaluate(&crossing([1.0, 2.0], [1.0, 1.0]), &params, PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Hold);
        assert!(decision.details.starts_with("Invalid parameters"));
    }

    #[test]
    fn attach_then_overlay_round_trip() {
        let mut series = bars(&wave(60));
        SmaCrossover.attach_indicators(&mut series, &ParamSet::new());
        assert!(series.has_columns(&["SMA_10", "SMA_20"]));

        let overlays = SmaCrossover.overlays(&series, &ParamSet::new());
        assert_eq!(overlays["sma_short"].len(), 51);
        assert_eq!(overlays["sma_long"].len(), 41);
    }

    #[test]
    fn missing_close_column_skips_attachment() {
        let mut series = table(&[("high", &[1.0, 2.0])]);
        SmaCrossover.attach_indicators(&mut series, &ParamSet::new());
        assert!(!series.has_column("SMA_10"));
    }
}
