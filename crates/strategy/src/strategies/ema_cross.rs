use common::series::CLOSE;
use common::{BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{columns, moving};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{cross, lean, route, Event};
use crate::Strategy;

const FAST: ParamSpec = ParamSpec::number("ema_fast_period", "Fast EMA Period", 9.0, 1.0, 100.0);
const SLOW: ParamSpec = ParamSpec::number("ema_slow_period", "Slow EMA Period", 21.0, 2.0, 200.0);

pub struct EmaCrossover;

impl EmaCrossover {
    fn periods(params: &ParamSet) -> (usize, usize) {
        (params.period(&FAST), params.period(&SLOW))
    }

    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let (fast_period, slow_period) = Self::periods(params);
        if fast_period == 0 || fast_period >= slow_period {
            return Ok(SignalDecision::invalid_params(format!(
                "fast EMA period ({fast_period}) must be at least 1 and below the slow period ({slow_period})"
            )));
        }

        let fast = bars.recent::<2>(&columns::ema(fast_period))?;
        let slow = bars.recent::<2>(&columns::ema(slow_period))?;
        let (fast_label, slow_label) = (format!("EMA({fast_period})"), format!("EMA({slow_period})"));

        let event = Event::from_cross(
            cross(fast, slow),
            format!("{fast_label} crossed ABOVE {slow_label}"),
            format!("{fast_label} crossed BELOW {slow_label}"),
        );
        Ok(route(position, event)
            .unwrap_or_else(|| lean(&fast_label, fast[1], &slow_label, slow[1])))
    }
}

impl Strategy for EmaCrossover {
    fn name(&self) -> &'static str {
        "Simple EMA Crossover"
    }

    fn slug(&self) -> &'static str {
        "ema_simple_cross"
    }

    fn description(&self) -> &'static str {
        "Trades crossovers of a fast and a slow exponential moving average."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[FAST, SLOW]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let (fast, slow) = Self::periods(params);
        let computed = inputs(bars, [CLOSE]).and_then(|[close]| {
            Ok(vec![
                (columns::ema(fast), moving::ema(&close, fast)?),
                (columns::ema(slow), moving::ema(&close, slow)?),
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
        let (fast, slow) = Self::periods(params);
        overlay::collect(
            bars,
            &[
                (columns::ema(fast), "ema_fast"),
                (columns::ema(slow), "ema_slow"),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::testing::table;
    use common::{Bias, Signal};

    #[test]
    fn cross_below_sells_when_flat() {
        let bars = table(&[("EMA_9", &[101.0, 99.0]), ("EMA_21", &[100.0, 100.0])]);
        let decision = EmaCrossover.evaluate(&bars, &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Sell);
        assert_eq!(decision.details, "EMA(9) crossed BELOW EMA(21).");
    }

    #[test]
    fn cross_above_closes_a_short() {
        let bars = table(&[("EMA_9", &[99.0, 101.0]), ("EMA_21", &[100.0, 100.0])]);
        let decision = EmaCrossover.evaluate(&bars, &ParamSet::new(), PositionContext::Short);
        assert_eq!(decision.signal, Signal::CloseShort);
    }

    #[test]
    fn no_cross_reports_bias() {
        let bars = table(&[("EMA_9", &[98.0, 99.0]), ("EMA_21", &[100.0, 100.0])]);
        let decision = EmaCrossover.evaluate(&bars, &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Hold);
        assert_eq!(decision.bias, Some(Bias::Bearish));
    }

    #[test]
    fn custom_periods_change_the_columns_read() {
        let bars = table(&[("EMA_5", &[99.0, 101.0]), ("EMA_10", &[100.0, 100.0])]);
        let params = ParamSet::new()
            .with("ema_fast_period", 5.0)
            .with("ema_slow_period", 10.0);
        let decision = EmaCrossover.evaluate(&bars, &params, PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Buy);
    }
}
