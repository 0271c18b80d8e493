use common::series::{CLOSE, HIGH, LOW};
use common::{BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{channels, columns};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{route, Event};
use crate::Strategy;

const EMA_LENGTH: ParamSpec = ParamSpec::number("kc_ema_length", "KC EMA Length", 20.0, 2.0, 100.0);
const ATR_LENGTH: ParamSpec = ParamSpec::number("kc_atr_length", "KC ATR Length", 10.0, 1.0, 50.0);
const MULTIPLIER: ParamSpec =
    ParamSpec::stepped("kc_atr_multiplier", "KC ATR Multiplier", 2.0, 0.1, 5.0, 0.1);

pub struct KeltnerBreakout;

struct Settings {
    ema: usize,
    atr: usize,
    multiplier: f64,
}

impl Settings {
    fn resolve(params: &ParamSet) -> Self {
        Self {
            ema: params.period(&EMA_LENGTH),
            atr: params.period(&ATR_LENGTH),
            multiplier: params.number(&MULTIPLIER),
        }
    }

    fn columns(&self) -> columns::BandColumns {
        columns::keltner(self.ema, self.atr, self.multiplier)
    }
}

impl KeltnerBreakout {
    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let s = Settings::resolve(params);
        if s.ema == 0 || s.atr == 0 || !(s.multiplier > 0.0) {
            return Ok(SignalDecision::invalid_params(format!(
                "lengths ({}, {}) and multiplier ({}) must be positive",
                s.ema, s.atr, s.multiplier
            )));
        }
        let cols = s.columns();

        let [close] = bars.recent::<1>(CLOSE)?;
        let [upper] = bars.recent::<1>(&cols.upper)?;
        let [lower] = bars.recent::<1>(&cols.lower)?;

        let event = if close > upper {
            Some(Event::Bullish(format!("Price ({close:.2}) > Upper KC ({upper:.2})")))
        } else if close < lower {
            Some(Event::Bearish(format!("Price ({close:.2}) < Lower KC ({lower:.2})")))
        } else {
            None
        };

        Ok(route(position, event).unwrap_or_else(|| {
            SignalDecision::hold(format!(
                "Price ({close:.2}) within KC ({lower:.2} - {upper:.2})."
            ))
        }))
    }
}

impl Strategy for KeltnerBreakout {
    fn name(&self) -> &'static str {
        "Keltner Channel Breakout"
    }

    fn slug(&self) -> &'static str {
        "keltner_breakout"
    }

    fn description(&self) -> &'static str {
        "Trades closes outside an EMA channel whose width scales with the average true range."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[EMA_LENGTH, ATR_LENGTH, MULTIPLIER]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let s = Settings::resolve(params);
        let cols = s.columns();
        let computed = inputs(bars, [HIGH, LOW, CLOSE]).and_then(|[high, low, close]| {
            let bands = channels::keltner(&high, &low, &close, s.ema, s.atr, s.multiplier)?;
            Ok(vec![
                (cols.lower, bands.lower),
                (cols.middle, bands.middle),
                (cols.upper, bands.upper),
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
        let cols = Settings::resolve(params).columns();
        overlay::collect(
            bars,
            &[
                (cols.upper, "keltner_upper"),
                (cols.middle, "keltner_middle"),
                (cols.lower, "keltner_lower"),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::testing::{bars, table, wave};
    use common::Signal;

    fn channel(close: f64) -> BarSeries {
        table(&[
            ("close", &[close]),
            ("KCLe_20_10_2.0", &[95.0]),
            ("KCUe_20_10_2.0", &[105.0]),
        ])
    }

    #[test]
    fn breakout_above_buys() {
        let decision = KeltnerBreakout.evaluate(&channel(106.0), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Buy);
    }

    #[test]
    fn breakdown_closes_a_long() {
        let decision = KeltnerBreakout.evaluate(&channel(94.0), &ParamSet::new(), PositionContext::Long);
        assert_eq!(decision.signal, Signal::CloseLong);
    }

    #[test]
    fn inside_channel_holds() {
        let decision = KeltnerBreakout.evaluate(&channel(100.0), &ParamSet::new(), PositionContext::Short);
        assert_eq!(decision.signal, Signal::Hold);
        assert!(decision.details.contains("within KC"));
    }

    #[test]
    fn attaches_a_full_channel() {
        let mut series = bars(&wave(50));
        KeltnerBreakout.attach_indicators(&mut series, &ParamSet::new());
        assert!(series.has_columns(&["KCLe_20_10_2.0", "KCBe_20_10_2.0", "KCUe_20_10_2.0"]));
        assert_eq!(KeltnerBreakout.overlays(&series, &ParamSet::new()).len(), 3);
    }
}
