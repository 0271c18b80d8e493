use common::series::CLOSE;
use common::{Bias, BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{columns, oscillators};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{cross_level, route, Cross, Event};
use crate::Strategy;

const LENGTH: ParamSpec = ParamSpec::number("rsi_length", "RSI Length", 14.0, 2.0, 50.0);
const OVERSOLD: ParamSpec =
    ParamSpec::number("rsi_oversold_level", "Oversold Level", 30.0, 1.0, 49.0);
const OVERBOUGHT: ParamSpec =
    ParamSpec::number("rsi_overbought_level", "Overbought Level", 70.0, 51.0, 99.0);

/// RSI leaving the oversold / overbought zones.
pub struct RsiMeanReversion;

impl RsiMeanReversion {
    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let length = params.period(&LENGTH);
        let oversold = params.number(&OVERSOLD);
        let overbought = params.number(&OVERBOUGHT);
        if oversold >= overbought {
            return Ok(SignalDecision::invalid_params(format!(
                "oversold level ({oversold}) must be below overbought level ({overbought})"
            )));
        }

        let rsi = bars.recent::<2>(&columns::rsi(length))?;
        let latest = rsi[1];

        let event = match (cross_level(rsi, oversold), cross_level(rsi, overbought)) {
            (Some(Cross::Above), _) => Some(Event::Bullish(format!(
                "RSI ({latest:.2}) crossed ABOVE oversold ({oversold})"
            ))),
            (_, Some(Cross::Below)) => Some(Event::Bearish(format!(
                "RSI ({latest:.2}) crossed BELOW overbought ({overbought})"
            ))),
            _ => None,
        };

        Ok(route(position, event).unwrap_or_else(|| {
            if latest < oversold {
                SignalDecision::hold(format!("RSI OVERSOLD ({latest:.2} < {oversold})."))
                    .with_bias(Bias::Bullish)
            } else if latest > overbought {
                SignalDecision::hold(format!("RSI OVERBOUGHT ({latest:.2} > {overbought})."))
                    .with_bias(Bias::Bearish)
            } else {
                SignalDecision::hold(format!("RSI neutral ({latest:.2})."))
            }
        }))
    }
}

impl Strategy for RsiMeanReversion {
    fn name(&self) -> &'static str {
        "RSI Mean Reversion"
    }

    fn slug(&self) -> &'static str {
        "rsi_mean_reversion"
    }

    fn description(&self) -> &'static str {
        "Buys when RSI climbs back out of the oversold zone and sells when it falls back from overbought."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[LENGTH, OVERSOLD, OVERBOUGHT]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let length = params.period(&LENGTH);
        let computed = inputs(bars, [CLOSE])
            .and_then(|[close]| Ok(vec![(columns::rsi(length), oscillators::rsi(&close, length)?)]));
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
        let length = params.period(&LENGTH);
        overlay::collect(bars, &[(columns::rsi(length), "rsi_line")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::testing::{bars, table, wave};
    use common::Signal;

    fn rsi(values: &[f64]) -> BarSeries {
        table(&[("RSI_14", values)])
    }

    #[test]
    fn leaving_oversold_buys() {
        let decision = RsiMeanReversion.evaluate(&rsi(&[28.0, 31.0]), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Buy);
        assert_eq!(decision.details, "RSI (31.00) crossed ABOVE oversold (30).");
    }

    #[test]
    fn leaving_overbought_sells() {
        let decision = RsiMeanReversion.evaluate(&rsi(&[72.0, 69.0]), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Sell);
    }

    #[test]
    fn leaving_overbought_closes_a_long() {
        let decision = RsiMeanReversion.evaluate(&rsi(&[72.0, 69.0]), &ParamSet::new(), PositionContext::Long);
        assert_eq!(decision.signal, Signal::CloseLong);
        assert!(decision.details.ends_with("(exit long)."));
    }

    #[test]
    fn staying_oversold_is_a_hold() {
        let decision = RsiMeanReversion.evaluate(&rsi(&[25.0, 22.0]), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Hold);
        assert!(decision.details.starts_with("RSI OVERSOLD"));
    }

    #[test]
    fn missing_previous_value_is_insufficient() {
        let decision = RsiMeanReversion.evaluate(&rsi(&[f64::NAN, 31.0]), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Hold);
        assert!(decision.details.starts_with("Insufficient data"));
    }

    #[test]
    fn crossed_levels_are_rejected() {
        let params = ParamSet::new()
            .with("rsi_oversold_level", 80.0)
            .with("rsi_overbought_level", 70.0);
        let decision = RsiMeanReversion.evaluate(&rsi(&[28.0, 31.0]), &params, PositionContext::Flat);
        assert!(decision.details.starts_with("Invalid parameters"));
    }

    #[test]
    fn attached_rsi_stays_in_range() {
        let mut series = bars(&wave(80));
        RsiMeanReversion.attach_indicators(&mut series, &ParamSet::new());
        let column = series.column("RSI_14").unwrap();
        assert!(column[..14].iter().all(Option::is_none));
        assert!(column[14..].iter().flatten().all(|v| (0.0..=100.0).contains(v)));
    }
}
