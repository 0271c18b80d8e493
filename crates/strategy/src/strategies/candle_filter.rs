use common::series::{CLOSE, HIGH, LOW, OPEN};
use common::{BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::candles::{self, Pattern};
use crate::indicators::{columns, moving, IndicatorError};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{route, Event};
use crate::Strategy;

const TREND_EMA: ParamSpec =
    ParamSpec::number("trend_ema_length", "Trend EMA Length", 20.0, 5.0, 200.0);
const PATTERN: ParamSpec = ParamSpec::select(
    "candlestick_pattern",
    "Candlestick Pattern",
    "ENGULFING",
    Pattern::CODES,
);

/// A chosen candlestick pattern, confirmed by price being on the matching
/// side of a trend EMA.
pub struct CandleEmaFilter;

impl CandleEmaFilter {
    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let length = params.period(&TREND_EMA);
        let pattern: Pattern = match params.choice(&PATTERN).parse() {
            Ok(p) => p,
            Err(reason) => return Ok(SignalDecision::invalid_params(reason)),
        };
        let title = pattern.title();

        let [close] = bars.recent::<1>(CLOSE)?;
        let [ema] = bars.recent::<1>(&columns::ema(length))?;
        let [score] = bars.recent::<1>(&columns::pattern(pattern.code()))?;

        let event = if score > 0.0 && close > ema {
            Some(Event::Bullish(format!(
                "Bullish {title} detected with Price ({close:.2}) > EMA({length}) ({ema:.2})"
            )))
        } else if score < 0.0 && close < ema {
            Some(Event::Bearish(format!(
                "Bearish {title} detected with Price ({close:.2}) < EMA({length}) ({ema:.2})"
            )))
        } else {
            None
        };

        Ok(route(position, event).unwrap_or_else(|| {
            if score == 0.0 {
                return SignalDecision::hold(format!(
                    "No significant {title} pattern on latest candle."
                ));
            }
            let kind = if score > 0.0 { "Bullish" } else { "Bearish" };
            let trend = if close > ema {
                "uptrend (Price > EMA)"
            } else if close < ema {
                "downtrend (Price < EMA)"
            } else {
                "price at EMA"
            };
            SignalDecision::hold(format!("{kind} {title} pattern detected. Price is in {trend}."))
        }))
    }
}

impl Strategy for CandleEmaFilter {
    fn name(&self) -> &'static str {
        "Candlestick Pattern + EMA Trend Filter"
    }

    fn slug(&self) -> &'static str {
        "candle_ema_filter"
    }

    fn description(&self) -> &'static str {
        "Acts on a selected candlestick pattern only when price agrees with the trend EMA."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[TREND_EMA, PATTERN]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let length = params.period(&TREND_EMA);
        let choice = params.choice(&PATTERN);
        let computed = inputs(bars, [OPEN, HIGH, LOW, CLOSE]).and_then(|[open, high, low, close]| {
            let pattern: Pattern = choice.parse().map_err(IndicatorError::InvalidParameter)?;
            Ok(vec![
                (columns::ema(length), moving::ema(&close, length)?),
                (
                    columns::pattern(pattern.code()),
                    candles::detect(pattern, &open, &high, &low, &close)?,
                ),
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
        let length = params.period(&TREND_EMA);
        overlay::collect(bars, &[(columns::ema(length), "trend_ema_line")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::testing::table;
    use common::Signal;

    fn latest(close: f64, ema: f64, score: f64) -> BarSeries {
        table(&[
            ("close", &[close]),
            ("EMA_20", &[ema]),
            ("pattern_engulfing", &[score]),
        ])
    }

    #[test]
    fn bullish_pattern_in_uptrend_buys() {
        let decision = CandleEmaFilter.evaluate(&latest(105.0, 100.0, 100.0), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Buy);
        assert!(decision.details.starts_with("Bullish Engulfing detected"));
    }

    #[test]
    fn bullish_pattern_against_trend_holds() {
        let decision = CandleEmaFilter.evaluate(&latest(95.0, 100.0, 100.0), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Hold);
        assert!(decision.details.contains("downtrend"));
    }

    #[test]
    fn bearish_pattern_in_downtrend_closes_a_long() {
        let decision = CandleEmaFilter.evaluate(&latest(95.0, 100.0, -100.0), &ParamSet::new(), PositionContext::Long);
        assert_eq!(decision.signal, Signal::CloseLong);
    }

    #[test]
    fn unknown_pattern_is_rejected() {
        let params = ParamSet::new().with("candlestick_pattern", "TRIANGLE");
        let decision = CandleEmaFilter.evaluate(&latest(105.0, 100.0, 100.0), &params, PositionContext::Flat);
        assert!(decision.details.starts_with("Invalid parameters"));
    }

    #[test]
    fn attaches_the_selected_pattern_column() {
        let mut series = table(&[
            ("open", &[10.0, 8.8]),
            ("high", &[10.5, 11.0]),
            ("low", &[8.5, 8.7]),
            ("close", &[9.0, 10.8]),
        ]);
        let params = ParamSet::new().with("trend_ema_length", 1.0);
        CandleEmaFilter.attach_indicators(&mut series, &params);
        assert_eq!(series.column("pattern_engulfing").unwrap()[1], Some(100.0));
        assert!(series.has_column("EMA_1"));
    }
}
