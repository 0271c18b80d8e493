use common::series::CLOSE;
use common::{Bias, BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{channels, columns};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{cross, Cross};
use crate::Strategy;

const LENGTH: ParamSpec = ParamSpec::number("bbands_length", "BBands Length", 20.0, 2.0, 100.0);
const STD_DEV: ParamSpec =
    ParamSpec::stepped("bbands_std_dev", "BBands Std Dev", 2.0, 0.1, 5.0, 0.1);

/// Fades touches of the outer bands and exits on a return to the middle
/// band.
pub struct BollingerReversion;

impl BollingerReversion {
    fn settings(params: &ParamSet) -> (usize, f64) {
        (params.period(&LENGTH), params.number(&STD_DEV))
    }

    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let (length, std_dev) = Self::settings(params);
        if length == 0 || !(std_dev > 0.0) {
            return Ok(SignalDecision::invalid_params(format!(
                "length ({length}) and std dev ({std_dev}) must be positive"
            )));
        }
        let cols = columns::bbands(length, std_dev);

        let close = bars.recent::<2>(CLOSE)?;
        let middle = bars.recent::<2>(&cols.middle)?;
        let [lower] = bars.recent::<1>(&cols.lower)?;
        let [upper] = bars.recent::<1>(&cols.upper)?;
        let latest = close[1];

        let decision = match position {
            PositionContext::Flat if latest <= lower => {
                Some(SignalDecision::buy(format!("Price ({latest:.2}) <= Lower BB ({lower:.2}).")))
            }
            PositionContext::Flat if latest >= upper => {
                Some(SignalDecision::sell(format!("Price ({latest:.2}) >= Upper BB ({upper:.2}).")))
            }
            PositionContext::Long if cross(close, middle) == Some(Cross::Above) => Some(
                SignalDecision::close_long("Price crossed above Middle BB (exit long)."),
            ),
            PositionContext::Short if cross(close, middle) == Some(Cross::Below) => Some(
                SignalDecision::close_short("Price crossed below Middle BB (exit short)."),
            ),
            _ => None,
        };

        Ok(decision.unwrap_or_else(|| {
            if latest > middle[1] {
                SignalDecision::hold("Price > Middle BB (Bullish Bias).").with_bias(Bias::Bullish)
            } else {
                SignalDecision::hold("Price <= Middle BB (Bearish Bias).").with_bias(Bias::Bearish)
            }
        }))
    }
}

impl Strategy for BollingerReversion {
    fn name(&self) -> &'static str {
        "Bollinger Bands Mean Reversion"
    }

    fn slug(&self) -> &'static str {
        "bbands_mean_reversion"
    }

    fn description(&self) -> &'static str {
        "Buys at the lower band, sells at the upper band and exits when price returns through the middle band."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[LENGTH, STD_DEV]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let (length, std_dev) = Self::settings(params);
        let cols = columns::bbands(length, std_dev);
        let computed = inputs(bars, [CLOSE]).and_then(|[close]| {
            let bands = channels::bollinger(&close, length, std_dev)?;
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
        let (length, std_dev) = Self::settings(params);
        let cols = columns::bbands(length, std_dev);
        overlay::collect(
            bars,
            &[
                (cols.lower, "bband_lower"),
                (cols.middle, "bband_middle"),
                (cols.upper, "bband_upper"),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::testing::{bars, table, wave};
    use common::Signal;

    fn bands(close: [f64; 2], middle: [f64; 2]) -> BarSeries {
        table(&[
            ("close", &close),
            ("BBL_20_2.0", &[90.0, 90.0]),
            ("BBM_20_2.0", &middle),
            ("BBU_20_2.0", &[110.0, 110.0]),
        ])
    }

    #[test]
    fn touching_the_lower_band_buys() {
        let decision = BollingerReversion.evaluate(&bands([95.0, 89.0], [100.0, 100.0]), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Buy);
    }

    #[test]
    fn touching_the_upper_band_sells() {
        let decision = BollingerReversion.evaluate(&bands([105.0, 110.0], [100.0, 100.0]), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Sell);
    }

    #[test]
    fn crossing_the_middle_band_closes_a_long() {
        let decision = BollingerReversion.evaluate(&bands([99.0, 101.0], [100.0, 100.0]), &ParamSet::new(), PositionContext::Long);
        assert_eq!(decision.signal, Signal::CloseLong);
    }

    #[test]
    fn crossing_the_middle_band_closes_a_short() {
        let decision = BollingerReversion.evaluate(&bands([101.0, 99.0], [100.0, 100.0]), &ParamSet::new(), PositionContext::Short);
        assert_eq!(decision.signal, Signal::CloseShort);
    }

    #[test]
    fn hold_carries_bias() {
        let decision = BollingerReversion.evaluate(&bands([103.0, 104.0], [100.0, 100.0]), &ParamSet::new(), PositionContext::Flat);
        assert_eq!(decision.signal, Signal::Hold);
        assert_eq!(decision.bias, Some(Bias::Bullish));
    }

    #[test]
    fn fractional_width_names_columns_consistently() {
        let params = ParamSet::new().with("bbands_std_dev", 2.5);
        let mut series = bars(&wave(40));
        BollingerReversion.attach_indicators(&mut series, &params);
        assert!(series.has_column("BBU_20_2.5"));
        let decision = BollingerReversion.evaluate(&series, &params, PositionContext::Flat);
        assert!(!decision.details.starts_with("Insufficient data"));
        assert_eq!(BollingerReversion.overlays(&series, &params).len(), 3);
    }
}
