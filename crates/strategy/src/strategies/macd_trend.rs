use common::series::CLOSE;
use common::{Bias, BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{columns, oscillators};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{cross, route, Event};
use crate::Strategy;

const FAST: ParamSpec = ParamSpec::number("macd_fast_period", "MACD Fast Period", 12.0, 1.0, 50.0);
const SLOW: ParamSpec = ParamSpec::number("macd_slow_period", "MACD Slow Period", 26.0, 2.0, 100.0);
const SIGNAL: ParamSpec =
    ParamSpec::number("macd_signal_period", "MACD Signal Period", 9.0, 1.0, 50.0);

/// MACD line crossing its signal line.
pub struct MacdTrend;

struct Settings {
    fast: usize,
    slow: usize,
    signal: usize,
}

impl Settings {
    fn resolve(params: &ParamSet) -> Self {
        Self {
            fast: params.period(&FAST),
            slow: params.period(&SLOW),
            signal: params.period(&SIGNAL),
        }
    }

    fn columns(&self) -> columns::MacdColumns {
        columns::macd(self.fast, self.slow, self.signal)
    }
}

impl MacdTrend {
    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let s = Settings::resolve(params);
        if s.fast == 0 || s.fast >= s.slow || s.signal == 0 {
            return Ok(SignalDecision::invalid_params(format!(
                "MACD periods must satisfy 1 <= fast ({}) < slow ({}) and signal ({}) >= 1",
                s.fast, s.slow, s.signal
            )));
        }

        let cols = s.columns();
        let macd = bars.recent::<2>(&cols.macd)?;
        let signal = bars.recent::<2>(&cols.signal)?;
        let (m, sig) = (macd[1], signal[1]);

        let event = Event::from_cross(
            cross(macd, signal),
            format!("MACD ({m:.2}) crossed ABOVE Signal ({sig:.2})"),
            format!("MACD ({m:.2}) crossed BELOW Signal ({sig:.2})"),
        );
        Ok(route(position, event).unwrap_or_else(|| {
            if m > sig {
                SignalDecision::hold(format!("MACD ({m:.2}) > Signal ({sig:.2}) (Bullish Momentum)."))
                    .with_bias(Bias::Bullish)
            } else if m < sig {
                SignalDecision::hold(format!("MACD ({m:.2}) < Signal ({sig:.2}) (Bearish Momentum)."))
                    .with_bias(Bias::Bearish)
            } else {
                SignalDecision::hold("MACD neutral.")
            }
        }))
    }
}

impl Strategy for MacdTrend {
    fn name(&self) -> &'static str {
        "MACD Trend (Crossover)"
    }

    fn slug(&self) -> &'static str {
        "macd_trend_crossover"
    }

    fn description(&self) -> &'static str {
        "Follows momentum shifts when the MACD line crosses its signal line."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[FAST, SLOW, SIGNAL]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let s = Settings::resolve(params);
        let cols = s.columns();
        let computed = inputs(bars, [CLOSE]).and_then(|[close]| {
            let lines = oscillators::macd(&close, s.fast, s.slow, s.signal)?;
            Ok(vec![
                (cols.macd, lines.macd),
                (cols.histogram, lines.histogram),
                (cols.signal, lines.signal),
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
                (cols.macd, "macd_line"),
                (cols.signal, "macd_signal_line"),
                (cols.histogram, "macd_histogram"),
            ],
        )
    }
}
