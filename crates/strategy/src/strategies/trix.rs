use common::series::CLOSE;
use common::{BarSeries, DataGap, Overlays, PositionContext, SignalDecision};

use super::{inputs, settle, store};
use crate::indicators::{columns, oscillators};
use crate::overlay;
use crate::params::{ParamSet, ParamSpec};
use crate::signal::{cross, lean, route, Event};
use crate::Strategy;

const LENGTH: ParamSpec = ParamSpec::number("trix_length", "TRIX Length", 14.0, 1.0, 50.0);
const SIGNAL: ParamSpec =
    ParamSpec::number("trix_signal_length", "Signal Length", 9.0, 1.0, 50.0);

pub struct TrixSignalCross;

impl TrixSignalCross {
    fn lengths(params: &ParamSet) -> (usize, usize) {
        (params.period(&LENGTH), params.period(&SIGNAL))
    }

    fn decide(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<SignalDecision, DataGap> {
        let (length, signal_len) = Self::lengths(params);
        if length == 0 || signal_len == 0 {
            return Ok(SignalDecision::invalid_params("TRIX lengths must be at least 1"));
        }
        let cols = columns::trix(length, signal_len);

        let trix = bars.recent::<2>(&cols.trix)?;
        let signal = bars.recent::<2>(&cols.signal)?;
        let (t, s) = (trix[1], signal[1]);

        let event = Event::from_cross(
            cross(trix, signal),
            format!("TRIX ({t:.4}) crossed ABOVE Signal ({s:.4})"),
            format!("TRIX ({t:.4}) crossed BELOW Signal ({s:.4})"),
        );
        Ok(route(position, event).unwrap_or_else(|| lean("TRIX", t, "Signal", s)))
    }
}

impl Strategy for TrixSignalCross {
    fn name(&self) -> &'static str {
        "TRIX Signal Line Crossover"
    }

    fn slug(&self) -> &'static str {
        "trix_signal_cross"
    }

    fn description(&self) -> &'static str {
        "Trades the triple-smoothed momentum line crossing its moving-average signal."
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[LENGTH, SIGNAL]
    }

    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet) {
        let (length, signal_len) = Self::lengths(params);
        let cols = columns::trix(length, signal_len);
        let computed = inputs(bars, [CLOSE]).and_then(|[close]| {
            let lines = oscillators::trix(&close, length, signal_len)?;
            Ok(vec![(cols.trix, lines.trix), (cols.signal, lines.signal)])
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
        let (length, signal_len) = Self::lengths(params);
        let cols = columns::trix(length, signal_len);
        overlay::collect(
            bars,
            &[(cols.trix, "trix_line"), (cols.signal, "trix_signal_line")],
        )
    }
}
