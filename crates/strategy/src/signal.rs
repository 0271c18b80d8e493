//! Crossover detection and position-aware routing shared by the rule sets.

use common::{Bias, PositionContext, SignalDecision};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    Above,
    Below,
}

/// Did `a` cross `b` between the previous and the latest bar?
///
/// Both arrays are `[previous, latest]`. Only a transition counts:
/// `prev_a <= prev_b && a > b` is a cross above, the mirror a cross below.
pub fn cross(a: [f64; 2], b: [f64; 2]) -> Option<Cross> {
    let [prev_a, a] = a;
    let [prev_b, b] = b;
    if prev_a <= prev_b && a > b {
        Some(Cross::Above)
    } else if prev_a >= prev_b && a < b {
        Some(Cross::Below)
    } else {
        None
    }
}

/// Crossing of a fixed level.
pub fn cross_level(a: [f64; 2], level: f64) -> Option<Cross> {
    cross(a, [level, level])
}

/// A directional event detected by a rule, with its explanation
/// (no trailing punctuation).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Bullish(String),
    Bearish(String),
}

impl Event {
    /// Bullish on a cross above, bearish on a cross below.
    pub fn from_cross(crossed: Option<Cross>, above: String, below: String) -> Option<Event> {
        match crossed? {
            Cross::Above => Some(Event::Bullish(above)),
            Cross::Below => Some(Event::Bearish(below)),
        }
    }

    pub fn bias(&self) -> Bias {
        match self {
            Event::Bullish(_) => Bias::Bullish,
            Event::Bearish(_) => Bias::Bearish,
        }
    }
}

/// Turn an event into a decision for the caller's position.
///
/// Flat: bullish → BUY, bearish → SELL. Long: bearish → CLOSE_LONG.
/// Short: bullish → CLOSE_SHORT. Anything else is `None` and the caller
/// builds its own informational HOLD.
pub fn route(position: PositionContext, event: Option<Event>) -> Option<SignalDecision> {
    match (position, event?) {
        (PositionContext::Flat, Event::Bullish(msg)) => Some(SignalDecision::buy(format!("{msg}."))),
        (PositionContext::Flat, Event::Bearish(msg)) => {
            Some(SignalDecision::sell(format!("{msg}.")))
        }
        (PositionContext::Long, Event::Bearish(msg)) => {
            Some(SignalDecision::close_long(format!("{msg} (exit long).")))
        }
        (PositionContext::Short, Event::Bullish(msg)) => {
            Some(SignalDecision::close_short(format!("{msg} (exit short).")))
        }
        _ => None,
    }
}

/// Informational HOLD for a pair of lines: which one leads, as a bias.
pub fn lean(fast_label: &str, fast: f64, slow_label: &str, slow: f64) -> SignalDecision {
    if fast > slow {
        SignalDecision::hold(format!("{fast_label} > {slow_label} (Long Bias)"))
            .with_bias(Bias::Bullish)
    } else {
        SignalDecision::hold(format!("{fast_label} <= {slow_label} (Short Bias)"))
            .with_bias(Bias::Bearish)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Signal;

    #[test]
    fn cross_requires_a_transition() {
        assert_eq!(cross([19.8, 20.3], [20.0, 20.1]), Some(Cross::Above));
        assert_eq!(cross([20.3, 19.8], [20.1, 20.0]), Some(Cross::Below));
        assert_eq!(cross([21.0, 22.0], [20.0, 20.0]), None);
        assert_eq!(cross([19.0, 19.5], [20.0, 20.0]), None);
    }

    #[test]
    fn tie_on_latest_bar_is_not_a_cross() {
        assert_eq!(cross([19.0, 20.0], [20.0, 20.0]), None);
        assert_eq!(cross_level([20.0, 20.0], 20.0), None);
    }

    #[test]
    fn tie_on_previous_bar_then_separation_is_a_cross() {
        assert_eq!(cross_level([30.0, 31.0], 30.0), Some(Cross::Above));
        assert_eq!(cross_level([70.0, 69.0], 70.0), Some(Cross::Below));
    }

    #[test]
    fn routing_depends_on_position() {
        let up = || Some(Event::Bullish("up".into()));
        let down = || Some(Event::Bearish("down".into()));

        assert_eq!(route(PositionContext::Flat, up()).unwrap().signal, Signal::Buy);
        assert_eq!(route(PositionContext::Flat, down()).unwrap().signal, Signal::Sell);
        assert_eq!(
            route(PositionContext::Long, down()).unwrap().signal,
            Signal::CloseLong
        );
        assert_eq!(
            route(PositionContext::Short, up()).unwrap().signal,
            Signal::CloseShort
        );
        assert!(route(PositionContext::Long, up()).is_none());
        assert!(route(PositionContext::Short, down()).is_none());
        assert!(route(PositionContext::Flat, None).is_none());
    }

    #[test]
    fn exit_details_are_marked() {
        let decision = route(PositionContext::Long, Some(Event::Bearish("x".into()))).unwrap();
        assert_eq!(decision.details, "x (exit long).");
    }
}
