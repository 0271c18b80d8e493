//! Candlestick pattern recognition. Each bar scores `+100` (bullish),
//! `-100` (bearish) or `0`; bars without enough history are `None`.

use std::fmt;
use std::str::FromStr;

use super::{same_length, Result, Series};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Engulfing,
    Hammer,
    ShootingStar,
    MorningStar,
    EveningStar,
    Doji,
}

impl Pattern {
    /// Codes accepted from callers, in UI order.
    pub const CODES: &'static [&'static str] = &[
        "ENGULFING",
        "HAMMER",
        "SHOOTINGSTAR",
        "MORNINGSTAR",
        "EVENINGSTAR",
        "DOJI",
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Pattern::Engulfing => "ENGULFING",
            Pattern::Hammer => "HAMMER",
            Pattern::ShootingStar => "SHOOTINGSTAR",
            Pattern::MorningStar => "MORNINGSTAR",
            Pattern::EveningStar => "EVENINGSTAR",
            Pattern::Doji => "DOJI",
        }
    }

    /// Human-readable name used in signal details.
    pub fn title(&self) -> &'static str {
        match self {
            Pattern::Engulfing => "Engulfing",
            Pattern::Hammer => "Hammer",
            Pattern::ShootingStar => "Shooting Star",
            Pattern::MorningStar => "Morning Star",
            Pattern::EveningStar => "Evening Star",
            Pattern::Doji => "Doji",
        }
    }

    /// Bars of history the pattern spans.
    fn span(&self) -> usize {
        match self {
            Pattern::Engulfing => 2,
            Pattern::MorningStar | Pattern::EveningStar => 3,
            Pattern::Hammer | Pattern::ShootingStar | Pattern::Doji => 1,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Pattern {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let code: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        match code.as_str() {
            "ENGULFING" => Ok(Pattern::Engulfing),
            "HAMMER" => Ok(Pattern::Hammer),
            "SHOOTINGSTAR" => Ok(Pattern::ShootingStar),
            "MORNINGSTAR" => Ok(Pattern::MorningStar),
            "EVENINGSTAR" => Ok(Pattern::EveningStar),
            "DOJI" => Ok(Pattern::Doji),
            _ => Err(format!("unknown candlestick pattern '{s}'")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bar {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl Bar {
    fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }
    fn range(&self) -> f64 {
        self.high - self.low
    }
    fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }
    fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }
    fn bullish(&self) -> bool {
        self.close > self.open
    }
    fn bearish(&self) -> bool {
        self.close < self.open
    }
    fn body_mid(&self) -> f64 {
        (self.open + self.close) / 2.0
    }
}

/// Score every bar for `pattern`.
pub fn detect(
    pattern: Pattern,
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
) -> Result<Series> {
    let len = same_length(&[open, high, low, close])?;
    let bars: Vec<Bar> = (0..len)
        .map(|i| Bar {
            open: open[i],
            high: high[i],
            low: low[i],
            close: close[i],
        })
        .collect();

    let span = pattern.span();
    Ok((0..len)
        .map(|i| {
            if i + 1 < span {
                return None;
            }
            let window = &bars[i + 1 - span..=i];
            Some(score(pattern, window))
        })
        .collect())
}

fn score(pattern: Pattern, w: &[Bar]) -> f64 {
    let hit = match pattern {
        Pattern::Doji => doji(&w[0]).then_some(100.0),
        Pattern::Hammer => hammer(&w[0]).then_some(100.0),
        Pattern::ShootingStar => shooting_star(&w[0]).then_some(-100.0),
        Pattern::Engulfing => engulfing(&w[0], &w[1]),
        Pattern::MorningStar => morning_star(&w[0], &w[1], &w[2]).then_some(100.0),
        Pattern::EveningStar => evening_star(&w[0], &w[1], &w[2]).then_some(-100.0),
    };
    hit.unwrap_or(0.0)
}

fn doji(b: &Bar) -> bool {
    b.range() > 0.0 && b.body() <= 0.1 * b.range()
}

fn hammer(b: &Bar) -> bool {
    let range = b.range();
    range > 0.0
        && b.body() <= 0.3 * range
        && b.lower_shadow() >= 2.0 * b.body()
        && b.lower_shadow() > 0.0
        && b.upper_shadow() <= 0.1 * range
}

fn shooting_star(b: &Bar) -> bool {
    let range = b.range();
    range > 0.0
        && b.body() <= 0.3 * range
        && b.upper_shadow() >= 2.0 * b.body()
        && b.upper_shadow() > 0.0
        && b.lower_shadow() <= 0.1 * range
}

fn engulfing(prev: &Bar, cur: &Bar) -> Option<f64> {
    if cur.body() <= prev.body() {
        return None;
    }
    if prev.bearish() && cur.bullish() && cur.open <= prev.close && cur.close >= prev.open {
        return Some(100.0);
    }
    if prev.bullish() && cur.bearish() && cur.open >= prev.close && cur.close <= prev.open {
        return Some(-100.0);
    }
    None
}

fn morning_star(first: &Bar, star: &Bar, last: &Bar) -> bool {
    first.bearish()
        && first.body() > 0.5 * first.range()
        && star.body() <= 0.3 * first.body()
        && star.open.max(star.close) <= first.close
        && last.bullish()
        && last.close > first.body_mid()
}

fn evening_star(first: &Bar, star: &Bar, last: &Bar) -> bool {
    first.bullish()
        && first.body() > 0.5 * first.range()
        && star.body() <= 0.3 * first.body()
        && star.open.min(star.close) >= first.close
        && last.bearish()
        && last.close < first.body_mid()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(pattern: Pattern, bars: &[(f64, f64, f64, f64)]) -> Series {
        let open: Vec<f64> = bars.iter().map(|b| b.0).collect();
        let high: Vec<f64> = bars.iter().map(|b| b.1).collect();
        let low: Vec<f64> = bars.iter().map(|b| b.2).collect();
        let close: Vec<f64> = bars.iter().map(|b| b.3).collect();
        detect(pattern, &open, &high, &low, &close).unwrap()
    }

    #[test]
    fn bullish_engulfing_scores_plus_100() {
        let out = run(
            Pattern::Engulfing,
            &[(10.0, 10.5, 8.5, 9.0), (8.8, 11.0, 8.7, 10.8)],
        );
        assert_eq!(out, vec![None, Some(100.0)]);
    }

    #[test]
    fn bearish_engulfing_scores_minus_100() {
        let out = run(
            Pattern::Engulfing,
            &[(9.0, 10.5, 8.9, 10.0), (10.2, 10.3, 8.0, 8.5)],
        );
        assert_eq!(out[1], Some(-100.0));
    }

    #[test]
    fn hammer_has_a_long_lower_shadow() {
        let out = run(Pattern::Hammer, &[(10.0, 10.1, 7.0, 10.05)]);
        assert_eq!(out, vec![Some(100.0)]);
    }

    #[test]
    fn shooting_star_is_bearish() {
        let out = run(Pattern::ShootingStar, &[(10.0, 13.0, 9.95, 10.05)]);
        assert_eq!(out, vec![Some(-100.0)]);
    }

    #[test]
    fn morning_star_needs_three_bars() {
        let out = run(
            Pattern::MorningStar,
            &[
                (12.0, 12.1, 9.9, 10.0),
                (9.8, 9.9, 9.5, 9.7),
                (9.8, 11.6, 9.7, 11.5),
            ],
        );
        assert_eq!(out, vec![None, None, Some(100.0)]);
    }

    #[test]
    fn ordinary_bar_scores_zero() {
        let out = run(Pattern::Doji, &[(10.0, 12.0, 9.0, 11.5)]);
        assert_eq!(out, vec![Some(0.0)]);
    }

    #[test]
    fn pattern_codes_parse_leniently() {
        assert_eq!("shooting_star".parse::<Pattern>(), Ok(Pattern::ShootingStar));
        assert_eq!("ENGULFING".parse::<Pattern>(), Ok(Pattern::Engulfing));
        assert!("TRIANGLE".parse::<Pattern>().is_err());
        for code in Pattern::CODES {
            assert_eq!(code.parse::<Pattern>().map(|p| p.code()), Ok(*code));
        }
    }
}
