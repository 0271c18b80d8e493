use ta::indicators::{AverageTrueRange, BollingerBands, Maximum, Minimum};
use ta::{DataItem, Next};

use super::moving::ema;
use super::{library_error, mask_warmup, require_period, same_length, zip_with, IndicatorError, Result, Series};

/// Lower / middle / upper lines of a channel.
pub struct Bands {
    pub lower: Series,
    pub middle: Series,
    pub upper: Series,
}

pub fn bollinger(values: &[f64], period: usize, std_dev: f64) -> Result<Bands> {
    require_period(period, "Bollinger length")?;
    if !(std_dev > 0.0) {
        return Err(IndicatorError::InvalidParameter(
            "Bollinger std dev multiplier must be positive".into(),
        ));
    }
    let mut bb = BollingerBands::new(period, std_dev).map_err(library_error)?;

    let (mut lower, mut middle, mut upper) = (Vec::new(), Vec::new(), Vec::new());
    for v in values {
        let out = bb.next(*v);
        lower.push(out.lower);
        middle.push(out.average);
        upper.push(out.upper);
    }
    Ok(Bands {
        lower: mask_warmup(lower, period - 1),
        middle: mask_warmup(middle, period - 1),
        upper: mask_warmup(upper, period - 1),
    })
}

/// Average true range, one value per bar.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Result<Series> {
    require_period(period, "ATR length")?;
    let items = candle_items(high, low, close)?;
    let mut atr = AverageTrueRange::new(period).map_err(library_error)?;
    let raw = items.iter().map(|item| atr.next(item)).collect();
    Ok(mask_warmup(raw, period - 1))
}

/// Keltner channel: EMA basis ± `multiplier` × ATR.
pub fn keltner(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    ema_period: usize,
    atr_period: usize,
    multiplier: f64,
) -> Result<Bands> {
    let basis = ema(close, ema_period)?;
    let range = atr(high, low, close, atr_period)?;
    Ok(Bands {
        lower: zip_with(&basis, &range, |b, r| b - multiplier * r),
        upper: zip_with(&basis, &range, |b, r| b + multiplier * r),
        middle: basis,
    })
}

/// Donchian channel of the bars *preceding* each bar: the upper line at
/// bar `t` is the highest high of `t-upper_period ..= t-1`, so the current
/// close can break out of it.
pub fn donchian(
    high: &[f64],
    low: &[f64],
    upper_period: usize,
    lower_period: usize,
) -> Result<Bands> {
    require_period(upper_period, "Donchian upper length")?;
    require_period(lower_period, "Donchian lower length")?;
    let len = same_length(&[high, low])?;
    let mut max = Maximum::new(upper_period).map_err(library_error)?;
    let mut min = Minimum::new(lower_period).map_err(library_error)?;

    let mut upper = vec![None; len];
    let mut lower = vec![None; len];
    for i in 1..len {
        let highest = max.next(high[i - 1]);
        let lowest = min.next(low[i - 1]);
        if i >= upper_period {
            upper[i] = Some(highest);
        }
        if i >= lower_period {
            lower[i] = Some(lowest);
        }
    }
    let middle = zip_with(&upper, &lower, |u, l| (u + l) / 2.0);
    Ok(Bands {
        lower,
        middle,
        upper,
    })
}

pub struct SupertrendLines {
    pub line: Series,
    /// `1.0` while trending up, `-1.0` while trending down.
    pub direction: Series,
}

pub fn supertrend(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    atr_period: usize,
    multiplier: f64,
) -> Result<SupertrendLines> {
    if !(multiplier > 0.0) {
        return Err(IndicatorError::InvalidParameter(
            "Supertrend multiplier must be positive".into(),
        ));
    }
    let range = atr(high, low, close, atr_period)?;
    let len = range.len();
    let mut line = vec![None; len];
    let mut direction = vec![None; len];

    // (final upper, final lower, direction) of the previous bar
    let mut state: Option<(f64, f64, f64)> = None;
    for i in 0..len {
        let Some(atr) = range[i] else { continue };
        let mid = (high[i] + low[i]) / 2.0;
        let basic_upper = mid + multiplier * atr;
        let basic_lower = mid - multiplier * atr;

        let next = match state {
            None => (basic_upper, basic_lower, 1.0),
            Some((prev_upper, prev_lower, prev_dir)) => {
                let prev_close = close[i - 1];
                let upper = if basic_upper < prev_upper || prev_close > prev_upper {
                    basic_upper
                } else {
                    prev_upper
                };
                let lower = if basic_lower > prev_lower || prev_close < prev_lower {
                    basic_lower
                } else {
                    prev_lower
                };
                let dir = if close[i] > prev_upper {
                    1.0
                } else if close[i] < prev_lower {
                    -1.0
                } else {
                    prev_dir
                };
                (upper, lower, dir)
            }
        };

        let (upper, lower, dir) = next;
        line[i] = Some(if dir > 0.0 { lower } else { upper });
        direction[i] = Some(dir);
        state = Some(next);
    }
    Ok(SupertrendLines { line, direction })
}

fn candle_items(high: &[f64], low: &[f64], close: &[f64]) -> Result<Vec<DataItem>> {
    same_length(&[high, low, close])?;
    high.iter()
        .zip(low)
        .zip(close)
        .enumerate()
        .map(|(index, ((h, l), c))| {
            DataItem::builder()
                .open(*c)
                .high(*h)
                .low(*l)
                .close(*c)
                .volume(0.0)
                .build()
                .map_err(|_| IndicatorError::InvalidBar { index })
        })
        .collect()
}
