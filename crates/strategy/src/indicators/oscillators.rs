use ta::indicators::{
    MovingAverageConvergenceDivergence as Macd, RateOfChange, RelativeStrengthIndex as Rsi,
};
use ta::Next;

use super::moving::{ema, rolling_mean, sma};
use super::{
    library_error, mask_warmup, mean, on_defined_tail, require_period, rolling, same_length,
    zip_with, Result, Series,
};

/// Constant scaling the mean absolute deviation in the CCI.
pub const CCI_CONSTANT: f64 = 0.015;

pub fn rsi(values: &[f64], period: usize) -> Result<Series> {
    require_period(period, "RSI length")?;
    let mut rsi = Rsi::new(period).map_err(library_error)?;
    let raw = values.iter().map(|v| rsi.next(*v)).collect();
    Ok(mask_warmup(raw, period))
}

pub struct MacdLines {
    pub macd: Series,
    pub signal: Series,
    pub histogram: Series,
}

pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Result<MacdLines> {
    require_period(fast, "MACD fast period")?;
    require_period(slow, "MACD slow period")?;
    require_period(signal, "MACD signal period")?;
    let mut macd = Macd::new(fast, slow, signal).map_err(library_error)?;

    let (mut line, mut sig, mut hist) = (Vec::new(), Vec::new(), Vec::new());
    for v in values {
        let out = macd.next(*v);
        line.push(out.macd);
        sig.push(out.signal);
        hist.push(out.histogram);
    }

    let line_warmup = fast.max(slow) - 1;
    let signal_warmup = line_warmup + signal - 1;
    Ok(MacdLines {
        macd: mask_warmup(line, line_warmup),
        signal: mask_warmup(sig, signal_warmup),
        histogram: mask_warmup(hist, signal_warmup),
    })
}

/// Percentage change against the value `period` bars earlier.
pub fn roc(values: &[f64], period: usize) -> Result<Series> {
    require_period(period, "ROC length")?;
    let mut roc = RateOfChange::new(period).map_err(library_error)?;
    let raw = values.iter().map(|v| roc.next(*v)).collect();
    Ok(mask_warmup(raw, period))
}

/// Commodity channel index over the typical price.
pub fn cci(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Result<Series> {
    require_period(period, "CCI length")?;
    same_length(&[high, low, close])?;
    let typical: Series = high
        .iter()
        .zip(low)
        .zip(close)
        .map(|((h, l), c)| Some((h + l + c) / 3.0))
        .collect();

    Ok(rolling(&typical, period, |window| {
        let avg = mean(window)?;
        let deviation = window.iter().map(|v| (v - avg).abs()).sum::<f64>() / window.len() as f64;
        if deviation == 0.0 {
            return None;
        }
        let latest = window[window.len() - 1];
        Some((latest - avg) / (CCI_CONSTANT * deviation))
    }))
}

/// Awesome oscillator: fast minus slow SMA of the bar midpoint.
pub fn awesome(high: &[f64], low: &[f64], fast: usize, slow: usize) -> Result<Series> {
    same_length(&[high, low])?;
    let median: Vec<f64> = high.iter().zip(low).map(|(h, l)| (h + l) / 2.0).collect();
    let fast_ma = sma(&median, fast)?;
    let slow_ma = sma(&median, slow)?;
    Ok(zip_with(&fast_ma, &slow_ma, |f, s| f - s))
}

pub struct StochasticLines {
    pub k: Series,
    pub d: Series,
}

/// Slow stochastic: raw %K over `k_period`, smoothed by `smooth_k`, and %D
/// as the SMA of the smoothed %K.
pub fn stochastic(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    k_period: usize,
    d_period: usize,
    smooth_k: usize,
) -> Result<StochasticLines> {
    require_period(k_period, "%K period")?;
    let len = same_length(&[high, low, close])?;

    let raw: Series = (0..len)
        .map(|i| {
            if i + 1 < k_period {
                return None;
            }
            let from = i + 1 - k_period;
            let highest = high[from..=i].iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let lowest = low[from..=i].iter().copied().fold(f64::INFINITY, f64::min);
            let range = highest - lowest;
            (range > 0.0).then(|| 100.0 * (close[i] - lowest) / range)
        })
        .collect();

    let k = rolling_mean(&raw, smooth_k)?;
    let d = rolling_mean(&k, d_period)?;
    Ok(StochasticLines { k, d })
}

pub struct TrixLines {
    pub trix: Series,
    pub signal: Series,
}

/// One-bar percentage change of a triple-smoothed EMA, with an SMA signal.
pub fn trix(values: &[f64], period: usize, signal: usize) -> Result<TrixLines> {
    let first = ema(values, period)?;
    let second = on_defined_tail(&first, |v| ema(v, period))?;
    let third = on_defined_tail(&second, |v| ema(v, period))?;

    let mut line = vec![None; third.len()];
    for i in 1..third.len() {
        if let (Some(prev), Some(cur)) = (third[i - 1], third[i]) {
            if prev != 0.0 {
                line[i] = Some(100.0 * (cur - prev) / prev);
            }
        }
    }
    let signal = rolling_mean(&line, signal)?;
    Ok(TrixLines {
        trix: line,
        signal,
    })
}
