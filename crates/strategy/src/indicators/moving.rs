use ta::indicators::{ExponentialMovingAverage as Ema, SimpleMovingAverage as Sma};
use ta::Next;

use super::{library_error, mask_warmup, mean, require_period, rolling, zip_with, Result, Series};

/// Simple moving average.
pub fn sma(values: &[f64], period: usize) -> Result<Series> {
    require_period(period, "SMA period")?;
    let mut sma = Sma::new(period).map_err(library_error)?;
    let raw = values.iter().map(|v| sma.next(*v)).collect();
    Ok(mask_warmup(raw, period - 1))
}

/// Exponential moving average (smoothing 2 / (period + 1)).
pub fn ema(values: &[f64], period: usize) -> Result<Series> {
    require_period(period, "EMA period")?;
    let mut ema = Ema::new(period).map_err(library_error)?;
    let raw = values.iter().map(|v| ema.next(*v)).collect();
    Ok(mask_warmup(raw, period - 1))
}

/// Simple moving average over a series that may carry warm-up gaps.
pub fn rolling_mean(series: &[Option<f64>], period: usize) -> Result<Series> {
    require_period(period, "smoothing period")?;
    Ok(rolling(series, period, mean))
}

/// Linearly weighted moving average (newest value weighs `period`).
pub fn wma(series: &[Option<f64>], period: usize) -> Result<Series> {
    require_period(period, "WMA period")?;
    let denominator = (period * (period + 1)) as f64 / 2.0;
    Ok(rolling(series, period, |window| {
        let weighted: f64 = window
            .iter()
            .enumerate()
            .map(|(i, v)| (i + 1) as f64 * v)
            .sum();
        Some(weighted / denominator)
    }))
}

/// Hull moving average: `WMA(2·WMA(n/2) − WMA(n), √n)`.
pub fn hma(values: &[f64], period: usize) -> Result<Series> {
    if period < 2 {
        return Err(super::IndicatorError::InvalidParameter(
            "HMA period must be at least 2".into(),
        ));
    }
    let input = super::defined(values);
    let half = wma(&input, period / 2)?;
    let full = wma(&input, period)?;
    let raw = zip_with(&half, &full, |h, f| 2.0 * h - f);

    let smoothing = ((period as f64).sqrt().round() as usize).max(1);
    wma(&raw, smoothing)
}
