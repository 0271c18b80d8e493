use super::{defined, require_period, rolling, same_length, zip_with, Result, Series};

/// Chaikin money flow: summed money-flow volume over summed volume.
pub fn cmf(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    volume: &[f64],
    period: usize,
) -> Result<Series> {
    require_period(period, "CMF length")?;
    same_length(&[high, low, close, volume])?;

    let flow: Vec<f64> = (0..close.len())
        .map(|i| {
            let range = high[i] - low[i];
            if range > 0.0 {
                ((close[i] - low[i]) - (high[i] - close[i])) / range * volume[i]
            } else {
                0.0
            }
        })
        .collect();

    Ok(ratio_of_sums(&flow, volume, period))
}

/// Rolling volume-weighted average of the typical price.
pub fn vwap(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    volume: &[f64],
    period: usize,
) -> Result<Series> {
    require_period(period, "VWAP length")?;
    same_length(&[high, low, close, volume])?;

    let weighted: Vec<f64> = (0..close.len())
        .map(|i| (high[i] + low[i] + close[i]) / 3.0 * volume[i])
        .collect();

    Ok(ratio_of_sums(&weighted, volume, period))
}

fn ratio_of_sums(numerator: &[f64], denominator: &[f64], period: usize) -> Series {
    let sum = |w: &[f64]| Some(w.iter().sum::<f64>());
    let top = rolling(&defined(numerator), period, sum);
    let bottom = rolling(&defined(denominator), period, sum);
    zip_with(&top, &bottom, |t, b| if b == 0.0 { f64::NAN } else { t / b })
}
