//! Indicator math. Every function takes complete input slices (oldest
//! first) and returns one value per bar, `None` during warm-up.

pub mod candles;
pub mod channels;
pub mod columns;
pub mod moving;
pub mod oscillators;
pub mod volume;

use thiserror::Error;

/// Output column of an indicator, aligned with its inputs.
pub type Series = Vec<Option<f64>>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("input '{0}' has missing values")]
    MissingInput(String),

    #[error("input '{0}' is missing")]
    MissingColumn(String),

    #[error("bar {index} is not a valid candle (low/high out of order)")]
    InvalidBar { index: usize },

    #[error("inputs have different lengths")]
    LengthMismatch,

    #[error("indicator library error: {0}")]
    Library(String),
}

pub type Result<T> = std::result::Result<T, IndicatorError>;

pub(crate) fn require_period(period: usize, what: &str) -> Result<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{what} must be at least 1"
        )));
    }
    Ok(())
}

pub(crate) fn same_length(inputs: &[&[f64]]) -> Result<usize> {
    let len = inputs.first().map_or(0, |s| s.len());
    if inputs.iter().any(|s| s.len() != len) {
        return Err(IndicatorError::LengthMismatch);
    }
    Ok(len)
}

pub(crate) fn library_error(e: impl std::fmt::Debug) -> IndicatorError {
    IndicatorError::Library(format!("{e:?}"))
}

/// Blank out the first `warmup` values and anything non-finite.
pub(crate) fn mask_warmup(values: Vec<f64>, warmup: usize) -> Series {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i >= warmup && v.is_finite()).then_some(v))
        .collect()
}

/// Apply `f` to the defined tail of `series` (everything after its leading
/// `None`s) and re-align the result. Gaps after the first value are an
/// error.
pub(crate) fn on_defined_tail<F>(series: &[Option<f64>], f: F) -> Result<Series>
where
    F: FnOnce(&[f64]) -> Result<Series>,
{
    let Some(start) = series.iter().position(Option::is_some) else {
        return Ok(vec![None; series.len()]);
    };
    let tail: Option<Vec<f64>> = series[start..].iter().copied().collect();
    let tail = tail.ok_or_else(|| IndicatorError::MissingInput("intermediate series".into()))?;

    let mut out = vec![None; start];
    out.extend(f(&tail)?);
    Ok(out)
}

/// Evaluate `f` over each trailing window of `window` values. Windows that
/// are incomplete or contain a `None` produce `None`.
pub(crate) fn rolling<F>(series: &[Option<f64>], window: usize, f: F) -> Series
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut buf = Vec::with_capacity(window);
    (0..series.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            buf.clear();
            for v in &series[i + 1 - window..=i] {
                buf.push((*v)?);
            }
            f(&buf).filter(|v| v.is_finite())
        })
        .collect()
}

/// Element-wise combination of two aligned series.
pub(crate) fn zip_with<F>(a: &[Option<f64>], b: &[Option<f64>], f: F) -> Series
where
    F: Fn(f64, f64) -> f64,
{
    a.iter()
        .zip(b)
        .map(|(x, y)| Some(f((*x)?, (*y)?)).filter(|v| v.is_finite()))
        .collect()
}

pub(crate) fn defined(values: &[f64]) -> Series {
    values.iter().map(|v| Some(*v)).collect()
}

pub(crate) fn mean(window: &[f64]) -> Option<f64> {
    if window.is_empty() {
        return None;
    }
    Some(window.iter().sum::<f64>() / window.len() as f64)
}

#[cfg(test)]
pub(crate) fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("value should be available");
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_needs_a_full_window_without_gaps() {
        let series = vec![Some(1.0), Some(2.0), None, Some(4.0), Some(5.0), Some(6.0)];
        let sums = rolling(&series, 2, |w| Some(w.iter().sum()));
        assert_eq!(sums, vec![None, Some(3.0), None, None, Some(9.0), Some(11.0)]);
    }

    #[test]
    fn mask_warmup_hides_leading_and_non_finite_values() {
        let masked = mask_warmup(vec![1.0, 2.0, f64::NAN, 4.0], 1);
        assert_eq!(masked, vec![None, Some(2.0), None, Some(4.0)]);
    }

    #[test]
    fn defined_tail_is_realigned() {
        let series = vec![None, None, Some(1.0), Some(2.0)];
        let out = on_defined_tail(&series, |v| Ok(defined(&v.iter().map(|x| x * 10.0).collect::<Vec<_>>())))
            .unwrap();
        assert_eq!(out, vec![None, None, Some(10.0), Some(20.0)]);
    }

    #[test]
    fn gaps_inside_the_defined_tail_are_rejected() {
        let series = vec![Some(1.0), None, Some(2.0)];
        assert!(on_defined_tail(&series, |v| Ok(defined(v))).is_err());
    }

    #[test]
    fn mismatched_inputs_are_rejected() {
        assert_eq!(
            same_length(&[&[1.0, 2.0], &[1.0]]),
            Err(IndicatorError::LengthMismatch)
        );
    }
}
