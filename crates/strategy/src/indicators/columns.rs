//! Column names for attached indicators.
//!
//! Attachment, signal evaluation and overlay extraction all derive names
//! from these functions. Floats use `{:?}` so `2.0` stays `2.0`.

pub fn sma(period: usize) -> String {
    format!("SMA_{period}")
}

pub fn ema(period: usize) -> String {
    format!("EMA_{period}")
}

pub fn hma(period: usize) -> String {
    format!("HMA_{period}")
}

pub fn rsi(period: usize) -> String {
    format!("RSI_{period}")
}

pub fn roc(period: usize) -> String {
    format!("ROC_{period}")
}

pub fn cci(period: usize) -> String {
    format!("CCI_{period}_0.015")
}

pub fn cmf(period: usize) -> String {
    format!("CMF_{period}")
}

pub fn ao(fast: usize, slow: usize) -> String {
    format!("AO_{fast}_{slow}")
}

pub fn vwap(period: usize) -> String {
    format!("VWAP_{period}")
}

/// Score column of a candlestick pattern, e.g. `pattern_engulfing`.
pub fn pattern(code: &str) -> String {
    format!("pattern_{}", code.to_ascii_lowercase())
}

pub struct MacdColumns {
    pub macd: String,
    pub histogram: String,
    pub signal: String,
}

pub fn macd(fast: usize, slow: usize, signal: usize) -> MacdColumns {
    let suffix = format!("{fast}_{slow}_{signal}");
    MacdColumns {
        macd: format!("MACD_{suffix}"),
        histogram: format!("MACDh_{suffix}"),
        signal: format!("MACDs_{suffix}"),
    }
}

/// Lower / middle / upper lines of a channel indicator.
pub struct BandColumns {
    pub lower: String,
    pub middle: String,
    pub upper: String,
}

pub fn bbands(period: usize, std_dev: f64) -> BandColumns {
    let suffix = format!("{period}_{std_dev:?}");
    BandColumns {
        lower: format!("BBL_{suffix}"),
        middle: format!("BBM_{suffix}"),
        upper: format!("BBU_{suffix}"),
    }
}

pub fn keltner(ema_period: usize, atr_period: usize, multiplier: f64) -> BandColumns {
    let suffix = format!("{ema_period}_{atr_period}_{multiplier:?}");
    BandColumns {
        lower: format!("KCLe_{suffix}"),
        middle: format!("KCBe_{suffix}"),
        upper: format!("KCUe_{suffix}"),
    }
}

pub fn donchian(upper_period: usize, lower_period: usize) -> BandColumns {
    BandColumns {
        lower: format!("DCL_{lower_period}"),
        middle: format!("DCM_{lower_period}_{upper_period}"),
        upper: format!("DCU_{upper_period}"),
    }
}

pub struct SupertrendColumns {
    pub line: String,
    pub direction: String,
}

pub fn supertrend(atr_period: usize, multiplier: f64) -> SupertrendColumns {
    let suffix = format!("{atr_period}_{multiplier:?}");
    SupertrendColumns {
        line: format!("SUPERT_{suffix}"),
        direction: format!("SUPERTd_{suffix}"),
    }
}

pub struct TrixColumns {
    pub trix: String,
    pub signal: String,
}

pub fn trix(period: usize, signal: usize) -> TrixColumns {
    TrixColumns {
        trix: format!("TRIX_{period}_{signal}"),
        signal: format!("TRIXs_{period}_{signal}"),
    }
}

pub struct StochColumns {
    pub k: String,
    pub d: String,
}

pub fn stoch(k_period: usize, d_period: usize, smooth_k: usize) -> StochColumns {
    let suffix = format!("{k_period}_{d_period}_{smooth_k}");
    StochColumns {
        k: format!("STOCHk_{suffix}"),
        d: format!("STOCHd_{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_parameters_always_carry_a_decimal_point() {
        let bands = bbands(20, 2.0);
        assert_eq!(bands.lower, "BBL_20_2.0");
        assert_eq!(bands.upper, "BBU_20_2.0");
        assert_eq!(keltner(20, 10, 2.5).middle, "KCBe_20_10_2.5");
        assert_eq!(supertrend(10, 3.0).direction, "SUPERTd_10_3.0");
    }

    #[test]
    fn integer_parameters_are_joined_with_underscores() {
        assert_eq!(macd(12, 26, 9).signal, "MACDs_12_26_9");
        assert_eq!(stoch(14, 3, 3).k, "STOCHk_14_3_3");
        assert_eq!(donchian(20, 10).middle, "DCM_10_20");
        assert_eq!(pattern("ENGULFING"), "pattern_engulfing");
    }
}
