use std::net::IpAddr;

use crate::{Error, Result};

/// All process configuration loaded from environment variables at startup.
/// Nothing is required; every variable has a working default.
#[derive(Debug, Clone)]
pub struct Config {
    // HTTP listener
    pub bind_addr: IpAddr,
    pub port: u16,

    /// When set, `/api/*` routes require `Authorization: Bearer <token>`.
    pub api_token: Option<String>,

    // Strategy allow-list file path
    pub strategy_config_path: String,

    // Market data
    pub binance_base_url: String,
    pub default_candle_limit: usize,
}

impl Config {
    pub const DEFAULT_BINANCE_URL: &'static str = "https://api.binance.com";

    /// Load configuration from environment variables.
    /// Loads `.env` if present. Fails on values that do not parse.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        Ok(Config {
            bind_addr: parsed_env("BIND_ADDR")?.unwrap_or(IpAddr::from([0, 0, 0, 0])),
            port: parsed_env("PORT")?.unwrap_or(8080),
            api_token: optional_env("API_TOKEN").filter(|t| !t.trim().is_empty()),
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH")
                .unwrap_or_else(|| "config/strategies.toml".to_string()),
            binance_base_url: optional_env("BINANCE_BASE_URL")
                .unwrap_or_else(|| Self::DEFAULT_BINANCE_URL.to_string()),
            default_candle_limit: parsed_env("DEFAULT_CANDLE_LIMIT")?.unwrap_or(300),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parsed_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("{key}='{raw}' is invalid: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_value_is_a_config_error() {
        std::env::set_var("STRATDESK_TEST_PORT", "not-a-port");
        let err = parsed_env::<u16>("STRATDESK_TEST_PORT").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        std::env::remove_var("STRATDESK_TEST_PORT");
    }

    #[test]
    fn unset_value_is_none() {
        let value = parsed_env::<u16>("STRATDESK_TEST_UNSET_VARIABLE").unwrap();
        assert!(value.is_none());
    }
}
