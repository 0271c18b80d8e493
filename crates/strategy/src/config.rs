use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// Strategy allow-list file (TOML).
///
/// Example `config/strategies.toml`:
/// ```toml
/// enabled = [
///     "sma_crossover",
///     "rsi_mean_reversion",
///     "donchian_breakout",
/// ]
/// ```
///
/// Units missing from `enabled` are never offered, even though they are
/// compiled in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    #[serde(default)]
    pub enabled: Vec<String>,
}

impl StrategyFileConfig {
    /// Load from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read strategy config at '{path}': {e}")))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("cannot parse strategy config at '{path}': {e}")))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn allows(&self, slug: &str) -> bool {
        self.enabled.iter().any(|s| s == slug)
    }
}

impl Default for StrategyFileConfig {
    /// Every built-in unit enabled.
    fn default() -> Self {
        Self {
            enabled: crate::builtin()
                .iter()
                .map(|s| s.slug().to_string())
                .collect(),
        }
    }
}
