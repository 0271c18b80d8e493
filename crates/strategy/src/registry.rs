use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use common::{BarSeries, Overlays, PositionContext, SignalDecision};

use crate::config::StrategyFileConfig;
use crate::params::{validate_schema, ParamSet, Schema};
use crate::strategies::*;
use crate::Strategy;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Strategy '{0}' is not available")]
    Unavailable(String),
}

/// Every unit compiled into the binary, in display order.
pub fn builtin() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(SmaCrossover),
        Box::new(EmaCrossover),
        Box::new(RsiMeanReversion),
        Box::new(MacdTrend),
        Box::new(BollingerReversion),
        Box::new(DonchianBreakout),
        Box::new(KeltnerBreakout),
        Box::new(SupertrendFollowing),
        Box::new(RocBreakout),
        Box::new(CciCyclical),
        Box::new(CmfThreshold),
        Box::new(AoZeroCross),
        Box::new(TrixSignalCross),
        Box::new(CandleEmaFilter),
        Box::new(HmaSlope),
        Box::new(StochasticMomentum),
        Box::new(VwapCross),
    ]
}

/// Directory entry for one loaded unit.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    pub name: &'static str,
    pub slug: &'static str,
    pub description: &'static str,
    pub params: Schema,
}

/// Result of running one unit over a bar series.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub strategy: &'static str,
    pub decision: SignalDecision,
    pub overlays: Overlays,
    /// Number of bars the decision was made on.
    pub bars: usize,
}

/// The enabled strategy units. Built once at startup, read-only afterwards.
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn Strategy>>,
}

impl StrategyRegistry {
    /// Keep the units of `catalogue` whose slug is allow-listed in `cfg`.
    /// Malformed or duplicate units are skipped with a warning.
    pub fn new(catalogue: Vec<Box<dyn Strategy>>, cfg: &StrategyFileConfig) -> Self {
        let mut strategies: Vec<Box<dyn Strategy>> = Vec::new();
        let mut seen = HashSet::new();

        for strategy in catalogue {
            let slug = strategy.slug();
            if let Err(reason) = well_formed(strategy.as_ref()) {
                warn!(slug, %reason, "Skipping malformed strategy");
                continue;
            }
            if !cfg.allows(slug) {
                continue;
            }
            if !seen.insert(slug) {
                warn!(slug, "Duplicate strategy slug; keeping the first");
                continue;
            }
            info!(slug, name = strategy.name(), "Registered strategy");
            strategies.push(strategy);
        }

        for slug in &cfg.enabled {
            if !seen.contains(slug.as_str()) {
                warn!(slug = %slug, "Enabled strategy has no implementation");
            }
        }

        Self { strategies }
    }

    pub fn get(&self, slug: &str) -> Result<&dyn Strategy, RegistryError> {
        self.strategies
            .iter()
            .find(|s| s.slug() == slug)
            .map(|s| s.as_ref())
            .ok_or_else(|| RegistryError::Unavailable(slug.to_string()))
    }

    pub fn directory(&self) -> Vec<StrategyInfo> {
        self.strategies
            .iter()
            .map(|s| StrategyInfo {
                name: s.name(),
                slug: s.slug(),
                description: s.description(),
                params: Schema(s.params()),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Attach indicators, evaluate the latest bar and extract overlays.
    pub fn analyze(
        &self,
        slug: &str,
        mut bars: BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> Result<Analysis, RegistryError> {
        let strategy = self.get(slug)?;
        strategy.attach_indicators(&mut bars, params);
        let decision = strategy.evaluate(&bars, params, position);
        let overlays = strategy.overlays(&bars, params);

        info!(
            strategy = slug,
            bars = bars.len(),
            %position,
            signal = ?decision.signal,
            "Analysis complete"
        );

        Ok(Analysis {
            strategy: strategy.slug(),
            decision,
            overlays,
            bars: bars.len(),
        })
    }
}

fn well_formed(strategy: &dyn Strategy) -> Result<(), String> {
    if strategy.slug().trim().is_empty() {
        return Err("empty slug".into());
    }
    if strategy.name().trim().is_empty() {
        return Err("empty display name".into());
    }
    validate_schema(strategy.params())
}
