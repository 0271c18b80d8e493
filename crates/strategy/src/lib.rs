pub mod config;
pub mod indicators;
pub mod overlay;
pub mod params;
pub mod registry;
pub mod signal;
pub mod strategies;

pub use config::StrategyFileConfig;
pub use params::{ParamSet, ParamSpec, ParamValue};
pub use registry::{builtin, Analysis, RegistryError, StrategyInfo, StrategyRegistry};

use common::{BarSeries, Overlays, PositionContext, SignalDecision};

/// All strategy implementations must satisfy this trait.
///
/// A unit is stateless: every call receives the bars and parameters it
/// needs, so one instance serves concurrent requests.
pub trait Strategy: Send + Sync {
    /// Display name, e.g. "SMA Crossover".
    fn name(&self) -> &'static str;

    /// Machine identifier used by the allow-list and the API.
    fn slug(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Recognised options with defaults, bounds and UI hints.
    fn params(&self) -> &'static [ParamSpec];

    /// Append this unit's indicator columns. Never fails: a missing input
    /// column or an indicator error leaves the table without the columns.
    fn attach_indicators(&self, bars: &mut BarSeries, params: &ParamSet);

    /// Decide on the latest bar. Missing data and invalid parameters yield
    /// an explanatory HOLD.
    fn evaluate(
        &self,
        bars: &BarSeries,
        params: &ParamSet,
        position: PositionContext,
    ) -> SignalDecision;

    /// Chart series for the attached columns; empty without a time index.
    fn overlays(&self, bars: &BarSeries, params: &ParamSet) -> Overlays;
}
