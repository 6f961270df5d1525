//! Engine configuration.
//!
//! Plain structs with `Default` and builder-style setters; defaults mirror
//! the business rules the engine ships with (10-record minimum, 95%
//! confidence, guarded scenario bands).

use crate::features::FeatureBuilder;
use crate::models::gradient_boosting::GradientBoostingConfig;
use crate::scenario::ScenarioSimulator;
use crate::solver::PriceSolver;

/// Tunable knobs of the elasticity engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Feature construction policy
    pub feature_builder: FeatureBuilder,
    /// Boosted-model hyperparameters
    pub gradient_boosting: GradientBoostingConfig,
    /// Two-sided confidence level for coefficient intervals
    pub confidence_level: f64,
    /// Optimal-price policy
    pub price_solver: PriceSolver,
    /// Scenario guard bands and risk thresholds
    pub simulator: ScenarioSimulator,
    /// Maximum products fitted concurrently in bulk mode
    pub bulk_concurrency: usize,
    /// Trailing window, in days, the scenario demand baseline averages over
    pub scenario_lookback_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            feature_builder: FeatureBuilder::default(),
            gradient_boosting: GradientBoostingConfig::default(),
            confidence_level: 0.95,
            price_solver: PriceSolver::default(),
            simulator: ScenarioSimulator::default(),
            bulk_concurrency: 4,
            scenario_lookback_days: 90,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the feature construction policy.
    pub fn with_feature_builder(mut self, feature_builder: FeatureBuilder) -> Self {
        self.feature_builder = feature_builder;
        self
    }

    /// Replaces the boosted-model hyperparameters.
    pub fn with_gradient_boosting(mut self, config: GradientBoostingConfig) -> Self {
        self.gradient_boosting = config;
        self
    }

    /// Sets the confidence level used by both interval methods.
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    /// Fixes the bootstrap seed; a convenience for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.gradient_boosting.seed = Some(seed);
        self
    }

    /// Sets the bulk-mode concurrency bound.
    pub fn with_bulk_concurrency(mut self, bulk_concurrency: usize) -> Self {
        self.bulk_concurrency = bulk_concurrency;
        self
    }

    /// Sets the scenario baseline lookback window.
    pub fn with_scenario_lookback_days(mut self, days: u32) -> Self {
        self.scenario_lookback_days = days;
        self
    }
}
