//! # Elasticity Engine
//!
//! A Rust library that estimates price elasticity of demand from historical
//! sales records, derives a revenue-optimal price, and simulates the effect
//! of hypothetical price changes.
//!
//! ## Features
//!
//! - Feature construction from raw sale records (log transforms, zero-sales
//!   policy, variance guards)
//! - Two demand models behind one contract: a deterministic log-log OLS fit
//!   and a gradient-boosted tree fit with a bootstrap confidence interval
//! - Elasticity classification, optimal-price solving, and what-if scenario
//!   projection with risk-scored recommendations
//! - An async engine that serializes per-product calculations, offloads
//!   CPU-bound fits, and aggregates bulk runs
//!
//! ## Quick Start
//!
//! ```no_run
//! use elasticity_engine::{compute, EngineConfig, ModelKind};
//! use retail_sales::history::{generate_history, HistorySpec};
//! use retail_sales::ProductPricing;
//!
//! let history = generate_history(&HistorySpec::default());
//! let pricing = ProductPricing::new(100.0, 60.0);
//!
//! let result = compute(
//!     &EngineConfig::default(),
//!     "sku-1042",
//!     ModelKind::Linear,
//!     &history,
//!     &pricing,
//! )
//! .expect("history is long enough to fit");
//!
//! println!(
//!     "{}: coefficient {:.2} ({}), optimal price {:.2}",
//!     result.product_id, result.coefficient, result.elasticity_type, result.optimal_price
//! );
//! ```

pub mod cancel;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod models;
pub mod result;
pub mod scenario;
pub mod solver;
pub mod store;

// Re-export commonly used types
pub use crate::cancel::CancelFlag;
pub use crate::classifier::{classify, ElasticityType};
pub use crate::config::EngineConfig;
pub use crate::engine::{compute, BulkError, BulkOutcome, CalculationStage, ElasticityEngine};
pub use crate::error::{ElasticityError, Result};
pub use crate::features::{FeatureBuilder, FeatureFrame, FeatureRow, ZeroQuantityPolicy};
pub use crate::models::{
    CoefficientEstimate, DemandModel, FittedDemandModel, GradientBoostingConfig, ModelKind,
};
pub use crate::result::{ConfidenceInterval, ElasticityResult, RecommendedAction};
pub use crate::scenario::{
    DemandBaseline, RiskLevel, ScenarioAction, ScenarioRecommendation, ScenarioResult,
    ScenarioSimulator,
};
pub use crate::solver::{PriceRecommendation, PriceSolver};
pub use crate::store::{
    InMemoryCatalog, InMemoryResultStore, InMemorySalesHistory, ProductProvider, ResultStore,
    SalesHistoryProvider, Versioned,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
