//! # ElastiRev
//!
//! Umbrella crate for the ElastiRev workspace: price-elasticity estimation
//! and pricing-scenario simulation built from three members:
//!
//! - [`retail_sales`] — domain records for sales history and product pricing
//! - [`pricing_math`] — descriptive statistics and least-squares regression
//! - [`elasticity_engine`] — the estimation, optimization and simulation core
//!
//! ## Example
//!
//! ```
//! use elastirev_workspace::engine::{compute, EngineConfig, ModelKind};
//! use elastirev_workspace::sales::history::{generate_history, HistorySpec};
//! use elastirev_workspace::sales::ProductPricing;
//!
//! let history = generate_history(&HistorySpec::default());
//! let result = compute(
//!     &EngineConfig::default(),
//!     "sku-1",
//!     ModelKind::Linear,
//!     &history,
//!     &ProductPricing::new(100.0, 60.0),
//! )
//! .unwrap();
//! assert!(result.coefficient < 0.0);
//! ```

/// Domain records for sales history and product pricing.
pub use retail_sales as sales;

/// Descriptive statistics and regression building blocks.
pub use pricing_math as math;

/// The estimation, optimization and simulation core.
pub use elasticity_engine as engine;
