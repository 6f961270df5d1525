//! Persisted outcome of an elasticity calculation.

use crate::classifier::ElasticityType;
use crate::models::ModelKind;
use chrono::{DateTime, Utc};
use retail_sales::DateRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-sided confidence interval on a coefficient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Builds an interval, normalizing the bound order.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { lower: a, upper: b }
        } else {
            Self { lower: b, upper: a }
        }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Pricing action recommended alongside an elasticity estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    IncreasePrice,
    DecreasePrice,
    HoldPrice,
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecommendedAction::IncreasePrice => "increase_price",
            RecommendedAction::DecreasePrice => "decrease_price",
            RecommendedAction::HoldPrice => "hold_price",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of one elasticity calculation for one product
///
/// Append-only once persisted: recalculations add a new record, the previous
/// ones stay as the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticityResult {
    pub product_id: String,
    /// Signed elasticity coefficient; negative for normal demand
    pub coefficient: f64,
    pub elasticity_type: ElasticityType,
    /// Goodness of fit, when the model reports one
    pub r_squared: Option<f64>,
    /// Rows actually fitted after filtering
    pub sample_size: usize,
    pub model_kind: ModelKind,
    pub confidence_interval: ConfidenceInterval,
    pub calculation_date: DateTime<Utc>,
    /// Date range the fitted rows cover
    pub period: DateRange,
    pub recommended_action: RecommendedAction,
    pub optimal_price: f64,
    /// Fractional revenue change expected at the optimal price
    pub expected_revenue_change: f64,
}
