//! Revenue-optimal price from a fitted elasticity.
//!
//! For elastic demand the optimal price follows the standard markup rule
//! `P* = c * e / (e + 1)`. On the inelastic side the rule is unbounded (the
//! in-model revenue keeps rising with price), so a policy cap on the current
//! price is applied instead of a derivation.

use crate::classifier::ElasticityType;
use crate::error::{ElasticityError, Result};
use crate::result::RecommendedAction;
use retail_sales::ProductPricing;

/// Optimal price with its expected revenue impact
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecommendation {
    pub optimal_price: f64,
    /// Fractional revenue change expected at the optimal price
    pub expected_revenue_change: f64,
    pub action: RecommendedAction,
}

/// Solves for the revenue-optimal price under the fitted demand relation
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSolver {
    inelastic_cap_ratio: f64,
    min_markup_ratio: f64,
}

impl Default for PriceSolver {
    fn default() -> Self {
        Self {
            inelastic_cap_ratio: 1.5,
            min_markup_ratio: 1.1,
        }
    }
}

impl PriceSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy cap applied to inelastic products, as a multiple of
    /// the current price.
    pub fn with_inelastic_cap_ratio(mut self, ratio: f64) -> Self {
        self.inelastic_cap_ratio = ratio;
        self
    }

    /// Sets the cost floor, as a multiple of unit cost, below which no price
    /// is ever recommended.
    pub fn with_min_markup_ratio(mut self, ratio: f64) -> Self {
        self.min_markup_ratio = ratio;
        self
    }

    /// Computes the optimal price and its expected revenue change.
    ///
    /// `baseline_quantity` is the average daily demand at the current price;
    /// the expected change evaluates the power-law demand relation
    /// `Q* = Q * (P*/P)^e` at the recommended price.
    pub fn solve(
        &self,
        coefficient: f64,
        pricing: &ProductPricing,
        baseline_quantity: f64,
        elasticity_type: ElasticityType,
    ) -> Result<PriceRecommendation> {
        let current_price = pricing.current_price;
        let unit_cost = pricing.unit_cost;

        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(ElasticityError::InvalidPricing(format!(
                "current price must be positive, got {}",
                current_price
            )));
        }
        if !unit_cost.is_finite() || unit_cost < 0.0 {
            return Err(ElasticityError::InvalidPricing(format!(
                "unit cost must be non-negative, got {}",
                unit_cost
            )));
        }
        if !baseline_quantity.is_finite() || baseline_quantity <= 0.0 {
            return Err(ElasticityError::InvalidPricing(format!(
                "baseline quantity must be positive, got {}",
                baseline_quantity
            )));
        }
        if !coefficient.is_finite() {
            return Err(ElasticityError::ModelFit(format!(
                "cannot solve for a non-finite coefficient: {}",
                coefficient
            )));
        }

        // The markup rule divides by e + 1.
        if coefficient == -1.0 {
            return Err(ElasticityError::DegenerateElasticity { coefficient });
        }

        let raw = if coefficient < -1.0 {
            unit_cost * coefficient / (coefficient + 1.0)
        } else {
            current_price * self.inelastic_cap_ratio
        };
        let optimal_price = raw.max(unit_cost * self.min_markup_ratio);
        if !optimal_price.is_finite() || optimal_price <= 0.0 {
            return Err(ElasticityError::ModelFit(format!(
                "optimal price is not positive: {}",
                optimal_price
            )));
        }

        let predicted_quantity =
            baseline_quantity * (optimal_price / current_price).powf(coefficient);
        let current_revenue = current_price * baseline_quantity;
        let expected_revenue_change =
            (optimal_price * predicted_quantity - current_revenue) / current_revenue;

        let action = match elasticity_type {
            ElasticityType::HighlyElastic | ElasticityType::Elastic => {
                RecommendedAction::DecreasePrice
            }
            ElasticityType::UnitElastic => RecommendedAction::HoldPrice,
            ElasticityType::Inelastic => RecommendedAction::IncreasePrice,
        };

        Ok(PriceRecommendation {
            optimal_price,
            expected_revenue_change,
            action,
        })
    }
}
