//! What-if scenario simulation from a stored elasticity result.
//!
//! The projection deliberately uses the linear local approximation
//! `%Δquantity = e * %Δprice` around the current operating point rather than
//! the power-law relation the price solver evaluates; the two disagree away
//! from small changes and both behaviors are part of the contract.

use crate::classifier::ElasticityType;
use crate::error::{ElasticityError, Result};
use crate::result::ElasticityResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Demand and pricing baseline the projection starts from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandBaseline {
    pub current_price: f64,
    pub unit_cost: f64,
    /// Average units sold per day over the lookback window
    pub average_daily_quantity: f64,
}

/// Action recommended for a simulated price change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioAction {
    IncreasePrice,
    DecreasePrice,
    HoldPrice,
    ReducePriceCautiously,
    RaisePriceAggressively,
}

impl fmt::Display for ScenarioAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScenarioAction::IncreasePrice => "increase_price",
            ScenarioAction::DecreasePrice => "decrease_price",
            ScenarioAction::HoldPrice => "hold_price",
            ScenarioAction::ReducePriceCautiously => "reduce_price_cautiously",
            ScenarioAction::RaisePriceAggressively => "raise_price_aggressively",
        };
        write!(f, "{}", name)
    }
}

/// Risk attached to a recommendation, driven by the size of the price move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Recommendation attached to a scenario projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecommendation {
    pub action: ScenarioAction,
    pub risk_level: RiskLevel,
}

/// Projected impact of a hypothetical price change
///
/// All `*_pct` fields are fractional ratios (-0.10 is a 10% cut); they are
/// `None` when the corresponding baseline is zero, never a division error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub product_id: String,
    pub current_price: f64,
    pub new_price: f64,
    pub price_change_pct: f64,
    /// Average daily demand at the current price
    pub current_demand: f64,
    pub predicted_demand: f64,
    pub demand_change_pct: Option<f64>,
    /// Daily revenue at the current price
    pub current_revenue: f64,
    pub predicted_revenue: f64,
    pub revenue_change_pct: Option<f64>,
    /// Daily profit at the current price
    pub current_profit: f64,
    pub predicted_profit: f64,
    pub profit_change_pct: Option<f64>,
    /// Revenue delta accumulated over the simulated period
    pub projected_revenue_delta: f64,
    /// Profit delta accumulated over the simulated period
    pub projected_profit_delta: f64,
    pub elasticity_used: f64,
    pub simulation_days: u32,
    pub recommendation: ScenarioRecommendation,
    pub created_at: DateTime<Utc>,
}

/// Simulates demand, revenue and profit under a hypothetical price
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSimulator {
    max_decrease_pct: f64,
    max_increase_pct: f64,
    high_risk_threshold: f64,
    medium_risk_threshold: f64,
    strong_change_threshold: f64,
}

impl Default for ScenarioSimulator {
    fn default() -> Self {
        Self {
            max_decrease_pct: 0.30,
            max_increase_pct: 0.20,
            high_risk_threshold: 0.20,
            medium_risk_threshold: 0.10,
            strong_change_threshold: 0.05,
        }
    }
}

impl ScenarioSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the largest allowed fractional price decrease.
    pub fn with_max_decrease_pct(mut self, pct: f64) -> Self {
        self.max_decrease_pct = pct;
        self
    }

    /// Sets the largest allowed fractional price increase.
    pub fn with_max_increase_pct(mut self, pct: f64) -> Self {
        self.max_increase_pct = pct;
        self
    }

    /// Projects the impact of pricing at `new_price` for `simulation_days`.
    pub fn simulate(
        &self,
        elasticity: &ElasticityResult,
        baseline: &DemandBaseline,
        new_price: f64,
        simulation_days: u32,
    ) -> Result<ScenarioResult> {
        if !new_price.is_finite() || new_price <= 0.0 {
            return Err(ElasticityError::SimulationInput(format!(
                "new price must be positive, got {}",
                new_price
            )));
        }
        if !baseline.current_price.is_finite() || baseline.current_price <= 0.0 {
            return Err(ElasticityError::SimulationInput(format!(
                "baseline price must be positive, got {}",
                baseline.current_price
            )));
        }
        if !baseline.average_daily_quantity.is_finite() || baseline.average_daily_quantity < 0.0 {
            return Err(ElasticityError::SimulationInput(format!(
                "baseline demand must be non-negative, got {}",
                baseline.average_daily_quantity
            )));
        }
        if simulation_days == 0 {
            return Err(ElasticityError::SimulationInput(
                "simulation must cover at least one day".to_string(),
            ));
        }

        let price_change_pct = (new_price - baseline.current_price) / baseline.current_price;
        if price_change_pct < -self.max_decrease_pct {
            return Err(ElasticityError::SimulationInput(format!(
                "price decrease of {:.1}% exceeds the {:.0}% limit",
                -price_change_pct * 100.0,
                self.max_decrease_pct * 100.0
            )));
        }
        if price_change_pct > self.max_increase_pct {
            return Err(ElasticityError::SimulationInput(format!(
                "price increase of {:.1}% exceeds the {:.0}% limit",
                price_change_pct * 100.0,
                self.max_increase_pct * 100.0
            )));
        }

        // Linear local approximation around the operating point.
        let demand_change = elasticity.coefficient * price_change_pct;

        let current_demand = baseline.average_daily_quantity;
        let predicted_demand = (current_demand * (1.0 + demand_change)).max(0.0);

        let current_revenue = baseline.current_price * current_demand;
        let predicted_revenue = new_price * predicted_demand;
        let current_profit = (baseline.current_price - baseline.unit_cost) * current_demand;
        let predicted_profit = (new_price - baseline.unit_cost) * predicted_demand;

        let demand_change_pct = (current_demand > 0.0).then_some(demand_change);
        let revenue_change_pct =
            (current_revenue > 0.0).then(|| (predicted_revenue - current_revenue) / current_revenue);
        let profit_change_pct =
            (current_profit != 0.0).then(|| (predicted_profit - current_profit) / current_profit);

        let days = f64::from(simulation_days);
        let recommendation = self.recommend(
            price_change_pct,
            revenue_change_pct,
            profit_change_pct,
            elasticity.elasticity_type,
        );

        Ok(ScenarioResult {
            product_id: elasticity.product_id.clone(),
            current_price: baseline.current_price,
            new_price,
            price_change_pct,
            current_demand,
            predicted_demand,
            demand_change_pct,
            current_revenue,
            predicted_revenue,
            revenue_change_pct,
            current_profit,
            predicted_profit,
            profit_change_pct,
            projected_revenue_delta: (predicted_revenue - current_revenue) * days,
            projected_profit_delta: (predicted_profit - current_profit) * days,
            elasticity_used: elasticity.coefficient,
            simulation_days,
            recommendation,
            created_at: Utc::now(),
        })
    }

    fn recommend(
        &self,
        price_change_pct: f64,
        revenue_change_pct: Option<f64>,
        profit_change_pct: Option<f64>,
        elasticity_type: ElasticityType,
    ) -> ScenarioRecommendation {
        let magnitude = price_change_pct.abs();
        let risk_level = if magnitude > self.high_risk_threshold {
            RiskLevel::High
        } else if magnitude > self.medium_risk_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        let revenue = revenue_change_pct.unwrap_or(0.0);
        let profit = profit_change_pct.unwrap_or(0.0);

        let action = if price_change_pct > 0.0 {
            if revenue > self.strong_change_threshold && profit > self.strong_change_threshold {
                ScenarioAction::RaisePriceAggressively
            } else if revenue > 0.0 && profit > 0.0 {
                ScenarioAction::IncreasePrice
            } else {
                ScenarioAction::HoldPrice
            }
        } else if price_change_pct < 0.0 {
            if revenue > 0.0 && profit > 0.0 {
                ScenarioAction::DecreasePrice
            } else if revenue > 0.0 && elasticity_type.is_elastic() {
                ScenarioAction::ReducePriceCautiously
            } else {
                ScenarioAction::HoldPrice
            }
        } else {
            ScenarioAction::HoldPrice
        };

        ScenarioRecommendation { action, risk_level }
    }
}
