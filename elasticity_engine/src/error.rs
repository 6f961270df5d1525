//! Error types for the elasticity_engine crate

use pricing_math::MathError;
use thiserror::Error;

/// Custom error types for the elasticity_engine crate
///
/// Every error is local to one product and one calculation; nothing here is
/// globally fatal. `kind()` exposes the machine-readable tag API callers are
/// expected to surface alongside the human-readable message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ElasticityError {
    /// Too few usable records to estimate anything
    #[error("insufficient sales data: got {got} usable records, need at least {need}")]
    InsufficientData { got: usize, need: usize },

    /// History is present but degenerate (e.g. zero price variance)
    #[error("degenerate sales data: {0}")]
    DegenerateData(String),

    /// The model fit did not converge or produced non-finite output
    #[error("model fit failed: {0}")]
    ModelFit(String),

    /// Coefficient sits exactly at the price solver's singular point
    #[error("elasticity coefficient {coefficient} is singular for price optimization")]
    DegenerateElasticity { coefficient: f64 },

    /// Product pricing from the catalog is unusable
    #[error("invalid product pricing: {0}")]
    InvalidPricing(String),

    /// Scenario input rejected before any computation
    #[error("invalid simulation input: {0}")]
    SimulationInput(String),

    /// Product id unknown to a collaborator
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// The result store rejected a write
    #[error("result store error: {0}")]
    Store(String),

    /// Calculation stopped at a cooperative cancellation checkpoint
    #[error("calculation cancelled")]
    Cancelled,
}

impl ElasticityError {
    /// Machine-readable error kind.
    ///
    /// Degenerate histories share the `insufficient_data` tag with short
    /// histories: both mean "this data cannot support an estimate".
    pub fn kind(&self) -> &'static str {
        match self {
            ElasticityError::InsufficientData { .. } | ElasticityError::DegenerateData(_) => {
                "insufficient_data"
            }
            ElasticityError::ModelFit(_) => "model_fit",
            ElasticityError::DegenerateElasticity { .. } => "degenerate_elasticity",
            ElasticityError::InvalidPricing(_) => "invalid_pricing",
            ElasticityError::SimulationInput(_) => "simulation_input",
            ElasticityError::UnknownProduct(_) => "unknown_product",
            ElasticityError::Store(_) => "store",
            ElasticityError::Cancelled => "cancelled",
        }
    }

    /// Whether retrying the calculation with the other model variant may
    /// succeed. Only fit failures qualify; data problems will not improve.
    pub fn is_retriable_with_other_model(&self) -> bool {
        matches!(self, ElasticityError::ModelFit(_))
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ElasticityError>;

impl From<MathError> for ElasticityError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData(msg) => ElasticityError::DegenerateData(msg),
            MathError::InvalidInput(msg) | MathError::CalculationError(msg) => {
                ElasticityError::ModelFit(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable_tags() {
        let err = ElasticityError::InsufficientData { got: 3, need: 10 };
        assert_eq!(err.kind(), "insufficient_data");
        assert_eq!(
            ElasticityError::DegenerateData("flat".into()).kind(),
            "insufficient_data"
        );
        assert_eq!(ElasticityError::Cancelled.kind(), "cancelled");
    }

    #[test]
    fn only_fit_failures_suggest_the_other_model() {
        assert!(ElasticityError::ModelFit("diverged".into()).is_retriable_with_other_model());
        assert!(!ElasticityError::InsufficientData { got: 1, need: 10 }
            .is_retriable_with_other_model());
    }

    #[test]
    fn messages_carry_the_counts() {
        let err = ElasticityError::InsufficientData { got: 3, need: 10 };
        assert_eq!(
            err.to_string(),
            "insufficient sales data: got 3 usable records, need at least 10"
        );
    }
}
