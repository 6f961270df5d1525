//! Demand models that turn a feature frame into an elasticity estimate.

use crate::cancel::CancelFlag;
use crate::config::EngineConfig;
use crate::error::{ElasticityError, Result};
use crate::features::FeatureFrame;
use crate::result::ConfidenceInterval;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which demand model variant to fit
///
/// Model selection is enum-keyed end to end; the variant never travels as a
/// string tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Deterministic log-log OLS; the default
    Linear,
    /// Boosted trees with a bootstrap interval; higher fidelity, O(N) refits
    GradientBoosting,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::Linear => "linear",
            ModelKind::GradientBoosting => "gradient_boosting",
        };
        write!(f, "{}", name)
    }
}

/// Coefficient with its goodness of fit and uncertainty
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientEstimate {
    pub coefficient: f64,
    pub r_squared: Option<f64>,
    pub confidence_interval: ConfidenceInterval,
}

/// A demand model that can be fitted to a feature frame
pub trait DemandModel {
    /// The fitted form of this model
    type Fitted: FittedDemandModel;

    /// Fits the model to the frame.
    fn fit(&self, frame: &FeatureFrame) -> Result<Self::Fitted>;
}

/// A fitted demand model exposing the shared elasticity contract
pub trait FittedDemandModel {
    /// Elasticity coefficient and goodness of fit.
    fn coefficient(&self, frame: &FeatureFrame) -> Result<(f64, Option<f64>)>;

    /// Confidence interval for the coefficient. Implementations doing
    /// expensive resampling honor the cancellation flag between iterations.
    fn confidence_interval(
        &self,
        frame: &FeatureFrame,
        cancel: &CancelFlag,
    ) -> Result<ConfidenceInterval>;
}

/// Fits the requested variant and extracts its estimate.
pub fn estimate(
    kind: ModelKind,
    config: &EngineConfig,
    frame: &FeatureFrame,
    cancel: &CancelFlag,
) -> Result<CoefficientEstimate> {
    match kind {
        ModelKind::Linear => {
            let model = LinearDemandModel::new(config.confidence_level);
            run(&model, frame, cancel)
        }
        ModelKind::GradientBoosting => {
            let model = GradientBoostingModel::new(
                config.gradient_boosting.clone(),
                config.confidence_level,
            );
            run(&model, frame, cancel)
        }
    }
}

fn run<M: DemandModel>(
    model: &M,
    frame: &FeatureFrame,
    cancel: &CancelFlag,
) -> Result<CoefficientEstimate> {
    let fitted = model.fit(frame)?;

    let (coefficient, r_squared) = fitted.coefficient(frame)?;
    if !coefficient.is_finite() {
        return Err(ElasticityError::ModelFit(format!(
            "coefficient is not finite: {}",
            coefficient
        )));
    }

    let confidence_interval = fitted.confidence_interval(frame, cancel)?;

    Ok(CoefficientEstimate {
        coefficient,
        r_squared,
        confidence_interval,
    })
}

pub mod gradient_boosting;
pub mod linear;
mod regression_tree;

pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingModel};
pub use linear::LinearDemandModel;
