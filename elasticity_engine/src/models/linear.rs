//! Log-log linear demand model.
//!
//! Regresses `log_quantity` on `log_price`; the fitted slope is the point
//! elasticity of the log-log specification. The whole path is deterministic,
//! so identical histories reproduce the coefficient, R² and interval
//! bit for bit.

use crate::cancel::CancelFlag;
use crate::error::{ElasticityError, Result};
use crate::features::FeatureFrame;
use crate::models::{DemandModel, FittedDemandModel};
use crate::result::ConfidenceInterval;
use pricing_math::regression::{fit_ols, OlsFit};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// OLS demand model on the log-log scale
#[derive(Debug, Clone)]
pub struct LinearDemandModel {
    confidence_level: f64,
}

impl LinearDemandModel {
    pub fn new(confidence_level: f64) -> Self {
        Self { confidence_level }
    }
}

/// Fitted log-log model
#[derive(Debug, Clone)]
pub struct FittedLinearModel {
    fit: OlsFit,
    confidence_level: f64,
}

impl DemandModel for LinearDemandModel {
    type Fitted = FittedLinearModel;

    fn fit(&self, frame: &FeatureFrame) -> Result<FittedLinearModel> {
        let fit = fit_ols(&frame.log_price_matrix(), &frame.log_quantity_target())?;
        Ok(FittedLinearModel {
            fit,
            confidence_level: self.confidence_level,
        })
    }
}

impl FittedDemandModel for FittedLinearModel {
    fn coefficient(&self, _frame: &FeatureFrame) -> Result<(f64, Option<f64>)> {
        Ok((self.fit.coefficients[1], Some(self.fit.r_squared)))
    }

    fn confidence_interval(
        &self,
        _frame: &FeatureFrame,
        _cancel: &CancelFlag,
    ) -> Result<ConfidenceInterval> {
        let t_dist = StudentsT::new(0.0, 1.0, self.fit.residual_df as f64).map_err(|e| {
            ElasticityError::ModelFit(format!("t-distribution unavailable: {}", e))
        })?;
        let t = t_dist.inverse_cdf(0.5 + self.confidence_level / 2.0);

        let beta = self.fit.coefficients[1];
        let se = self.fit.std_errors[1];
        Ok(ConfidenceInterval::new(beta - t * se, beta + t * se))
    }
}
