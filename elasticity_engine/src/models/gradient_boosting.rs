//! Gradient-boosted demand model.
//!
//! Boosted CART regression trees of quantity on price and context features
//! under squared-error loss: start from the target mean, then repeatedly fit
//! a depth-limited tree to the residuals and add its shrunken prediction.
//! The elasticity is read off the fitted surface as a symmetric numerical
//! derivative at the mean observed price; uncertainty comes from a bootstrap
//! over the training rows.

use crate::cancel::CancelFlag;
use crate::error::{ElasticityError, Result};
use crate::features::FeatureFrame;
use crate::models::regression_tree::RegressionTree;
use crate::models::{DemandModel, FittedDemandModel};
use crate::result::ConfidenceInterval;
use pricing_math::descriptive;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Hyperparameters for the boosted demand model
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostingConfig {
    /// Trees in the headline fit
    pub n_estimators: usize,
    /// Shrinkage applied to each tree's contribution
    pub learning_rate: f64,
    /// Depth limit of each tree
    pub max_depth: usize,
    /// Minimum rows per leaf
    pub min_samples_leaf: usize,
    /// Bootstrap resamples behind the confidence interval
    pub bootstrap_iterations: usize,
    /// Trees per bootstrap refit; cheaper than the headline fit
    pub bootstrap_estimators: usize,
    /// Fractional price perturbation for the numerical derivative
    pub derivative_bandwidth: f64,
    /// RNG seed for the bootstrap; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 2,
            bootstrap_iterations: 100,
            bootstrap_estimators: 50,
            derivative_bandwidth: 0.01,
            seed: None,
        }
    }
}

impl GradientBoostingConfig {
    /// Sets the number of boosting rounds.
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Sets the number of bootstrap resamples.
    pub fn with_bootstrap_iterations(mut self, bootstrap_iterations: usize) -> Self {
        self.bootstrap_iterations = bootstrap_iterations;
        self
    }

    /// Fixes the bootstrap RNG seed for exact reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Boosted-tree demand model
#[derive(Debug, Clone)]
pub struct GradientBoostingModel {
    config: GradientBoostingConfig,
    confidence_level: f64,
}

impl GradientBoostingModel {
    pub fn new(config: GradientBoostingConfig, confidence_level: f64) -> Self {
        Self {
            config,
            confidence_level,
        }
    }
}

/// Additive ensemble produced by boosting
#[derive(Debug, Clone)]
struct BoostedEnsemble {
    baseline: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl BoostedEnsemble {
    fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        n_estimators: usize,
        learning_rate: f64,
        max_depth: usize,
        min_samples_leaf: usize,
    ) -> Result<Self> {
        let baseline = descriptive::mean(y)?;

        let mut predictions = vec![baseline; y.len()];
        let mut residuals = vec![0.0; y.len()];
        let mut trees = Vec::with_capacity(n_estimators);

        for _ in 0..n_estimators {
            for i in 0..y.len() {
                residuals[i] = y[i] - predictions[i];
            }

            let tree = RegressionTree::fit(x, &residuals, max_depth, min_samples_leaf)?;
            for (prediction, row) in predictions.iter_mut().zip(x.iter()) {
                *prediction += learning_rate * tree.predict_row(row);
            }
            trees.push(tree);
        }

        if predictions.iter().any(|p| !p.is_finite()) {
            return Err(ElasticityError::ModelFit(
                "boosting produced non-finite predictions".to_string(),
            ));
        }

        Ok(Self {
            baseline,
            learning_rate,
            trees,
        })
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.baseline
            + self.learning_rate
                * self
                    .trees
                    .iter()
                    .map(|tree| tree.predict_row(row))
                    .sum::<f64>()
    }
}

/// Fitted boosted demand model
#[derive(Debug, Clone)]
pub struct FittedGradientBoosting {
    ensemble: BoostedEnsemble,
    config: GradientBoostingConfig,
    confidence_level: f64,
}

impl DemandModel for GradientBoostingModel {
    type Fitted = FittedGradientBoosting;

    fn fit(&self, frame: &FeatureFrame) -> Result<FittedGradientBoosting> {
        let ensemble = BoostedEnsemble::fit(
            &frame.demand_matrix(),
            &frame.quantity_target(),
            self.config.n_estimators,
            self.config.learning_rate,
            self.config.max_depth,
            self.config.min_samples_leaf,
        )?;

        Ok(FittedGradientBoosting {
            ensemble,
            config: self.config.clone(),
            confidence_level: self.confidence_level,
        })
    }
}

impl FittedDemandModel for FittedGradientBoosting {
    fn coefficient(&self, frame: &FeatureFrame) -> Result<(f64, Option<f64>)> {
        let coefficient = elasticity_at(
            &self.ensemble,
            &frame.mean_demand_row(),
            frame.mean_price(),
            self.config.derivative_bandwidth,
        )?;

        // In-sample goodness of fit.
        let x = frame.demand_matrix();
        let y = frame.quantity_target();
        let y_mean = descriptive::mean(&y)?;
        let mut rss = 0.0;
        let mut tss = 0.0;
        for (row, &actual) in x.iter().zip(y.iter()) {
            rss += (actual - self.ensemble.predict_row(row)).powi(2);
            tss += (actual - y_mean).powi(2);
        }
        let r_squared = if tss > 0.0 { Some(1.0 - rss / tss) } else { None };

        Ok((coefficient, r_squared))
    }

    fn confidence_interval(
        &self,
        frame: &FeatureFrame,
        cancel: &CancelFlag,
    ) -> Result<ConfidenceInterval> {
        let iterations = self.config.bootstrap_iterations;
        if iterations == 0 {
            return Err(ElasticityError::ModelFit(
                "bootstrap_iterations must be at least 1".to_string(),
            ));
        }

        let x = frame.demand_matrix();
        let y = frame.quantity_target();
        let n = y.len();
        let base_row = frame.mean_demand_row();

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut coefficients = Vec::with_capacity(iterations);
        let mut sample_x: Vec<Vec<f64>> = Vec::with_capacity(n);
        let mut sample_y: Vec<f64> = Vec::with_capacity(n);

        for _ in 0..iterations {
            if cancel.is_cancelled() {
                return Err(ElasticityError::Cancelled);
            }

            sample_x.clear();
            sample_y.clear();
            for _ in 0..n {
                let idx = rng.gen_range(0..n);
                sample_x.push(x[idx].clone());
                sample_y.push(y[idx]);
            }

            let Ok(ensemble) = BoostedEnsemble::fit(
                &sample_x,
                &sample_y,
                self.config.bootstrap_estimators,
                self.config.learning_rate,
                self.config.max_depth,
                self.config.min_samples_leaf,
            ) else {
                continue;
            };

            match elasticity_at(
                &ensemble,
                &base_row,
                frame.mean_price(),
                self.config.derivative_bandwidth,
            ) {
                Ok(value) if value.is_finite() => coefficients.push(value),
                _ => continue,
            }
        }

        // A resample can degenerate (e.g. non-positive predicted demand);
        // tolerate a minority of failures, not a majority.
        if coefficients.len() < (iterations + 1) / 2 {
            return Err(ElasticityError::ModelFit(format!(
                "bootstrap produced only {} usable resamples out of {}",
                coefficients.len(),
                iterations
            )));
        }

        let alpha = (1.0 - self.confidence_level) / 2.0 * 100.0;
        let lower = descriptive::percentile(&coefficients, alpha)?;
        let upper = descriptive::percentile(&coefficients, 100.0 - alpha)?;
        Ok(ConfidenceInterval::new(lower, upper))
    }
}

/// Point elasticity of the fitted surface at the given price.
fn elasticity_at(
    ensemble: &BoostedEnsemble,
    base_row: &[f64],
    price: f64,
    bandwidth: f64,
) -> Result<f64> {
    let step = bandwidth * price;
    if !(step > 0.0) {
        return Err(ElasticityError::ModelFit(format!(
            "derivative step is not positive (bandwidth {}, price {})",
            bandwidth, price
        )));
    }

    let mut at = base_row.to_vec();
    at[0] = price;
    let demand = ensemble.predict_row(&at);
    if !demand.is_finite() || demand <= 0.0 {
        return Err(ElasticityError::ModelFit(format!(
            "predicted demand at the mean price is not positive: {}",
            demand
        )));
    }

    at[0] = price + step;
    let demand_up = ensemble.predict_row(&at);
    at[0] = price - step;
    let demand_down = ensemble.predict_row(&at);

    let slope = (demand_up - demand_down) / (2.0 * step);
    Ok(slope * price / demand)
}
