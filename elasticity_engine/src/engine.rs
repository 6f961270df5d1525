//! Orchestration of the elasticity calculation pipeline.
//!
//! The pipeline walks a fixed sequence of stages; every transition is a pure
//! call into the corresponding component and no stage is retried. The
//! CPU-bound stages run on the blocking pool so request-serving tasks stay
//! responsive, calculations for the same product are serialized through a
//! keyed lock, and bulk runs isolate per-product failures behind a bounded
//! fan-out.

use crate::cancel::CancelFlag;
use crate::classifier;
use crate::config::EngineConfig;
use crate::error::{ElasticityError, Result};
use crate::models::{self, ModelKind};
use crate::result::ElasticityResult;
use crate::scenario::{DemandBaseline, ScenarioResult};
use crate::store::{ProductProvider, ResultStore, SalesHistoryProvider};
use chrono::{Duration, Utc};
use dashmap::DashMap;
use futures_util::future::join_all;
use pricing_math::descriptive;
use retail_sales::{DateRange, ProductPricing, SaleRecord};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, info_span, warn, Instrument};

/// Stages of one calculation, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationStage {
    CollectingData,
    FeatureBuilding,
    Fitting,
    ExtractingCoefficient,
    Classifying,
    SolvingPrice,
    Persisting,
    Done,
    Failed,
}

impl fmt::Display for CalculationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalculationStage::CollectingData => "collecting_data",
            CalculationStage::FeatureBuilding => "feature_building",
            CalculationStage::Fitting => "fitting",
            CalculationStage::ExtractingCoefficient => "extracting_coefficient",
            CalculationStage::Classifying => "classifying",
            CalculationStage::SolvingPrice => "solving_price",
            CalculationStage::Persisting => "persisting",
            CalculationStage::Done => "done",
            CalculationStage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Per-product failure recorded by a bulk run
#[derive(Debug, Clone, PartialEq)]
pub struct BulkError {
    pub product_id: String,
    pub error: ElasticityError,
}

/// Aggregate outcome of a bulk calculation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkOutcome {
    pub total_calculated: usize,
    pub total_errors: usize,
    pub errors: Vec<BulkError>,
}

/// Orchestrates feature building, model fitting, classification, price
/// optimization and persistence
pub struct ElasticityEngine {
    config: EngineConfig,
    history: Arc<dyn SalesHistoryProvider>,
    products: Arc<dyn ProductProvider>,
    store: Arc<dyn ResultStore>,
    product_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ElasticityEngine {
    pub fn new(
        config: EngineConfig,
        history: Arc<dyn SalesHistoryProvider>,
        products: Arc<dyn ProductProvider>,
        store: Arc<dyn ResultStore>,
    ) -> Self {
        Self {
            config,
            history,
            products,
            store,
            product_locks: DashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn product_lock(&self, product_id: &str) -> Arc<Mutex<()>> {
        self.product_locks
            .entry(product_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Calculates and persists the elasticity of one product.
    pub async fn calculate_elasticity(
        &self,
        product_id: &str,
        model: ModelKind,
        period: Option<DateRange>,
    ) -> Result<ElasticityResult> {
        self.calculate_elasticity_with_cancel(product_id, model, period, CancelFlag::new())
            .await
    }

    /// Same as [`calculate_elasticity`](Self::calculate_elasticity) but
    /// cancellable: the bootstrap checks the flag between refits.
    pub async fn calculate_elasticity_with_cancel(
        &self,
        product_id: &str,
        model: ModelKind,
        period: Option<DateRange>,
        cancel: CancelFlag,
    ) -> Result<ElasticityResult> {
        let span = info_span!("calculate_elasticity", product_id = %product_id, model = %model);
        let outcome = self
            .calculate_inner(product_id, model, period, cancel)
            .instrument(span)
            .await;

        if let Err(ref error) = outcome {
            warn!(
                stage = %CalculationStage::Failed,
                product_id,
                kind = error.kind(),
                %error,
                "elasticity calculation failed"
            );
        }
        outcome
    }

    async fn calculate_inner(
        &self,
        product_id: &str,
        model: ModelKind,
        period: Option<DateRange>,
        cancel: CancelFlag,
    ) -> Result<ElasticityResult> {
        // One in-flight calculation per product; other products proceed in
        // parallel through their own entry in the lock table.
        let lock = self.product_lock(product_id);
        let _serialized = lock.lock().await;

        debug!(stage = %CalculationStage::CollectingData, "loading history and pricing");
        let records = self.history.history(product_id, period)?;
        let pricing = self.products.pricing(product_id)?;

        let config = self.config.clone();
        let pid = product_id.to_string();
        let result = tokio::task::spawn_blocking(move || {
            compute_with_cancel(&config, &pid, model, &records, &pricing, &cancel)
        })
        .await
        .map_err(|e| ElasticityError::ModelFit(format!("calculation worker failed: {}", e)))??;

        debug!(stage = %CalculationStage::Persisting, "committing result");
        self.store.append_elasticity(result.clone())?;

        info!(
            stage = %CalculationStage::Done,
            coefficient = result.coefficient,
            elasticity_type = %result.elasticity_type,
            optimal_price = result.optimal_price,
            "elasticity calculated"
        );
        Ok(result)
    }

    /// Calculates every listed product, isolating failures per product.
    ///
    /// Fan-out is bounded by the configured bulk concurrency; one product's
    /// error never cancels the rest of the batch.
    pub async fn calculate_bulk(&self, product_ids: &[String], model: ModelKind) -> BulkOutcome {
        let limiter = Arc::new(Semaphore::new(self.config.bulk_concurrency.max(1)));

        let tasks = product_ids.iter().map(|product_id| {
            let limiter = Arc::clone(&limiter);
            async move {
                let _permit = limiter.acquire().await.expect("semaphore never closed");
                let outcome = self.calculate_elasticity(product_id, model, None).await;
                (product_id.clone(), outcome)
            }
        });

        let mut bulk = BulkOutcome::default();
        for (product_id, outcome) in join_all(tasks).await {
            match outcome {
                Ok(_) => bulk.total_calculated += 1,
                Err(error) => {
                    warn!(product_id = %product_id, kind = error.kind(), %error, "bulk item failed");
                    bulk.total_errors += 1;
                    bulk.errors.push(BulkError { product_id, error });
                }
            }
        }
        bulk
    }

    /// Projects a hypothetical price change from a stored elasticity result
    /// and persists the scenario.
    pub async fn simulate_scenario(
        &self,
        elasticity: &ElasticityResult,
        new_price: f64,
        simulation_days: u32,
    ) -> Result<ScenarioResult> {
        let baseline = self.demand_baseline(&elasticity.product_id)?;
        let result =
            self.config
                .simulator
                .simulate(elasticity, &baseline, new_price, simulation_days)?;
        self.store.append_scenario(result.clone())?;

        info!(
            product_id = %result.product_id,
            new_price,
            action = %result.recommendation.action,
            risk = ?result.recommendation.risk_level,
            "scenario simulated"
        );
        Ok(result)
    }

    /// Average daily demand over the trailing lookback window, anchored at
    /// the product's most recent record rather than the wall clock.
    fn demand_baseline(&self, product_id: &str) -> Result<DemandBaseline> {
        let pricing = self.products.pricing(product_id)?;
        let records = self.history.history(product_id, None)?;

        let latest = records
            .iter()
            .map(|r| r.date)
            .max()
            .ok_or(ElasticityError::InsufficientData {
                got: 0,
                need: self.config.feature_builder.min_sample_size(),
            })?;
        let window = DateRange::new(
            latest - Duration::days(i64::from(self.config.scenario_lookback_days)),
            latest,
        );

        let quantities: Vec<f64> = records
            .iter()
            .filter(|r| window.contains(r.date))
            .map(|r| r.quantity)
            .collect();
        let need = self.config.feature_builder.min_sample_size();
        if quantities.len() < need {
            return Err(ElasticityError::InsufficientData {
                got: quantities.len(),
                need,
            });
        }

        Ok(DemandBaseline {
            current_price: pricing.current_price,
            unit_cost: pricing.unit_cost,
            average_daily_quantity: descriptive::mean(&quantities)?,
        })
    }
}

/// Runs the full pipeline synchronously, with the history and pricing
/// already in hand. This is the pure core the async engine delegates to.
pub fn compute(
    config: &EngineConfig,
    product_id: &str,
    model: ModelKind,
    records: &[SaleRecord],
    pricing: &ProductPricing,
) -> Result<ElasticityResult> {
    compute_with_cancel(config, product_id, model, records, pricing, &CancelFlag::new())
}

/// Pipeline with a cooperative cancellation flag.
pub fn compute_with_cancel(
    config: &EngineConfig,
    product_id: &str,
    model: ModelKind,
    records: &[SaleRecord],
    pricing: &ProductPricing,
    cancel: &CancelFlag,
) -> Result<ElasticityResult> {
    debug!(
        stage = %CalculationStage::FeatureBuilding,
        records = records.len(),
        "building features"
    );
    let frame = config.feature_builder.build(records)?;

    debug!(
        stage = %CalculationStage::Fitting,
        sample_size = frame.sample_size(),
        dropped = frame.dropped_rows(),
        "fitting demand model"
    );
    let estimate = models::estimate(model, config, &frame, cancel)?;
    debug!(
        stage = %CalculationStage::ExtractingCoefficient,
        coefficient = estimate.coefficient,
        "coefficient extracted"
    );

    let elasticity_type = classifier::classify(estimate.coefficient);
    debug!(stage = %CalculationStage::Classifying, elasticity_type = %elasticity_type, "classified");

    let recommendation = config.price_solver.solve(
        estimate.coefficient,
        pricing,
        frame.mean_quantity(),
        elasticity_type,
    )?;
    debug!(
        stage = %CalculationStage::SolvingPrice,
        optimal_price = recommendation.optimal_price,
        "optimal price solved"
    );

    Ok(ElasticityResult {
        product_id: product_id.to_string(),
        coefficient: estimate.coefficient,
        elasticity_type,
        r_squared: estimate.r_squared,
        sample_size: frame.sample_size(),
        model_kind: model,
        confidence_interval: estimate.confidence_interval,
        calculation_date: Utc::now(),
        period: frame.period(),
        recommended_action: recommendation.action,
        optimal_price: recommendation.optimal_price,
        expected_revenue_change: recommendation.expected_revenue_change,
    })
}
