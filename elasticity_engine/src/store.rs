//! Collaborator traits and the in-memory versioned result store.
//!
//! The engine only ever reads history and pricing, and only ever appends
//! results. Computed records are versioned rather than updated in place:
//! every append gets a monotonic sequence number and "latest" is a read over
//! the ordered log, which keeps the audit trail and makes concurrent reads
//! trivial.

use crate::error::{ElasticityError, Result};
use crate::result::ElasticityResult;
use crate::scenario::ScenarioResult;
use chrono::{DateTime, Utc};
use retail_sales::{DateRange, ProductPricing, SaleRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Read-only source of historical sale records
pub trait SalesHistoryProvider: Send + Sync {
    /// Records for a product in date order, optionally restricted to a range.
    fn history(&self, product_id: &str, period: Option<DateRange>) -> Result<Vec<SaleRecord>>;
}

/// Read-only source of current product pricing
pub trait ProductProvider: Send + Sync {
    fn pricing(&self, product_id: &str) -> Result<ProductPricing>;
}

/// A stored record with its version metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// Store-wide monotonic sequence number
    pub sequence: u64,
    /// When the record was committed
    pub recorded_at: DateTime<Utc>,
    pub record: T,
}

/// Append-only sink and ordered log of computed results
pub trait ResultStore: Send + Sync {
    /// Commits a calculation result; the whole record or nothing.
    fn append_elasticity(&self, result: ElasticityResult) -> Result<Versioned<ElasticityResult>>;

    /// Commits a scenario projection.
    fn append_scenario(&self, result: ScenarioResult) -> Result<Versioned<ScenarioResult>>;

    /// Most recently appended elasticity for a product, if any.
    fn latest_elasticity(&self, product_id: &str) -> Option<Versioned<ElasticityResult>>;

    /// Full append-order log of elasticities for a product.
    fn elasticity_log(&self, product_id: &str) -> Vec<Versioned<ElasticityResult>>;
}

#[derive(Debug, Default)]
struct StoreInner {
    next_sequence: u64,
    elasticity: HashMap<String, Vec<Versioned<ElasticityResult>>>,
    scenarios: HashMap<String, Vec<Versioned<ScenarioResult>>>,
}

/// In-memory reference implementation of [`ResultStore`]
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full append-order log of scenarios for a product.
    pub fn scenario_log(&self, product_id: &str) -> Vec<Versioned<ScenarioResult>> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.scenarios.get(product_id).cloned())
            .unwrap_or_default()
    }
}

impl ResultStore for InMemoryResultStore {
    fn append_elasticity(&self, result: ElasticityResult) -> Result<Versioned<ElasticityResult>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ElasticityError::Store("result store lock poisoned".to_string()))?;

        inner.next_sequence += 1;
        let versioned = Versioned {
            sequence: inner.next_sequence,
            recorded_at: Utc::now(),
            record: result,
        };
        inner
            .elasticity
            .entry(versioned.record.product_id.clone())
            .or_default()
            .push(versioned.clone());
        Ok(versioned)
    }

    fn append_scenario(&self, result: ScenarioResult) -> Result<Versioned<ScenarioResult>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ElasticityError::Store("result store lock poisoned".to_string()))?;

        inner.next_sequence += 1;
        let versioned = Versioned {
            sequence: inner.next_sequence,
            recorded_at: Utc::now(),
            record: result,
        };
        inner
            .scenarios
            .entry(versioned.record.product_id.clone())
            .or_default()
            .push(versioned.clone());
        Ok(versioned)
    }

    fn latest_elasticity(&self, product_id: &str) -> Option<Versioned<ElasticityResult>> {
        self.inner
            .read()
            .ok()?
            .elasticity
            .get(product_id)?
            .last()
            .cloned()
    }

    fn elasticity_log(&self, product_id: &str) -> Vec<Versioned<ElasticityResult>> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.elasticity.get(product_id).cloned())
            .unwrap_or_default()
    }
}

/// In-memory sales history keyed by product id
#[derive(Debug, Default)]
pub struct InMemorySalesHistory {
    records: RwLock<HashMap<String, Vec<SaleRecord>>>,
}

impl InMemorySalesHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a product's history, kept sorted by date.
    pub fn insert(&self, product_id: impl Into<String>, mut records: Vec<SaleRecord>) {
        records.sort_by_key(|r| r.date);
        self.records
            .write()
            .expect("sales history lock poisoned")
            .insert(product_id.into(), records);
    }
}

impl SalesHistoryProvider for InMemorySalesHistory {
    fn history(&self, product_id: &str, period: Option<DateRange>) -> Result<Vec<SaleRecord>> {
        let map = self
            .records
            .read()
            .map_err(|_| ElasticityError::Store("sales history lock poisoned".to_string()))?;

        let records = map
            .get(product_id)
            .ok_or_else(|| ElasticityError::UnknownProduct(product_id.to_string()))?;

        Ok(match period {
            Some(range) => records
                .iter()
                .filter(|r| range.contains(r.date))
                .cloned()
                .collect(),
            None => records.clone(),
        })
    }
}

/// In-memory product catalog
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<String, ProductPricing>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product_id: impl Into<String>, pricing: ProductPricing) {
        self.products
            .write()
            .expect("catalog lock poisoned")
            .insert(product_id.into(), pricing);
    }
}

impl ProductProvider for InMemoryCatalog {
    fn pricing(&self, product_id: &str) -> Result<ProductPricing> {
        self.products
            .read()
            .map_err(|_| ElasticityError::Store("catalog lock poisoned".to_string()))?
            .get(product_id)
            .copied()
            .ok_or_else(|| ElasticityError::UnknownProduct(product_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ElasticityType;
    use crate::models::ModelKind;
    use crate::result::{ConfidenceInterval, RecommendedAction};
    use chrono::NaiveDate;

    fn result(product_id: &str, coefficient: f64) -> ElasticityResult {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ElasticityResult {
            product_id: product_id.to_string(),
            coefficient,
            elasticity_type: ElasticityType::Elastic,
            r_squared: Some(0.9),
            sample_size: 30,
            model_kind: ModelKind::Linear,
            confidence_interval: ConfidenceInterval::new(coefficient - 0.2, coefficient + 0.2),
            calculation_date: Utc::now(),
            period: DateRange::new(day, day),
            recommended_action: RecommendedAction::DecreasePrice,
            optimal_price: 20.0,
            expected_revenue_change: 0.05,
        }
    }

    #[test]
    fn appends_are_versioned_in_order() {
        let store = InMemoryResultStore::new();
        let first = store.append_elasticity(result("sku-1", -1.5)).unwrap();
        let second = store.append_elasticity(result("sku-1", -1.6)).unwrap();

        assert!(second.sequence > first.sequence);

        let log = store.elasticity_log("sku-1");
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].record.coefficient, -1.5);
        assert_eq!(log[1].record.coefficient, -1.6);
    }

    #[test]
    fn latest_is_the_last_append_not_a_rewrite() {
        let store = InMemoryResultStore::new();
        store.append_elasticity(result("sku-1", -1.5)).unwrap();
        store.append_elasticity(result("sku-1", -1.6)).unwrap();

        let latest = store.latest_elasticity("sku-1").unwrap();
        assert_eq!(latest.record.coefficient, -1.6);
        // The earlier record is still in the log.
        assert_eq!(store.elasticity_log("sku-1").len(), 2);
    }

    #[test]
    fn products_do_not_share_logs() {
        let store = InMemoryResultStore::new();
        store.append_elasticity(result("sku-1", -1.5)).unwrap();

        assert!(store.latest_elasticity("sku-2").is_none());
        assert!(store.elasticity_log("sku-2").is_empty());
    }

    #[test]
    fn history_provider_filters_by_range() {
        let history = InMemorySalesHistory::new();
        let day = |d: u32| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        history.insert(
            "sku-1",
            (1..=10)
                .map(|d| SaleRecord::new(day(d), 10.0, 5.0))
                .collect(),
        );

        let window = DateRange::new(day(3), day(5));
        let records = history.history("sku-1", Some(window)).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| window.contains(r.date)));
    }

    #[test]
    fn unknown_product_is_a_structured_error() {
        let history = InMemorySalesHistory::new();
        assert_eq!(
            history.history("missing", None).unwrap_err().kind(),
            "unknown_product"
        );

        let catalog = InMemoryCatalog::new();
        assert_eq!(
            catalog.pricing("missing").unwrap_err().kind(),
            "unknown_product"
        );
    }
}
