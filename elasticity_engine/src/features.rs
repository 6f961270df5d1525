//! Feature construction from raw sale records.
//!
//! The builder is a pure transform: it filters unusable records, applies the
//! zero-quantity policy, derives the log columns both demand models feed on,
//! and rejects histories that cannot support an estimate.

use crate::error::{ElasticityError, Result};
use pricing_math::descriptive;
use retail_sales::{DateRange, SaleRecord};

/// How zero-quantity days are treated ahead of the log transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZeroQuantityPolicy {
    /// Drop the record. Reduces the fitted sample size.
    Drop,
    /// Substitute a small positive floor so the day stays in the sample.
    Floor(f64),
}

impl Default for ZeroQuantityPolicy {
    fn default() -> Self {
        ZeroQuantityPolicy::Drop
    }
}

/// One model-ready observation derived from a `SaleRecord`
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub price: f64,
    pub quantity: f64,
    pub log_price: f64,
    pub log_quantity: f64,
    pub discount_percent: f64,
    pub is_holiday: f64,
    pub promotion_active: f64,
    /// Competitor price, falling back to own price when unobserved
    pub competitor_price: f64,
    pub log_competitor_price: f64,
}

/// Feature rows plus the summary statistics the models need
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    rows: Vec<FeatureRow>,
    period: DateRange,
    mean_price: f64,
    mean_quantity: f64,
    dropped_rows: usize,
}

impl FeatureFrame {
    /// Number of rows that will be fitted.
    pub fn sample_size(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Date range actually covered by the usable rows.
    pub fn period(&self) -> DateRange {
        self.period
    }

    /// Mean observed price across usable rows.
    pub fn mean_price(&self) -> f64 {
        self.mean_price
    }

    /// Mean daily quantity across usable rows.
    pub fn mean_quantity(&self) -> f64 {
        self.mean_quantity
    }

    /// Records excluded by validation or the zero-quantity policy.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Design matrix for the log-log linear model: one `log_price` column.
    pub fn log_price_matrix(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(|r| vec![r.log_price]).collect()
    }

    /// Target vector for the log-log linear model.
    pub fn log_quantity_target(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.log_quantity).collect()
    }

    /// Design matrix for the boosted model: raw price plus context features.
    ///
    /// Column 0 is always the price so the numerical derivative knows which
    /// input to perturb.
    pub fn demand_matrix(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .map(|r| {
                vec![
                    r.price,
                    r.discount_percent,
                    r.is_holiday,
                    r.promotion_active,
                    r.competitor_price,
                ]
            })
            .collect()
    }

    /// Target vector for the boosted model.
    pub fn quantity_target(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.quantity).collect()
    }

    /// Column means of the demand matrix, the evaluation point for the
    /// numerical derivative.
    pub fn mean_demand_row(&self) -> Vec<f64> {
        let n = self.rows.len() as f64;
        let mut means = vec![0.0; 5];
        for row in &self.rows {
            means[0] += row.price;
            means[1] += row.discount_percent;
            means[2] += row.is_holiday;
            means[3] += row.promotion_active;
            means[4] += row.competitor_price;
        }
        for value in means.iter_mut() {
            *value /= n;
        }
        means
    }
}

/// Transforms raw transaction records into a model-ready feature frame
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBuilder {
    min_sample_size: usize,
    zero_quantity_policy: ZeroQuantityPolicy,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self {
            min_sample_size: 10,
            zero_quantity_policy: ZeroQuantityPolicy::Drop,
        }
    }
}

impl FeatureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum number of usable rows required for an estimate.
    pub fn with_min_sample_size(mut self, min_sample_size: usize) -> Self {
        self.min_sample_size = min_sample_size;
        self
    }

    /// Sets the policy applied to zero-quantity days.
    pub fn with_zero_quantity_policy(mut self, policy: ZeroQuantityPolicy) -> Self {
        self.zero_quantity_policy = policy;
        self
    }

    pub fn min_sample_size(&self) -> usize {
        self.min_sample_size
    }

    /// Builds the feature frame for one product's ordered history.
    pub fn build(&self, records: &[SaleRecord]) -> Result<FeatureFrame> {
        let mut rows = Vec::with_capacity(records.len());
        let mut first_date = None;
        let mut last_date = None;
        let mut dropped = 0usize;

        for record in records {
            if record.validate().is_err() {
                dropped += 1;
                continue;
            }

            let quantity = if record.quantity > 0.0 {
                record.quantity
            } else {
                match self.zero_quantity_policy {
                    ZeroQuantityPolicy::Floor(floor) if floor > 0.0 => floor,
                    _ => {
                        dropped += 1;
                        continue;
                    }
                }
            };

            let competitor_price = record
                .competitor_price
                .filter(|cp| *cp > 0.0)
                .unwrap_or(record.price);

            rows.push(FeatureRow {
                price: record.price,
                quantity,
                log_price: record.price.ln(),
                log_quantity: quantity.ln(),
                discount_percent: record.discount_percent,
                is_holiday: f64::from(u8::from(record.is_holiday)),
                promotion_active: f64::from(u8::from(record.promotion_active)),
                competitor_price,
                log_competitor_price: competitor_price.ln(),
            });

            first_date = Some(first_date.map_or(record.date, |d: chrono::NaiveDate| d.min(record.date)));
            last_date = Some(last_date.map_or(record.date, |d: chrono::NaiveDate| d.max(record.date)));
        }

        if rows.len() < self.min_sample_size.max(1) {
            return Err(ElasticityError::InsufficientData {
                got: rows.len(),
                need: self.min_sample_size.max(1),
            });
        }

        let prices: Vec<f64> = rows.iter().map(|r| r.price).collect();
        let quantities: Vec<f64> = rows.iter().map(|r| r.quantity).collect();

        if descriptive::variance(&prices)? == 0.0 {
            return Err(ElasticityError::DegenerateData(
                "price never varies across the history".to_string(),
            ));
        }
        if descriptive::variance(&quantities)? == 0.0 {
            return Err(ElasticityError::DegenerateData(
                "quantity never varies across the history".to_string(),
            ));
        }

        Ok(FeatureFrame {
            period: DateRange::new(
                first_date.expect("non-empty rows have a first date"),
                last_date.expect("non-empty rows have a last date"),
            ),
            mean_price: descriptive::mean(&prices)?,
            mean_quantity: descriptive::mean(&quantities)?,
            dropped_rows: dropped,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset as i64)
    }

    fn history(prices_and_quantities: &[(f64, f64)]) -> Vec<SaleRecord> {
        prices_and_quantities
            .iter()
            .enumerate()
            .map(|(i, &(p, q))| SaleRecord::new(day(i as u64), p, q))
            .collect()
    }

    #[test]
    fn short_history_is_rejected() {
        let records = history(&[(10.0, 5.0), (11.0, 4.0), (12.0, 3.0)]);
        let err = FeatureBuilder::new().build(&records).unwrap_err();
        assert_eq!(err, ElasticityError::InsufficientData { got: 3, need: 10 });
    }

    #[test]
    fn constant_price_is_degenerate() {
        let records: Vec<SaleRecord> = (0..12)
            .map(|i| SaleRecord::new(day(i), 10.0, 5.0 + i as f64))
            .collect();
        assert!(matches!(
            FeatureBuilder::new().build(&records).unwrap_err(),
            ElasticityError::DegenerateData(_)
        ));
    }

    #[test]
    fn drop_policy_shrinks_the_sample() {
        let mut pairs: Vec<(f64, f64)> = (0..12).map(|i| (10.0 + i as f64, 20.0 - i as f64)).collect();
        pairs[3].1 = 0.0;
        pairs[7].1 = 0.0;

        let frame = FeatureBuilder::new().build(&history(&pairs)).unwrap();
        assert_eq!(frame.sample_size(), 10);
        assert_eq!(frame.dropped_rows(), 2);
    }

    #[test]
    fn floor_policy_keeps_zero_days() {
        let mut pairs: Vec<(f64, f64)> = (0..12).map(|i| (10.0 + i as f64, 20.0 - i as f64)).collect();
        pairs[3].1 = 0.0;

        let frame = FeatureBuilder::new()
            .with_zero_quantity_policy(ZeroQuantityPolicy::Floor(0.5))
            .build(&history(&pairs))
            .unwrap();
        assert_eq!(frame.sample_size(), 12);
        assert_eq!(frame.dropped_rows(), 0);

        let floored = &frame.rows()[3];
        assert_eq!(floored.quantity, 0.5);
        assert!((floored.log_quantity - 0.5f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn non_positive_floor_falls_back_to_dropping() {
        let mut pairs: Vec<(f64, f64)> = (0..12).map(|i| (10.0 + i as f64, 20.0 - i as f64)).collect();
        pairs[0].1 = 0.0;

        let frame = FeatureBuilder::new()
            .with_zero_quantity_policy(ZeroQuantityPolicy::Floor(0.0))
            .build(&history(&pairs))
            .unwrap();
        assert_eq!(frame.sample_size(), 11);
    }

    #[test]
    fn missing_competitor_price_falls_back_to_own_price() {
        let pairs: Vec<(f64, f64)> = (0..10).map(|i| (10.0 + i as f64, 20.0 - i as f64)).collect();
        let mut records = history(&pairs);
        records[0] = records[0].clone().with_competitor_price(9.0);

        let frame = FeatureBuilder::new().build(&records).unwrap();
        assert_eq!(frame.rows()[0].competitor_price, 9.0);
        assert_eq!(frame.rows()[1].competitor_price, frame.rows()[1].price);
    }

    #[test]
    fn period_and_means_cover_usable_rows_only() {
        let mut pairs: Vec<(f64, f64)> = (0..11).map(|i| (10.0 + i as f64, 30.0 - i as f64)).collect();
        pairs[10].1 = 0.0; // dropped, so the period ends a day earlier

        let frame = FeatureBuilder::new().build(&history(&pairs)).unwrap();
        assert_eq!(frame.period(), DateRange::new(day(0), day(9)));
        assert!((frame.mean_price() - 14.5).abs() < 1e-12);
    }

    #[test]
    fn invalid_records_are_skipped_not_fatal() {
        let mut records: Vec<SaleRecord> = (0..11)
            .map(|i| SaleRecord::new(day(i), 10.0 + i as f64, 20.0 - i as f64))
            .collect();
        records[5].price = -1.0;

        let frame = FeatureBuilder::new().build(&records).unwrap();
        assert_eq!(frame.sample_size(), 10);
        assert_eq!(frame.dropped_rows(), 1);
    }
}
