//! # Retail Sales
//!
//! `retail_sales` holds the domain records shared by pricing analytics:
//! historical sale transactions, product cost/price snapshots, and the
//! calendar context (season, holidays, promotions) that demand models feed
//! on. Records are plain immutable value types; collaborating stores hand
//! them out read-only.
//!
//! ## Usage Example
//!
//! ```
//! use chrono::NaiveDate;
//! use retail_sales::{SaleRecord, Season};
//!
//! let sale = SaleRecord::new(
//!     NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
//!     24.99,
//!     180.0,
//! )
//! .with_season(Season::Summer)
//! .with_discount_percent(10.0);
//!
//! assert!(sale.validate().is_ok());
//! assert!((sale.revenue() - 24.99 * 180.0).abs() < 1e-9);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Synthetic history generation
pub mod history;

/// Errors raised when a sale record fails field-level validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("price must be positive, got {0}")]
    InvalidPrice(f64),

    #[error("quantity must be non-negative and finite, got {0}")]
    InvalidQuantity(f64),

    #[error("discount_percent must be within [0, 100], got {0}")]
    InvalidDiscount(f64),

    #[error("competitor_price must be non-negative, got {0}")]
    InvalidCompetitorPrice(f64),

    #[error("unknown season: {0}")]
    UnknownSeason(String),
}

/// Calendar season attached to a sale record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Season for a given date in a northern-hemisphere retail calendar.
    pub fn from_date(date: NaiveDate) -> Self {
        use chrono::Datelike;
        match date.month() {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Season {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" | "fall" => Ok(Season::Autumn),
            "winter" => Ok(Season::Winter),
            other => Err(RecordError::UnknownSeason(other.to_string())),
        }
    }
}

/// One historical sale observation for a product
///
/// The record is immutable once created; demand estimation only ever reads
/// it. `quantity` is a daily aggregate and may legitimately be zero on days
/// the product did not sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Day the sales were aggregated over
    pub date: NaiveDate,
    /// Effective unit price charged that day
    pub price: f64,
    /// Units sold that day
    pub quantity: f64,
    /// Discount applied, as a percentage of list price
    pub discount_percent: f64,
    /// Whether the day was a holiday
    pub is_holiday: bool,
    /// Whether a promotion was running
    pub promotion_active: bool,
    /// Observed competitor price, when available
    pub competitor_price: Option<f64>,
    /// Season of the sale, when known
    pub season: Option<Season>,
}

impl SaleRecord {
    /// Creates a plain record with no discount, holiday, promotion or
    /// competitor context.
    pub fn new(date: NaiveDate, price: f64, quantity: f64) -> Self {
        Self {
            date,
            price,
            quantity,
            discount_percent: 0.0,
            is_holiday: false,
            promotion_active: false,
            competitor_price: None,
            season: None,
        }
    }

    /// Sets the discount percentage.
    pub fn with_discount_percent(mut self, discount_percent: f64) -> Self {
        self.discount_percent = discount_percent;
        self
    }

    /// Marks the day as a holiday.
    pub fn with_holiday(mut self, is_holiday: bool) -> Self {
        self.is_holiday = is_holiday;
        self
    }

    /// Marks a promotion as active.
    pub fn with_promotion(mut self, promotion_active: bool) -> Self {
        self.promotion_active = promotion_active;
        self
    }

    /// Attaches an observed competitor price.
    pub fn with_competitor_price(mut self, competitor_price: f64) -> Self {
        self.competitor_price = Some(competitor_price);
        self
    }

    /// Attaches the season.
    pub fn with_season(mut self, season: Season) -> Self {
        self.season = Some(season);
        self
    }

    /// Revenue generated by this record.
    pub fn revenue(&self) -> f64 {
        self.price * self.quantity
    }

    /// Profit generated by this record at the given unit cost.
    pub fn profit(&self, unit_cost: f64) -> f64 {
        (self.price - unit_cost) * self.quantity
    }

    /// Checks the record's field invariants.
    pub fn validate(&self) -> Result<(), RecordError> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(RecordError::InvalidPrice(self.price));
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(RecordError::InvalidQuantity(self.quantity));
        }
        if !(0.0..=100.0).contains(&self.discount_percent) {
            return Err(RecordError::InvalidDiscount(self.discount_percent));
        }
        if let Some(cp) = self.competitor_price {
            if !cp.is_finite() || cp < 0.0 {
                return Err(RecordError::InvalidCompetitorPrice(cp));
            }
        }
        Ok(())
    }
}

/// Inclusive date range covered by a batch of sale records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether a date falls inside the range, inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Current price and cost snapshot for a product
///
/// This is what the read-only product catalog hands to the pricing engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductPricing {
    /// Price the product currently sells at
    pub current_price: f64,
    /// Unit cost of goods sold
    pub unit_cost: f64,
}

impl ProductPricing {
    pub fn new(current_price: f64, unit_cost: f64) -> Self {
        Self {
            current_price,
            unit_cost,
        }
    }

    /// Gross margin as a fraction of the current price.
    pub fn margin(&self) -> f64 {
        (self.current_price - self.unit_cost) / self.current_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SaleRecord {
        SaleRecord::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), 19.99, 42.0)
    }

    #[test]
    fn valid_record_passes_validation() {
        assert!(record().validate().is_ok());
    }

    #[test]
    fn zero_quantity_is_a_valid_observation() {
        let r = SaleRecord::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), 19.99, 0.0);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let mut r = record();
        r.price = 0.0;
        assert_eq!(r.validate(), Err(RecordError::InvalidPrice(0.0)));
    }

    #[test]
    fn out_of_range_discount_is_rejected() {
        let r = record().with_discount_percent(120.0);
        assert_eq!(r.validate(), Err(RecordError::InvalidDiscount(120.0)));
    }

    #[test]
    fn negative_competitor_price_is_rejected() {
        let r = record().with_competitor_price(-1.0);
        assert!(matches!(
            r.validate(),
            Err(RecordError::InvalidCompetitorPrice(_))
        ));
    }

    #[test]
    fn revenue_and_profit_follow_price_and_cost() {
        let r = record();
        assert!((r.revenue() - 19.99 * 42.0).abs() < 1e-9);
        assert!((r.profit(10.0) - (19.99 - 10.0) * 42.0).abs() < 1e-9);
    }

    #[test]
    fn season_from_date_covers_the_year() {
        let date = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
        assert_eq!(Season::from_date(date(4, 10)), Season::Spring);
        assert_eq!(Season::from_date(date(7, 1)), Season::Summer);
        assert_eq!(Season::from_date(date(10, 31)), Season::Autumn);
        assert_eq!(Season::from_date(date(1, 2)), Season::Winter);
    }

    #[test]
    fn season_round_trips_through_str() {
        assert_eq!("autumn".parse::<Season>().unwrap(), Season::Autumn);
        assert_eq!("fall".parse::<Season>().unwrap(), Season::Autumn);
        assert_eq!(Season::Winter.to_string(), "winter");
        assert!("monsoon".parse::<Season>().is_err());
    }

    #[test]
    fn date_range_is_inclusive() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
    }

    #[test]
    fn margin_is_a_fraction_of_price() {
        let pricing = ProductPricing::new(20.0, 15.0);
        assert!((pricing.margin() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn sale_record_serializes_with_snake_case_season() {
        let r = record().with_season(Season::Spring);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"season\":\"spring\""));
        let back: SaleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
