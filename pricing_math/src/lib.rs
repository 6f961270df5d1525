//! # Pricing Math
//!
//! Numerical building blocks for pricing analytics. This crate provides the
//! descriptive statistics and least-squares regression used by demand
//! estimation, kept free of any domain types so it can be reused across
//! pricing tools.

use thiserror::Error;

// Numerical modules
pub mod descriptive;
pub mod regression;

/// Errors that can occur in pricing-related calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for pricing math operations
pub type Result<T> = std::result::Result<T, MathError>;
