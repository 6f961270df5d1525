//! Descriptive statistics over `f64` samples.

use crate::{MathError, Result};

/// Arithmetic mean of a sample.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "mean requires at least one value".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance of a sample.
pub fn variance(values: &[f64]) -> Result<f64> {
    let m = mean(values)?;
    let sum_sq = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();

    Ok(sum_sq / values.len() as f64)
}

/// Population standard deviation of a sample.
pub fn std_dev(values: &[f64]) -> Result<f64> {
    Ok(variance(values)?.sqrt())
}

/// Percentile of a sample using linear interpolation between closest ranks.
///
/// `pct` is expressed on the 0..=100 scale, so `percentile(values, 50.0)`
/// is the median.
pub fn percentile(values: &[f64], pct: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "percentile requires at least one value".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&pct) || !pct.is_finite() {
        return Err(MathError::InvalidInput(format!(
            "percentile must be within [0, 100], got {}",
            pct
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("non-comparable sample value"));

    if sorted.len() == 1 {
        return Ok(sorted[0]);
    }

    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let fraction = rank - lower as f64;

    if lower + 1 >= sorted.len() {
        return Ok(sorted[sorted.len() - 1]);
    }

    Ok(sorted[lower] + fraction * (sorted[lower + 1] - sorted[lower]))
}

/// Pearson correlation between two equally sized samples.
pub fn correlation(xs: &[f64], ys: &[f64]) -> Result<f64> {
    if xs.len() != ys.len() {
        return Err(MathError::InvalidInput(format!(
            "samples must have equal length ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < 2 {
        return Err(MathError::InsufficientData(
            "correlation requires at least two observations".to_string(),
        ));
    }

    let mx = mean(xs)?;
    let my = mean(ys)?;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        cov += (x - mx) * (y - my);
        var_x += (x - mx).powi(2);
        var_y += (y - my).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return Err(MathError::CalculationError(
            "correlation undefined for a zero-variance sample".to_string(),
        ));
    }

    Ok(cov / (var_x.sqrt() * var_y.sqrt()))
}
