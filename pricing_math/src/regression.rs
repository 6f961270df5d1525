//! Ordinary least squares regression via the normal equations.
//!
//! Solves `beta = (X'X)^-1 X'y` with an intercept column prepended to the
//! design matrix. The feature count is expected to stay small (a handful of
//! demand covariates), so a dense Gauss-Jordan inverse is used rather than a
//! factorization library.

use crate::{descriptive, MathError, Result};
use serde::{Deserialize, Serialize};

// Pivots smaller than this are treated as a singular design matrix.
const PIVOT_EPSILON: f64 = 1e-12;

/// A fitted least-squares model.
///
/// `coefficients[0]` is the intercept; `coefficients[1..]` line up with the
/// columns of the design matrix passed to [`fit_ols`]. `std_errors` follows
/// the same layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OlsFit {
    /// Intercept followed by one weight per feature column.
    pub coefficients: Vec<f64>,
    /// Standard error of each coefficient.
    pub std_errors: Vec<f64>,
    /// Coefficient of determination of the fit.
    pub r_squared: f64,
    /// Residual degrees of freedom (`n - features - 1`).
    pub residual_df: usize,
}

impl OlsFit {
    /// Predicted target for one feature row.
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut value = self.coefficients[0];
        for (weight, feature) in self.coefficients[1..].iter().zip(row.iter()) {
            value += weight * feature;
        }
        value
    }
}

/// Fits an ordinary least squares regression of `targets` on `rows`.
///
/// Each row is one observation; all rows must have the same number of
/// features. Fails when the system is underdetermined, the design matrix is
/// singular, or the fit produces non-finite weights.
pub fn fit_ols(rows: &[Vec<f64>], targets: &[f64]) -> Result<OlsFit> {
    let n = rows.len();
    if n == 0 || n != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "observations ({}) and targets ({}) must be non-empty and equal",
            n,
            targets.len()
        )));
    }

    let features = rows[0].len();
    if rows.iter().any(|r| r.len() != features) {
        return Err(MathError::InvalidInput(
            "all observations must have the same number of features".to_string(),
        ));
    }

    // One parameter per feature plus the intercept.
    let k = features + 1;
    if n <= k {
        return Err(MathError::InsufficientData(format!(
            "need more than {} observations to fit {} parameters, got {}",
            k, k, n
        )));
    }

    // Accumulate X'X and X'y with the implicit leading column of ones.
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &y) in rows.iter().zip(targets.iter()) {
        for i in 0..k {
            let xi = if i == 0 { 1.0 } else { row[i - 1] };
            xty[i] += xi * y;
            for j in 0..k {
                let xj = if j == 0 { 1.0 } else { row[j - 1] };
                xtx[i][j] += xi * xj;
            }
        }
    }

    let inverse = invert(&xtx)?;

    let mut coefficients = vec![0.0; k];
    for i in 0..k {
        for j in 0..k {
            coefficients[i] += inverse[i][j] * xty[j];
        }
    }
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(MathError::CalculationError(
            "least squares produced non-finite coefficients".to_string(),
        ));
    }

    // Residual and total sums of squares for R² and the error variance.
    let mut rss = 0.0;
    for (row, &y) in rows.iter().zip(targets.iter()) {
        let mut pred = coefficients[0];
        for (weight, feature) in coefficients[1..].iter().zip(row.iter()) {
            pred += weight * feature;
        }
        rss += (y - pred).powi(2);
    }

    let y_mean = descriptive::mean(targets)?;
    let tss = targets.iter().map(|y| (y - y_mean).powi(2)).sum::<f64>();
    if tss <= 0.0 {
        return Err(MathError::InvalidInput(
            "target has zero variance".to_string(),
        ));
    }

    let residual_df = n - k;
    let sigma_sq = rss / residual_df as f64;
    let std_errors: Vec<f64> = (0..k)
        .map(|i| (sigma_sq * inverse[i][i].max(0.0)).sqrt())
        .collect();
    if std_errors.iter().any(|se| !se.is_finite()) {
        return Err(MathError::CalculationError(
            "least squares produced non-finite standard errors".to_string(),
        ));
    }

    Ok(OlsFit {
        coefficients,
        std_errors,
        r_squared: 1.0 - rss / tss,
        residual_df,
    })
}

/// Gauss-Jordan inverse with partial pivoting.
fn invert(matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let k = matrix.len();
    let mut work: Vec<Vec<f64>> = matrix
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut augmented = row.clone();
            augmented.extend((0..k).map(|j| if i == j { 1.0 } else { 0.0 }));
            augmented
        })
        .collect();

    for col in 0..k {
        // Pick the largest remaining pivot to keep the elimination stable.
        let pivot_row = (col..k)
            .max_by(|&a, &b| {
                work[a][col]
                    .abs()
                    .partial_cmp(&work[b][col].abs())
                    .expect("non-comparable pivot")
            })
            .expect("pivot search over non-empty range");

        if work[pivot_row][col].abs() < PIVOT_EPSILON {
            return Err(MathError::CalculationError(
                "singular design matrix (collinear or constant features)".to_string(),
            ));
        }
        work.swap(col, pivot_row);

        let pivot = work[col][col];
        for value in work[col].iter_mut() {
            *value /= pivot;
        }

        for row in 0..k {
            if row == col {
                continue;
            }
            let factor = work[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..2 * k {
                work[row][j] -= factor * work[col][j];
            }
        }
    }

    Ok(work.into_iter().map(|row| row[k..].to_vec()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_line() {
        // y = 2x + 1 with no noise.
        let rows: Vec<Vec<f64>> = (1..=6).map(|x| vec![x as f64]).collect();
        let targets: Vec<f64> = rows.iter().map(|r| 2.0 * r[0] + 1.0).collect();

        let fit = fit_ols(&rows, &targets).unwrap();
        assert!((fit.coefficients[0] - 1.0).abs() < 1e-9);
        assert!((fit.coefficients[1] - 2.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(fit.residual_df, 4);
    }

    #[test]
    fn recovers_two_feature_plane() {
        // y = 3 + 0.5*a - 2*b over a small grid.
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for a in 0..4 {
            for b in 0..4 {
                rows.push(vec![a as f64, b as f64]);
                targets.push(3.0 + 0.5 * a as f64 - 2.0 * b as f64);
            }
        }

        let fit = fit_ols(&rows, &targets).unwrap();
        assert!((fit.coefficients[0] - 3.0).abs() < 1e-9);
        assert!((fit.coefficients[1] - 0.5).abs() < 1e-9);
        assert!((fit.coefficients[2] + 2.0).abs() < 1e-9);
    }

    #[test]
    fn predict_applies_intercept_and_weights() {
        let fit = OlsFit {
            coefficients: vec![1.0, 2.0, -1.0],
            std_errors: vec![0.0, 0.0, 0.0],
            r_squared: 1.0,
            residual_df: 5,
        };
        assert!((fit.predict(&[3.0, 4.0]) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn noisy_fit_reports_positive_standard_errors() {
        // Same line with a fixed alternating perturbation.
        let rows: Vec<Vec<f64>> = (1..=10).map(|x| vec![x as f64]).collect();
        let targets: Vec<f64> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| 2.0 * r[0] + 1.0 + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();

        let fit = fit_ols(&rows, &targets).unwrap();
        assert!(fit.std_errors[1] > 0.0);
        assert!(fit.r_squared > 0.9 && fit.r_squared < 1.0);
    }

    #[test]
    fn rejects_constant_feature() {
        let rows: Vec<Vec<f64>> = (0..8).map(|_| vec![1.5]).collect();
        let targets: Vec<f64> = (0..8).map(|i| i as f64).collect();

        assert!(matches!(
            fit_ols(&rows, &targets),
            Err(MathError::CalculationError(_))
        ));
    }

    #[test]
    fn rejects_underdetermined_system() {
        let rows = vec![vec![1.0, 2.0], vec![2.0, 1.0], vec![3.0, 3.0]];
        let targets = vec![1.0, 2.0, 3.0];

        assert!(matches!(
            fit_ols(&rows, &targets),
            Err(MathError::InsufficientData(_))
        ));
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let rows = vec![vec![1.0], vec![2.0]];
        let targets = vec![1.0];

        assert!(matches!(
            fit_ols(&rows, &targets),
            Err(MathError::InvalidInput(_))
        ));
    }
}
