//! CART regression tree used as the boosting weak learner.
//!
//! Splits minimize the summed squared error of the two children; leaves
//! predict the mean of their targets. Depth and leaf-size limits keep the
//! individual trees weak.

use crate::error::{ElasticityError, Result};

// Split must improve the parent's squared error by more than this.
const MIN_SSE_GAIN: f64 = 1e-12;

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Depth-limited regression tree with mean-squared-error splits
#[derive(Debug, Clone)]
pub(crate) struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    /// Fits a tree on the full training set.
    pub(crate) fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        max_depth: usize,
        min_samples_leaf: usize,
    ) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(ElasticityError::ModelFit(
                "tree training set is empty or misaligned".to_string(),
            ));
        }

        let indices: Vec<usize> = (0..x.len()).collect();
        let root = build_node(x, y, &indices, 0, max_depth, min_samples_leaf.max(1));
        Ok(Self { root })
    }

    /// Predicted value for one feature row.
    pub(crate) fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn mean_of(y: &[f64], indices: &[usize]) -> f64 {
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn build_node(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    depth: usize,
    max_depth: usize,
    min_samples_leaf: usize,
) -> Node {
    let value = mean_of(y, indices);
    if depth >= max_depth || indices.len() < 2 * min_samples_leaf {
        return Node::Leaf { value };
    }

    let Some((feature, threshold)) = best_split(x, y, indices, min_samples_leaf) else {
        return Node::Leaf { value };
    };

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x[i][feature] <= threshold);
    if left_indices.is_empty() || right_indices.is_empty() {
        return Node::Leaf { value };
    }

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_node(
            x,
            y,
            &left_indices,
            depth + 1,
            max_depth,
            min_samples_leaf,
        )),
        right: Box::new(build_node(
            x,
            y,
            &right_indices,
            depth + 1,
            max_depth,
            min_samples_leaf,
        )),
    }
}

/// Scans every feature boundary and returns the split with the lowest child
/// squared error, if any split actually improves on the parent.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    min_samples_leaf: usize,
) -> Option<(usize, f64)> {
    let n = indices.len();
    let n_features = x[indices[0]].len();

    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let parent_sse = total_sq - total_sum * total_sum / n as f64;

    let mut best: Option<(usize, f64, f64)> = None;

    for feature in 0..n_features {
        let mut order = indices.to_vec();
        order.sort_by(|&a, &b| {
            x[a][feature]
                .partial_cmp(&x[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for split in 1..n {
            let prev = order[split - 1];
            left_sum += y[prev];
            left_sq += y[prev] * y[prev];

            if split < min_samples_leaf || n - split < min_samples_leaf {
                continue;
            }

            let prev_value = x[prev][feature];
            let next_value = x[order[split]][feature];
            if next_value <= prev_value {
                // No boundary between equal feature values.
                continue;
            }

            let left_n = split as f64;
            let right_n = (n - split) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            let improves = sse + MIN_SSE_GAIN < parent_sse;
            let beats_best = best.map_or(true, |(_, _, b)| sse < b);
            if improves && beats_best {
                best = Some((feature, (prev_value + next_value) / 2.0, sse));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_targets_yield_a_single_leaf() {
        let x: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        let y = vec![3.0; 8];

        let tree = RegressionTree::fit(&x, &y, 3, 1).unwrap();
        assert_eq!(tree.predict_row(&[0.0]), 3.0);
        assert_eq!(tree.predict_row(&[100.0]), 3.0);
    }

    #[test]
    fn step_function_is_learned_exactly() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| if i < 5 { 1.0 } else { 9.0 }).collect();

        let tree = RegressionTree::fit(&x, &y, 2, 1).unwrap();
        assert_eq!(tree.predict_row(&[2.0]), 1.0);
        assert_eq!(tree.predict_row(&[7.0]), 9.0);
    }

    #[test]
    fn depth_zero_predicts_the_mean() {
        let x: Vec<Vec<f64>> = (0..4).map(|i| vec![i as f64]).collect();
        let y = vec![1.0, 2.0, 3.0, 4.0];

        let tree = RegressionTree::fit(&x, &y, 0, 1).unwrap();
        assert!((tree.predict_row(&[0.0]) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn splits_respect_the_leaf_minimum() {
        let x: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64]).collect();
        let y = vec![0.0, 0.0, 0.0, 10.0, 10.0, 10.0];

        // With a leaf minimum of 3 only the middle boundary is legal.
        let tree = RegressionTree::fit(&x, &y, 4, 3).unwrap();
        assert_eq!(tree.predict_row(&[0.0]), 0.0);
        assert_eq!(tree.predict_row(&[5.0]), 10.0);
    }

    #[test]
    fn splits_only_on_informative_features() {
        // Feature 0 is constant noise, feature 1 carries the signal.
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![7.0, i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| if i < 5 { -2.0 } else { 2.0 }).collect();

        let tree = RegressionTree::fit(&x, &y, 2, 1).unwrap();
        assert_eq!(tree.predict_row(&[7.0, 1.0]), -2.0);
        assert_eq!(tree.predict_row(&[7.0, 8.0]), 2.0);
    }

    #[test]
    fn rejects_misaligned_training_set() {
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec![1.0];
        assert!(RegressionTree::fit(&x, &y, 3, 1).is_err());
    }
}
