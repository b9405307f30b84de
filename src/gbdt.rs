//! Gradient-boosted tree ensemble inference over a JSON model dump.
//!
//! The artifact uses the XGBoost dump layout: per tree, parallel arrays
//! indexed by node, with `left_children[i] == -1` marking a leaf whose value
//! sits in `split_conditions[i]`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Deserialize)]
pub struct Tree {
    split_indices: Vec<u32>,
    split_conditions: Vec<f64>,
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    default_left: Vec<bool>,
}

impl Tree {
    fn num_nodes(&self) -> usize {
        self.left_children.len()
    }

    fn validate(&self, num_features: usize) -> Result<()> {
        let n = self.num_nodes();
        if self.split_indices.len() != n
            || self.split_conditions.len() != n
            || self.right_children.len() != n
            || self.default_left.len() != n
        {
            bail!("tree node arrays have inconsistent lengths");
        }
        if n == 0 {
            bail!("tree has no nodes");
        }
        for idx in 0..n {
            let left = self.left_children[idx];
            let right = self.right_children[idx];
            if !self.split_conditions[idx].is_finite() {
                bail!("node {} has non-finite split condition", idx);
            }
            if (left < 0) != (right < 0) {
                bail!("node {} has only one leaf marker", idx);
            }
            if left >= 0 {
                if left as usize >= n || right as usize >= n {
                    bail!("node {} has child index out of range", idx);
                }
                // Dumps are topologically ordered; children always point
                // forward, which also rules out traversal cycles.
                if left as usize <= idx || right as usize <= idx {
                    bail!("node {} has child index not past the parent", idx);
                }
                if self.split_indices[idx] as usize >= num_features {
                    bail!(
                        "node {} splits on feature {} but model has {} features",
                        idx,
                        self.split_indices[idx],
                        num_features
                    );
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf. Missing values (NaN) follow the
    /// node's default direction.
    fn predict_row(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            let left = self.left_children[idx];
            if left < 0 {
                return self.split_conditions[idx];
            }
            let value = features
                .get(self.split_indices[idx] as usize)
                .copied()
                .unwrap_or(f64::NAN);
            idx = if value.is_nan() {
                if self.default_left[idx] {
                    left as usize
                } else {
                    self.right_children[idx] as usize
                }
            } else if value < self.split_conditions[idx] {
                left as usize
            } else {
                self.right_children[idx] as usize
            };
        }
    }
}

/// Pre-fitted regression ensemble: prediction is `base_score` plus the sum
/// of each tree's leaf value.
#[derive(Debug, Deserialize)]
pub struct GradientBoostedModel {
    base_score: f64,
    num_features: usize,
    trees: Vec<Tree>,
}

impl GradientBoostedModel {
    pub fn from_path(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path)
            .with_context(|| format!("failed to read model at {}", path.display()))?;
        let model: GradientBoostedModel = serde_json::from_str(&txt)
            .with_context(|| format!("failed to parse model JSON at {}", path.display()))?;
        model.validate()?;
        Ok(model)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.base_score.is_finite() {
            bail!("model base_score is not finite");
        }
        if self.num_features == 0 {
            bail!("model declares zero features");
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.num_features)
                .with_context(|| format!("invalid tree {}", tree_idx))?;
        }
        Ok(())
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Deterministic inference for a single row.
    pub fn predict_row(&self, features: &[f64]) -> f64 {
        self.base_score
            + self
                .trees
                .iter()
                .map(|tree| tree.predict_row(features))
                .sum::<f64>()
    }
}
