use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::PredictError;

/// Pre-fitted standard scaler: per-feature affine transform
/// `(x - mean) / scale`, exported from the training run as JSON.
#[derive(Debug, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let scaler = Self { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path)
            .with_context(|| format!("failed to read scaler at {}", path.display()))?;
        let scaler: StandardScaler = serde_json::from_str(&txt)
            .with_context(|| format!("failed to parse scaler JSON at {}", path.display()))?;
        scaler.validate()?;
        Ok(scaler)
    }

    fn validate(&self) -> Result<()> {
        if self.mean.len() != self.scale.len() {
            bail!(
                "scaler mean/scale length mismatch: {} vs {}",
                self.mean.len(),
                self.scale.len()
            );
        }
        if let Some(idx) = self
            .scale
            .iter()
            .position(|s| !s.is_finite() || *s == 0.0)
        {
            bail!("scaler has unusable scale entry at index {}", idx);
        }
        if let Some(idx) = self.mean.iter().position(|m| !m.is_finite()) {
            bail!("scaler has non-finite mean entry at index {}", idx);
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Apply the fitted affine transform to one row.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, PredictError> {
        if features.len() != self.mean.len() {
            return Err(PredictError::Shape {
                got: features.len(),
                expected: self.mean.len(),
            });
        }
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}
