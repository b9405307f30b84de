use anyhow::{bail, Result};
use std::path::Path;

use crate::error::PredictError;
use crate::features::NUM_FEATURES;
use crate::gbdt::GradientBoostedModel;
use crate::scaler::StandardScaler;

/// The pre-fitted scaler + regression model pair. Loaded once at startup,
/// immutable afterwards; prediction is a pure function of this state and
/// the input vector.
#[derive(Debug)]
pub struct FarePipeline {
    scaler: StandardScaler,
    model: GradientBoostedModel,
}

impl FarePipeline {
    /// Load both artifacts and check they agree with the serving feature
    /// order. Any failure here aborts process start.
    pub fn load(scaler_path: &Path, model_path: &Path) -> Result<Self> {
        let scaler = StandardScaler::from_path(scaler_path)?;
        let model = GradientBoostedModel::from_path(model_path)?;
        Self::from_parts(scaler, model)
    }

    pub fn from_parts(scaler: StandardScaler, model: GradientBoostedModel) -> Result<Self> {
        model.validate()?;
        if scaler.n_features() != NUM_FEATURES {
            bail!(
                "scaler was fitted on {} features, serving expects {}",
                scaler.n_features(),
                NUM_FEATURES
            );
        }
        if model.num_features() != NUM_FEATURES {
            bail!(
                "model was fitted on {} features, serving expects {}",
                model.num_features(),
                NUM_FEATURES
            );
        }
        Ok(Self { scaler, model })
    }

    pub fn num_trees(&self) -> usize {
        self.model.num_trees()
    }

    /// Scale the assembled vector and run the ensemble.
    pub fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        let scaled = self.scaler.transform(features)?;
        Ok(self.model.predict_row(&scaled))
    }
}
