use thiserror::Error;

/// Request-scoped failures. Startup failures (missing or corrupt artifacts)
/// are `anyhow` errors propagated out of `main` instead.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Malformed or out-of-range raw input; the request never reaches the pipeline.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Feature vector does not match what the scaler/model were fitted on.
    #[error("feature length mismatch: got {got}, expected {expected}")]
    Shape { got: usize, expected: usize },
}
