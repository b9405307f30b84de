//! Core of the taxi fare prediction service: feature assembly and the
//! pre-fitted scaler + gradient-boosted tree pipeline. The HTTP boundary
//! lives in the binary.

pub mod error;
pub mod features;
pub mod gbdt;
pub mod pipeline;
pub mod scaler;
