//! Analytical inference estimates for decoder-only transformers
//!
//! Predicts parameter count, FLOPs per token, memory traffic and roofline
//! latency/throughput from a model's hyperparameters and an accelerator's
//! peak specifications. Nothing is executed or measured.
//!
//! ## Main Components
//!
//! - `estimator`: the closed-form cost model
//! - `config`: model shapes, presets and JSON config files
//! - `hardware`: accelerator profiles and numeric precisions
//! - `report`: serializable snapshot of a full estimate

pub mod config;
pub mod estimator;
pub mod hardware;
pub mod report;

pub use config::{Config, ModelConfig};
pub use estimator::{ConfigurationError, Estimator};
pub use hardware::{HardwareProfile, Precision};
pub use report::{Bottleneck, EstimateReport};

/// Library errors
pub use anyhow::{Error, Result};
