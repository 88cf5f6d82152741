//! Snapshot of every estimate for one batch size
//!
//! All values are in base units (seconds, bytes, FLOPs, tokens/s). Conversion
//! to display units is left to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The resource that limits decoding speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bottleneck {
    Compute,
    Memory,
}

impl fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compute => write!(f, "compute-bound"),
            Self::Memory => write!(f, "memory-bound"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateReport {
    pub batch_size: usize,
    pub total_parameters: u64,
    pub flops_per_token: f64,
    pub bytes_per_token: f64,
    pub compute_time: f64,
    pub memory_time: f64,
    pub latency: f64,
    pub throughput: f64,
    pub arithmetic_intensity: f64,
    pub bottleneck: Bottleneck,
}
