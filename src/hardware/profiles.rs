//! Accelerator profiles and numeric precisions

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Peak throughput and bandwidth of a device at a given numeric precision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HardwareProfile {
    /// Sustained floating-point operations per second
    pub peak_flops: f64,
    /// Bytes per second between memory and compute
    pub memory_bandwidth: f64,
    /// Bytes used to store one parameter
    pub bytes_per_param: f64,
}

impl Default for HardwareProfile {
    fn default() -> Self {
        // A100, FP16
        Self {
            peak_flops: 312e12,
            memory_bandwidth: 1.5e12,
            bytes_per_param: 2.0,
        }
    }
}

impl HardwareProfile {
    pub fn new(peak_flops: f64, memory_bandwidth: f64, bytes_per_param: f64) -> Self {
        Self {
            peak_flops,
            memory_bandwidth,
            bytes_per_param,
        }
    }

    /// Store weights at a different precision. Peak FLOP/s is left alone.
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.bytes_per_param = precision.bytes_per_param();
        self
    }

    pub fn from_preset(preset: &str) -> anyhow::Result<Self> {
        HARDWARE_PROFILES.get(preset).copied().ok_or_else(|| {
            let mut names: Vec<_> = HARDWARE_PROFILES.keys().collect();
            names.sort();
            anyhow::anyhow!("Unknown hardware preset: {}. Available: {:?}", preset, names)
        })
    }
}

/// Numeric format used to store weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Fp32,
    Fp16,
    Bf16,
    Int8,
    Int4,
}

impl Precision {
    pub fn bytes_per_param(&self) -> f64 {
        match self {
            Self::Fp32 => 4.0,
            Self::Fp16 | Self::Bf16 => 2.0,
            Self::Int8 => 1.0,
            Self::Int4 => 0.5,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fp32 => "fp32",
            Self::Fp16 => "fp16",
            Self::Bf16 => "bf16",
            Self::Int8 => "int8",
            Self::Int4 => "int4",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fp32" | "f32" | "float32" => Ok(Self::Fp32),
            "fp16" | "f16" | "half" => Ok(Self::Fp16),
            "bf16" | "bfloat16" => Ok(Self::Bf16),
            "int8" | "i8" => Ok(Self::Int8),
            "int4" | "i4" => Ok(Self::Int4),
            other => Err(format!(
                "unknown precision '{}' (expected fp32, fp16, bf16, int8 or int4)",
                other
            )),
        }
    }
}

/// Dense FP16/BF16 tensor throughput and HBM/GDDR bandwidth, 2 bytes per param
pub static HARDWARE_PROFILES: Lazy<HashMap<String, HardwareProfile>> = Lazy::new(|| {
    let mut profiles = HashMap::new();

    profiles.insert("a100".to_string(), HardwareProfile::default());
    profiles.insert("h100".to_string(), HardwareProfile::new(989e12, 3.35e12, 2.0));
    profiles.insert("v100".to_string(), HardwareProfile::new(125e12, 900e9, 2.0));
    profiles.insert("rtx4090".to_string(), HardwareProfile::new(165e12, 1.008e12, 2.0));
    profiles.insert("l4".to_string(), HardwareProfile::new(121e12, 300e9, 2.0));

    profiles
});
