pub mod model;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::hardware::HardwareProfile;

pub use model::{ModelConfig, MODEL_PRESETS};

/// A model paired with the hardware it is estimated on
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub hardware: HardwareProfile,
}

impl Config {
    pub fn from_presets(model_preset: &str, hardware_preset: &str) -> Result<Self> {
        Ok(Self {
            model: ModelConfig::from_preset(model_preset)?,
            hardware: HardwareProfile::from_preset(hardware_preset)?,
        })
    }

    /// Load a config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Save the config as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_presets() {
        let config = Config::from_presets("gpt2-medium", "v100").unwrap();
        assert_eq!(config.model.n_layers, 24);
        assert_eq!(config.hardware.memory_bandwidth, 900e9);
    }

    #[test]
    fn test_bad_hardware_preset() {
        assert!(Config::from_presets("gpt2-small", "tpu-v9").is_err());
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "model": {"n_layers": 2, "d_model": 64, "n_heads": 4, "d_ff": 256,
                      "vocab_size": 100, "context_length": 16},
            "hardware": {"peak_flops": 1e12, "memory_bandwidth": 1e11, "bytes_per_param": 4}
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.model.d_ff, 256);
        assert_eq!(config.hardware.bytes_per_param, 4.0);
    }
}
