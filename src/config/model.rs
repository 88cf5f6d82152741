use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Architectural hyperparameters of a decoder-only transformer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Number of transformer blocks
    pub n_layers: u64,
    /// Hidden / embedding dimension
    pub d_model: u64,
    /// Number of attention heads
    pub n_heads: u64,
    /// Feed-forward inner dimension
    pub d_ff: u64,
    /// Token vocabulary size
    pub vocab_size: u64,
    /// Sequence length used for the attention cost
    pub context_length: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_layers: 12,
            d_model: 768,
            n_heads: 12,
            d_ff: 3072,
            vocab_size: 50257,
            context_length: 2048,
        }
    }
}

impl ModelConfig {
    pub fn with_context_length(mut self, context_length: u64) -> Self {
        self.context_length = context_length;
        self
    }

    pub fn from_preset(preset: &str) -> anyhow::Result<Self> {
        MODEL_PRESETS.get(preset).copied().ok_or_else(|| {
            let mut names: Vec<_> = MODEL_PRESETS.keys().collect();
            names.sort();
            anyhow::anyhow!("Unknown model preset: {}. Available: {:?}", preset, names)
        })
    }
}

/// GPT-2 family shapes, all with a 2048-token context
pub static MODEL_PRESETS: Lazy<HashMap<String, ModelConfig>> = Lazy::new(|| {
    let mut models = HashMap::new();

    models.insert("gpt2-small".to_string(), ModelConfig::default());

    models.insert(
        "gpt2-medium".to_string(),
        ModelConfig {
            n_layers: 24,
            d_model: 1024,
            n_heads: 16,
            d_ff: 4096,
            ..ModelConfig::default()
        },
    );

    models.insert(
        "gpt2-large".to_string(),
        ModelConfig {
            n_layers: 36,
            d_model: 1280,
            n_heads: 20,
            d_ff: 5120,
            ..ModelConfig::default()
        },
    );

    models.insert(
        "gpt2-xl".to_string(),
        ModelConfig {
            n_layers: 48,
            d_model: 1600,
            n_heads: 25,
            d_ff: 6400,
            ..ModelConfig::default()
        },
    );

    models
});
