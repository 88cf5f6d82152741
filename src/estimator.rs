//! Closed-form inference cost model for decoder-only transformers
//!
//! Every query is a pure function of the [`ModelConfig`] and [`HardwareProfile`]
//! captured at construction. The latency model is a roofline: a token cannot be
//! produced faster than either the compute units or the memory system allow.
//!
//! ```text
//! params   = V·d + L·(4d² + 2·d·d_ff + 2d)
//! flops    = L·(2d² + d² + 2·d·ctx + 2·d_ff·d) + 2·d·V
//! latency  = max(flops·batch / peak_flops, params·bytes / bandwidth)
//! ```

use thiserror::Error;
use tracing::debug;

use crate::config::ModelConfig;
use crate::hardware::HardwareProfile;
use crate::report::{Bottleneck, EstimateReport};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("d_ff should be 4*d_model ({expected}), got {d_ff}")]
    FeedForwardMismatch { d_ff: u64, expected: u64 },

    #[error("d_model ({d_model}) must be divisible by n_heads ({n_heads})")]
    HeadsNotDivisible { d_model: u64, n_heads: u64 },

    #[error("{0} must be greater than zero")]
    ZeroDimension(&'static str),

    #[error("hardware {field} must be finite and positive, got {value}")]
    InvalidHardware { field: &'static str, value: f64 },

    #[error("parameter count overflows a 64-bit integer")]
    ParameterOverflow,
}

/// Analytical estimator for one (model, hardware) pair
#[derive(Debug, Clone, PartialEq)]
pub struct Estimator {
    model: ModelConfig,
    hardware: HardwareProfile,
}

impl Estimator {
    /// Validate the pair and build an estimator.
    ///
    /// Zero-sized dimensions and non-positive or non-finite hardware figures
    /// are rejected here along with the two architectural invariants, so the
    /// query methods never divide by zero.
    pub fn new(model: ModelConfig, hardware: HardwareProfile) -> Result<Self, ConfigurationError> {
        validate_model(&model)?;
        validate_hardware(&hardware)?;

        let estimator = Self { model, hardware };
        debug!(
            n_layers = model.n_layers,
            d_model = model.d_model,
            params = estimator.total_parameters(),
            "estimator ready"
        );
        Ok(estimator)
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    pub fn hardware(&self) -> &HardwareProfile {
        &self.hardware
    }

    /// Total learnable parameters.
    ///
    /// The output head is assumed tied to the input embedding and is not
    /// counted. Biases are not modeled.
    pub fn total_parameters(&self) -> u64 {
        let m = &self.model;
        let embed_params = m.vocab_size * m.d_model;

        let attn_params = 4 * m.d_model * m.d_model;
        let ff_params = 2 * m.d_model * m.d_ff;
        let norm_params = 2 * m.d_model;
        let layer_params = attn_params + ff_params + norm_params;

        embed_params + m.n_layers * layer_params
    }

    /// Floating-point operations to produce one token.
    ///
    /// Normalization, activations and residual adds are ignored.
    pub fn flops_per_token(&self) -> f64 {
        let d_model = self.model.d_model as f64;
        let d_ff = self.model.d_ff as f64;
        let context = self.model.context_length as f64;

        let attn_flops = 2.0 * d_model * d_model // q, k, v
            + d_model * d_model // output projection
            + 2.0 * d_model * context; // scores and weighted sum
        let ff_flops = 2.0 * d_ff * d_model;

        let logits_flops = 2.0 * d_model * self.model.vocab_size as f64;
        self.model.n_layers as f64 * (attn_flops + ff_flops) + logits_flops
    }

    /// Bytes streamed from memory per token, every weight read once.
    pub fn memory_bandwidth_required(&self) -> f64 {
        self.total_parameters() as f64 * self.hardware.bytes_per_param
    }

    /// Compute-bound time for one decoding step of `batch_size` tokens
    pub fn compute_time(&self, batch_size: usize) -> f64 {
        self.flops_per_token() * batch_size as f64 / self.hardware.peak_flops
    }

    /// Memory-bound time for one decoding step.
    ///
    /// Weights are read once and shared by the whole batch, so this does not
    /// depend on batch size.
    pub fn memory_time(&self) -> f64 {
        self.memory_bandwidth_required() / self.hardware.memory_bandwidth
    }

    /// Roofline latency in seconds for one decoding step at `batch_size`
    pub fn latency(&self, batch_size: usize) -> f64 {
        self.compute_time(batch_size).max(self.memory_time())
    }

    /// Tokens per second at `batch_size`
    pub fn throughput(&self, batch_size: usize) -> f64 {
        batch_size as f64 / self.latency(batch_size)
    }

    /// Which roofline term determines [`Self::latency`]. Ties count as memory-bound.
    pub fn bottleneck(&self, batch_size: usize) -> Bottleneck {
        if self.compute_time(batch_size) > self.memory_time() {
            Bottleneck::Compute
        } else {
            Bottleneck::Memory
        }
    }

    /// FLOPs performed per byte of weights moved
    pub fn arithmetic_intensity(&self, batch_size: usize) -> f64 {
        self.flops_per_token() * batch_size as f64 / self.memory_bandwidth_required()
    }

    /// Batch size at which compute time catches up with memory time
    pub fn ridge_batch_size(&self) -> f64 {
        self.memory_time() * self.hardware.peak_flops / self.flops_per_token()
    }

    pub fn report(&self, batch_size: usize) -> EstimateReport {
        EstimateReport {
            batch_size,
            total_parameters: self.total_parameters(),
            flops_per_token: self.flops_per_token(),
            bytes_per_token: self.memory_bandwidth_required(),
            compute_time: self.compute_time(batch_size),
            memory_time: self.memory_time(),
            latency: self.latency(batch_size),
            throughput: self.throughput(batch_size),
            arithmetic_intensity: self.arithmetic_intensity(batch_size),
            bottleneck: self.bottleneck(batch_size),
        }
    }
}

fn validate_model(model: &ModelConfig) -> Result<(), ConfigurationError> {
    let dims = [
        ("n_layers", model.n_layers),
        ("d_model", model.d_model),
        ("n_heads", model.n_heads),
        ("d_ff", model.d_ff),
        ("vocab_size", model.vocab_size),
        ("context_length", model.context_length),
    ];
    if let Some((name, _)) = dims.into_iter().find(|(_, value)| *value == 0) {
        return Err(ConfigurationError::ZeroDimension(name));
    }

    let expected = model
        .d_model
        .checked_mul(4)
        .ok_or(ConfigurationError::ParameterOverflow)?;
    if model.d_ff != expected {
        return Err(ConfigurationError::FeedForwardMismatch {
            d_ff: model.d_ff,
            expected,
        });
    }

    if model.d_model % model.n_heads != 0 {
        return Err(ConfigurationError::HeadsNotDivisible {
            d_model: model.d_model,
            n_heads: model.n_heads,
        });
    }

    checked_parameters(model).ok_or(ConfigurationError::ParameterOverflow)?;
    Ok(())
}

fn validate_hardware(hardware: &HardwareProfile) -> Result<(), ConfigurationError> {
    let fields = [
        ("peak_flops", hardware.peak_flops),
        ("memory_bandwidth", hardware.memory_bandwidth),
        ("bytes_per_param", hardware.bytes_per_param),
    ];
    for (field, value) in fields {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigurationError::InvalidHardware { field, value });
        }
    }
    Ok(())
}

/// Same sum as [`Estimator::total_parameters`], with every step checked.
fn checked_parameters(m: &ModelConfig) -> Option<u64> {
    let embed = m.vocab_size.checked_mul(m.d_model)?;
    let attn = m.d_model.checked_mul(m.d_model)?.checked_mul(4)?;
    let ff = m.d_model.checked_mul(m.d_ff)?.checked_mul(2)?;
    let norm = m.d_model.checked_mul(2)?;
    let layer = attn.checked_add(ff)?.checked_add(norm)?;
    embed.checked_add(m.n_layers.checked_mul(layer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_model() -> ModelConfig {
        ModelConfig {
            n_layers: 2,
            d_model: 8,
            n_heads: 2,
            d_ff: 32,
            vocab_size: 10,
            context_length: 4,
        }
    }

    #[test]
    fn test_tiny_parameter_count() {
        let est = Estimator::new(tiny_model(), HardwareProfile::default()).unwrap();
        // 10*8 + 2*(4*64 + 2*8*32 + 16) = 80 + 2*784
        assert_eq!(est.total_parameters(), 1648);
    }

    #[test]
    fn test_tiny_flops() {
        let est = Estimator::new(tiny_model(), HardwareProfile::default()).unwrap();
        // attn = 128 + 64 + 64, ff = 512, logits = 160
        assert_eq!(est.flops_per_token(), 2.0 * (256.0 + 512.0) + 160.0);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let model = ModelConfig {
            context_length: 0,
            ..tiny_model()
        };
        let err = Estimator::new(model, HardwareProfile::default()).unwrap_err();
        assert_eq!(err, ConfigurationError::ZeroDimension("context_length"));
    }

    #[test]
    fn test_zero_heads_rejected_before_division() {
        let model = ModelConfig {
            n_heads: 0,
            ..tiny_model()
        };
        assert_eq!(
            Estimator::new(model, HardwareProfile::default()).unwrap_err(),
            ConfigurationError::ZeroDimension("n_heads")
        );
    }

    #[test]
    fn test_invalid_hardware_rejected() {
        let hw = HardwareProfile::new(1e12, f64::NAN, 2.0);
        let err = Estimator::new(tiny_model(), hw).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidHardware {
                field: "memory_bandwidth",
                ..
            }
        ));

        let hw = HardwareProfile::new(-1.0, 1e12, 2.0);
        assert!(Estimator::new(tiny_model(), hw).is_err());
    }

    #[test]
    fn test_overflow_rejected() {
        let model = ModelConfig {
            n_layers: u64::MAX / 2,
            ..tiny_model()
        };
        assert_eq!(
            Estimator::new(model, HardwareProfile::default()).unwrap_err(),
            ConfigurationError::ParameterOverflow
        );
    }

    #[test]
    fn test_error_messages() {
        let err = ConfigurationError::FeedForwardMismatch {
            d_ff: 3000,
            expected: 3072,
        };
        assert_eq!(err.to_string(), "d_ff should be 4*d_model (3072), got 3000");
    }

    #[test]
    fn test_ridge_point_switches_bottleneck() {
        let est = Estimator::new(ModelConfig::default(), HardwareProfile::default()).unwrap();
        let ridge = est.ridge_batch_size();
        assert_eq!(est.bottleneck(ridge.floor() as usize), Bottleneck::Memory);
        assert_eq!(est.bottleneck(ridge.ceil() as usize + 1), Bottleneck::Compute);
    }

    #[test]
    fn test_arithmetic_intensity_scales_with_batch() {
        let est = Estimator::new(ModelConfig::default(), HardwareProfile::default()).unwrap();
        let one = est.arithmetic_intensity(1);
        assert!((est.arithmetic_intensity(8) - 8.0 * one).abs() < 1e-9);
    }

    #[test]
    fn test_estimator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Estimator>();
    }
}
