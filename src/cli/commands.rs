//! CLI command implementations

use anyhow::{Context, Result};
use llm_roofline::config::MODEL_PRESETS;
use llm_roofline::hardware::HARDWARE_PROFILES;
use llm_roofline::{Config, EstimateReport, Estimator};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use super::TargetArgs;

/// Report written by `estimate --output`
#[derive(Serialize)]
struct SavedEstimate<'a> {
    created_at: String,
    config: &'a Config,
    report: &'a EstimateReport,
}

fn resolve_config(target: &TargetArgs) -> Result<Config> {
    let mut config = match &target.config {
        Some(path) => Config::load(path)?,
        None => Config::from_presets(&target.model, &target.hardware)?,
    };

    if let Some(precision) = target.precision {
        config.hardware = config.hardware.with_precision(precision);
    }
    if let Some(context_length) = target.context_length {
        config.model = config.model.with_context_length(context_length);
    }

    Ok(config)
}

fn build_estimator(config: &Config) -> Result<Estimator> {
    Estimator::new(config.model, config.hardware).context("Invalid model configuration")
}

fn target_label(target: &TargetArgs) -> String {
    match &target.config {
        Some(path) => path.display().to_string(),
        None => format!("{} on {}", target.model, target.hardware),
    }
}

pub fn estimate(
    target: &TargetArgs,
    batch_size: usize,
    json: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(batch_size > 0, "Batch size must be at least 1");

    let config = resolve_config(target)?;
    let estimator = build_estimator(&config)?;
    let report = estimator.report(batch_size);
    info!(batch_size, bottleneck = %report.bottleneck, "estimate computed");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&target_label(target), &report);
    }

    if let Some(path) = output {
        let saved = SavedEstimate {
            created_at: chrono::Utc::now().to_rfc3339(),
            config: &config,
            report: &report,
        };
        fs::write(&path, serde_json::to_string_pretty(&saved)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Report saved to {}", path.display());
    }

    Ok(())
}

fn print_report(label: &str, report: &EstimateReport) {
    println!();
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║  {}", label);
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!(
        "  Total Parameters:       {:.1}M",
        report.total_parameters as f64 / 1e6
    );
    println!(
        "  FLOPs per token:        {:.3} GFLOPs",
        report.flops_per_token / 1e9
    );
    println!(
        "  Weights per token:      {:.1} MB",
        report.bytes_per_token / 1e6
    );
    println!("  Compute time:           {:.4}ms", report.compute_time * 1e3);
    println!("  Memory time:            {:.4}ms", report.memory_time * 1e3);
    println!(
        "  Theoretical Latency:    {:.2}ms per step (bs={})",
        report.latency * 1e3,
        report.batch_size
    );
    println!(
        "  Theoretical Throughput: {:.0} tokens/sec",
        report.throughput
    );
    println!(
        "  Arithmetic intensity:   {:.1} FLOPs/byte",
        report.arithmetic_intensity
    );
    println!("  Status:                 {}", report.bottleneck);
    println!();
}

pub fn sweep(target: &TargetArgs, max_batch_size: usize) -> Result<()> {
    anyhow::ensure!(max_batch_size > 0, "Max batch size must be at least 1");

    let config = resolve_config(target)?;
    let estimator = build_estimator(&config)?;

    println!();
    println!("Batch sweep: {}", target_label(target));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "  {:>8}  {:>14}  {:>18}  {}",
        "batch", "latency (ms)", "tokens/sec", "bound"
    );

    let mut batch_size = 1usize;
    while batch_size <= max_batch_size {
        let report = estimator.report(batch_size);
        println!(
            "  {:>8}  {:>14.4}  {:>18.0}  {}",
            batch_size,
            report.latency * 1e3,
            report.throughput,
            report.bottleneck
        );
        batch_size = match batch_size.checked_mul(2) {
            Some(next) => next,
            None => break,
        };
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "  Ridge point: batch size ≈ {:.1} (compute time equals memory time)",
        estimator.ridge_batch_size()
    );
    println!();
    Ok(())
}

pub fn presets() -> Result<()> {
    println!();
    println!("MODEL PRESETS");
    let mut models: Vec<_> = MODEL_PRESETS.iter().collect();
    models.sort_by_key(|(_, m)| (m.n_layers, m.d_model));
    for (name, model) in models {
        println!(
            "  {:<12} layers={:<3} d_model={:<5} heads={:<3} vocab={} ctx={}",
            name, model.n_layers, model.d_model, model.n_heads, model.vocab_size, model.context_length
        );
    }

    println!();
    println!("HARDWARE PRESETS");
    let mut profiles: Vec<_> = HARDWARE_PROFILES.iter().collect();
    profiles.sort_by(|a, b| a.0.cmp(b.0));
    for (name, hw) in profiles {
        println!(
            "  {:<12} {:>7.1} TFLOP/s  {:>6.2} TB/s  {} bytes/param",
            name,
            hw.peak_flops / 1e12,
            hw.memory_bandwidth / 1e12,
            hw.bytes_per_param
        );
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_roofline::Precision;
    use tempfile::TempDir;

    fn preset_target(model: &str, hardware: &str) -> TargetArgs {
        TargetArgs {
            model: model.to_string(),
            hardware: hardware.to_string(),
            config: None,
            precision: None,
            context_length: None,
        }
    }

    #[test]
    fn test_flags_override_presets() {
        let target = TargetArgs {
            precision: Some(Precision::Int8),
            context_length: Some(8192),
            ..preset_target("gpt2-small", "a100")
        };

        let config = resolve_config(&target).unwrap();
        assert_eq!(config.hardware.bytes_per_param, 1.0);
        assert_eq!(config.hardware.peak_flops, 312e12);
        assert_eq!(config.model.context_length, 8192);
        assert_eq!(config.model.d_model, 768);
    }

    #[test]
    fn test_config_file_beats_presets() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        Config::from_presets("gpt2-xl", "h100").unwrap().save(&path).unwrap();

        let target = TargetArgs {
            config: Some(path),
            ..preset_target("gpt2-small", "a100")
        };

        let config = resolve_config(&target).unwrap();
        assert_eq!(config, Config::from_presets("gpt2-xl", "h100").unwrap());
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        Config::default().save(&path).unwrap();

        let target = TargetArgs {
            config: Some(path),
            precision: Some(Precision::Fp32),
            ..preset_target("gpt2-small", "a100")
        };

        let config = resolve_config(&target).unwrap();
        assert_eq!(config.hardware.bytes_per_param, 4.0);
    }

    #[test]
    fn test_unknown_preset_is_an_error() {
        assert!(resolve_config(&preset_target("gpt2-small", "abacus")).is_err());
    }

    #[test]
    fn test_zero_batch_sizes_rejected() {
        let target = preset_target("gpt2-small", "a100");
        assert!(estimate(&target, 0, false, None).is_err());
        assert!(sweep(&target, 0).is_err());
    }

    #[test]
    fn test_invalid_config_file_rejected_by_estimator() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        let mut config = Config::default();
        config.model.d_ff = 3000;
        config.save(&path).unwrap();

        let target = TargetArgs {
            config: Some(path),
            ..preset_target("gpt2-small", "a100")
        };
        let err = estimate(&target, 1, false, None).unwrap_err();
        assert!(err.to_string().contains("Invalid model configuration"));
    }

    #[test]
    fn test_estimate_writes_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");

        let target = preset_target("gpt2-small", "a100");
        estimate(&target, 4, true, Some(path.clone())).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(json["created_at"].as_str().is_some_and(|s| !s.is_empty()));
        assert_eq!(json["config"]["model"]["d_model"], 768);
        assert_eq!(json["report"]["total_parameters"], 123_550_464u64);
        assert_eq!(json["report"]["batch_size"], 4);
    }
}
