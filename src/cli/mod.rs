pub mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use llm_roofline::Precision;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "llm-roofline")]
#[command(about = "Roofline estimates for transformer inference", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Which model runs on which hardware
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Model preset name
    #[arg(long, default_value = "gpt2-small")]
    pub model: String,
    /// Hardware preset name
    #[arg(long, default_value = "a100")]
    pub hardware: String,
    /// JSON config file with "model" and "hardware" sections (overrides presets)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Weight precision (fp32, fp16, bf16, int8, int4)
    #[arg(long)]
    pub precision: Option<Precision>,
    /// Override the attention context length
    #[arg(long)]
    pub context_length: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate parameters, FLOPs, latency and throughput
    Estimate {
        #[command(flatten)]
        target: TargetArgs,
        /// Tokens decoded in parallel
        #[arg(long, default_value = "1")]
        batch_size: usize,
        /// Print the raw report as JSON
        #[arg(long)]
        json: bool,
        /// Save the report to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show latency and throughput across power-of-two batch sizes
    Sweep {
        #[command(flatten)]
        target: TargetArgs,
        /// Largest batch size to evaluate
        #[arg(long, default_value = "1024")]
        max_batch_size: usize,
    },
    /// List built-in model and hardware presets
    Presets,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Estimate {
            target,
            batch_size,
            json,
            output,
        } => commands::estimate(&target, batch_size, json, output),
        Commands::Sweep {
            target,
            max_batch_size,
        } => commands::sweep(&target, max_batch_size),
        Commands::Presets => commands::presets(),
    }
}
