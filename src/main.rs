// src/main.rs
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use spikefinder::detection::{
    filter_peaks, render_spikes_png, PeakFilterParams, PlotStyle, SyntheticTrace,
};
use spikefinder::{DetectorConfig, SingleSpikePolicy, SpikeDetector, Trace};

/// Detect action potentials in a patch-clamp current trace.
#[derive(Debug, Parser)]
#[command(name = "spikefinder", version)]
struct Cli {
    /// Trace file: JSON array or delimited text.
    #[arg(required_unless_present = "demo")]
    trace: Option<PathBuf>,
    /// JSON file with detector settings.
    #[arg(long, env = "SPIKEFINDER_CONFIG")]
    config: Option<PathBuf>,
    /// Sample interval in seconds (overrides the config file).
    #[arg(long)]
    sample_interval: Option<f64>,
    /// Write a PNG of the trace with spike markers.
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Remove clipped and peaky artefacts before detection.
    #[arg(long)]
    despike: bool,
    /// Run on a synthetic five-pulse trace generated from SEED.
    #[arg(long, value_name = "SEED", conflicts_with = "trace")]
    demo: Option<u64>,
    /// Report a lone detected spike instead of discarding it.
    #[arg(long)]
    keep_single_spike: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // 1. 读取配置
    let mut config = match &cli.config {
        Some(path) => DetectorConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DetectorConfig::default(),
    };
    if let Some(dt) = cli.sample_interval {
        config = config.with_sample_interval(dt);
    }
    if cli.keep_single_spike {
        config.single_spike_policy = SingleSpikePolicy::Keep;
    }
    let detector = SpikeDetector::new(config).context("invalid detector settings")?;
    let sample_interval = detector.config().sample_interval;

    // 2. 读取信号
    let (mut trace, label) = match (&cli.trace, cli.demo) {
        (Some(path), _) => (
            Trace::from_file(path, sample_interval)
                .with_context(|| format!("reading trace {}", path.display()))?,
            path.display().to_string(),
        ),
        (None, Some(seed)) => (
            Trace::new(SyntheticTrace::default().generate(seed), sample_interval)?,
            format!("synthetic (seed {seed})"),
        ),
        (None, None) => anyhow::bail!("no trace given"),
    };
    info!(
        "{label}: {} samples, {:.3} s",
        trace.len(),
        trace.duration_seconds()
    );
    if cli.despike {
        let cleaned = filter_peaks(&trace.samples, PeakFilterParams::default());
        info!("despike replaced {} samples", cleaned.replaced);
        trace.samples = cleaned.filtered;
    }

    // 3. 检测
    let detection = detector.detect(&trace.samples)?;
    detection.log_events();

    // 4. 输出
    if let Some(path) = &cli.plot {
        let png = render_spikes_png(&trace.samples, &detection, &label, PlotStyle::default())?;
        fs::write(path, png).with_context(|| format!("writing plot {}", path.display()))?;
        info!("plot written to {}", path.display());
    }
    let summary = detection.summary(sample_interval);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
