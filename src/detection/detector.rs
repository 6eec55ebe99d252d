use log::{debug, info, warn};
use serde::Serialize;

use crate::detection::band::isolate_bands;
use crate::detection::classify::{loudest_noise, separation_test, two_means, Cluster, Separation};
use crate::detection::decimation::corroborated_troughs;
use crate::detection::rebound::{composite_amplitudes, measure_rebounds};
use crate::detection::{DetectionError, DetectorConfig, SingleSpikePolicy};

/// Notable outcomes of a detection run, handed back to the caller to log.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DetectionEvent {
    NoSpikesDetected,
    /// Accepted spikes whose amplitude does not exceed the loudest noise trough.
    OverlappingNoiseTail { spikes: usize },
    /// Spikes dropped for falling inside the refractory period of an earlier one.
    RefractoryMerged { dropped: usize },
    /// A lone spike discarded by [`SingleSpikePolicy::Discard`].
    SingleSpikeDiscarded { index: usize },
}

/// Intermediate numbers kept for inspection.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Diagnostics {
    pub flipped: bool,
    pub background_noise_sd: f64,
    pub corroborated_troughs: usize,
    pub spike_centroid: Option<f64>,
    pub noise_centroid: Option<f64>,
    pub iterations: usize,
    pub separation: Option<Separation>,
}

/// Result of running the detector over one trace.
#[derive(Clone, Debug, Default)]
pub struct Detection {
    /// Ascending sample indices of accepted spikes; `None` when nothing was found.
    pub spikes: Option<Vec<usize>>,
    /// Sample index of the largest trough classified as noise.
    pub violation: Option<usize>,
    pub events: Vec<DetectionEvent>,
    pub diagnostics: Diagnostics,
}
impl Detection {
    pub fn spike_count(&self) -> usize {
        self.spikes.as_ref().map_or(0, Vec::len)
    }
    /// Spike times in seconds.
    pub fn spike_times(&self, sample_interval: f64) -> Vec<f64> {
        self.spikes
            .iter()
            .flatten()
            .map(|&i| i as f64 * sample_interval)
            .collect()
    }
    /// Forwards the events to the `log` facade.
    pub fn log_events(&self) {
        for event in &self.events {
            match event {
                DetectionEvent::NoSpikesDetected => info!("No spikes detected."),
                DetectionEvent::OverlappingNoiseTail { spikes } => {
                    warn!("{spikes} spike amplitudes overlapping tail of noise distribution.")
                }
                DetectionEvent::RefractoryMerged { dropped } => {
                    debug!("{dropped} troughs fell inside the refractory period")
                }
                DetectionEvent::SingleSpikeDiscarded { index } => {
                    info!("Discarded lone spike at sample {index}.")
                }
            }
        }
    }
    pub fn summary(&self, sample_interval: f64) -> DetectionSummary {
        DetectionSummary {
            spike_count: self.spike_count(),
            spikes: self.spikes.clone(),
            spike_times: self.spike_times(sample_interval),
            violation: self.violation,
            events: self.events.clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }
    fn none(diagnostics: Diagnostics, mut events: Vec<DetectionEvent>) -> Self {
        events.push(DetectionEvent::NoSpikesDetected);
        Self {
            spikes: None,
            violation: None,
            events,
            diagnostics,
        }
    }
}

/// Serializable report of one detection run.
#[derive(Clone, Debug, Serialize)]
pub struct DetectionSummary {
    pub spike_count: usize,
    pub spikes: Option<Vec<usize>>,
    pub spike_times: Vec<f64>,
    pub violation: Option<usize>,
    pub events: Vec<DetectionEvent>,
    pub diagnostics: Diagnostics,
}

/// Stateless spike detector.
#[derive(Clone, Debug, Default)]
pub struct SpikeDetector {
    config: DetectorConfig,
}
impl SpikeDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, DetectionError> {
        config.validate()?;
        Ok(Self { config })
    }
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
    /// Runs the full pipeline over `trace`.
    ///
    /// Fails only on non-finite samples; every degenerate trace (empty, flat,
    /// too few troughs, clusters too close) comes back as a detection with no
    /// spikes.
    pub fn detect(&self, trace: &[f64]) -> Result<Detection, DetectionError> {
        if let Some((index, &value)) = trace.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(DetectionError::NonFiniteSample { index, value });
        }
        Ok(self.run(trace))
    }
    fn run(&self, trace: &[f64]) -> Detection {
        let config = &self.config;
        let mut diagnostics = Diagnostics::default();
        let mut events = Vec::new();
        if trace.len() < 3 {
            return Detection::none(diagnostics, events);
        }
        let bands = isolate_bands(trace, config);
        diagnostics.flipped = bands.flipped;
        diagnostics.background_noise_sd = bands.background_sd();
        let signal = &bands.spike_band;

        let troughs = corroborated_troughs(signal);
        diagnostics.corroborated_troughs = troughs.len();
        debug!("{} corroborated troughs", troughs.len());
        let raw_max = trace.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let raw_min = trace.iter().copied().fold(f64::INFINITY, f64::min);
        if troughs.is_empty() || raw_max <= raw_min {
            return Detection::none(diagnostics, events);
        }

        let rebounds = measure_rebounds(&troughs, signal, config.search_samples());
        let amplitudes = composite_amplitudes(&troughs, &rebounds);
        let Some(clusters) = two_means(&amplitudes, config.seed_percentile, config.max_iterations)
        else {
            return Detection::none(diagnostics, events);
        };
        diagnostics.spike_centroid = Some(clusters.spike_centroid);
        diagnostics.noise_centroid = Some(clusters.noise_centroid);
        diagnostics.iterations = clusters.iterations;
        let separation = separation_test(&amplitudes, &clusters, config.separation_sigmas);
        diagnostics.separation = Some(separation);
        debug!(
            "spike cluster sqrt-mean {:.3}, noise {:.3} +/- {:.3}",
            separation.spike_mean, separation.noise_mean, separation.noise_sd
        );
        if !separation.passed {
            return Detection::none(diagnostics, events);
        }
        let Some(loudest) = loudest_noise(&amplitudes, &clusters) else {
            return Detection::none(diagnostics, events);
        };

        let overlapping = clusters
            .members(Cluster::Spike)
            .filter(|&i| amplitudes[i] <= amplitudes[loudest])
            .count();
        if overlapping > 0 {
            events.push(DetectionEvent::OverlappingNoiseTail {
                spikes: overlapping,
            });
        }

        let candidates: Vec<usize> = clusters
            .members(Cluster::Spike)
            .map(|i| troughs[i].index)
            .collect();
        let spikes = enforce_refractory(&candidates, config.refractory_samples());
        if spikes.len() < candidates.len() {
            events.push(DetectionEvent::RefractoryMerged {
                dropped: candidates.len() - spikes.len(),
            });
        }
        if spikes.len() == 1 && config.single_spike_policy == SingleSpikePolicy::Discard {
            events.push(DetectionEvent::SingleSpikeDiscarded { index: spikes[0] });
            return Detection::none(diagnostics, events);
        }
        if spikes.is_empty() {
            return Detection::none(diagnostics, events);
        }
        Detection {
            spikes: Some(spikes),
            violation: Some(troughs[loudest].index),
            events,
            diagnostics,
        }
    }
}

/// Keeps the first spike of every run closer together than `refractory` samples.
fn enforce_refractory(candidates: &[usize], refractory: usize) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(candidates.len());
    for &index in candidates {
        match kept.last() {
            Some(&last) if index - last < refractory => {}
            _ => kept.push(index),
        }
    }
    kept
}

/// Runs the detector with the default rig constants.
///
/// Non-finite samples are treated like any other degenerate input and give no
/// spikes; use [`SpikeDetector::detect`] to have them reported as errors.
pub fn detect_spikes(trace: &[f64]) -> Detection {
    SpikeDetector::default()
        .detect(trace)
        .unwrap_or_else(|_| Detection::none(Diagnostics::default(), Vec::new()))
}
