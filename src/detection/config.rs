use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detection::DetectionError;

/// Sample interval of the acquisition rig (seconds).
pub const SAMPLE_INTERVAL: f64 = 1e-4;
/// High-pass cutoff that strips slow drift (Hz).
pub const HIGHPASS_CUT_DRIFT: f64 = 70.0;
/// High-pass cutoff that isolates the spike band (Hz).
pub const HIGHPASS_CUT_SPIKES: f64 = 500.0;
/// Minimum spacing between two reported spikes (seconds).
pub const REFRACTORY_PERIOD: f64 = 2e-3;
/// Forward window searched for a rebound after each trough (seconds).
pub const SEARCH_INTERVAL: f64 = 1e-3;
/// Leading samples of the spike band replaced by the mean-centred raw trace.
pub const EDGE_CORRECTION_SAMPLES: usize = 20;

/// What to do when exactly one spike survives classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingleSpikePolicy {
    /// Treat a lone detection as unreliable and report no spikes.
    #[default]
    Discard,
    /// Report the lone detection as-is.
    Keep,
}

/// Tunable constants of the spike detector.
///
/// Durations are in seconds and converted to sample counts through
/// `sample_interval`. Every field has a default, so a JSON file only needs to
/// list the values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub sample_interval: f64,
    pub drift_cutoff_hz: f64,
    pub spike_cutoff_hz: f64,
    pub refractory_period: f64,
    pub search_interval: f64,
    pub edge_correction_samples: usize,
    /// Percentile (0..=100) of the composite amplitudes used to seed the noise centroid.
    pub seed_percentile: f64,
    pub max_iterations: usize,
    /// Required gap between cluster means, in noise standard deviations (sqrt scale).
    pub separation_sigmas: f64,
    pub single_spike_policy: SingleSpikePolicy,
}
impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_interval: SAMPLE_INTERVAL,
            drift_cutoff_hz: HIGHPASS_CUT_DRIFT,
            spike_cutoff_hz: HIGHPASS_CUT_SPIKES,
            refractory_period: REFRACTORY_PERIOD,
            search_interval: SEARCH_INTERVAL,
            edge_correction_samples: EDGE_CORRECTION_SAMPLES,
            seed_percentile: 50.0,
            max_iterations: 10_000,
            separation_sigmas: 4.0,
            single_spike_policy: SingleSpikePolicy::Discard,
        }
    }
}
impl DetectorConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DetectionError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
    pub fn with_sample_interval(mut self, sample_interval: f64) -> Self {
        self.sample_interval = sample_interval;
        self
    }
    pub fn validate(&self) -> Result<(), DetectionError> {
        if !(self.sample_interval.is_finite() && self.sample_interval > 0.0) {
            return Err(DetectionError::InvalidSampleInterval(self.sample_interval));
        }
        for (name, value) in [
            ("drift cutoff", self.drift_cutoff_hz),
            ("spike cutoff", self.spike_cutoff_hz),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(DetectionError::InvalidCutoff { name, value });
            }
        }
        for (name, value) in [
            ("refractory period", self.refractory_period),
            ("search interval", self.search_interval),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(DetectionError::InvalidDuration { name, value });
            }
        }
        if !(0.0..=100.0).contains(&self.seed_percentile) {
            return Err(DetectionError::InvalidPercentile(self.seed_percentile));
        }
        if !(self.separation_sigmas.is_finite() && self.separation_sigmas >= 0.0) {
            return Err(DetectionError::InvalidSeparation(self.separation_sigmas));
        }
        if self.max_iterations == 0 {
            return Err(DetectionError::ZeroIterations);
        }
        Ok(())
    }
    pub fn refractory_samples(&self) -> usize {
        seconds_to_samples(self.refractory_period, self.sample_interval)
    }
    pub fn search_samples(&self) -> usize {
        seconds_to_samples(self.search_interval, self.sample_interval)
    }
}
fn seconds_to_samples(seconds: f64, sample_interval: f64) -> usize {
    (seconds / sample_interval).round() as usize
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    #[test]
    fn defaults_match_rig_constants() {
        let config = DetectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.refractory_samples(), 20);
        assert_eq!(config.search_samples(), 10);
    }
    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"spike_cutoff_hz": 400.0, "single_spike_policy": "keep"}}"#
        )
        .unwrap();
        let config = DetectorConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.spike_cutoff_hz, 400.0);
        assert_eq!(config.single_spike_policy, SingleSpikePolicy::Keep);
        assert_eq!(config.drift_cutoff_hz, HIGHPASS_CUT_DRIFT);
    }
    #[test]
    fn rejects_bad_values() {
        let config = DetectorConfig::default().with_sample_interval(0.0);
        assert!(matches!(
            config.validate(),
            Err(DetectionError::InvalidSampleInterval(_))
        ));
        let config = DetectorConfig {
            seed_percentile: 120.0,
            ..DetectorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DetectionError::InvalidPercentile(_))
        ));
        let config = DetectorConfig {
            max_iterations: 0,
            ..DetectorConfig::default()
        };
        assert!(matches!(config.validate(), Err(DetectionError::ZeroIterations)));
    }
    #[test]
    fn invalid_json_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            DetectorConfig::from_json_file(file.path()),
            Err(DetectionError::Json(_))
        ));
    }
}
