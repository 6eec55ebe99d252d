//! Spike detection for patch-clamp current traces.
//!
//! [`detect_spikes`] turns one raw trace into ascending spike sample indices
//! plus the index of the loudest trough that was classified as noise.
pub mod detection;

pub use detection::{
    detect_spikes, Detection, DetectionError, DetectionEvent, DetectorConfig, SingleSpikePolicy,
    SpikeDetector, Trace,
};
