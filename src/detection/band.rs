use rustfft::{num_complex::Complex64, FftPlanner};

use crate::detection::DetectorConfig;

/// Spectral index of `cutoff_hz` for a signal of `len` samples.
///
/// Half-way values round to even, so `0.5` maps to bin 0 and `1.5` to bin 2.
pub fn cutoff_index(cutoff_hz: f64, sample_interval: f64, len: usize) -> usize {
    let index = (cutoff_hz * sample_interval * len as f64).round_ties_even();
    if index.is_finite() && index > 0.0 {
        index as usize
    } else {
        0
    }
}

/// Removes every Fourier coefficient above `cutoff_hz` (both halves of the spectrum).
pub fn low_pass(signal: &[f64], cutoff_hz: f64, sample_interval: f64) -> Vec<f64> {
    let len = signal.len();
    let k = cutoff_index(cutoff_hz, sample_interval, len);
    // bins [k, len - k) hold the high frequencies; an empty range keeps everything
    filter_bins(signal, |bin| k > 0 && bin >= k && bin < len.saturating_sub(k))
}

/// Removes every Fourier coefficient below `cutoff_hz`, DC included.
pub fn high_pass(signal: &[f64], cutoff_hz: f64, sample_interval: f64) -> Vec<f64> {
    let len = signal.len();
    let k = cutoff_index(cutoff_hz, sample_interval, len);
    filter_bins(signal, |bin| k > 0 && (bin < k || bin >= len.saturating_sub(k)))
}

fn filter_bins(signal: &[f64], remove: impl Fn(usize) -> bool) -> Vec<f64> {
    let len = signal.len();
    if len == 0 {
        return Vec::new();
    }
    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(len);
    let inverse = planner.plan_fft_inverse(len);
    let mut buffer: Vec<Complex64> = signal.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    forward.process(&mut buffer);
    for (bin, coeff) in buffer.iter_mut().enumerate() {
        if remove(bin) {
            *coeff = Complex64::ZERO;
        }
    }
    inverse.process(&mut buffer);
    let scale = 1.0 / len as f64;
    buffer.iter().map(|c| c.re * scale).collect()
}

/// The two derived signals the detector works on.
#[derive(Clone, Debug)]
pub struct BandSignals {
    /// Drift-removed background, band-limited to the spike band.
    pub background: Vec<f64>,
    /// High-passed trace, sign-normalised so spikes point down.
    pub spike_band: Vec<f64>,
    /// True when `spike_band` was negated during normalisation.
    pub flipped: bool,
}
impl BandSignals {
    pub fn background_sd(&self) -> f64 {
        population_sd(&self.background)
    }
}

pub fn isolate_bands(raw: &[f64], config: &DetectorConfig) -> BandSignals {
    let dt = config.sample_interval;
    let background = low_pass(
        &high_pass(raw, config.drift_cutoff_hz, dt),
        config.spike_cutoff_hz,
        dt,
    );
    let mut spike_band = high_pass(raw, config.spike_cutoff_hz, dt);
    let edge = config.edge_correction_samples.min(raw.len());
    if edge > 0 {
        let head = &raw[..edge];
        let mean = head.iter().sum::<f64>() / edge as f64;
        for (out, &v) in spike_band.iter_mut().zip(head) {
            *out = v - mean;
        }
    }
    let flipped = normalize_polarity(&mut spike_band);
    BandSignals {
        background,
        spike_band,
        flipped,
    }
}

/// Negates `signal` in place when its largest excursion is positive.
pub fn normalize_polarity(signal: &mut [f64]) -> bool {
    let max = signal.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = signal.iter().copied().fold(f64::INFINITY, f64::min);
    if signal.is_empty() || max.abs() <= min.abs() {
        return false;
    }
    for v in signal.iter_mut() {
        *v = -*v;
    }
    true
}

pub(crate) fn population_sd(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mean = data.iter().sum::<f64>() / data.len() as f64;
    let variance = data
        .iter()
        .map(|v| {
            let delta = v - mean;
            delta * delta
        })
        .sum::<f64>()
        / data.len() as f64;
    variance.sqrt()
}
