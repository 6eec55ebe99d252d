//! Removal of "peaky" artefacts from whole-cell spike trains.
//!
//! Samples outside `±clip_range` are dropped, a forward-backward exponentially
//! weighted moving average (FBEWMA) is fitted to what remains, samples farther
//! than `delta` from that average are dropped as well, and every gap is
//! bridged by linear interpolation. Leading gaps read as zero; trailing gaps
//! hold the last valid sample.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakFilterParams {
    /// Largest tolerated distance from the FBEWMA.
    pub delta: f64,
    /// Samples beyond `±clip_range` are discarded before smoothing.
    pub clip_range: f64,
    /// EWMA span in samples (`alpha = 2 / (span + 1)`).
    pub span: usize,
}
impl Default for PeakFilterParams {
    fn default() -> Self {
        Self {
            delta: 0.10,
            clip_range: 3000.0,
            span: 10,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FilteredTrace {
    pub raw: Vec<f64>,
    pub filtered: Vec<f64>,
    /// Number of samples replaced by interpolation.
    pub replaced: usize,
}

pub fn filter_peaks(trace: &[f64], params: PeakFilterParams) -> FilteredTrace {
    let clipped = clip(trace, params.clip_range);
    let smooth = ewma_forward_backward(&clipped, params.span);
    let kept: Vec<Option<f64>> = clipped
        .iter()
        .zip(&smooth)
        .map(|(&v, &s)| match (v, s) {
            (Some(v), Some(s)) if (v - s).abs() > params.delta => None,
            (v, _) => v,
        })
        .collect();
    let replaced = kept.iter().filter(|v| v.is_none()).count();
    FilteredTrace {
        raw: trace.to_vec(),
        filtered: interpolate(&kept),
        replaced,
    }
}

fn clip(trace: &[f64], clip_range: f64) -> Vec<Option<f64>> {
    trace
        .iter()
        .map(|&v| (v.is_finite() && v.abs() <= clip_range).then_some(v))
        .collect()
}

/// Mean of the forward and the reversed EWMA. Missing in either direction
/// means missing in the result.
pub fn ewma_forward_backward(data: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let forward = ewma(data.iter().copied(), span);
    let mut backward = ewma(data.iter().rev().copied(), span);
    backward.reverse();
    forward
        .into_iter()
        .zip(backward)
        .map(|(f, b)| Some((f? + b?) / 2.0))
        .collect()
}

/// Bias-corrected EWMA over a series with gaps.
///
/// Gaps keep decaying the weights of older samples but add nothing, so the
/// value right after a gap leans more on the fresh sample.
fn ewma(data: impl Iterator<Item = Option<f64>>, span: usize) -> Vec<Option<f64>> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let decay = 1.0 - alpha;
    let mut weighted_sum = 0.0;
    let mut weight = 0.0;
    data.map(|value| {
        weighted_sum *= decay;
        weight *= decay;
        if let Some(v) = value {
            weighted_sum += v;
            weight += 1.0;
        }
        (weight > 0.0).then(|| weighted_sum / weight)
    })
    .collect()
}

fn interpolate(data: &[Option<f64>]) -> Vec<f64> {
    let mut out = vec![0.0; data.len()];
    let mut previous: Option<(usize, f64)> = None;
    for (i, value) in data.iter().enumerate() {
        let Some(v) = *value else { continue };
        out[i] = v;
        if let Some((j, p)) = previous {
            let span = (i - j) as f64;
            for (k, slot) in out.iter_mut().enumerate().take(i).skip(j + 1) {
                *slot = p + (v - p) * (k - j) as f64 / span;
            }
        }
        previous = Some((i, v));
    }
    if let Some((j, p)) = previous {
        for slot in out.iter_mut().skip(j + 1) {
            *slot = p;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn ewma_matches_adjusted_weights() {
        let out = ewma([Some(1.0), Some(2.0), Some(3.0)].into_iter(), 3);
        // alpha = 0.5: (3 + 2*0.5 + 1*0.25) / (1 + 0.5 + 0.25)
        let expected = 4.25 / 1.75;
        assert!((out[2].unwrap() - expected).abs() < 1e-12);
        assert_eq!(out[0], Some(1.0));
    }
    #[test]
    fn ewma_decays_across_gaps() {
        let out = ewma([Some(2.0), None, Some(4.0)].into_iter(), 3);
        assert_eq!(out[1], Some(2.0));
        // weights 1 for 4.0 and 0.25 for 2.0
        assert!((out[2].unwrap() - 4.5 / 1.25).abs() < 1e-12);
        assert_eq!(ewma([None, Some(1.0)].into_iter(), 3)[0], None);
    }
    #[test]
    fn interpolation_fills_gaps() {
        let filled = interpolate(&[None, Some(1.0), None, None, Some(4.0), None]);
        assert_eq!(filled, vec![0.0, 1.0, 2.0, 3.0, 4.0, 4.0]);
        assert_eq!(interpolate(&[None, None]), vec![0.0, 0.0]);
    }
    #[test]
    fn clipped_spike_is_replaced() {
        let trace = [0.0, 0.0, 0.0, 5000.0, 0.0, 0.0, 0.0];
        let result = filter_peaks(&trace, PeakFilterParams::default());
        assert_eq!(result.raw, trace.to_vec());
        assert_eq!(result.replaced, 1);
        assert!(result.filtered.iter().all(|&v| v == 0.0));
    }
    #[test]
    fn outliers_near_the_average_are_kept() {
        let trace = [1.0, 1.0, 1.05, 1.0, 3.0, 1.0, 1.0];
        let params = PeakFilterParams {
            delta: 0.5,
            ..PeakFilterParams::default()
        };
        let result = filter_peaks(&trace, params);
        assert_eq!(result.filtered[2], 1.05);
        assert!(result.filtered[4] < 3.0);
        assert!(result.replaced >= 1);
    }
}
