//! Two-cluster split of composite trough amplitudes into spikes and noise.
//!
//! The split is a one-dimensional two-means seeded at a percentile of the
//! amplitudes and at their maximum, so a large mass of small noise troughs
//! pulls one centroid while the few large spikes hold the other. Whether the
//! upper cluster really is spikes is decided afterwards on a square-root
//! scale: its mean must clear the noise mean by a fixed number of noise
//! standard deviations.

use log::trace;
use serde::Serialize;

use crate::detection::band::population_sd;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cluster {
    Noise,
    Spike,
}

/// Linear-interpolation percentile, `q` in `[0, 100]`.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[derive(Clone, Debug)]
pub struct TwoMeans {
    pub labels: Vec<Cluster>,
    pub noise_centroid: f64,
    pub spike_centroid: f64,
    pub iterations: usize,
}
impl TwoMeans {
    pub fn members(&self, cluster: Cluster) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(move |(_, &label)| label == cluster)
            .map(|(i, _)| i)
    }
    pub fn count(&self, cluster: Cluster) -> usize {
        self.labels.iter().filter(|&&label| label == cluster).count()
    }
}

/// Lloyd iterations for k = 2 over scalar values.
///
/// Ties go to the lower seed. A cluster that loses all its members keeps its
/// previous centroid. The cluster whose final centroid is larger is labelled
/// [`Cluster::Spike`].
pub fn two_means(values: &[f64], seed_percentile: f64, max_iterations: usize) -> Option<TwoMeans> {
    let low_seed = percentile(values, seed_percentile)?;
    let high_seed = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut centroids = [low_seed, high_seed];
    let mut assignment = assign(values, &centroids);
    let mut iterations = 1;
    while iterations < max_iterations.max(1) {
        update(values, &assignment, &mut centroids);
        let next = assign(values, &centroids);
        iterations += 1;
        if next == assignment {
            break;
        }
        assignment = next;
    }
    update(values, &assignment, &mut centroids);
    trace!(
        "two-means settled after {iterations} iterations at {:.3} / {:.3}",
        centroids[0],
        centroids[1]
    );
    let spike = usize::from(centroids[1] >= centroids[0]);
    let labels = assignment
        .iter()
        .map(|&c| if c == spike { Cluster::Spike } else { Cluster::Noise })
        .collect();
    Some(TwoMeans {
        labels,
        noise_centroid: centroids[1 - spike],
        spike_centroid: centroids[spike],
        iterations,
    })
}

fn assign(values: &[f64], centroids: &[f64; 2]) -> Vec<usize> {
    values
        .iter()
        .map(|v| usize::from((v - centroids[1]).abs() < (v - centroids[0]).abs()))
        .collect()
}

fn update(values: &[f64], assignment: &[usize], centroids: &mut [f64; 2]) {
    for (cluster, centroid) in centroids.iter_mut().enumerate() {
        let (sum, n) = values
            .iter()
            .zip(assignment)
            .filter(|(_, &c)| c == cluster)
            .fold((0.0_f64, 0usize), |(sum, n), (v, _)| (sum + v, n + 1));
        if n > 0 {
            *centroid = sum / n as f64;
        }
    }
}

/// Cluster statistics on the square-root scale.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Separation {
    pub spike_mean: f64,
    pub noise_mean: f64,
    pub noise_sd: f64,
    pub required_gap: f64,
    pub passed: bool,
}

/// Accepts the spike cluster only if it sits `sigmas` noise deviations above
/// the noise cluster. Both clusters must be non-empty.
pub fn separation_test(amplitudes: &[f64], clusters: &TwoMeans, sigmas: f64) -> Separation {
    let roots = |cluster: Cluster| -> Vec<f64> {
        clusters
            .members(cluster)
            .map(|i| amplitudes[i].max(0.0).sqrt())
            .collect()
    };
    let spike = roots(Cluster::Spike);
    let noise = roots(Cluster::Noise);
    let mean = |data: &[f64]| data.iter().sum::<f64>() / data.len().max(1) as f64;
    let spike_mean = mean(&spike);
    let noise_mean = mean(&noise);
    let noise_sd = population_sd(&noise);
    let required_gap = sigmas * noise_sd;
    let passed = !spike.is_empty() && !noise.is_empty() && spike_mean >= noise_mean + required_gap;
    Separation {
        spike_mean,
        noise_mean,
        noise_sd,
        required_gap,
        passed,
    }
}

/// Position of the largest noise amplitude (first one on ties).
pub fn loudest_noise(amplitudes: &[f64], clusters: &TwoMeans) -> Option<usize> {
    clusters.members(Cluster::Noise).fold(None, |best, i| match best {
        Some(b) if amplitudes[b] >= amplitudes[i] => Some(b),
        _ => Some(i),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn percentile_interpolates_linearly() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 100.0), Some(4.0));
        assert_eq!(percentile(&values, 50.0), Some(2.5));
        assert_eq!(percentile(&[], 50.0), None);
    }
    #[test]
    fn splits_noise_mass_from_large_outliers() {
        let mut values: Vec<f64> = (0..40).map(|i| 10.0 + (i % 5) as f64).collect();
        values.extend([400.0, 420.0, 390.0]);
        let clusters = two_means(&values, 50.0, 10_000).unwrap();
        assert_eq!(clusters.count(Cluster::Spike), 3);
        assert_eq!(clusters.members(Cluster::Spike).collect::<Vec<_>>(), vec![40, 41, 42]);
        assert!((clusters.spike_centroid - 403.333).abs() < 1e-2);
        assert!((clusters.noise_centroid - 12.0).abs() < 1e-9);
        let sep = separation_test(&values, &clusters, 4.0);
        assert!(sep.passed);
        assert_eq!(loudest_noise(&values, &clusters), Some(4));
    }
    #[test]
    fn overlapping_clusters_fail_the_separation_test() {
        let values: Vec<f64> = (1..=50).map(|i| i as f64).collect();
        let clusters = two_means(&values, 50.0, 10_000).unwrap();
        assert!(clusters.count(Cluster::Spike) > 0);
        assert!(!separation_test(&values, &clusters, 4.0).passed);
    }
    #[test]
    fn identical_values_leave_the_spike_cluster_empty() {
        let values = [7.0; 6];
        let clusters = two_means(&values, 50.0, 100).unwrap();
        assert_eq!(clusters.count(Cluster::Spike), 0);
        assert!(!separation_test(&values, &clusters, 4.0).passed);
        assert_eq!(loudest_noise(&values, &clusters), Some(0));
    }
    #[test]
    fn iteration_cap_is_respected() {
        let values: Vec<f64> = (0..100).map(|i| (i * i) as f64).collect();
        let clusters = two_means(&values, 50.0, 1).unwrap();
        assert_eq!(clusters.iterations, 1);
        assert!(two_means(&[], 50.0, 10).is_none());
    }
}
