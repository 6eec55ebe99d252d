use std::collections::BTreeSet;

use crate::detection::peaks::{find_peaks, Direction, Peak};

/// Negative-going troughs of `signal` that also show up in its even- or
/// odd-sample decimated view.
///
/// A deflection several samples wide is still a trough after dropping every
/// other sample; a one-sample glitch sitting on the discarded phase is not.
/// The result is sorted by index with values taken from `signal`.
pub fn corroborated_troughs(signal: &[f64]) -> Vec<Peak> {
    let decimated = decimated_trough_indices(signal);
    find_peaks(signal, Direction::Minima)
        .into_iter()
        .filter(|p| p.value < 0.0 && decimated.contains(&p.index))
        .collect()
}

/// Trough indices of the even and odd sub-signals, mapped back to `signal`.
fn decimated_trough_indices(signal: &[f64]) -> BTreeSet<usize> {
    let even: Vec<f64> = signal.iter().copied().step_by(2).collect();
    let odd: Vec<f64> = signal.iter().copied().skip(1).step_by(2).collect();
    let from_even = find_peaks(&even, Direction::Minima)
        .into_iter()
        .map(|p| p.index * 2);
    let from_odd = find_peaks(&odd, Direction::Minima)
        .into_iter()
        .map(|p| p.index * 2 + 1);
    from_even.chain(from_odd).collect()
}
