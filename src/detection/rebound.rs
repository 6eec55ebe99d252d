use crate::detection::peaks::{find_peaks, Direction, Peak};

/// Rebound amplitude following each trough.
///
/// For a trough at `i` the window `signal[i..=i + window]` (clamped to the end
/// of the signal) is scanned for the first local minimum and the first local
/// maximum after the trough. A deeper minimum means the deflection has not
/// bottomed out yet, so no rebound is credited; otherwise the rebound is the
/// height of the first local maximum, floored at zero. A window without any
/// local maximum also yields zero.
pub fn measure_rebounds(troughs: &[Peak], signal: &[f64], window: usize) -> Vec<f64> {
    troughs
        .iter()
        .map(|trough| rebound_after(trough, signal, window))
        .collect()
}

fn rebound_after(trough: &Peak, signal: &[f64], window: usize) -> f64 {
    if trough.index >= signal.len() {
        return 0.0;
    }
    let end = trough.index.saturating_add(window).min(signal.len() - 1);
    let segment = &signal[trough.index..=end];
    let next_min = find_peaks(segment, Direction::Minima)
        .first()
        .map_or(trough.value, |p| p.value);
    if next_min < trough.value {
        return 0.0;
    }
    find_peaks(segment, Direction::Maxima)
        .first()
        .map_or(0.0, |p| p.value.max(0.0))
}

/// Clustering feature: trough depth plus the rebound that follows it.
pub fn composite_amplitudes(troughs: &[Peak], rebounds: &[f64]) -> Vec<f64> {
    troughs
        .iter()
        .zip(rebounds)
        .map(|(t, r)| t.value.abs() + r)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    fn trough_at(signal: &[f64], index: usize) -> Peak {
        Peak {
            index,
            value: signal[index],
        }
    }
    #[test]
    fn flat_window_scores_lower_than_a_rebound() {
        let mut flat = vec![0.0; 30];
        flat[9] = -50.0;
        flat[10] = -100.0;
        for v in flat.iter_mut().skip(11) {
            *v = -20.0;
        }
        let mut bouncing = flat.clone();
        for v in bouncing.iter_mut().skip(11) {
            *v = 0.0;
        }
        bouncing[12] = 40.0;
        let flat_trough = [trough_at(&flat, 10)];
        let bouncing_trough = [trough_at(&bouncing, 10)];
        let flat_rebound = measure_rebounds(&flat_trough, &flat, 10);
        let bouncing_rebound = measure_rebounds(&bouncing_trough, &bouncing, 10);
        assert_eq!(flat_rebound, vec![0.0]);
        assert_eq!(bouncing_rebound, vec![40.0]);
        let flat_amp = composite_amplitudes(&flat_trough, &flat_rebound);
        let bouncing_amp = composite_amplitudes(&bouncing_trough, &bouncing_rebound);
        assert_eq!(flat_amp, vec![100.0]);
        assert!(flat_amp[0] < bouncing_amp[0]);
    }
    #[test]
    fn deeper_follow_up_minimum_cancels_the_rebound() {
        let signal = [0.0, -10.0, 5.0, -30.0, 2.0, 0.0];
        let rebounds = measure_rebounds(&[trough_at(&signal, 1)], &signal, 4);
        assert_eq!(rebounds, vec![0.0]);
    }
    #[test]
    fn rebound_outside_the_window_is_not_seen() {
        let signal = [0.0, -10.0, -5.0, -2.0, -1.0, 25.0, 0.0];
        assert_eq!(measure_rebounds(&[trough_at(&signal, 1)], &signal, 3), vec![0.0]);
        assert_eq!(measure_rebounds(&[trough_at(&signal, 1)], &signal, 5), vec![25.0]);
    }
    #[test]
    fn negative_rebound_is_floored() {
        let signal = [0.0, -10.0, -4.0, -6.0, -5.0, -7.0, -7.0];
        assert_eq!(measure_rebounds(&[trough_at(&signal, 1)], &signal, 5), vec![0.0]);
    }
    #[test]
    fn window_is_clamped_at_the_end() {
        let signal = [0.0, 3.0, -10.0];
        assert_eq!(measure_rebounds(&[trough_at(&signal, 2)], &signal, 10), vec![0.0]);
    }
}
