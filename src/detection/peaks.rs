/// Which kind of extremum to extract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Maxima,
    Minima,
}
/// A local extremum of a signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    pub index: usize,
    pub value: f64,
}
/// Locates local extrema by watching the sign of the slope flip.
///
/// A sample counts as rising when the next one is strictly larger. A minimum is
/// reported where the slope turns from not-rising to rising, a maximum where it
/// turns from rising to not-rising. A flat bottom reports its last sample and a
/// flat top its first. Signals shorter than three samples have no extrema.
pub fn find_peaks(signal: &[f64], direction: Direction) -> Vec<Peak> {
    if signal.len() < 3 {
        return Vec::new();
    }
    let rising: Vec<i8> = signal.windows(2).map(|w| i8::from(w[1] > w[0])).collect();
    rising
        .windows(2)
        .enumerate()
        .filter(|(_, w)| {
            let turn = w[1] - w[0];
            match direction {
                Direction::Minima => turn > 0,
                Direction::Maxima => turn < 0,
            }
        })
        .map(|(i, _)| Peak {
            index: i + 1,
            value: signal[i + 1],
        })
        .collect()
}
#[cfg(test)]
mod tests {
    use super::*;
    fn indices(peaks: &[Peak]) -> Vec<usize> {
        peaks.iter().map(|p| p.index).collect()
    }
    #[test]
    fn finds_minima_and_maxima() {
        let signal = [0.0, -3.0, 1.0, 4.0, 2.0, -1.0, 0.5];
        let minima = find_peaks(&signal, Direction::Minima);
        assert_eq!(indices(&minima), vec![1, 5]);
        assert_eq!(minima[0].value, -3.0);
        assert_eq!(indices(&find_peaks(&signal, Direction::Maxima)), vec![3]);
    }
    #[test]
    fn plateaus_report_the_sample_next_to_the_rise() {
        let signal = [5.0, 3.0, 3.0, 3.0, 4.0];
        assert_eq!(indices(&find_peaks(&signal, Direction::Minima)), vec![3]);
        let signal = [0.0, 2.0, 2.0, 1.0];
        assert_eq!(indices(&find_peaks(&signal, Direction::Maxima)), vec![1]);
    }
    #[test]
    fn endpoints_and_short_inputs_are_never_peaks() {
        assert!(find_peaks(&[1.0, 0.0], Direction::Minima).is_empty());
        assert!(find_peaks(&[], Direction::Maxima).is_empty());
        let ramp = [4.0, 3.0, 2.0, 1.0];
        assert!(find_peaks(&ramp, Direction::Minima).is_empty());
        assert!(find_peaks(&ramp, Direction::Maxima).is_empty());
    }
}
