use rand::{rngs::StdRng, Rng, SeedableRng};

/// Recipe for a test trace: uniform noise with rectangular pulses laid on top.
#[derive(Clone, Debug)]
pub struct SyntheticTrace {
    pub len: usize,
    /// Noise is drawn from `[-noise_amplitude, noise_amplitude)`.
    pub noise_amplitude: f64,
    /// Value held for the whole pulse (negative for inward currents).
    pub pulse_amplitude: f64,
    pub pulse_width: usize,
    pub onsets: Vec<usize>,
}
impl Default for SyntheticTrace {
    fn default() -> Self {
        Self {
            len: 2000,
            noise_amplitude: 50.0,
            pulse_amplitude: -5000.0,
            pulse_width: 5,
            onsets: vec![200, 400, 600, 800, 1000],
        }
    }
}
impl SyntheticTrace {
    /// Same seed, same trace.
    pub fn generate(&self, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut samples: Vec<f64> = (0..self.len)
            .map(|_| {
                if self.noise_amplitude > 0.0 {
                    rng.gen_range(-self.noise_amplitude..self.noise_amplitude)
                } else {
                    0.0
                }
            })
            .collect();
        for &onset in &self.onsets {
            let end = onset.saturating_add(self.pulse_width).min(self.len);
            for sample in samples.iter_mut().take(end).skip(onset) {
                *sample = self.pulse_amplitude;
            }
        }
        samples
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn pulses_and_noise_land_where_asked() {
        let recipe = SyntheticTrace::default();
        let trace = recipe.generate(1);
        assert_eq!(trace.len(), 2000);
        for onset in &recipe.onsets {
            assert!(trace[*onset..*onset + 5].iter().all(|&v| v == -5000.0));
        }
        assert!(trace[0..200].iter().all(|v| v.abs() <= 50.0));
        assert_eq!(trace, recipe.generate(1));
    }
    #[test]
    fn pulses_are_clipped_at_the_end() {
        let recipe = SyntheticTrace {
            len: 10,
            noise_amplitude: 0.0,
            pulse_amplitude: -1.0,
            pulse_width: 5,
            onsets: vec![8, 20],
        };
        let trace = recipe.generate(0);
        assert_eq!(trace[8..], [-1.0, -1.0]);
        assert!(trace[..8].iter().all(|&v| v == 0.0));
    }
}
