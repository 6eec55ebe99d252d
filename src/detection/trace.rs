use std::fs;
use std::path::Path;

use crate::detection::DetectionError;

/// One recorded current trace.
#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    pub samples: Vec<f64>,
    pub sample_interval: f64,
}
impl Trace {
    pub fn new(samples: Vec<f64>, sample_interval: f64) -> Result<Self, DetectionError> {
        let trace = Self {
            samples,
            sample_interval,
        };
        trace.validate()?;
        Ok(trace)
    }
    pub fn validate(&self) -> Result<(), DetectionError> {
        if !(self.sample_interval.is_finite() && self.sample_interval > 0.0) {
            return Err(DetectionError::InvalidSampleInterval(self.sample_interval));
        }
        if let Some((index, &value)) = self
            .samples
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(DetectionError::NonFiniteSample { index, value });
        }
        Ok(())
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 * self.sample_interval
    }
    /// Reads a JSON array of numbers, or plain text with values separated by
    /// commas, semicolons or whitespace. Lines starting with `#` are skipped.
    pub fn from_file(path: impl AsRef<Path>, sample_interval: f64) -> Result<Self, DetectionError> {
        let text = fs::read_to_string(path)?;
        Self::new(parse_samples(&text)?, sample_interval)
    }
}

pub fn parse_samples(text: &str) -> Result<Vec<f64>, DetectionError> {
    if text.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(text)?);
    }
    let mut samples = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for token in line
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let value = token.parse::<f64>().map_err(|_| DetectionError::TraceParse {
                line: line_no + 1,
                token: token.to_string(),
            })?;
            samples.push(value);
        }
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    #[test]
    fn parses_delimited_text() {
        let text = "# pA\n1.5, -2\n3;4\t5\n\n";
        assert_eq!(parse_samples(text).unwrap(), vec![1.5, -2.0, 3.0, 4.0, 5.0]);
    }
    #[test]
    fn parses_json_arrays() {
        assert_eq!(parse_samples(" [1, -2.5, 3e2]").unwrap(), vec![1.0, -2.5, 300.0]);
        assert!(matches!(parse_samples("[1, \"x\"]"), Err(DetectionError::Json(_))));
    }
    #[test]
    fn reports_bad_tokens_with_line_numbers() {
        let err = parse_samples("1\n2 oops\n").unwrap_err();
        match err {
            DetectionError::TraceParse { line, token } => {
                assert_eq!(line, 2);
                assert_eq!(token, "oops");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0\n-1\n0\n").unwrap();
        let trace = Trace::from_file(file.path(), 1e-4).unwrap();
        assert_eq!(trace.len(), 3);
        assert!((trace.duration_seconds() - 3e-4).abs() < 1e-15);
    }
    #[test]
    fn rejects_bad_interval_and_nan() {
        assert!(matches!(
            Trace::new(vec![0.0], -1.0),
            Err(DetectionError::InvalidSampleInterval(_))
        ));
        assert!(matches!(
            Trace::new(vec![0.0, f64::INFINITY], 1e-4),
            Err(DetectionError::NonFiniteSample { index: 1, .. })
        ));
    }
}
