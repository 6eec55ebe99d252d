use thiserror::Error;
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("sample interval must be finite and greater than zero, got {0}")]
    InvalidSampleInterval(f64),
    #[error("{name} must be finite and greater than zero, got {value}")]
    InvalidCutoff { name: &'static str, value: f64 },
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidDuration { name: &'static str, value: f64 },
    #[error("seed percentile must lie in [0, 100], got {0}")]
    InvalidPercentile(f64),
    #[error("separation factor must be finite and non-negative, got {0}")]
    InvalidSeparation(f64),
    #[error("two-means iteration cap must be at least one")]
    ZeroIterations,
    #[error("trace sample {index} is not finite ({value})")]
    NonFiniteSample { index: usize, value: f64 },
    #[error("failed to parse trace value {token:?} on line {line}")]
    TraceParse { line: usize, token: String },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for DetectionError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        DetectionError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for DetectionError {
    fn from(value: image::ImageError) -> Self {
        DetectionError::Plot(value.to_string())
    }
}
