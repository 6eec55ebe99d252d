// src/detection/mod.rs
// 尖峰检测流水线：带通 -> 找谷 -> 抽取校验 -> 反弹 -> 聚类 -> 边界情况
pub mod band;
pub mod classify;
pub mod config;
pub mod decimation;
pub mod detector;
pub mod error;
pub mod peak_filter;
pub mod peaks;
pub mod plot;
pub mod rebound;
pub mod synthetic;
pub mod trace;
// 公开导出常用类型，方便外部调用
pub use band::{high_pass, isolate_bands, low_pass, BandSignals};
pub use classify::{two_means, Cluster, Separation, TwoMeans};
pub use config::{DetectorConfig, SingleSpikePolicy};
pub use decimation::corroborated_troughs;
pub use detector::{
    detect_spikes, Detection, DetectionEvent, DetectionSummary, Diagnostics, SpikeDetector,
};
pub use error::DetectionError;
pub use peak_filter::{filter_peaks, FilteredTrace, PeakFilterParams};
pub use peaks::{find_peaks, Direction, Peak};
pub use plot::{render_spikes_png, PlotStyle};
pub use rebound::{composite_amplitudes, measure_rebounds};
pub use synthetic::SyntheticTrace;
pub use trace::Trace;
