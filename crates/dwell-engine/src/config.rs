use crate::error::EngineError;
use anyhow::{Context, Result};
use common::geometry::Zone;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Engine configuration, loaded from a JSON file with env-var overrides for
/// the common knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Video source to process (file path or URI ffmpeg can open)
    pub video_path: String,

    /// Where the CSV report is written at the end of the run
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Seconds of real time between sampled frames
    #[serde(default = "default_skip_interval")]
    pub skip_interval_seconds: f64,

    /// Per-axis pixel tolerance for matching a detection to a known entity
    #[serde(default = "default_proximity_threshold")]
    pub proximity_threshold: i64,

    /// Entities observed for less than this many seconds are dropped from
    /// the report as likely false positives
    #[serde(default = "default_min_time_threshold")]
    pub min_time_threshold: f64,

    /// Region of interest for in-zone dwell accounting
    #[serde(default)]
    pub zone: Zone,

    /// Detector plugin selection and tuning
    #[serde(default)]
    pub detector: DetectorConfig,
}

fn default_output_path() -> String {
    "output/entity_data.csv".to_string()
}

fn default_skip_interval() -> f64 {
    1.0
}

fn default_proximity_threshold() -> i64 {
    30
}

fn default_min_time_threshold() -> f64 {
    1.0
}

/// Detector plugin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Plugin kind: "onnx" or "mock"
    #[serde(default = "default_detector_kind")]
    pub kind: String,

    /// Path to the YOLOv8 ONNX model file for person detection
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// Confidence threshold for person detections (0.0 to 1.0)
    #[serde(default = "default_confidence")]
    pub confidence_threshold: f32,

    /// IoU threshold for NMS
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f32,

    /// Model input size (width and height)
    #[serde(default = "default_input_size")]
    pub input_size: u32,
}

fn default_detector_kind() -> String {
    "onnx".to_string()
}

fn default_model_path() -> String {
    "models/yolov8n.onnx".to_string()
}

fn default_confidence() -> f32 {
    0.5
}

fn default_iou_threshold() -> f32 {
    0.45
}

fn default_input_size() -> u32 {
    640
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            kind: default_detector_kind(),
            model_path: default_model_path(),
            confidence_threshold: default_confidence(),
            iou_threshold: default_iou_threshold(),
            input_size: default_input_size(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file, then apply env overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(video) = env::var("DWELLTRACK_VIDEO") {
            self.video_path = video;
        }
        if let Ok(output) = env::var("DWELLTRACK_OUTPUT") {
            self.output_path = output;
        }
        if let Ok(interval) = env::var("DWELLTRACK_SKIP_INTERVAL") {
            if let Ok(v) = interval.parse() {
                self.skip_interval_seconds = v;
            }
        }
        if let Ok(kind) = env::var("DWELLTRACK_DETECTOR") {
            self.detector.kind = kind;
        }
    }

    /// Validate the configuration before any frame processing begins.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.video_path.is_empty() {
            return Err(EngineError::configuration("video_path must be set"));
        }
        if self.skip_interval_seconds <= 0.0 {
            return Err(EngineError::configuration(format!(
                "skip_interval_seconds must be positive, got {}",
                self.skip_interval_seconds
            )));
        }
        if self.proximity_threshold <= 0 {
            return Err(EngineError::configuration(format!(
                "proximity_threshold must be positive, got {}",
                self.proximity_threshold
            )));
        }
        if self.min_time_threshold < 0.0 {
            return Err(EngineError::configuration(format!(
                "min_time_threshold must not be negative, got {}",
                self.min_time_threshold
            )));
        }
        if !self.zone.is_valid() {
            return Err(EngineError::configuration(format!(
                "zone '{}' has non-positive dimensions {}x{}",
                self.zone.label, self.zone.width, self.zone.height
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            video_path: String::new(),
            output_path: default_output_path(),
            skip_interval_seconds: default_skip_interval(),
            proximity_threshold: default_proximity_threshold(),
            min_time_threshold: default_min_time_threshold(),
            zone: Zone::default(),
            detector: DetectorConfig::default(),
        }
    }
}
