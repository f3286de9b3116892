use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub models: ModelsConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_result_dir")]
    pub result_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub detection: DetectionModelConfig,
    pub classification: ClassificationModelConfig,
    /// Threads ONNX Runtime may use inside a single operator.
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionModelConfig {
    pub path: PathBuf,
    #[serde(default = "default_detection_input_size")]
    pub input_size: u32,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f32,
    #[serde(default = "default_max_detections")]
    pub max_detections: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationModelConfig {
    pub path: PathBuf,
    #[serde(default = "default_classification_input_size")]
    pub input_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Config {
    /// Rejects values that would make the pipeline misbehave at request time.
    pub fn validate(&self) -> Result<()> {
        let detection = &self.models.detection;
        if !(0.0..=1.0).contains(&detection.confidence_threshold) {
            return Err(Error::config(format!(
                "models.detection.confidence_threshold must be within [0, 1], got {}",
                detection.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&detection.iou_threshold) {
            return Err(Error::config(format!(
                "models.detection.iou_threshold must be within [0, 1], got {}",
                detection.iou_threshold
            )));
        }
        if detection.input_size == 0 || self.models.classification.input_size == 0 {
            return Err(Error::config("model input_size must be positive"));
        }
        if detection.max_detections == 0 {
            return Err(Error::config("models.detection.max_detections must be positive"));
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err(Error::config("upload.allowed_extensions must not be empty"));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            result_dir: default_result_dir(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_result_dir() -> PathBuf {
    PathBuf::from("static/results")
}

fn default_intra_threads() -> usize {
    4
}

fn default_detection_input_size() -> u32 {
    640
}

fn default_classification_input_size() -> u32 {
    224
}

fn default_confidence_threshold() -> f32 {
    0.25
}

fn default_iou_threshold() -> f32 {
    0.7
}

fn default_max_detections() -> usize {
    300
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()]
}
