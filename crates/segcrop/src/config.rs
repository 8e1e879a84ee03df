use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{crop::DEFAULT_PAD, error::ConfigError};

/// Parameters handed to the detector on every invocation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct InferenceParams {
    /// Model weights passed to the detector
    pub model: PathBuf,
    /// Inference resolution in pixels
    pub image_size: u32,
    /// Minimum detection confidence
    #[schemars(range(min = 0.0, max = 1.0))]
    pub confidence: f32,
    /// NMS IoU threshold
    #[schemars(range(min = 0.0, max = 1.0))]
    pub iou: f32,
    /// Class ids the detector is allowed to report
    pub classes: Vec<u32>,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            model: PathBuf::from("model.pt"),
            image_size: 640,
            confidence: 0.25,
            iou: 0.45,
            classes: vec![0, 3, 6, 8, 11, 14, 16, 22],
        }
    }
}

/// How to launch the external detector and where it writes its runs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    /// Executable to run
    pub program: String,
    /// Leading arguments, before the generated `key=value` options
    pub task_args: Vec<String>,
    /// Directory holding the run directories
    pub project: PathBuf,
    /// Run directory prefix; runs are `<name>`, `<name>2`, `<name>3`, ...
    pub run_name: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            program: "yolo".to_string(),
            task_args: vec!["segment".to_string(), "predict".to_string()],
            project: PathBuf::from("runs/segment"),
            run_name: "predict".to_string(),
        }
    }
}

/// Everything one pipeline run needs, built once and passed in.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub inference: InferenceParams,
    pub detector: DetectorConfig,
    /// Margin around each polygon's bounding box
    pub pad: u32,
    /// Crops directory, created inside the run directory
    pub crops_dir_name: String,
    /// Write crops here instead of inside the run directory
    pub output_dir: Option<PathBuf>,
    /// Class-name file to use instead of the detector's
    pub class_names_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inference: InferenceParams::default(),
            detector: DetectorConfig::default(),
            pad: DEFAULT_PAD,
            crops_dir_name: "crops_by_mask".to_string(),
            output_dir: None,
            class_names_path: None,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format from the extension and load
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path_ref),
            Some("json") => Self::from_json_file(path_ref),
            _ => Err(ConfigError::UnsupportedFormat(path_ref.to_path_buf())),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSON schema of the configuration file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(PipelineConfig)
    }
}
