use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegCropError {
    #[error("Image not found or not decodable: {path} ({reason})")]
    NotFound { path: PathBuf, reason: String },

    #[error("Failed to write crop {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SegCropError>;

/// Reasons a single annotation line is rejected.
///
/// These never escape [`crate::labels::LabelFileParser::read`]; a rejected
/// line is logged and dropped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LabelParseError {
    #[error("label line too short: expected at least 4 tokens, found {0}")]
    TooShort(usize),

    #[error("could not parse class id from {0:?}")]
    InvalidClassId(String),

    #[error("could not parse confidence from {0:?}")]
    InvalidConfidence(String),

    #[error("too few points for a polygon: {0}")]
    TooFewPoints(usize),
}

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Failed to launch detector `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Detector exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("No run directory matching '{prefix}*' under {root}")]
    NoRunDirectory { root: PathBuf, prefix: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Unsupported config format: {0}. Please use .toml or .json files")]
    UnsupportedFormat(PathBuf),
}
