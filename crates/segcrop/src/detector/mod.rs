//! The external detector, seen only through its on-disk outputs.
//!
//! A detector run leaves behind a run directory:
//!
//! ```text
//! <project>/<run_name>[N]/
//!     <image file name>            annotated preview
//!     labels/<image stem>.txt      polygon annotations
//!     labels/classes_names.txt     optional class-name table
//! ```

pub mod command;
pub mod run_dir;

use std::path::{Path, PathBuf};

use crate::{config::InferenceParams, error::DetectorError};

pub use command::CommandDetector;
pub use run_dir::{RunDirectoryDetector, RunLayout};

/// Paths produced by one detector invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    pub run_dir: PathBuf,
    pub annotated_image: PathBuf,
    pub annotations: PathBuf,
    pub class_names: Option<PathBuf>,
}

/// Trait for detection backends
pub trait Detector: Send + Sync {
    /// Run detection on `image_path` and report where the outputs landed
    fn detect(
        &self,
        image_path: &Path,
        params: &InferenceParams,
    ) -> Result<DetectionResult, DetectorError>;
}
