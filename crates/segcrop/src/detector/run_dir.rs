use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    config::{DetectorConfig, InferenceParams},
    detector::{DetectionResult, Detector},
    error::DetectorError,
};

const LABELS_DIR: &str = "labels";
const CLASS_NAMES_FILE: &str = "classes_names.txt";

/// Naming convention of detector run directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub project: PathBuf,
    pub run_name: String,
}

impl RunLayout {
    pub fn new(project: impl Into<PathBuf>, run_name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            run_name: run_name.into(),
        }
    }

    /// Ordering key of a run directory name: the bare prefix is run 0,
    /// `<prefix>N` is run N. Anything else is not a run.
    pub fn run_index(&self, dir_name: &str) -> Option<u64> {
        let suffix = dir_name.strip_prefix(self.run_name.as_str())?;
        if suffix.is_empty() {
            return Some(0);
        }
        if !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        suffix.parse().ok()
    }

    /// The most recent run directory under the project directory.
    pub fn latest_run(&self) -> Result<PathBuf, DetectorError> {
        let no_run = || DetectorError::NoRunDirectory {
            root: self.project.clone(),
            prefix: self.run_name.clone(),
        };
        if !self.project.is_dir() {
            return Err(no_run());
        }

        let mut latest: Option<(u64, PathBuf)> = None;
        for entry in fs::read_dir(&self.project)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(index) = name.to_str().and_then(|name| self.run_index(name)) else {
                continue;
            };
            if latest.as_ref().is_none_or(|(best, _)| index > *best) {
                latest = Some((index, entry.path()));
            }
        }

        let (_, run_dir) = latest.ok_or_else(no_run)?;
        debug!("Latest run directory: {}", run_dir.display());
        Ok(run_dir)
    }

    /// Locate the outputs for `image_path` inside `run_dir`.
    pub fn resolve(&self, run_dir: &Path, image_path: &Path) -> DetectionResult {
        let labels_dir = run_dir.join(LABELS_DIR);
        let mut annotations_name = image_path.file_stem().unwrap_or_default().to_os_string();
        annotations_name.push(".txt");
        let annotations = labels_dir.join(annotations_name);

        let class_names = labels_dir.join(CLASS_NAMES_FILE);
        DetectionResult {
            run_dir: run_dir.to_path_buf(),
            annotated_image: run_dir.join(image_path.file_name().unwrap_or_default()),
            annotations,
            class_names: class_names.is_file().then_some(class_names),
        }
    }
}

impl From<&DetectorConfig> for RunLayout {
    fn from(config: &DetectorConfig) -> Self {
        Self::new(&config.project, &config.run_name)
    }
}

/// Detector for output that already exists on disk: it runs nothing and
/// picks up the most recent run directory.
#[derive(Debug, Clone)]
pub struct RunDirectoryDetector {
    layout: RunLayout,
}

impl RunDirectoryDetector {
    pub fn new(layout: RunLayout) -> Self {
        Self { layout }
    }
}

impl Detector for RunDirectoryDetector {
    fn detect(
        &self,
        image_path: &Path,
        _params: &InferenceParams,
    ) -> Result<DetectionResult, DetectorError> {
        let run_dir = self.layout.latest_run()?;
        Ok(self.layout.resolve(&run_dir, image_path))
    }
}
