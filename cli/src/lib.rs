use segcrop::{ClassNames, OutputArtifact, PipelineOutput};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// One crop as listed in the manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportEntry {
    pub index: usize,
    pub caption: String,
    #[serde(flatten)]
    pub artifact: OutputArtifact,
}

/// Manifest of one CLI invocation, written next to the crops on request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub image: PathBuf,
    pub annotated_image: Option<PathBuf>,
    pub crops: Vec<ReportEntry>,
}

impl RunReport {
    pub fn new(
        image: impl Into<PathBuf>,
        annotated_image: Option<PathBuf>,
        artifacts: Vec<OutputArtifact>,
        class_names: Option<&ClassNames>,
    ) -> Self {
        let crops = artifacts
            .into_iter()
            .enumerate()
            .map(|(index, artifact)| ReportEntry {
                index,
                caption: artifact.caption(class_names),
                artifact,
            })
            .collect();
        Self {
            image: image.into(),
            annotated_image,
            crops,
        }
    }

    /// Build a report from a full pipeline run
    pub fn from_output(image: impl Into<PathBuf>, output: PipelineOutput) -> Self {
        let PipelineOutput {
            annotated_image,
            artifacts,
            class_names,
        } = output;
        Self::new(image, Some(annotated_image), artifacts, class_names.as_ref())
    }

    /// `<index>: <caption> -> <path>`, one line per crop
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for entry in &self.crops {
            out.push_str(&format!(
                "{}: {} -> {}\n",
                entry.index,
                entry.caption,
                entry.artifact.path.display()
            ));
        }
        out
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        let content = self.to_json()?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }
}
