use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::{
    config::{DetectorConfig, InferenceParams},
    detector::{DetectionResult, Detector, RunLayout},
    error::DetectorError,
};

/// Runs an external detector program synchronously, then reads its newest
/// run directory.
///
/// The program is called as
/// `<program> <task_args...> model=.. source=.. imgsz=.. conf=.. iou=..
/// classes=[..] save=True save_txt=True save_conf=True show_boxes=False
/// project=.. name=..`.
#[derive(Debug, Clone)]
pub struct CommandDetector {
    config: DetectorConfig,
}

impl CommandDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Build the command line without running it
    pub fn command(&self, image_path: &Path, params: &InferenceParams) -> Command {
        let classes = params
            .classes
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.task_args)
            .arg(format!("model={}", params.model.display()))
            .arg(format!("source={}", image_path.display()))
            .arg(format!("imgsz={}", params.image_size))
            .arg(format!("conf={}", params.confidence))
            .arg(format!("iou={}", params.iou))
            .arg(format!("classes=[{classes}]"))
            .arg("save=True")
            .arg("save_txt=True")
            .arg("save_conf=True")
            .arg("show_boxes=False")
            .arg(format!("project={}", self.config.project.display()))
            .arg(format!("name={}", self.config.run_name));
        cmd
    }
}

impl Detector for CommandDetector {
    fn detect(
        &self,
        image_path: &Path,
        params: &InferenceParams,
    ) -> Result<DetectionResult, DetectorError> {
        let mut cmd = self.command(image_path, params);
        info!("Running detector `{}` on {}", self.config.program, image_path.display());
        debug!("Detector command: {:?}", cmd);

        let output = cmd.output().map_err(|source| DetectorError::Spawn {
            program: self.config.program.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(DetectorError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let layout = RunLayout::from(&self.config);
        let run_dir = layout.latest_run()?;
        Ok(layout.resolve(&run_dir, image_path))
    }
}
