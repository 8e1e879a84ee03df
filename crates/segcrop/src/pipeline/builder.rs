use std::path::PathBuf;

use crate::{
    config::PipelineConfig,
    crop::CropExtractor,
    detector::{CommandDetector, Detector},
    pipeline::{LabelCropper, Pipeline},
    smoothing::GaussianAlpha5x5,
    traits::AlphaFilter,
};

/// Builder for creating pipelines with a fluent API
pub struct PipelineBuilder {
    config: PipelineConfig,
    detector: Option<Box<dyn Detector>>,
    alpha_filter: Box<dyn AlphaFilter>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            detector: None,
            alpha_filter: Box::new(GaussianAlpha5x5),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn pad(mut self, pad: u32) -> Self {
        self.config.pad = pad;
        self
    }

    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(output_dir.into());
        self
    }

    pub fn class_names_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.class_names_path = Some(path.into());
        self
    }

    /// Set the detector (replaces any existing one)
    pub fn detector<D>(mut self, detector: D) -> Self
    where
        D: Detector + 'static,
    {
        self.detector = Some(Box::new(detector));
        self
    }

    /// Set the alpha filter (replaces the default 5x5 Gaussian)
    pub fn alpha_filter<F>(mut self, filter: F) -> Self
    where
        F: AlphaFilter + 'static,
    {
        self.alpha_filter = Box::new(filter);
        self
    }

    /// Build the pipeline; without an explicit detector the configured
    /// external command is used.
    pub fn build(self) -> Pipeline {
        let detector = self
            .detector
            .unwrap_or_else(|| Box::new(CommandDetector::new(self.config.detector.clone())));
        let cropper = Self::cropper_for(self.config.pad, self.alpha_filter);
        Pipeline::new(self.config, detector, cropper)
    }

    /// Build only the post-detection stage; no detector is created.
    pub fn build_cropper(self) -> LabelCropper {
        Self::cropper_for(self.config.pad, self.alpha_filter)
    }

    fn cropper_for(pad: u32, alpha_filter: Box<dyn AlphaFilter>) -> LabelCropper {
        LabelCropper::new(CropExtractor::new(pad).with_alpha_filter(alpha_filter))
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
