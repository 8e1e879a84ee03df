pub mod builder;

use std::path::Path;

use image::RgbImage;
use tracing::{info, warn};

use crate::{
    class_names::ClassNames,
    config::PipelineConfig,
    crop::CropExtractor,
    detector::Detector,
    error::{Result, SegCropError},
    labels::LabelFileParser,
    raster::rasterize_polygon,
    types::{LabelItem, OutputArtifact, PipelineOutput},
    writer::OutputWriter,
};

/// Post-detection stage: turns an annotation list into crop files.
///
/// Needs no detector, so it also serves label files produced elsewhere.
pub struct LabelCropper {
    extractor: CropExtractor,
}

impl LabelCropper {
    pub fn new(extractor: CropExtractor) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &CropExtractor {
        &self.extractor
    }

    /// Cut crops for an existing annotation file
    pub fn crop_labels(
        &self,
        image_path: &Path,
        labels_path: &Path,
        class_names: Option<&ClassNames>,
        output_dir: &Path,
    ) -> Result<Vec<OutputArtifact>> {
        let source = load_source_image(image_path)?;
        let labels = LabelFileParser::new(source.width(), source.height()).read_file(labels_path)?;
        self.process_labels(&source, &labels, class_names, output_dir)
    }

    /// Rasterize, crop and write every item, in order.
    ///
    /// The file index of an item is its position in `labels`. The first crop
    /// that cannot be written aborts the call; files already written stay.
    pub fn process_labels(
        &self,
        source: &RgbImage,
        labels: &[LabelItem],
        class_names: Option<&ClassNames>,
        output_dir: &Path,
    ) -> Result<Vec<OutputArtifact>> {
        let writer = OutputWriter::new(output_dir)?;
        let (width, height) = source.dimensions();

        let mut artifacts = Vec::with_capacity(labels.len());
        for (index, item) in labels.iter().enumerate() {
            let mask = rasterize_polygon(&item.polygon, width, height);
            let (crop, bbox) = self.extractor.extract(source, &mask, &item.polygon);

            let path = writer.write(&crop, index, item.class_id, item.confidence, class_names)?;
            info!(
                "Saved: {}  bbox={}  points={}",
                path.display(),
                bbox,
                item.polygon.len()
            );
            artifacts.push(OutputArtifact {
                class_idx: item.class_id,
                confidence: item.confidence,
                path,
            });
        }

        info!("Wrote {} crops to {}", artifacts.len(), output_dir.display());
        Ok(artifacts)
    }
}

impl Default for LabelCropper {
    fn default() -> Self {
        Self::new(CropExtractor::default())
    }
}

/// Detection followed by the segmentation-to-crop stages for one image
pub struct Pipeline {
    config: PipelineConfig,
    detector: Box<dyn Detector>,
    cropper: LabelCropper,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    pub fn new(config: PipelineConfig, detector: Box<dyn Detector>, cropper: LabelCropper) -> Self {
        Self {
            config,
            detector,
            cropper,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cropper(&self) -> &LabelCropper {
        &self.cropper
    }

    /// Run the detector on `image_path` and cut one crop per annotated
    /// instance.
    ///
    /// Fails with [`SegCropError::NotFound`] before the detector is called if
    /// the image is missing or cannot be decoded. Annotation lines that do not
    /// parse are skipped; the first crop that cannot be written aborts the
    /// call.
    pub fn run<P: AsRef<Path>>(&self, image_path: P) -> Result<PipelineOutput> {
        let image_path = image_path.as_ref();
        let source = load_source_image(image_path)?;

        let detection = self.detector.detect(image_path, &self.config.inference)?;
        info!("Detector run directory: {}", detection.run_dir.display());

        let class_names_path = self
            .config
            .class_names_path
            .as_deref()
            .or(detection.class_names.as_deref());
        let class_names = match class_names_path {
            Some(path) => ClassNames::load(path)?,
            None => None,
        };

        let (width, height) = source.dimensions();
        let labels = if detection.annotations.is_file() {
            LabelFileParser::new(width, height).read_file(&detection.annotations)?
        } else {
            // the detector writes no annotation file when it finds nothing
            warn!("No annotations at {}", detection.annotations.display());
            Vec::new()
        };

        let output_dir = self
            .config
            .output_dir
            .clone()
            .unwrap_or_else(|| detection.run_dir.join(&self.config.crops_dir_name));
        let artifacts =
            self.cropper
                .process_labels(&source, &labels, class_names.as_ref(), &output_dir)?;

        Ok(PipelineOutput {
            annotated_image: detection.annotated_image,
            artifacts,
            class_names,
        })
    }

    /// Cut crops for an existing annotation file, without running the detector
    pub fn crop_labels(
        &self,
        image_path: &Path,
        labels_path: &Path,
        class_names: Option<&ClassNames>,
        output_dir: &Path,
    ) -> Result<Vec<OutputArtifact>> {
        self.cropper
            .crop_labels(image_path, labels_path, class_names, output_dir)
    }
}

/// Decode the source image as 8-bit RGB.
pub fn load_source_image(path: &Path) -> Result<RgbImage> {
    if !path.is_file() {
        return Err(SegCropError::NotFound {
            path: path.to_path_buf(),
            reason: "no such file".to_string(),
        });
    }
    let image = image::open(path).map_err(|err| SegCropError::NotFound {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    Ok(image.to_rgb8())
}
