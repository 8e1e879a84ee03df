//! # Segmentation-to-crop pipeline
//!
//! Turns per-instance polygon annotations written by an external segmentation
//! detector into alpha-matted PNG crops, one per instance, each tagged with
//! its class and confidence.
//!
//! ## Stages
//!
//! 1. [`LabelFileParser`] reads `class x1 y1 ... xn yn conf` lines into
//!    [`LabelItem`]s, skipping malformed lines.
//! 2. [`rasterize_polygon`] fills each polygon into a binary mask.
//! 3. [`CropExtractor`] cuts the padded bounding box out of the source image
//!    and uses the softened mask as alpha.
//! 4. [`OutputWriter`] saves `{index:03}_class{id}_{name}_conf{conf:.3}.png`.
//!
//! [`Pipeline`] runs a [`Detector`] first and then the four stages in order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use segcrop::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::from_file("segcrop.toml")?;
//! let pipeline = Pipeline::builder().config(config).build();
//!
//! let output = pipeline.run("car.jpg")?;
//! for artifact in &output.artifacts {
//!     println!("{} {:.3} {}", artifact.class_idx, artifact.confidence, artifact.path.display());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Without a detector
//!
//! ```rust,no_run
//! use std::path::Path;
//! use segcrop::{ClassNames, Pipeline};
//!
//! let cropper = Pipeline::builder().pad(4).build_cropper();
//! let names = ClassNames::load("classes_names.txt")?;
//! let artifacts = cropper.crop_labels(
//!     Path::new("car.jpg"),
//!     Path::new("car.txt"),
//!     names.as_ref(),
//!     Path::new("crops"),
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod class_names;
pub mod config;
pub mod crop;
pub mod detector;
pub mod error;
pub mod labels;
pub mod pipeline;
pub mod raster;
pub mod smoothing;
pub mod traits;
pub mod types;
pub mod writer;

// Re-exports for convenience
pub use class_names::ClassNames;
pub use config::{DetectorConfig, InferenceParams, PipelineConfig};
pub use crop::{CropExtractor, DEFAULT_PAD, extract_crop};
pub use detector::{
    CommandDetector, DetectionResult, Detector, RunDirectoryDetector, RunLayout,
};
pub use error::{ConfigError, DetectorError, LabelParseError, Result, SegCropError};
pub use labels::LabelFileParser;
pub use pipeline::{LabelCropper, Pipeline, builder::PipelineBuilder, load_source_image};
pub use raster::{clamp_polygon, mask_bounds, rasterize_polygon};
pub use smoothing::{GaussianAlpha5x5, ImageprocGaussianAlpha, NoSmoothing};
pub use traits::AlphaFilter;
pub use types::{BoundingBox, LabelItem, OutputArtifact, PipelineOutput};
pub use writer::{OutputWriter, crop_file_name};
