use std::fmt;
use std::path::PathBuf;

use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::class_names::ClassNames;

/// One detected instance read from an annotation line.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelItem {
    /// Index into the class-name table
    pub class_id: u32,
    /// Detector score, passed through unmodified
    pub confidence: f64,
    /// Pixel-space polygon, at least 3 points
    pub polygon: Vec<Coord<i32>>,
}

/// Padded crop rectangle, half-open: `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl BoundingBox {
    /// Expand the inclusive bounds `(min_x, min_y)..=(max_x, max_y)` by `pad`
    /// on every side and clip the result to a `width x height` image.
    ///
    /// The max row and column stay inside the box, so any in-image point set
    /// yields a non-empty box.
    pub fn padded(
        (min_x, min_y): (u32, u32),
        (max_x, max_y): (u32, u32),
        pad: u32,
        width: u32,
        height: u32,
    ) -> Self {
        let x1 = max_x.saturating_add(1).saturating_add(pad).min(width);
        let y1 = max_y.saturating_add(1).saturating_add(pad).min(height);
        Self {
            x0: min_x.saturating_sub(pad).min(x1),
            y0: min_y.saturating_sub(pad).min(y1),
            x1,
            y1,
        }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})-({},{})", self.x0, self.y0, self.x1, self.y1)
    }
}

/// Descriptor of one persisted crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputArtifact {
    pub class_idx: u32,
    pub confidence: f64,
    pub path: PathBuf,
}

impl OutputArtifact {
    /// Human-readable caption: class label followed by the raw confidence.
    pub fn caption(&self, class_names: Option<&ClassNames>) -> String {
        format!(
            "{} {}",
            ClassNames::label_for(class_names, self.class_idx),
            self.confidence
        )
    }
}

/// Result of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Preview image produced by the detector, returned unchanged
    pub annotated_image: PathBuf,
    /// One entry per processed instance, in annotation-file order
    pub artifacts: Vec<OutputArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_names: Option<ClassNames>,
}

impl PipelineOutput {
    /// Captions for every artifact, in order.
    pub fn captions(&self) -> Vec<String> {
        self.artifacts
            .iter()
            .map(|artifact| artifact.caption(self.class_names.as_ref()))
            .collect()
    }
}
