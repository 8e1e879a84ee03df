use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::{
    class_names::ClassNames,
    error::{Result, SegCropError},
};

/// File name for one crop:
/// `{index:03}_class{class_id}_{safe_name}_conf{confidence:.3}.png`.
pub fn crop_file_name(
    index: usize,
    class_id: u32,
    confidence: f64,
    class_names: Option<&ClassNames>,
) -> String {
    format!(
        "{:03}_class{}_{}_conf{:.3}.png",
        index,
        class_id,
        ClassNames::safe_name(class_names, class_id),
        confidence
    )
}

/// Persists crops as PNG files in one directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    /// Create the writer, creating `output_dir` if needed.
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `crop` and return its path. Existing files with the same name
    /// are overwritten.
    pub fn write(
        &self,
        crop: &RgbaImage,
        index: usize,
        class_id: u32,
        confidence: f64,
        class_names: Option<&ClassNames>,
    ) -> Result<PathBuf> {
        let path = self
            .output_dir
            .join(crop_file_name(index, class_id, confidence, class_names));
        crop.save_with_format(&path, ImageFormat::Png)
            .map_err(|source| SegCropError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_file_name_with_class_names() {
        let names = ClassNames::parse("door\nfront bumper\n");
        assert_eq!(
            crop_file_name(0, 1, 0.87, Some(&names)),
            "000_class1_front_bumper_conf0.870.png"
        );
    }

    #[test]
    fn test_file_name_fallbacks() {
        let names = ClassNames::parse("door\n");
        assert_eq!(crop_file_name(12, 7, 0.5, Some(&names)), "012_class7_7_conf0.500.png");
        assert_eq!(crop_file_name(3, 2, 0.12345, None), "003_class2_2_conf0.123.png");
    }

    #[test]
    fn test_file_name_rounds_parsed_confidence() {
        // 0.2345 sits just below the rounding midpoint as a double
        let item = crate::labels::LabelFileParser::new(100, 100)
            .parse("1 0.1 0.1 0.9 0.1 0.9 0.9 0.2345")
            .unwrap();
        assert_eq!(
            crop_file_name(0, item.class_id, item.confidence, None),
            "000_class1_1_conf0.234.png"
        );
    }

    #[test]
    fn test_write_round_trips_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path().join("crops_by_mask")).unwrap();
        let crop = RgbaImage::from_fn(4, 3, |x, y| Rgba([10, 20, 30, (x * 60 + y) as u8]));

        let path = writer.write(&crop, 0, 5, 0.9, None).unwrap();
        assert_eq!(path.file_name().unwrap(), "000_class5_5_conf0.900.png");

        let reloaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(reloaded.as_raw(), crop.as_raw());
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        let first = RgbaImage::from_pixel(2, 2, Rgba([1, 1, 1, 255]));
        let second = RgbaImage::from_pixel(3, 3, Rgba([2, 2, 2, 128]));
        let a = writer.write(&first, 0, 1, 0.5, None).unwrap();
        let b = writer.write(&second, 0, 1, 0.5, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(image::open(&b).unwrap().to_rgba8().dimensions(), (3, 3));
    }
}
