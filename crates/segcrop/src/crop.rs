use geo::BoundingRect;
use geo_types::{Coord, LineString};
use image::{GrayImage, Rgba, RgbImage, RgbaImage};

use crate::{
    raster::clamp_polygon,
    smoothing::GaussianAlpha5x5,
    traits::AlphaFilter,
    types::BoundingBox,
};

/// Default margin around the polygon, in pixels.
pub const DEFAULT_PAD: u32 = 2;

/// Cuts an alpha-matted RGBA crop for one instance out of the source image.
pub struct CropExtractor {
    pad: u32,
    alpha_filter: Box<dyn AlphaFilter>,
}

impl CropExtractor {
    /// Extractor with the default 5x5 Gaussian alpha filter
    pub fn new(pad: u32) -> Self {
        Self {
            pad,
            alpha_filter: Box::new(GaussianAlpha5x5),
        }
    }

    /// Replace the alpha filter
    pub fn with_alpha_filter<F>(mut self, filter: F) -> Self
    where
        F: AlphaFilter + 'static,
    {
        self.alpha_filter = Box::new(filter);
        self
    }

    pub fn pad(&self) -> u32 {
        self.pad
    }

    /// Padded bounding box of the polygon after clamping it into the image.
    pub fn bounding_box(&self, polygon: &[Coord<i32>], width: u32, height: u32) -> BoundingBox {
        let clamped = clamp_polygon(polygon, width, height);
        match LineString::new(clamped).bounding_rect() {
            Some(rect) => BoundingBox::padded(
                (rect.min().x as u32, rect.min().y as u32),
                (rect.max().x as u32, rect.max().y as u32),
                self.pad,
                width,
                height,
            ),
            None => BoundingBox {
                x0: 0,
                y0: 0,
                x1: 0,
                y1: 0,
            },
        }
    }

    /// Build the RGBA crop over the padded bounding box.
    ///
    /// RGB comes from `source`, alpha from `mask` passed through the alpha
    /// filter. The box encloses every mask pixel of the polygon; only an empty
    /// polygon or a zero-sized image yields a 0x0 crop.
    pub fn extract(
        &self,
        source: &RgbImage,
        mask: &GrayImage,
        polygon: &[Coord<i32>],
    ) -> (RgbaImage, BoundingBox) {
        debug_assert_eq!(source.dimensions(), mask.dimensions());
        let (width, height) = source.dimensions();
        let bbox = self.bounding_box(polygon, width, height);
        if bbox.is_empty() {
            return (RgbaImage::new(0, 0), bbox);
        }

        let mut crop = RgbaImage::new(bbox.width(), bbox.height());
        let mut alpha = GrayImage::new(bbox.width(), bbox.height());
        for (x, y, pixel) in crop.enumerate_pixels_mut() {
            let (sx, sy) = (bbox.x0 + x, bbox.y0 + y);
            let [r, g, b] = source.get_pixel(sx, sy).0;
            *pixel = Rgba([r, g, b, 0]);
            alpha.put_pixel(x, y, *mask.get_pixel(sx, sy));
        }

        let alpha = self.alpha_filter.smooth(&alpha);
        for (pixel, a) in crop.pixels_mut().zip(alpha.pixels()) {
            pixel[3] = a[0];
        }

        (crop, bbox)
    }
}

impl Default for CropExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_PAD)
    }
}

/// One-shot form of [`CropExtractor::extract`] with the default alpha filter.
pub fn extract_crop(
    source: &RgbImage,
    mask: &GrayImage,
    polygon: &[Coord<i32>],
    pad: u32,
) -> (RgbaImage, BoundingBox) {
    CropExtractor::new(pad).extract(source, mask, polygon)
}
