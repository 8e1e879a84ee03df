use image::GrayImage;

use crate::traits::AlphaFilter;

/// 5-tap binomial approximation of a Gaussian, weights sum to 16.
const BINOMIAL_5: [u32; 5] = [1, 4, 6, 4, 1];

/// Separable 5x5 Gaussian with zero padding, in integer arithmetic.
///
/// Output is bit-identical across runs and platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianAlpha5x5;

impl AlphaFilter for GaussianAlpha5x5 {
    fn smooth(&self, alpha: &GrayImage) -> GrayImage {
        let (width, height) = alpha.dimensions();
        let (w, h) = (width as usize, height as usize);
        if w == 0 || h == 0 {
            return alpha.clone();
        }
        let src = alpha.as_raw();
        let radius = BINOMIAL_5.len() / 2;

        let mut horizontal = vec![0u32; w * h];
        for y in 0..h {
            let row = &src[y * w..(y + 1) * w];
            for x in 0..w {
                let mut acc = 0;
                for (k, weight) in BINOMIAL_5.iter().enumerate() {
                    // out-of-range taps read zero
                    if let Some(sx) = (x + k).checked_sub(radius).filter(|&sx| sx < w) {
                        acc += weight * u32::from(row[sx]);
                    }
                }
                horizontal[y * w + x] = acc;
            }
        }

        let mut out = GrayImage::new(width, height);
        for y in 0..h {
            for x in 0..w {
                let mut acc = 0;
                for (k, weight) in BINOMIAL_5.iter().enumerate() {
                    if let Some(sy) = (y + k).checked_sub(radius).filter(|&sy| sy < h) {
                        acc += weight * horizontal[sy * w + x];
                    }
                }
                // normalise by 16 * 16 with rounding
                out.put_pixel(x as u32, y as u32, image::Luma([((acc + 128) / 256) as u8]));
            }
        }
        out
    }
}

/// Float Gaussian blur from imageproc, with clamped borders.
#[derive(Debug, Clone)]
pub struct ImageprocGaussianAlpha {
    pub sigma: f32,
}

impl Default for ImageprocGaussianAlpha {
    fn default() -> Self {
        Self { sigma: 1.1 }
    }
}

impl AlphaFilter for ImageprocGaussianAlpha {
    fn smooth(&self, alpha: &GrayImage) -> GrayImage {
        if alpha.width() == 0 || alpha.height() == 0 {
            return alpha.clone();
        }
        imageproc::filter::gaussian_blur_f32(alpha, self.sigma)
    }
}

/// Keeps the hard binary edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSmoothing;

impl AlphaFilter for NoSmoothing {
    fn smooth(&self, alpha: &GrayImage) -> GrayImage {
        alpha.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_uniform_interior_is_preserved() {
        let alpha = GrayImage::from_pixel(9, 9, Luma([255]));
        let smoothed = GaussianAlpha5x5.smooth(&alpha);
        assert_eq!(smoothed.get_pixel(4, 4)[0], 255);
        assert_eq!(smoothed.get_pixel(2, 2)[0], 255);
    }

    #[test]
    fn test_zero_padding_darkens_corners() {
        let alpha = GrayImage::from_pixel(9, 9, Luma([255]));
        let smoothed = GaussianAlpha5x5.smooth(&alpha);
        // corner keeps (11/16)^2 of its weight
        assert_eq!(smoothed.get_pixel(0, 0)[0], 121);
        assert_eq!(smoothed.get_pixel(0, 4)[0], 175);
    }

    #[test]
    fn test_single_pixel_impulse() {
        let mut alpha = GrayImage::new(5, 5);
        alpha.put_pixel(2, 2, Luma([255]));
        let smoothed = GaussianAlpha5x5.smooth(&alpha);
        // 255 * 36 / 256 rounded
        assert_eq!(smoothed.get_pixel(2, 2)[0], 36);
        assert_eq!(smoothed.get_pixel(0, 0)[0], 1);
        assert_eq!(smoothed.get_pixel(2, 0)[0], 6);
    }

    #[test]
    fn test_hard_edge_becomes_soft() {
        let mut alpha = GrayImage::new(10, 1);
        for x in 5..10 {
            alpha.put_pixel(x, 0, Luma([255]));
        }
        let smoothed = GaussianAlpha5x5.smooth(&alpha);
        let edge = smoothed.get_pixel(5, 0)[0];
        assert!(edge > 0 && edge < 255);
    }

    #[test]
    fn test_smoothing_is_deterministic() {
        let mut alpha = GrayImage::new(16, 12);
        for y in 3..9 {
            for x in 2..13 {
                alpha.put_pixel(x, y, Luma([255]));
            }
        }
        let a = GaussianAlpha5x5.smooth(&alpha);
        let b = GaussianAlpha5x5.smooth(&alpha);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_empty_image_passthrough() {
        let alpha = GrayImage::new(0, 0);
        assert_eq!(GaussianAlpha5x5.smooth(&alpha).dimensions(), (0, 0));
        assert_eq!(ImageprocGaussianAlpha::default().smooth(&alpha).dimensions(), (0, 0));
        assert_eq!(NoSmoothing.smooth(&alpha).dimensions(), (0, 0));
    }
}
