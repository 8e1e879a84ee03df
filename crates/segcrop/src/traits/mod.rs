use image::GrayImage;

/// Trait for softening the alpha channel of a crop
pub trait AlphaFilter: Send + Sync {
    /// Return a smoothed copy of `alpha`, same dimensions
    fn smooth(&self, alpha: &GrayImage) -> GrayImage;
}

impl<T: AlphaFilter + ?Sized> AlphaFilter for Box<T> {
    fn smooth(&self, alpha: &GrayImage) -> GrayImage {
        (**self).smooth(alpha)
    }
}
