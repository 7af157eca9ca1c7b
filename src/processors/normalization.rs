//! Pixel normalization into the model's CHW tensor layout.
//!
//! Applies `(pixel / 255 - mean) / std` per channel, folded into a single
//! multiply-add per pixel (`alpha = scale / std`, `beta = -mean / std`), and
//! transposes HWC bytes into a batched `[1, 3, H, W]` float tensor.

use crate::core::{OcrError, OcrResult, Tensor4D};
use image::RgbImage;
use ndarray::Array4;
use rayon::prelude::*;

/// Per-channel mean used by the PGNet export (ImageNet statistics).
pub const DEFAULT_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel standard deviation used by the PGNet export.
pub const DEFAULT_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Normalizes images for inference.
///
/// Holds the folded per-channel scaling factors so the hot loop is a single
/// fused multiply-add per pixel.
#[derive(Debug)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (`alpha = scale / std`).
    pub alpha: [f32; 3],
    /// Offset values for each channel (`beta = -mean / std`).
    pub beta: [f32; 3],
}

impl NormalizeImage {
    /// Creates a new normalizer.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to `1.0 / 255.0`)
    /// * `mean` - Optional per-channel mean (defaults to [`DEFAULT_MEAN`])
    /// * `std` - Optional per-channel std (defaults to [`DEFAULT_STD`])
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `scale` or any standard deviation is
    /// not strictly positive.
    pub fn new(
        scale: Option<f32>,
        mean: Option<[f32; 3]>,
        std: Option<[f32; 3]>,
    ) -> OcrResult<Self> {
        let scale = scale.unwrap_or(1.0 / 255.0);
        let mean = mean.unwrap_or(DEFAULT_MEAN);
        let std = std.unwrap_or(DEFAULT_STD);

        if scale <= 0.0 {
            return Err(OcrError::config_error("scale must be greater than 0"));
        }
        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(OcrError::config_error(format!(
                    "standard deviation at index {i} must be greater than 0, got {s}"
                )));
            }
        }

        let mut alpha = [0.0; 3];
        let mut beta = [0.0; 3];
        for c in 0..3 {
            alpha[c] = scale / std[c];
            beta[c] = -mean[c] / std[c];
        }

        Ok(Self { alpha, beta })
    }

    /// Normalizes an RGB image into a batched CHW tensor `[1, 3, H, W]`.
    pub fn to_chw_tensor(&self, img: &RgbImage) -> OcrResult<Tensor4D> {
        let (w, h) = img.dimensions();
        let (w, h) = (w as usize, h as usize);
        let plane = w * h;
        let raw = img.as_raw();

        let mut data = vec![0.0f32; 3 * plane];
        data.par_chunks_mut(plane)
            .enumerate()
            .for_each(|(c, channel)| {
                let alpha = self.alpha[c];
                let beta = self.beta[c];
                for (i, v) in channel.iter_mut().enumerate() {
                    *v = raw[i * 3 + c] as f32 * alpha + beta;
                }
            });

        Array4::from_shape_vec((1, 3, h, w), data).map_err(OcrError::Tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn rejects_non_positive_std() {
        assert!(NormalizeImage::new(None, None, Some([0.2, 0.0, 0.2])).is_err());
    }

    #[test]
    fn rejects_non_positive_scale() {
        assert!(NormalizeImage::new(Some(0.0), None, None).is_err());
    }

    #[test]
    fn normalizes_with_imagenet_constants() {
        let norm = NormalizeImage::new(None, None, None).unwrap();
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 128]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));

        let tensor = norm.to_chw_tensor(&img).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 1, 2]);

        // (255/255 - 0.485) / 0.229
        let expected_r = (1.0 - 0.485) / 0.229;
        assert!((tensor[[0, 0, 0, 0]] - expected_r).abs() < 1e-4);
        // (0/255 - 0.456) / 0.224
        let expected_g = -0.456 / 0.224;
        assert!((tensor[[0, 1, 0, 0]] - expected_g).abs() < 1e-4);
        // (128/255 - 0.406) / 0.225
        let expected_b = (128.0 / 255.0 - 0.406) / 0.225;
        assert!((tensor[[0, 2, 0, 0]] - expected_b).abs() < 1e-4);
    }

    #[test]
    fn chw_layout_separates_channels() {
        let norm = NormalizeImage::new(Some(1.0), Some([0.0; 3]), Some([1.0; 3])).unwrap();
        let mut img = RgbImage::new(2, 2);
        for (x, y, px) in [(0, 0, [10, 20, 30]), (1, 1, [40, 50, 60])] {
            img.put_pixel(x, y, Rgb(px));
        }
        let tensor = norm.to_chw_tensor(&img).unwrap();
        assert_eq!(tensor[[0, 0, 0, 0]], 10.0);
        assert_eq!(tensor[[0, 1, 0, 0]], 20.0);
        assert_eq!(tensor[[0, 2, 0, 0]], 30.0);
        assert_eq!(tensor[[0, 0, 1, 1]], 40.0);
        assert_eq!(tensor[[0, 2, 1, 1]], 60.0);
    }
}
