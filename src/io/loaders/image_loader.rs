//! Loader for standard image formats (PNG, JPEG, BMP, TIFF, WebP).
//!
//! Grayscale images become `H × W` arrays; images with more than one channel
//! become `H × W × C`. 8-bit, 16-bit and float images keep their sample type.

use image::DynamicImage;
use ndarray::{ArrayD, IxDyn};

use crate::data::ArrayData;
use crate::io::loader::{ArrayLoader, LoaderError};

/// Loader for standard image formats.
pub struct ImageLoader;

impl ImageLoader {
    /// Shape `raw` samples as `H × W` or `H × W × C`.
    fn to_array<T>(
        h: usize,
        w: usize,
        channels: usize,
        raw: Vec<T>,
    ) -> Result<ArrayData, LoaderError>
    where
        ArrayData: From<ArrayD<T>>,
    {
        let shape = if channels == 1 {
            vec![h, w]
        } else {
            vec![h, w, channels]
        };
        ArrayD::from_shape_vec(IxDyn(&shape), raw)
            .map(ArrayData::from)
            .map_err(|e| {
                LoaderError::new(format!("Image buffer does not match {:?}: {}", shape, e))
            })
    }
}

impl ArrayLoader for ImageLoader {
    fn id(&self) -> &'static str {
        "image"
    }

    fn display_name(&self) -> &'static str {
        "Standard Image"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"]
    }

    fn can_load(&self, data: &[u8]) -> bool {
        if data.len() < 8 {
            return false;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return true;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return true;
        }

        // BMP: 42 4D (BM)
        if data.starts_with(&[0x42, 0x4D]) {
            return true;
        }

        // TIFF: 49 49 2A 00 (little endian) or 4D 4D 00 2A (big endian)
        if data.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return true;
        }

        // WebP: RIFF....WEBP
        data.len() >= 12 && data.starts_with(&[0x52, 0x49, 0x46, 0x46]) && &data[8..12] == b"WEBP"
    }

    fn load(&self, data: &[u8]) -> Result<ArrayData, LoaderError> {
        let img = image::load_from_memory(data).map_err(|e| {
            LoaderError::new(format!("Failed to decode image: {}", e)).with_loader(self.id())
        })?;
        let (width, height) = (img.width(), img.height());
        let (h, w) = (height as usize, width as usize);
        let channels = usize::from(img.color().channel_count());

        let array = match img {
            DynamicImage::ImageLuma8(buf) => Self::to_array(h, w, channels, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => Self::to_array(h, w, channels, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => Self::to_array(h, w, channels, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => Self::to_array(h, w, channels, buf.into_raw()),
            DynamicImage::ImageLuma16(buf) => Self::to_array(h, w, channels, buf.into_raw()),
            DynamicImage::ImageLumaA16(buf) => Self::to_array(h, w, channels, buf.into_raw()),
            DynamicImage::ImageRgb16(buf) => Self::to_array(h, w, channels, buf.into_raw()),
            DynamicImage::ImageRgba16(buf) => Self::to_array(h, w, channels, buf.into_raw()),
            DynamicImage::ImageRgb32F(buf) => Self::to_array(h, w, channels, buf.into_raw()),
            DynamicImage::ImageRgba32F(buf) => Self::to_array(h, w, channels, buf.into_raw()),
            other => Self::to_array(h, w, 4, other.to_rgba8().into_raw()),
        }?;

        log::trace!(
            "ImageLoader: loaded {}x{} image with {} channel(s)",
            width,
            height,
            channels
        );
        Ok(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DType;
    use image::{GrayImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn encode(img: DynamicImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_loader_metadata() {
        let loader = ImageLoader;
        assert_eq!(loader.id(), "image");
        assert!(loader.extensions().contains(&"png"));
        assert!(loader.extensions().contains(&"jpg"));
        assert_eq!(loader.priority(), 0);
    }

    #[test]
    fn test_magic_detection_png() {
        let png_magic = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(ImageLoader.can_load(&png_magic));
    }

    #[test]
    fn test_magic_detection_invalid() {
        let random_data = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert!(!ImageLoader.can_load(&random_data));
    }

    #[test]
    fn test_grayscale_is_two_dimensional() {
        let img = GrayImage::from_fn(4, 3, |x, y| image::Luma([(x + y) as u8]));
        let array = ImageLoader.load(&encode(DynamicImage::ImageLuma8(img))).unwrap();
        assert_eq!(array.dtype(), DType::U8);
        assert_eq!(array.shape(), &[3, 4]);
        assert_eq!(array.min_max(), Some((0.0, 5.0)));
    }

    #[test]
    fn test_rgb_keeps_channel_axis_last() {
        let img = RgbImage::from_pixel(2, 5, image::Rgb([10, 20, 30]));
        let array = ImageLoader.load(&encode(DynamicImage::ImageRgb8(img))).unwrap();
        assert_eq!(array.shape(), &[5, 2, 3]);
    }
}
