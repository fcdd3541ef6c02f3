//! Captured pixel buffer

use crate::{CaptureError, CaptureResult};
use image::{ImageBuffer, Rgba, RgbaImage};

/// Pixels grabbed for one session
#[derive(Debug, Clone)]
pub struct CapturedImage {
    image: RgbaImage,
}

impl CapturedImage {
    /// Wrap an RGBA image
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Build from a top-down BGRA buffer as returned by GDI
    pub fn from_bgra(mut data: Vec<u8>, width: u32, height: u32) -> CaptureResult<Self> {
        // Convert BGRA to RGBA; GDI leaves alpha at zero
        for chunk in data.chunks_exact_mut(4) {
            chunk.swap(0, 2);
            chunk[3] = 0xFF;
        }

        let image = ImageBuffer::from_raw(width, height, data)
            .ok_or(CaptureError::BufferSize { width, height })?;
        Ok(Self { image })
    }

    /// Solid image, mostly useful as a blank canvas
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            image: ImageBuffer::from_pixel(width, height, Rgba(color)),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    pub fn as_rgba_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.image
    }

    /// Pixel at `(x, y)`, `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width() && y < self.height() {
            Some(self.image.get_pixel(x, y).0)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgra_is_swizzled_and_made_opaque() {
        let data = vec![10, 20, 30, 0, 1, 2, 3, 0];
        let img = CapturedImage::from_bgra(data, 2, 1).unwrap();
        assert_eq!(img.pixel(0, 0), Some([30, 20, 10, 255]));
        assert_eq!(img.pixel(1, 0), Some([3, 2, 1, 255]));
        assert_eq!(img.pixel(2, 0), None);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let result = CapturedImage::from_bgra(vec![0; 12], 2, 2);
        assert!(matches!(
            result,
            Err(CaptureError::BufferSize { width: 2, height: 2 })
        ));
    }
}
