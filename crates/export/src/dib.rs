//! Device-independent bitmap encoding for the clipboard

use crate::ExportResult;
use capture::CapturedImage;
use image::codecs::bmp::BmpEncoder;
use image::{ExtendedColorType, Rgb, RgbImage};

/// Size of the BMP file header that CF_DIB payloads omit
const BITMAPFILEHEADER_SIZE: usize = 14;

/// Size of the info header at the start of a CF_DIB payload
pub const BITMAPINFOHEADER_SIZE: usize = 40;

/// Encode `image` as a 24-bit bottom-up DIB (BMP without its file header)
pub fn encode_dib(image: &CapturedImage) -> ExportResult<Vec<u8>> {
    let rgba = image.as_rgba();
    let rgb = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let p = rgba.get_pixel(x, y);
        Rgb([p[0], p[1], p[2]])
    });

    let mut bmp = Vec::new();
    BmpEncoder::new(&mut bmp).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;

    Ok(bmp.split_off(BITMAPFILEHEADER_SIZE))
}
