use std::path::Path;

use image::{imageops::FilterType, DynamicImage, ImageError};
use string_loom::{Grid, RgbaBuffer};

/// Loads `path` as a `size × size` grayscale target.
pub fn load_target(path: &Path, size: u32) -> Result<RgbaBuffer, ImageError> {
    Ok(square_grayscale(&image::open(path)?, size))
}

/// Center crop to the largest square, Lanczos resize to `size` and replace
/// every channel by the mean of the three.
pub fn square_grayscale(image: &DynamicImage, size: u32) -> RgbaBuffer {
    let side = image.width().min(image.height());
    if side == 0 || size == 0 {
        return RgbaBuffer::black(Grid::square(size as usize));
    }
    let x = (image.width() - side) / 2;
    let y = (image.height() - side) / 2;
    let square = image
        .crop_imm(x, y, side, side)
        .resize_exact(size, size, FilterType::Lanczos3)
        .into_rgba8();

    let mut buffer = RgbaBuffer::from(square);
    for pixel in buffer.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let mean = ((r as u16 + g as u16 + b as u16) / 3) as u8;
        pixel.0 = [mean, mean, mean, a];
    }
    buffer
}
