use std::fs;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, ImageEncoder, RgbaImage};

use crate::error::StencilError;
use crate::layout::{preview_size, PREVIEW_MAX_SIDE};

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, StencilError> {
    let mut encoded = Vec::new();
    let encoder = PngEncoder::new(&mut encoded);
    encoder.write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)?;
    Ok(encoded)
}

/// Writes `image` as PNG, creating parent directories as needed.
pub fn write_png(path: &Path, image: &RgbaImage) -> Result<(), StencilError> {
    let encoded = encode_png(image)?;
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StencilError::io(parent, source))?;
    }
    fs::write(path, encoded).map_err(|source| StencilError::io(path, source))
}

/// Nearest-neighbour downscale capped at [`PREVIEW_MAX_SIDE`].
pub fn write_preview(path: &Path, image: &RgbaImage) -> Result<(u32, u32), StencilError> {
    let (width, height) = preview_size(image.width(), image.height(), PREVIEW_MAX_SIDE);
    if (width, height) == image.dimensions() {
        write_png(path, image)?;
    } else {
        let preview = imageops::resize(image, width, height, FilterType::Nearest);
        write_png(path, &preview)?;
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn png_round_trips_through_the_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.png");
        let image = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 255]));
        write_png(&path, &image).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded, image);
    }

    #[test]
    fn preview_is_downscaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        let image = RgbaImage::from_pixel(2400, 300, Rgba([255, 255, 255, 255]));
        let size = write_preview(&path, &image).unwrap();

        assert_eq!(size, (1200, 150));
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1200, 150));
    }
}
