//! Orientation normalization.
//!
//! Rotates and mirrors a decoded raster so that it is upright, consuming the
//! EXIF orientation the decoder reported. Everything downstream (validation,
//! previews, the hothash) sees only the normalized pixels.

use image::imageops;
use image::RgbImage;

use crate::decode::{Orientation, Raster};

/// Apply `orientation` to a raster, returning the upright raster.
///
/// `Orientation::Normal` is a no-op. Orientations 5-8 swap width and height.
/// A raster whose buffer does not match its dimensions is returned untouched.
pub fn normalize(raster: Raster, orientation: Orientation) -> Raster {
    if orientation == Orientation::Normal || raster.is_empty() {
        return raster;
    }

    let expected = raster.width as usize * raster.height as usize * 3;
    if raster.pixels.len() != expected {
        return raster;
    }

    match raster.into_rgb_image() {
        Some(img) => Raster::from_rgb_image(apply(&img, orientation)),
        None => Raster::new(0, 0, Vec::new()),
    }
}

fn apply(img: &RgbImage, orientation: Orientation) -> RgbImage {
    match orientation {
        Orientation::Normal => img.clone(),
        Orientation::FlipHorizontal => imageops::flip_horizontal(img),
        Orientation::Rotate180 => imageops::rotate180(img),
        Orientation::FlipVertical => imageops::flip_vertical(img),
        Orientation::Transpose => imageops::flip_horizontal(&imageops::rotate90(img)),
        Orientation::Rotate90CW => imageops::rotate90(img),
        Orientation::Transverse => imageops::flip_horizontal(&imageops::rotate270(img)),
        Orientation::Rotate270CW => imageops::rotate270(img),
    }
}
