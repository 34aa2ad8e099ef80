//! Rasters, orientations and decode errors shared by every decoder.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an upload could not be turned into a raster.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The upload contained no bytes.
    #[error("Image data is empty")]
    EmptyInput,

    /// Neither a known raster format nor a RAW container.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// Recognized, but the decoder gave up partway.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The RAW decoder could not develop the sensor data.
    #[error("Unsupported RAW file: {0}")]
    UnsupportedRaw(String),

    /// A RAW container with no usable embedded JPEG.
    #[error("No embedded preview found")]
    NoThumbnail,
}

/// Resampling filter used when shrinking previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    Nearest,
    Bilinear,
    /// Preview default.
    #[default]
    Lanczos3,
}

impl FilterType {
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// EXIF orientation tag (0x0112). Each variant names the transform that
/// makes the stored pixels upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Tag absent or 1.
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    /// Mirror across the main diagonal.
    Transpose = 5,
    Rotate90CW = 6,
    /// Mirror across the anti-diagonal.
    Transverse = 7,
    Rotate270CW = 8,
}

impl Orientation {
    /// All eight orientations in EXIF code order.
    pub const ALL: [Orientation; 8] = [
        Orientation::Normal,
        Orientation::FlipHorizontal,
        Orientation::Rotate180,
        Orientation::FlipVertical,
        Orientation::Transpose,
        Orientation::Rotate90CW,
        Orientation::Transverse,
        Orientation::Rotate270CW,
    ];

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// True for the four orientations whose upright image is `height x width`.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }

    /// The orientation that undoes this one.
    ///
    /// The quarter turns invert each other; every other orientation is
    /// its own inverse.
    #[inline]
    pub fn inverse(self) -> Orientation {
        match self {
            Orientation::Rotate90CW => Orientation::Rotate270CW,
            Orientation::Rotate270CW => Orientation::Rotate90CW,
            other => other,
        }
    }
}

/// Codes outside 1-8 are treated as upright.
impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Decoded pixels, always RGB8. Alpha and extra precision are dropped at
/// decode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    /// Row-major, `width * height * 3` bytes.
    pub pixels: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 3,
            "raster buffer does not match {}x{}",
            width,
            height
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    /// `None` when the buffer length does not match the dimensions.
    pub fn into_rgb_image(self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels)
    }

    /// Like [`into_rgb_image`](Self::into_rgb_image), copying the pixels.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Zero-sized or without pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
