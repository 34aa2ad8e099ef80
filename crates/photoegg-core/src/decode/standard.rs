//! Decoding of standard raster formats (JPEG, PNG, TIFF, WebP, GIF, BMP).
//!
//! The decoder reports the EXIF orientation alongside the raster but never
//! applies it; rotation is the orientation normalizer's job.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::ImageReader;
use tracing::debug;

use super::{DecodeError, Orientation, Raster, RasterDecoder};

/// Decoder for every format the `image` crate recognizes by magic bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDecoder;

impl RasterDecoder for StandardDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<(Raster, Orientation), DecodeError> {
        decode_standard(bytes)
    }
}

/// Decode an image from bytes without applying EXIF orientation.
///
/// # Arguments
///
/// * `bytes` - Encoded image file bytes
///
/// # Returns
///
/// The RGB raster as stored in the file and the orientation read from its
/// EXIF block (`Orientation::Normal` when absent).
///
/// # Errors
///
/// Returns `DecodeError::EmptyInput` for an empty buffer,
/// `DecodeError::InvalidFormat` if the format cannot be recognized, and
/// `DecodeError::CorruptedFile` if decoding fails.
pub fn decode_standard(bytes: &[u8]) -> Result<(Raster, Orientation), DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let format = reader.format().ok_or(DecodeError::InvalidFormat)?;

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let orientation = read_orientation(bytes);
    debug!(
        ?format,
        width = img.width(),
        height = img.height(),
        orientation = orientation.code(),
        "decoded standard image"
    );

    Ok((Raster::from_rgb_image(img.into_rgb8()), orientation))
}

/// Extract EXIF orientation from an image container (JPEG, TIFF, PNG, WebP).
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}
