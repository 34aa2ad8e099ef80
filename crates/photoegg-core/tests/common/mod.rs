//! Helpers shared by the integration tests.

#![allow(dead_code)]

use photoegg_core::decode::{DecodeError, Orientation, Raster, RasterDecoder};
use photoegg_core::encode::encode_raster;

/// Red/green ramps over a constant blue channel.
pub fn gradient(width: u32, height: u32) -> Raster {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[
                ((x * 255) / width.max(1)) as u8,
                ((y * 255) / height.max(1)) as u8,
                96,
            ]);
        }
    }
    Raster::new(width, height, pixels)
}

pub const RED: [u8; 3] = [220, 20, 20];
pub const BLUE: [u8; 3] = [20, 20, 220];
pub const GREY: [u8; 3] = [120, 120, 120];

/// A grey field with a red block in the top-left corner and a blue block in
/// the top-right, so each of the eight orientations looks different.
pub fn corner_marked(width: u32, height: u32) -> Raster {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let color = if y < height / 4 && x < width / 4 {
                RED
            } else if y < height / 4 && x >= width - width / 4 {
                BLUE
            } else {
                GREY
            };
            pixels.extend_from_slice(&color);
        }
    }
    Raster::new(width, height, pixels)
}

/// Every pixel encodes its own coordinates. Sides must stay below 256.
pub fn labelled(width: u32, height: u32) -> Raster {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[x as u8, y as u8, 7]);
        }
    }
    Raster::new(width, height, pixels)
}

pub fn jpeg(raster: &Raster) -> Vec<u8> {
    encode_raster(raster, 95).unwrap()
}

/// Insert an APP1 EXIF segment holding just an orientation tag.
pub fn tag_orientation(jpeg: &[u8], code: u16) -> Vec<u8> {
    // little-endian TIFF: header, one-entry IFD0, no next IFD
    let mut tiff = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&code.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Decoder that returns a prepared raster and orientation, byte input ignored.
pub struct MemoryDecoder {
    pub raster: Raster,
    pub orientation: Orientation,
}

impl RasterDecoder for MemoryDecoder {
    fn decode(&self, _bytes: &[u8]) -> Result<(Raster, Orientation), DecodeError> {
        Ok((self.raster.clone(), self.orientation))
    }
}

/// The stored pixels a camera would write for `upright` under `orientation`.
///
/// Built from the EXIF definitions directly: for each stored `(x, y)`, the
/// upright pixel it holds.
pub fn stored_for(upright: &Raster, orientation: Orientation) -> Raster {
    let (w, h) = upright.dimensions();
    let code = orientation.code();
    let (sw, sh) = if code >= 5 { (h, w) } else { (w, h) };

    let mut pixels = Vec::with_capacity((sw * sh * 3) as usize);
    for y in 0..sh {
        for x in 0..sw {
            let (ux, uy) = match code {
                1 => (x, y),
                2 => (w - 1 - x, y),
                3 => (w - 1 - x, h - 1 - y),
                4 => (x, h - 1 - y),
                5 => (y, x),
                6 => (w - 1 - y, x),
                7 => (w - 1 - y, h - 1 - x),
                8 => (y, h - 1 - x),
                _ => unreachable!("orientation codes are 1-8"),
            };
            let i = ((uy * w + ux) * 3) as usize;
            pixels.extend_from_slice(&upright.pixels[i..i + 3]);
        }
    }
    Raster::new(sw, sh, pixels)
}

/// True when `pixel` is within `tolerance` of `color` on every channel.
pub fn close_to(pixel: &[u8], color: [u8; 3], tolerance: u8) -> bool {
    pixel
        .iter()
        .zip(color)
        .all(|(&a, b)| a.abs_diff(b) <= tolerance)
}
