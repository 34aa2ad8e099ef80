//! Camera RAW decoding.
//!
//! Sensor data is developed with a quick half-size pipeline: each 2x2 CFA
//! block becomes one RGB pixel, levels are normalized against the camera's
//! black and white points, the as-shot white balance is applied and the
//! result is sRGB gamma encoded. Cameras `rawloader` doesn't know fall back
//! to the largest embedded JPEG preview.

use std::io::Cursor;

use rawloader::{RawImage, RawImageData};
use tracing::{debug, warn};

use super::raw_preview::extract_embedded_preview;
use super::standard::{decode_standard, read_orientation};
use super::{DecodeError, Orientation, Raster, RasterDecoder, SourceKind};

/// Decoder for camera RAW files.
#[derive(Debug, Clone, Copy)]
pub struct RawDecoder {
    /// Use the embedded JPEG when the sensor data can't be developed.
    pub preview_fallback: bool,
}

impl Default for RawDecoder {
    fn default() -> Self {
        Self {
            preview_fallback: true,
        }
    }
}

impl RasterDecoder for RawDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<(Raster, Orientation), DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::EmptyInput);
        }

        match develop_raw(bytes) {
            Ok(decoded) => Ok(decoded),
            Err(err) if self.preview_fallback => {
                warn!(error = %err, "RAW develop failed, using embedded preview");
                decode_embedded_preview(bytes).map_err(|_| err)
            }
            Err(err) => Err(err),
        }
    }

    fn source_kind(&self, _bytes: &[u8], _filename: Option<&str>) -> SourceKind {
        SourceKind::Raw
    }
}

/// Develop the sensor data of a RAW file into an RGB raster.
///
/// # Errors
///
/// - `DecodeError::UnsupportedRaw` - `rawloader` does not recognize the file
/// - `DecodeError::CorruptedFile` - sensor data is shorter than its header claims
pub fn develop_raw(bytes: &[u8]) -> Result<(Raster, Orientation), DecodeError> {
    let image = rawloader::decode(&mut Cursor::new(bytes))
        .map_err(|e| DecodeError::UnsupportedRaw(e.to_string()))?;

    let orientation = Orientation::from(image.orientation.to_u16() as u32);
    let raster = develop(&image)?;

    debug!(
        make = %image.clean_make,
        model = %image.clean_model,
        sensor_width = image.width,
        sensor_height = image.height,
        width = raster.width,
        height = raster.height,
        orientation = orientation.code(),
        "developed RAW image"
    );

    Ok((raster, orientation))
}

/// Decode the largest embedded JPEG, orientation taken from the RAW container.
fn decode_embedded_preview(bytes: &[u8]) -> Result<(Raster, Orientation), DecodeError> {
    let jpeg = extract_embedded_preview(bytes)?;
    let (raster, _) = decode_standard(&jpeg)?;
    Ok((raster, read_orientation(bytes)))
}

/// Per-channel level mapping: black point, white point and white balance.
struct Levels {
    black: [f32; 4],
    range: [f32; 4],
    wb: [f32; 4],
}

impl Levels {
    fn from_image(image: &RawImage) -> Self {
        let mut black = [0.0; 4];
        let mut range = [1.0; 4];
        for c in 0..4 {
            black[c] = image.blacklevels[c] as f32;
            let white = image.whitelevels[c] as f32;
            range[c] = (white - black[c]).max(1.0);
        }
        Self {
            black,
            range,
            wb: white_balance(image.wb_coeffs),
        }
    }

    #[inline]
    fn apply(&self, channel: usize, value: f32) -> f32 {
        ((value - self.black[channel]) / self.range[channel]).max(0.0) * self.wb[channel]
    }
}

/// As-shot coefficients normalized so green is 1.0.
fn white_balance(coeffs: [f32; 4]) -> [f32; 4] {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    let mut wb = coeffs.map(|v| if valid(v) { v } else { 1.0 });
    if !valid(coeffs[3]) {
        wb[3] = wb[1];
    }
    let green = wb[1];
    wb.map(|v| v / green)
}

fn sample(data: &RawImageData, index: usize) -> f32 {
    match data {
        RawImageData::Integer(values) => values[index] as f32,
        RawImageData::Float(values) => values[index],
    }
}

fn data_len(data: &RawImageData) -> usize {
    match data {
        RawImageData::Integer(values) => values.len(),
        RawImageData::Float(values) => values.len(),
    }
}

fn develop(image: &RawImage) -> Result<Raster, DecodeError> {
    let (width, height, cpp) = (image.width, image.height, image.cpp.max(1));
    let needed = width * height * cpp;
    if data_len(&image.data) < needed {
        return Err(DecodeError::CorruptedFile(format!(
            "RAW data holds {} samples, expected {}",
            data_len(&image.data),
            needed
        )));
    }

    let levels = Levels::from_image(image);
    if cpp >= 3 {
        return Ok(develop_rgb(image, &levels));
    }

    let [top, right, bottom, left] = image.crops;
    let crop_w = width.saturating_sub(left + right);
    let crop_h = height.saturating_sub(top + bottom);
    let out_w = crop_w / 2;
    let out_h = crop_h / 2;
    if out_w == 0 || out_h == 0 {
        return Err(DecodeError::CorruptedFile(format!(
            "RAW active area {}x{} is too small",
            crop_w, crop_h
        )));
    }

    let mut pixels = Vec::with_capacity(out_w * out_h * 3);
    for y in 0..out_h {
        for x in 0..out_w {
            let mut sum = [0.0f32; 3];
            let mut count = [0u32; 3];
            for dy in 0..2 {
                for dx in 0..2 {
                    let row = top + y * 2 + dy;
                    let col = left + x * 2 + dx;
                    let color = image.cfa.color_at(row, col).min(3);
                    let value = levels.apply(color, sample(&image.data, row * width + col));
                    // the fourth CFA color is a second green
                    let rgb = if color == 3 { 1 } else { color };
                    sum[rgb] += value;
                    count[rgb] += 1;
                }
            }
            for c in 0..3 {
                let linear = if count[c] > 0 {
                    sum[c] / count[c] as f32
                } else {
                    0.0
                };
                pixels.push(to_srgb8(linear));
            }
        }
    }

    Ok(Raster::new(out_w as u32, out_h as u32, pixels))
}

/// Already-demosaiced sensors (linear DNG and friends).
fn develop_rgb(image: &RawImage, levels: &Levels) -> Raster {
    let cpp = image.cpp;
    let mut pixels = Vec::with_capacity(image.width * image.height * 3);
    for i in 0..image.width * image.height {
        for c in 0..3 {
            let value = levels.apply(c, sample(&image.data, i * cpp + c));
            pixels.push(to_srgb8(value));
        }
    }
    Raster::new(image.width as u32, image.height as u32, pixels)
}

/// Linear [0, 1] to 8-bit sRGB.
#[inline]
fn to_srgb8(linear: f32) -> u8 {
    let v = linear.clamp(0.0, 1.0);
    let encoded = if v <= 0.003_130_8 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    };
    (encoded * 255.0).round() as u8
}
