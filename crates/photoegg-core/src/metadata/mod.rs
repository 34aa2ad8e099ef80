//! Best-effort EXIF metadata extraction.
//!
//! Extraction never fails: a file without EXIF, or with EXIF that cannot be
//! parsed, yields an empty [`PhotoMetadata`]. Individual malformed fields are
//! skipped without affecting the rest.

mod datetime;
mod gps;

use std::io::Cursor;

use exif::{Exif, Field, In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use datetime::standardize_datetime;
pub use gps::{coordinates, dms_to_decimal, extract_gps, GpsInfo};

/// Metadata read from a photo's EXIF block. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoMetadata {
    /// Capture time, ISO 8601.
    pub taken_at: Option<String>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,

    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
    /// Meters, negative below sea level.
    pub gps_altitude: Option<f64>,
    pub gps_timestamp: Option<String>,
    pub gps_datestamp: Option<String>,
    pub gps_map_datum: Option<String>,

    pub iso: Option<u32>,
    pub aperture: Option<f64>,
    /// `1/N` below one second, otherwise seconds with three decimals.
    pub shutter_speed: Option<String>,
    /// Millimeters.
    pub focal_length: Option<f64>,
    pub lens_model: Option<String>,
    pub lens_make: Option<String>,
    pub flash: Option<String>,
    pub exposure_program: Option<String>,
    pub metering_mode: Option<String>,
    pub white_balance: Option<String>,
}

impl PhotoMetadata {
    /// True when both coordinates survived validation.
    pub fn has_gps(&self) -> bool {
        self.gps_latitude.is_some() && self.gps_longitude.is_some()
    }
}

/// Extract metadata from an encoded image (JPEG, TIFF-based RAW, PNG, WebP).
pub fn extract_metadata(bytes: &[u8]) -> PhotoMetadata {
    match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => from_exif(&exif),
        Err(e) => {
            debug!(error = %e, "no readable EXIF, metadata left empty");
            PhotoMetadata::default()
        }
    }
}

/// Map parsed EXIF fields onto a [`PhotoMetadata`].
pub fn from_exif(exif: &Exif) -> PhotoMetadata {
    let field = |tag: Tag| exif.get_field(tag, In::PRIMARY);
    let uint = |tag: Tag| field(tag).and_then(|f| f.value.get_uint(0));
    let float = |tag: Tag| field(tag).and_then(|f| floats(f).first().copied());
    let text = |tag: Tag| field(tag).and_then(ascii);

    let taken_at = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime]
        .into_iter()
        .find_map(&text)
        .map(|raw| standardize_datetime(&raw));

    let gps = extract_gps(exif);

    PhotoMetadata {
        taken_at,
        camera_make: text(Tag::Make),
        camera_model: text(Tag::Model),
        gps_latitude: gps.latitude,
        gps_longitude: gps.longitude,
        gps_altitude: gps.altitude,
        gps_timestamp: gps.timestamp,
        gps_datestamp: gps.datestamp,
        gps_map_datum: gps.map_datum,
        iso: uint(Tag::PhotographicSensitivity),
        aperture: float(Tag::FNumber),
        shutter_speed: float(Tag::ExposureTime).and_then(format_shutter_speed),
        focal_length: float(Tag::FocalLength),
        lens_model: text(Tag::LensModel),
        lens_make: text(Tag::LensMake),
        flash: uint(Tag::Flash).map(flash_label),
        exposure_program: uint(Tag::ExposureProgram)
            .map(exposure_program_label)
            .map(str::to_string),
        metering_mode: uint(Tag::MeteringMode)
            .map(metering_mode_label)
            .map(str::to_string),
        white_balance: uint(Tag::WhiteBalance)
            .map(white_balance_label)
            .map(str::to_string),
    }
}

/// First ASCII string of a field, trimmed. Empty strings count as absent.
pub(crate) fn ascii(field: &Field) -> Option<String> {
    match &field.value {
        Value::Ascii(values) => values.first().and_then(|raw| {
            let text = String::from_utf8_lossy(raw);
            let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
            (!text.is_empty()).then(|| text.to_string())
        }),
        _ => None,
    }
}

/// Numeric components of a field as finite `f64`s.
pub(crate) fn floats(field: &Field) -> Vec<f64> {
    let values: Vec<f64> = match &field.value {
        Value::Rational(v) => v.iter().map(|r| r.to_f64()).collect(),
        Value::SRational(v) => v.iter().map(|r| r.to_f64()).collect(),
        Value::Float(v) => v.iter().map(|&f| f as f64).collect(),
        Value::Double(v) => v.clone(),
        Value::Byte(v) => v.iter().map(|&b| b as f64).collect(),
        Value::Short(v) => v.iter().map(|&s| s as f64).collect(),
        Value::Long(v) => v.iter().map(|&l| l as f64).collect(),
        _ => Vec::new(),
    };
    values.into_iter().filter(|v| v.is_finite()).collect()
}

/// `1/N` for exposures under a second, otherwise seconds to three decimals.
pub fn format_shutter_speed(seconds: f64) -> Option<String> {
    if !(seconds.is_finite() && seconds > 0.0) {
        return None;
    }
    Some(if seconds < 1.0 {
        format!("1/{}", (1.0 / seconds).round() as u64)
    } else {
        format!("{:.3}", seconds)
    })
}

fn flash_label(value: u32) -> String {
    if value & 1 == 1 { "Fired" } else { "No Flash" }.to_string()
}

fn exposure_program_label(value: u32) -> &'static str {
    match value {
        0 => "Not Defined",
        1 => "Manual",
        2 => "Program AE",
        3 => "Aperture Priority",
        4 => "Shutter Priority",
        5 => "Creative (Slow Speed)",
        6 => "Action (High Speed)",
        7 => "Portrait",
        8 => "Landscape",
        _ => "Unknown",
    }
}

fn metering_mode_label(value: u32) -> &'static str {
    match value {
        1 => "Average",
        2 => "Center Weighted Average",
        3 => "Spot",
        4 => "Multi-Spot",
        5 => "Multi-Segment",
        6 => "Partial",
        _ => "Unknown",
    }
}

fn white_balance_label(value: u32) -> &'static str {
    if value == 0 {
        "Auto"
    } else {
        "Manual"
    }
}
