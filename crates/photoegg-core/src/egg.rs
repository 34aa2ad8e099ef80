//! The PhotoEgg record: everything the service returns for one upload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::metadata::PhotoMetadata;
use crate::pipeline::ProcessedImage;

/// JSON record for a processed photo. Previews are base64 JPEG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoEgg {
    pub hothash: String,

    pub hotpreview_base64: String,
    pub hotpreview_width: u32,
    pub hotpreview_height: u32,

    pub coldpreview_base64: Option<String>,
    pub coldpreview_width: Option<u32>,
    pub coldpreview_height: Option<u32>,

    pub primary_filename: Option<String>,
    pub width: u32,
    pub height: u32,

    pub taken_at: Option<String>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,

    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
    pub has_gps: bool,

    pub iso: Option<u32>,
    pub aperture: Option<f64>,
    pub shutter_speed: Option<String>,
    pub focal_length: Option<f64>,
    pub lens_model: Option<String>,
    pub lens_make: Option<String>,
}

impl PhotoEgg {
    /// Build the record from pipeline output and extracted metadata.
    pub fn assemble(
        processed: &ProcessedImage,
        metadata: &PhotoMetadata,
        primary_filename: Option<String>,
    ) -> Self {
        let hot = &processed.hot_preview;
        let cold = processed.cold_preview.as_ref();

        Self {
            hothash: processed.hothash.to_string(),
            hotpreview_base64: STANDARD.encode(&hot.bytes),
            hotpreview_width: hot.width,
            hotpreview_height: hot.height,
            coldpreview_base64: cold.map(|c| STANDARD.encode(&c.bytes)),
            coldpreview_width: cold.map(|c| c.width),
            coldpreview_height: cold.map(|c| c.height),
            primary_filename,
            width: processed.width,
            height: processed.height,
            taken_at: metadata.taken_at.clone(),
            camera_make: metadata.camera_make.clone(),
            camera_model: metadata.camera_model.clone(),
            gps_latitude: metadata.gps_latitude,
            gps_longitude: metadata.gps_longitude,
            has_gps: metadata.gps_latitude.is_some(),
            iso: metadata.iso,
            aperture: metadata.aperture,
            shutter_speed: metadata.shutter_speed.clone(),
            focal_length: metadata.focal_length,
            lens_model: metadata.lens_model.clone(),
            lens_make: metadata.lens_make.clone(),
        }
    }

    /// The uploaded filename, or `<hothash prefix>.jpg` without one.
    pub fn display_filename(&self) -> String {
        match &self.primary_filename {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{}.jpg", &self.hothash[..8.min(self.hothash.len())]),
        }
    }

    /// True when both coordinates are present.
    pub fn has_location(&self) -> bool {
        self.gps_latitude.is_some() && self.gps_longitude.is_some()
    }

    /// "Make Model", or just the model when the make is unknown.
    pub fn camera_info(&self) -> Option<String> {
        match (&self.camera_make, &self.camera_model) {
            (Some(make), Some(model)) => Some(format!("{} {}", make, model)),
            (None, Some(model)) => Some(model.clone()),
            _ => None,
        }
    }

    /// Decode the hot preview back to JPEG bytes.
    pub fn hot_preview_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.hotpreview_base64)
    }

    /// Decode the cold preview back to JPEG bytes, if present.
    pub fn cold_preview_bytes(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.coldpreview_base64.as_ref().map(|b64| STANDARD.decode(b64))
    }
}
