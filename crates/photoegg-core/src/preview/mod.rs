//! Hot and cold preview generation.
//!
//! Both previews fit the normalized raster inside a square box without ever
//! enlarging it, then encode it as a metadata-free JPEG. The hot preview uses
//! a fixed box and is the input to the hothash; the cold preview uses a
//! caller-chosen box at least as large as the hot one.

mod resize;

use thiserror::Error;
use tracing::debug;

pub use resize::{fit_within, resize_to_box};

use crate::decode::{FilterType, Raster};
use crate::encode::{encode_raster, EncodeError};
use crate::hash::{hothash, Hothash};
use crate::validate::validate_cold_box_against;

/// Side of the hot preview's bounding box, in pixels.
pub const HOT_PREVIEW_BOX: u32 = 150;
/// JPEG quality of the hot preview.
pub const HOT_PREVIEW_QUALITY: u8 = 85;
/// JPEG quality of the cold preview.
pub const COLD_PREVIEW_QUALITY: u8 = 90;

/// Errors from preview generation.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// The requested cold preview box is smaller than the hot box.
    #[error("{0}")]
    InvalidParameter(String),

    /// Resizing or encoding failed on an already validated raster.
    #[error("Preview generation failed: {0}")]
    GenerationFailed(String),
}

impl From<EncodeError> for PreviewError {
    fn from(err: EncodeError) -> Self {
        PreviewError::GenerationFailed(err.to_string())
    }
}

/// Box sizes, qualities and filter for a [`PreviewGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Hot preview box side.
    pub hot_box: u32,
    /// Hot preview JPEG quality.
    pub hot_quality: u8,
    /// Cold preview JPEG quality.
    pub cold_quality: u8,
    /// Resampling filter for both previews.
    pub filter: FilterType,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            hot_box: HOT_PREVIEW_BOX,
            hot_quality: HOT_PREVIEW_QUALITY,
            cold_quality: COLD_PREVIEW_QUALITY,
            filter: FilterType::Lanczos3,
        }
    }
}

/// An encoded preview and its actual pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// JPEG bytes.
    pub bytes: Vec<u8>,
    /// Width of the encoded image.
    pub width: u32,
    /// Height of the encoded image.
    pub height: u32,
}

impl Preview {
    /// Identity digest of the encoded bytes.
    pub fn hothash(&self) -> Hothash {
        hothash(&self.bytes)
    }
}

/// Produces hot and cold previews with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct PreviewGenerator {
    config: PreviewConfig,
}

impl PreviewGenerator {
    pub fn new(config: PreviewConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Fit inside the hot box and encode at the hot quality.
    pub fn make_hot_preview(&self, raster: &Raster) -> Result<Preview, PreviewError> {
        self.render(raster, self.config.hot_box, self.config.hot_quality)
    }

    /// Fit inside `box_side` and encode at the cold quality.
    ///
    /// # Errors
    ///
    /// - `PreviewError::InvalidParameter` - `box_side` is below the hot box,
    ///   checked before any pixel work
    /// - `PreviewError::GenerationFailed` - resize or encode failed
    pub fn make_cold_preview(&self, raster: &Raster, box_side: u32) -> Result<Preview, PreviewError> {
        self.check_cold_box(box_side)?;
        self.render(raster, box_side, self.config.cold_quality)
    }

    /// Validate a cold preview box side against this generator's hot box.
    pub fn check_cold_box(&self, box_side: u32) -> Result<(), PreviewError> {
        validate_cold_box_against(box_side, self.config.hot_box)
            .map_err(|e| PreviewError::InvalidParameter(e.to_string()))
    }

    fn render(&self, raster: &Raster, box_side: u32, quality: u8) -> Result<Preview, PreviewError> {
        if raster.is_empty() {
            return Err(PreviewError::GenerationFailed(
                "cannot preview an empty raster".to_string(),
            ));
        }

        let fitted = resize_to_box(raster, box_side, self.config.filter)?;
        let bytes = encode_raster(&fitted, quality)?;

        debug!(
            box_side,
            quality,
            width = fitted.width,
            height = fitted.height,
            bytes = bytes.len(),
            "rendered preview"
        );

        Ok(Preview {
            bytes,
            width: fitted.width,
            height: fitted.height,
        })
    }
}
