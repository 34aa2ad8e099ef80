//! Size and parameter validation.

use thiserror::Error;

use crate::preview::HOT_PREVIEW_BOX;

/// Smallest accepted width or height of a normalized raster, in pixels.
pub const MIN_DIMENSION: u32 = 4;

/// Validation failures. Both are client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A side of the normalized raster is below [`MIN_DIMENSION`].
    #[error("Image too small: {width}x{height} (minimum {min}x{min} pixels)")]
    ImageTooSmall { width: u32, height: u32, min: u32 },

    /// A caller-supplied parameter is out of range.
    #[error("{0}")]
    InvalidParameter(String),
}

/// Reject rasters with either side below [`MIN_DIMENSION`].
pub fn validate_dimensions(width: u32, height: u32) -> Result<(), ValidationError> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(ValidationError::ImageTooSmall {
            width,
            height,
            min: MIN_DIMENSION,
        });
    }
    Ok(())
}

/// Reject cold preview boxes smaller than the hot preview box.
pub fn validate_cold_box(side: u32) -> Result<(), ValidationError> {
    validate_cold_box_against(side, HOT_PREVIEW_BOX)
}

/// Same as [`validate_cold_box`] for a generator with a custom hot box.
pub fn validate_cold_box_against(side: u32, hot_box: u32) -> Result<(), ValidationError> {
    if side < hot_box {
        return Err(ValidationError::InvalidParameter(format!(
            "coldpreview_size must be at least {} pixels, got {}",
            hot_box, side
        )));
    }
    Ok(())
}
