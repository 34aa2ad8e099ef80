//! Fit-within resizing for previews.

use std::borrow::Cow;

use image::imageops;

use super::PreviewError;
use crate::decode::{FilterType, Raster};

/// Target size of a `width x height` image fitted inside a square box.
///
/// The longest side becomes `box_side` and the other side is scaled and
/// rounded, never below 1. Images that already fit keep their size, so
/// this never upscales. Zero-sized input or a zero box yields `(0, 0)`.
pub fn fit_within(width: u32, height: u32, box_side: u32) -> (u32, u32) {
    if width == 0 || height == 0 || box_side == 0 {
        return (0, 0);
    }
    if width <= box_side && height <= box_side {
        return (width, height);
    }

    let scale = |short: u32, long: u32| {
        let scaled = (box_side as f64 * short as f64 / long as f64).round() as u32;
        scaled.clamp(1, box_side)
    };
    if width >= height {
        (box_side, scale(height, width))
    } else {
        (scale(width, height), box_side)
    }
}

/// Resize a raster to fit inside `box_side`. A raster that already fits is
/// borrowed back unchanged.
///
/// # Errors
///
/// Returns `PreviewError::GenerationFailed` if `box_side` is zero or the
/// pixel buffer does not match the raster's dimensions.
pub fn resize_to_box(
    raster: &Raster,
    box_side: u32,
    filter: FilterType,
) -> Result<Cow<'_, Raster>, PreviewError> {
    if box_side == 0 {
        return Err(PreviewError::GenerationFailed(
            "preview box must be at least 1 pixel".to_string(),
        ));
    }
    let img = raster.to_rgb_image().ok_or_else(|| {
        PreviewError::GenerationFailed(format!(
            "pixel buffer of {} bytes does not match {}x{}",
            raster.pixels.len(),
            raster.width,
            raster.height
        ))
    })?;

    let (width, height) = fit_within(raster.width, raster.height, box_side);
    if (width, height) == raster.dimensions() {
        return Ok(Cow::Borrowed(raster));
    }

    let resized = imageops::resize(&img, width, height, filter.to_image_filter());
    Ok(Cow::Owned(Raster::from_rgb_image(resized)))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The result always fits in the box and never exceeds the source.
        #[test]
        fn prop_fits_and_never_grows(
            width in 1u32..=20_000,
            height in 1u32..=20_000,
            box_side in 1u32..=4096,
        ) {
            let (w, h) = fit_within(width, height, box_side);
            prop_assert!(w >= 1 && h >= 1);
            prop_assert!(w <= width && h <= height);
            prop_assert!(w <= box_side && h <= box_side);
        }

        /// Any box, including zero, gives a size inside it.
        #[test]
        fn prop_any_box_stays_inside(
            width in 0u32..=20_000,
            height in 0u32..=20_000,
            box_side in 0u32..=4096,
        ) {
            let (w, h) = fit_within(width, height, box_side);
            prop_assert!(w <= box_side && h <= box_side);
            prop_assert_eq!(w == 0, h == 0);
        }

        /// When downscaling, the longest side lands exactly on the box.
        #[test]
        fn prop_longest_side_matches_box(
            width in 1u32..=20_000,
            height in 1u32..=20_000,
            box_side in 1u32..=4096,
        ) {
            prop_assume!(width.max(height) > box_side);
            let (w, h) = fit_within(width, height, box_side);
            prop_assert_eq!(w.max(h), box_side);
            if width >= height {
                prop_assert_eq!(w, box_side);
            } else {
                prop_assert_eq!(h, box_side);
            }
        }

        /// Aspect ratio is preserved to within rounding.
        #[test]
        fn prop_aspect_preserved(
            width in 150u32..=8000,
            height in 150u32..=8000,
        ) {
            let (w, h) = fit_within(width, height, 150);
            let (long, short, out_long, out_short) = if width >= height {
                (width, height, w, h)
            } else {
                (height, width, h, w)
            };
            let expected = out_long as f64 * short as f64 / long as f64;
            prop_assert!((out_short as f64 - expected).abs() <= 0.5 + f64::EPSILON);
        }
    }
}
