//! PhotoEgg Core - preview generation and photo identity
//!
//! This crate turns an uploaded image into a PhotoEgg record: an upright
//! hot preview and its SHA-256 hothash, an optional larger cold preview, and
//! best-effort EXIF metadata. Everything is computed in memory from the
//! upload's bytes; nothing is stored.

pub mod batch;
pub mod decode;
pub mod egg;
pub mod encode;
pub mod hash;
pub mod metadata;
pub mod orientation;
pub mod pipeline;
pub mod preview;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use batch::{import_path, process_paths, ImportError, ImportOutcome};
pub use decode::{AutoDecoder, DecodeError, Orientation, Raster, RasterDecoder, SourceKind};
pub use egg::PhotoEgg;
pub use hash::{hothash, verify, Hothash};
pub use metadata::{extract_metadata, PhotoMetadata};
pub use orientation::normalize;
pub use pipeline::{Pipeline, PipelineError, ProcessedImage};
pub use preview::{
    fit_within, Preview, PreviewConfig, PreviewError, PreviewGenerator, COLD_PREVIEW_QUALITY,
    HOT_PREVIEW_BOX, HOT_PREVIEW_QUALITY,
};
pub use validate::{validate_cold_box, validate_dimensions, ValidationError, MIN_DIMENSION};
