//! JPEG encoding of preview rasters.
//!
//! Previews are baseline JPEGs with no EXIF or other metadata segments, so
//! identical pixels and quality always produce identical bytes.

mod jpeg;

pub use jpeg::{encode_jpeg, encode_raster, EncodeError};
