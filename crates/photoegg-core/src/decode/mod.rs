//! Image decoding for PhotoEgg.
//!
//! This module turns uploaded bytes into an RGB [`Raster`] plus the
//! [`Orientation`] recorded in the file. Decoders never rotate pixels.
//!
//! # Decoders
//!
//! - [`StandardDecoder`]: JPEG, PNG, TIFF, WebP, GIF and BMP via `image`
//! - [`RawDecoder`]: camera RAW via `rawloader`, with an embedded-preview fallback
//! - [`AutoDecoder`]: picks one of the above by sniffing the upload
//!
//! # Examples
//!
//! ```ignore
//! use photoegg_core::decode::{AutoDecoder, RasterDecoder};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let (raster, orientation) = AutoDecoder::default().decode(&bytes).unwrap();
//! println!("{}x{} tagged {}", raster.width, raster.height, orientation.code());
//! ```

mod raw;
mod raw_preview;
mod sniff;
mod standard;
mod types;

pub use raw::{develop_raw, RawDecoder};
pub use raw_preview::extract_embedded_preview;
pub use sniff::{has_raw_extension, has_raw_magic, is_tiff, sniff, SourceKind, RAW_EXTENSIONS};
pub use standard::{decode_standard, read_orientation, StandardDecoder};
pub use types::{DecodeError, FilterType, Orientation, Raster};

/// Turns encoded bytes into a raster and its recorded orientation.
///
/// Implementations must not apply the orientation themselves.
pub trait RasterDecoder: Send + Sync {
    /// Decode `bytes`.
    fn decode(&self, bytes: &[u8]) -> Result<(Raster, Orientation), DecodeError>;

    /// Decode with an optional original filename to help pick a format.
    fn decode_with_hint(
        &self,
        bytes: &[u8],
        _filename: Option<&str>,
    ) -> Result<(Raster, Orientation), DecodeError> {
        self.decode(bytes)
    }

    /// Which decoder family handled (or would handle) these bytes.
    fn source_kind(&self, _bytes: &[u8], _filename: Option<&str>) -> SourceKind {
        SourceKind::Standard
    }
}

/// Routes RAW uploads to [`RawDecoder`] and everything else to [`StandardDecoder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecoder {
    standard: StandardDecoder,
    raw: RawDecoder,
}

impl AutoDecoder {
    /// Build with a custom RAW decoder configuration.
    pub fn with_raw(raw: RawDecoder) -> Self {
        Self {
            standard: StandardDecoder,
            raw,
        }
    }
}

impl RasterDecoder for AutoDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<(Raster, Orientation), DecodeError> {
        self.decode_with_hint(bytes, None)
    }

    fn decode_with_hint(
        &self,
        bytes: &[u8],
        filename: Option<&str>,
    ) -> Result<(Raster, Orientation), DecodeError> {
        match sniff(bytes, filename) {
            SourceKind::Raw => self.raw.decode(bytes),
            SourceKind::Standard => self.standard.decode(bytes),
        }
    }

    fn source_kind(&self, bytes: &[u8], filename: Option<&str>) -> SourceKind {
        sniff(bytes, filename)
    }
}
