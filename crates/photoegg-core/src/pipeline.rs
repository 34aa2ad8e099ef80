//! The preview and identity pipeline.
//!
//! bytes -> decode -> normalize orientation -> validate size -> hot preview
//! -> hothash, plus an optional cold preview. A run either produces a
//! complete [`ProcessedImage`] or a [`PipelineError`]; there are no partial
//! results.

use thiserror::Error;
use tracing::debug;

use crate::decode::{AutoDecoder, DecodeError, RasterDecoder, SourceKind};
use crate::egg::PhotoEgg;
use crate::hash::Hothash;
use crate::metadata::extract_metadata;
use crate::orientation::normalize;
use crate::preview::{Preview, PreviewConfig, PreviewError, PreviewGenerator};
use crate::validate::{validate_dimensions, ValidationError};

/// Why a pipeline run failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The bytes are not a readable image.
    #[error("{0}")]
    Decode(#[from] DecodeError),

    /// The normalized raster is below the minimum size.
    #[error("Image too small: {width}x{height} (minimum {min}x{min} pixels)")]
    ImageTooSmall { width: u32, height: u32, min: u32 },

    /// A caller-supplied parameter is out of range.
    #[error("{0}")]
    InvalidParameter(String),

    /// Resize or encode failed after a successful decode.
    #[error("{0}")]
    PreviewGenerationFailed(String),
}

impl PipelineError {
    /// Stable name of the error kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Decode(_) => "DecodeError",
            PipelineError::ImageTooSmall { .. } => "ImageTooSmall",
            PipelineError::InvalidParameter(_) => "InvalidParameter",
            PipelineError::PreviewGenerationFailed(_) => "PreviewGenerationFailed",
        }
    }

    /// True when the failure is attributable to the caller's input.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PipelineError::PreviewGenerationFailed(_))
    }
}

impl From<ValidationError> for PipelineError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::ImageTooSmall { width, height, min } => {
                PipelineError::ImageTooSmall { width, height, min }
            }
            ValidationError::InvalidParameter(msg) => PipelineError::InvalidParameter(msg),
        }
    }
}

impl From<PreviewError> for PipelineError {
    fn from(err: PreviewError) -> Self {
        match err {
            PreviewError::InvalidParameter(msg) => PipelineError::InvalidParameter(msg),
            PreviewError::GenerationFailed(_) => {
                PipelineError::PreviewGenerationFailed(err.to_string())
            }
        }
    }
}

/// Output of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    /// SHA-256 of `hot_preview.bytes`.
    pub hothash: Hothash,
    pub hot_preview: Preview,
    /// Present only when requested.
    pub cold_preview: Option<Preview>,
    /// Width of the normalized raster.
    pub width: u32,
    /// Height of the normalized raster.
    pub height: u32,
    pub source_kind: SourceKind,
}

/// Decoder plus preview generator. Stateless between runs and shareable
/// across threads.
pub struct Pipeline {
    decoder: Box<dyn RasterDecoder>,
    generator: PreviewGenerator,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(AutoDecoder::default(), PreviewGenerator::default())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("generator", &self.generator)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(decoder: impl RasterDecoder + 'static, generator: PreviewGenerator) -> Self {
        Self {
            decoder: Box::new(decoder),
            generator,
        }
    }

    /// Default decoder with a custom preview configuration.
    pub fn with_config(config: PreviewConfig) -> Self {
        Self::new(AutoDecoder::default(), PreviewGenerator::new(config))
    }

    pub fn generator(&self) -> &PreviewGenerator {
        &self.generator
    }

    /// Run the pipeline over `bytes`.
    ///
    /// `cold_preview_box_side` of `None` skips the cold preview.
    pub fn process(
        &self,
        bytes: &[u8],
        cold_preview_box_side: Option<u32>,
    ) -> Result<ProcessedImage, PipelineError> {
        self.process_with_hint(bytes, None, cold_preview_box_side)
    }

    /// Like [`process`](Self::process), passing the upload's filename to the
    /// decoder so RAW files can be recognized by extension.
    pub fn process_with_hint(
        &self,
        bytes: &[u8],
        filename: Option<&str>,
        cold_preview_box_side: Option<u32>,
    ) -> Result<ProcessedImage, PipelineError> {
        if let Some(side) = cold_preview_box_side {
            self.generator.check_cold_box(side)?;
        }

        let (raster, orientation) = self.decoder.decode_with_hint(bytes, filename)?;
        let raster = normalize(raster, orientation);
        validate_dimensions(raster.width, raster.height)?;

        let hot_preview = self.generator.make_hot_preview(&raster)?;
        let hothash = hot_preview.hothash();
        let cold_preview = cold_preview_box_side
            .map(|side| self.generator.make_cold_preview(&raster, side))
            .transpose()?;

        debug!(
            %hothash,
            width = raster.width,
            height = raster.height,
            orientation = orientation.code(),
            cold = cold_preview.is_some(),
            "processed image"
        );

        Ok(ProcessedImage {
            hothash,
            hot_preview,
            cold_preview,
            width: raster.width,
            height: raster.height,
            source_kind: self.decoder.source_kind(bytes, filename),
        })
    }

    /// Process an upload and assemble its PhotoEgg record, including
    /// best-effort EXIF metadata.
    pub fn import(
        &self,
        bytes: &[u8],
        filename: Option<&str>,
        cold_preview_box_side: Option<u32>,
    ) -> Result<PhotoEgg, PipelineError> {
        let processed = self.process_with_hint(bytes, filename, cold_preview_box_side)?;
        let metadata = extract_metadata(bytes);
        Ok(PhotoEgg::assemble(
            &processed,
            &metadata,
            filename.map(str::to_string),
        ))
    }
}
