//! HTTP handlers.

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use photoegg_core::PhotoEgg;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "PhotoEgg",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "healthy",
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// An upload read out of the multipart form.
struct Upload {
    bytes: Vec<u8>,
    filename: Option<String>,
    cold_preview_box_side: Option<u32>,
}

/// `POST /v1/process`: build a PhotoEgg from the `file` field.
pub async fn process(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PhotoEgg>, ApiError> {
    let multipart = multipart.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let upload = read_upload(multipart, state.max_upload_bytes).await?;

    let permit = state
        .jobs
        .clone()
        .acquire_owned()
        .await
        .map_err(|_| ApiError::Unavailable)?;

    let pipeline = state.pipeline.clone();
    let filename = upload.filename.clone();
    let egg = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        pipeline.import(
            &upload.bytes,
            upload.filename.as_deref(),
            upload.cold_preview_box_side,
        )
    })
    .await
    .map_err(|err| ApiError::Internal(format!("Image worker failed: {err}")))??;

    info!(
        hothash = %egg.hothash,
        filename = filename.as_deref().unwrap_or("-"),
        cold = egg.coldpreview_base64.is_some(),
        "processed upload"
    );
    Ok(Json(egg))
}

async fn read_upload(mut multipart: Multipart, limit: usize) -> Result<Upload, ApiError> {
    let mut file = None;
    let mut cold_preview_box_side = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| multipart_error(err, limit))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|err| multipart_error(err, limit))?;
                file = Some((bytes.to_vec(), filename));
            }
            Some("coldpreview_size") => {
                cold_preview_box_side = parse_cold_size(field, limit).await?;
            }
            _ => {}
        }
    }

    let (bytes, filename) = file.ok_or(ApiError::MissingFile)?;
    Ok(Upload {
        bytes,
        filename,
        cold_preview_box_side,
    })
}

async fn parse_cold_size(field: Field<'_>, limit: usize) -> Result<Option<u32>, ApiError> {
    let text = field.text().await.map_err(|err| multipart_error(err, limit))?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<u32>().map(Some).map_err(|_| {
        ApiError::BadRequest(format!(
            "coldpreview_size must be a non-negative integer, got {:?}",
            text
        ))
    })
}

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit }
    } else {
        ApiError::BadRequest(err.body_text())
    }
}
