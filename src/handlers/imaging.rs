use axum::{Json, extract::State};
use tracing::info;

use crate::imaging::cropper::{export_crop, render_preview};
use crate::imaging::{encode_png_data_uri, estimate_dominant_color, is_light_color, lighten_color, load_image};
use crate::types::imaging::{ColorRequest, ColorResponse, CropRequest, CropResponse};
use crate::{BiolinkError, router::BiolinkState};

/// POST /admin/crop/preview -> editor view with the crop mask drawn on.
pub async fn crop_preview(
    State(state): State<BiolinkState>,
    Json(req): Json<CropRequest>,
) -> Result<Json<CropResponse>, BiolinkError> {
    let source = load_image(&state.client, &req.image_url).await?;
    let params = req.params(source.width(), source.height());
    params.validate()?;

    let rendered = tokio::task::spawn_blocking(move || render_preview(&source, &params))
        .await
        .map_err(|e| BiolinkError::Image(format!("render task failed: {e}")))?;
    Ok(Json(CropResponse {
        image: encode_png_data_uri(&rendered)?,
        width: rendered.width(),
        height: rendered.height(),
        scale: params.scale,
    }))
}

/// POST /admin/crop -> final crop at output resolution.
pub async fn crop_export(
    State(state): State<BiolinkState>,
    Json(req): Json<CropRequest>,
) -> Result<Json<CropResponse>, BiolinkError> {
    let source = load_image(&state.client, &req.image_url).await?;
    let params = req.params(source.width(), source.height());
    params.validate()?;

    let cropped = tokio::task::spawn_blocking(move || export_crop(&source, &params))
        .await
        .map_err(|e| BiolinkError::Image(format!("crop task failed: {e}")))?;
    info!(
        width = cropped.width(),
        height = cropped.height(),
        kind = ?req.kind,
        "image cropped"
    );
    Ok(Json(CropResponse {
        image: encode_png_data_uri(&cropped)?,
        width: cropped.width(),
        height: cropped.height(),
        scale: params.scale,
    }))
}

/// POST /admin/dominant-color -> never fails on bad images; falls back to white.
pub async fn dominant_color(
    State(state): State<BiolinkState>,
    Json(req): Json<ColorRequest>,
) -> Json<ColorResponse> {
    let color = estimate_dominant_color(&state.client, &req.image_url).await;
    Json(ColorResponse {
        glow: lighten_color(&color, 30.0),
        is_light: is_light_color(&color),
        color,
    })
}
