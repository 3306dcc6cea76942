use serde::{Deserialize, Serialize};

use crate::imaging::cropper::{CropParams, CropShape, DEFAULT_BACKGROUND_ASPECT, fit_scale};

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CropKind {
    #[default]
    Avatar,
    Background,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CropRequest {
    pub image_url: String,
    /// Omitted on first open: the source is fitted to the viewport.
    #[serde(default)]
    pub scale: Option<f64>,
    /// Degrees, clockwise.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default)]
    pub kind: CropKind,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
}

impl CropRequest {
    pub fn params(&self, source_width: u32, source_height: u32) -> CropParams {
        let shape = match self.kind {
            CropKind::Avatar => CropShape::Avatar,
            CropKind::Background => CropShape::Background {
                aspect_ratio: self.aspect_ratio.unwrap_or(DEFAULT_BACKGROUND_ASPECT),
            },
        };
        CropParams {
            scale: self
                .scale
                .unwrap_or_else(|| fit_scale(source_width, source_height)),
            rotation_deg: self.rotation,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            shape,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CropResponse {
    /// PNG data-URI.
    pub image: String,
    pub width: u32,
    pub height: u32,
    /// Scale actually used, so the editor can continue from a fitted start.
    pub scale: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColorRequest {
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorResponse {
    pub color: String,
    /// `color` lightened for the glow highlight.
    pub glow: String,
    pub is_light: bool,
}
