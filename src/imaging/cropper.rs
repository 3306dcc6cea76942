//! Crop tool geometry.
//!
//! The editor shows the source in a square preview viewport. The view
//! transform is composed the way a 2D canvas context composes it: translate
//! to the viewport center, rotate, scale, translate by the pan offset, then
//! draw the source centered on the origin. Export replays the same chain on
//! a larger surface, magnified so that the crop region of the preview fills
//! the output.

use crate::error::BiolinkError;
use image::{DynamicImage, Rgba, RgbaImage};

/// Edge length of the square preview viewport, in pixels.
pub const PREVIEW_SIZE: u32 = 300;
pub const AVATAR_OUTPUT: u32 = 400;
pub const BACKGROUND_OUTPUT: u32 = 800;
pub const DEFAULT_BACKGROUND_ASPECT: f64 = 16.0 / 9.0;
/// Accepted background aspect ratios (width / height). Bounds the export
/// height to 200..=3200 px.
pub const MIN_BACKGROUND_ASPECT: f64 = 0.25;
pub const MAX_BACKGROUND_ASPECT: f64 = 4.0;

const AVATAR_RADIUS_RATIO: f64 = 0.35;
const BACKGROUND_WIDTH_RATIO: f64 = 0.8;
const FIT_MARGIN: f64 = 0.9;

const MASK: [u8; 4] = [0, 0, 0, 128];
const BORDER: [u8; 4] = [255, 255, 255, 255];
const BORDER_WIDTH: f64 = 3.0;
const GUIDE: [u8; 4] = [255, 255, 255, 77];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropShape {
    /// Circular crop, square output.
    Avatar,
    /// Rectangular crop, `aspect_ratio` is width / height.
    Background { aspect_ratio: f64 },
}

impl CropShape {
    pub fn output_size(&self) -> (u32, u32) {
        match *self {
            Self::Avatar => (AVATAR_OUTPUT, AVATAR_OUTPUT),
            Self::Background { aspect_ratio } => {
                let height = (BACKGROUND_OUTPUT as f64 / aspect_ratio).round().max(1.0);
                (BACKGROUND_OUTPUT, height as u32)
            }
        }
    }

    fn preview_region(&self) -> Region {
        let size = PREVIEW_SIZE as f64;
        match *self {
            Self::Avatar => Region::Circle {
                cx: size / 2.0,
                cy: size / 2.0,
                r: size * AVATAR_RADIUS_RATIO,
            },
            Self::Background { aspect_ratio } => {
                let w = size * BACKGROUND_WIDTH_RATIO;
                let h = w / aspect_ratio;
                Region::Rect {
                    x: (size - w) / 2.0,
                    y: (size - h) / 2.0,
                    w,
                    h,
                }
            }
        }
    }

    /// Output pixels per preview pixel.
    fn magnification(&self) -> f64 {
        let region_width = match self.preview_region() {
            Region::Circle { r, .. } => r * 2.0,
            Region::Rect { w, .. } => w,
        };
        self.output_size().0 as f64 / region_width
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropParams {
    pub scale: f64,
    pub rotation_deg: f64,
    /// Pan offset, applied after scaling (source pixels at scale 1).
    pub offset_x: f64,
    pub offset_y: f64,
    pub shape: CropShape,
}

impl CropParams {
    pub fn validate(&self) -> Result<(), BiolinkError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(BiolinkError::Validation(
                "scale must be a positive number".to_string(),
            ));
        }
        if !(self.rotation_deg.is_finite() && self.offset_x.is_finite() && self.offset_y.is_finite())
        {
            return Err(BiolinkError::Validation(
                "rotation and offset must be finite".to_string(),
            ));
        }
        if let CropShape::Background { aspect_ratio } = self.shape
            && !(MIN_BACKGROUND_ASPECT..=MAX_BACKGROUND_ASPECT).contains(&aspect_ratio)
        {
            return Err(BiolinkError::Validation(format!(
                "aspect_ratio must be between {MIN_BACKGROUND_ASPECT} and {MAX_BACKGROUND_ASPECT}"
            )));
        }
        Ok(())
    }
}

/// Scale at which the whole source fits the preview with a small margin.
pub fn fit_scale(width: u32, height: u32) -> f64 {
    let size = PREVIEW_SIZE as f64;
    (size / width.max(1) as f64).min(size / height.max(1) as f64) * FIT_MARGIN
}

/// Editor view: transformed source, dimmed outside the crop region, with
/// the crop boundary stroked (and center guides for avatars).
pub fn render_preview(src: &DynamicImage, params: &CropParams) -> RgbaImage {
    let src = src.to_rgba8();
    let size = PREVIEW_SIZE;
    let mut canvas = RgbaImage::new(size, size);

    let view = view_transform(size as f64, size as f64, &src, params, 1.0);
    draw_transformed(&mut canvas, &src, &view);

    let region = params.shape.preview_region();
    for (x, y, px) in canvas.enumerate_pixels_mut() {
        let (fx, fy) = (x as f64 + 0.5, y as f64 + 0.5);
        if !region.contains(fx, fy) {
            blend_over(px, MASK);
        }
        if region.on_boundary(fx, fy, BORDER_WIDTH) {
            blend_over(px, BORDER);
        }
        if let Region::Circle { cx, cy, r } = region {
            let on_horizontal = (fy - cy).abs() <= 0.5 && (fx - cx).abs() <= r;
            let on_vertical = (fx - cx).abs() <= 0.5 && (fy - cy).abs() <= r;
            if on_horizontal || on_vertical {
                blend_over(px, GUIDE);
            }
        }
    }
    canvas
}

/// Final crop at output resolution. Avatars are clipped to a circle with
/// transparent corners.
pub fn export_crop(src: &DynamicImage, params: &CropParams) -> RgbaImage {
    let src = src.to_rgba8();
    let (w, h) = params.shape.output_size();
    let mut canvas = RgbaImage::new(w, h);

    let view = view_transform(
        w as f64,
        h as f64,
        &src,
        params,
        params.shape.magnification(),
    );
    draw_transformed(&mut canvas, &src, &view);

    if params.shape == CropShape::Avatar {
        let clip = Region::Circle {
            cx: w as f64 / 2.0,
            cy: h as f64 / 2.0,
            r: w as f64 / 2.0,
        };
        for (x, y, px) in canvas.enumerate_pixels_mut() {
            if !clip.contains(x as f64 + 0.5, y as f64 + 0.5) {
                *px = Rgba([0, 0, 0, 0]);
            }
        }
    }
    canvas
}

fn view_transform(
    canvas_w: f64,
    canvas_h: f64,
    src: &RgbaImage,
    params: &CropParams,
    magnification: f64,
) -> Affine {
    Affine::identity()
        .translate(canvas_w / 2.0, canvas_h / 2.0)
        .rotate(params.rotation_deg.to_radians())
        .scale(params.scale * magnification)
        .translate(params.offset_x, params.offset_y)
        .translate(-(src.width() as f64) / 2.0, -(src.height() as f64) / 2.0)
}

fn draw_transformed(canvas: &mut RgbaImage, src: &RgbaImage, view: &Affine) {
    let Some(inverse) = view.invert() else {
        return;
    };
    for (x, y, px) in canvas.enumerate_pixels_mut() {
        let (u, v) = inverse.apply(x as f64 + 0.5, y as f64 + 0.5);
        if let Some(sample) = sample_bilinear(src, u, v) {
            *px = sample;
        }
    }
}

fn sample_bilinear(src: &RgbaImage, u: f64, v: f64) -> Option<Rgba<u8>> {
    let (w, h) = (src.width() as f64, src.height() as f64);
    if u < 0.0 || v < 0.0 || u >= w || v >= h {
        return None;
    }
    let fx = (u - 0.5).clamp(0.0, w - 1.0);
    let fy = (v - 0.5).clamp(0.0, h - 1.0);
    let (x0, y0) = (fx.floor() as u32, fy.floor() as u32);
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let (tx, ty) = (fx - x0 as f64, fy - y0 as f64);

    let p00 = src.get_pixel(x0, y0).0;
    let p10 = src.get_pixel(x1, y0).0;
    let p01 = src.get_pixel(x0, y1).0;
    let p11 = src.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f64 * (1.0 - tx) + p10[c] as f64 * tx;
        let bottom = p01[c] as f64 * (1.0 - tx) + p11[c] as f64 * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    Some(Rgba(out))
}

/// Source-over compositing with straight alpha.
fn blend_over(dst: &mut Rgba<u8>, src: [u8; 4]) {
    let sa = src[3] as f64 / 255.0;
    let da = dst.0[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (src[c] as f64 * sa + dst.0[c] as f64 * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    *dst = Rgba(out);
}

#[derive(Debug, Clone, Copy)]
enum Region {
    Circle { cx: f64, cy: f64, r: f64 },
    Rect { x: f64, y: f64, w: f64, h: f64 },
}

impl Region {
    fn contains(&self, px: f64, py: f64) -> bool {
        match *self {
            Self::Circle { cx, cy, r } => (px - cx).hypot(py - cy) <= r,
            Self::Rect { x, y, w, h } => px >= x && px <= x + w && py >= y && py <= y + h,
        }
    }

    /// Within `width / 2` of the outline.
    fn on_boundary(&self, px: f64, py: f64, width: f64) -> bool {
        let half = width / 2.0;
        match *self {
            Self::Circle { cx, cy, r } => ((px - cx).hypot(py - cy) - r).abs() <= half,
            Self::Rect { x, y, w, h } => {
                let within_x = px >= x - half && px <= x + w + half;
                let within_y = py >= y - half && py <= y + h + half;
                let near_vertical = (px - x).abs() <= half || (px - (x + w)).abs() <= half;
                let near_horizontal = (py - y).abs() <= half || (py - (y + h)).abs() <= half;
                (near_vertical && within_y) || (near_horizontal && within_x)
            }
        }
    }
}

/// 2D affine matrix in canvas order: `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Affine {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Affine {
    fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// `self × other`: `other` applies first, as successive canvas calls do.
    fn then(self, o: Affine) -> Self {
        Self {
            a: self.a * o.a + self.c * o.b,
            b: self.b * o.a + self.d * o.b,
            c: self.a * o.c + self.c * o.d,
            d: self.b * o.c + self.d * o.d,
            e: self.a * o.e + self.c * o.f + self.e,
            f: self.b * o.e + self.d * o.f + self.f,
        }
    }

    fn translate(self, tx: f64, ty: f64) -> Self {
        self.then(Self {
            e: tx,
            f: ty,
            ..Self::identity()
        })
    }

    fn rotate(self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        self.then(Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        })
    }

    fn scale(self, s: f64) -> Self {
        self.then(Self {
            a: s,
            d: s,
            ..Self::identity()
        })
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    fn invert(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        Some(Self {
            a,
            b,
            c,
            d,
            e: -(a * self.e + c * self.f),
            f: -(b * self.e + d * self.f),
        })
    }
}
