use crate::imaging::source::load_image;
use image::DynamicImage;
use image::imageops::FilterType;
use tracing::debug;

/// Returned whenever an image cannot be fetched or decoded.
pub const DEFAULT_COLOR: &str = "#ffffff";

const SAMPLE_GRID: u32 = 50;
/// Every 4th pixel of the downsampled grid contributes to the average.
const PIXEL_STRIDE: usize = 4;

/// Average color of the image behind `reference`, as `#rrggbb`.
pub async fn estimate_dominant_color(client: &reqwest::Client, reference: &str) -> String {
    match load_image(client, reference).await {
        Ok(img) => average_color(&img),
        Err(e) => {
            debug!(error = %e, "dominant color unavailable; using default");
            DEFAULT_COLOR.to_string()
        }
    }
}

pub fn average_color(img: &DynamicImage) -> String {
    let grid = img
        .resize_exact(SAMPLE_GRID, SAMPLE_GRID, FilterType::Triangle)
        .to_rgba8();

    let (mut r, mut g, mut b, mut count) = (0u64, 0u64, 0u64, 0u64);
    for px in grid.as_raw().chunks_exact(4).step_by(PIXEL_STRIDE) {
        r += px[0] as u64;
        g += px[1] as u64;
        b += px[2] as u64;
        count += 1;
    }
    if count == 0 {
        return DEFAULT_COLOR.to_string();
    }

    let avg = |sum: u64| ((sum as f64) / (count as f64)).round() as u8;
    to_hex(avg(r), avg(g), avg(b))
}

pub fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Parse `#rrggbb`, `rrggbb` or `#rgb`.
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let value = u32::from_str_radix(&expanded, 16).ok()?;
    Some(((value >> 16) as u8, (value >> 8) as u8, value as u8))
}

/// Shift every channel by `percent` of full scale, clamped. Negative values darken.
/// Unparseable input is returned unchanged.
pub fn lighten_color(hex: &str, percent: f64) -> String {
    let Some((r, g, b)) = parse_hex(hex) else {
        return hex.to_string();
    };
    let amount = (2.55 * percent).round() as i32;
    let shift = |c: u8| (c as i32 + amount).clamp(0, 255) as u8;
    to_hex(shift(r), shift(g), shift(b))
}

/// Perceived luminance above one half.
pub fn is_light_color(hex: &str) -> bool {
    let Some((r, g, b)) = parse_hex(hex) else {
        return false;
    };
    let luminance = (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0;
    luminance > 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn solid_image_averages_to_itself() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(120, 80, Rgba([18, 52, 86, 255])));
        assert_eq!(average_color(&img), "#123456");
    }

    #[test]
    fn split_image_lands_between_halves() {
        let img = RgbaImage::from_fn(100, 100, |x, _| {
            if x < 50 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let hex = average_color(&DynamicImage::ImageRgba8(img));
        let (r, g, b) = parse_hex(&hex).unwrap();
        assert!(r > 100 && r < 155, "{hex}");
        assert_eq!((r, g), (g, b));
    }

    #[tokio::test]
    async fn undecodable_reference_fails_closed() {
        let client = reqwest::Client::new();
        let color = estimate_dominant_color(&client, "data:image/png;base64,bm90IGFuIGltYWdl").await;
        assert_eq!(color, DEFAULT_COLOR);
        let color = estimate_dominant_color(&client, "not a url").await;
        assert_eq!(color, DEFAULT_COLOR);
    }

    #[test]
    fn lighten_clamps_channels() {
        assert_eq!(lighten_color("#000000", 30.0), "#4d4d4d");
        assert_eq!(lighten_color("#f0f0f0", 30.0), "#ffffff");
        assert_eq!(lighten_color("#101010", -50.0), "#000000");
        assert_eq!(lighten_color("garbage", 10.0), "garbage");
    }

    #[test]
    fn luminance_threshold() {
        assert!(is_light_color("#ffffff"));
        assert!(is_light_color("#ff0"));
        assert!(!is_light_color("#000000"));
        assert!(!is_light_color("#0000ff"));
    }
}
