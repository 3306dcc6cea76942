use crate::error::BiolinkError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::StreamExt;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use tracing::debug;
use url::Url;

/// Largest source image accepted, inline or remote.
pub const MAX_SOURCE_BYTES: usize = 10 * 1024 * 1024;

const ACCEPTED_MIME: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Resolve an image reference (`data:` URI or `http(s)` URL) into pixels.
pub async fn load_image(
    client: &reqwest::Client,
    reference: &str,
) -> Result<DynamicImage, BiolinkError> {
    let reference = reference.trim();
    let bytes = if reference.starts_with("data:") {
        decode_data_uri(reference)?
    } else {
        fetch_remote(client, reference).await?
    };
    Ok(image::load_from_memory(&bytes)?)
}

/// Decode a base64 `data:` URI carrying one of the accepted image types.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, BiolinkError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| BiolinkError::Image("not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| BiolinkError::Image("malformed data URI".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(BiolinkError::Image(
            "data URI must be base64 encoded".to_string(),
        ));
    }
    let mime = header.split(';').next().unwrap_or_default().to_ascii_lowercase();
    if !ACCEPTED_MIME.contains(&mime.as_str()) {
        return Err(BiolinkError::Image(
            "Please upload a valid image file (JPEG, PNG, WebP, or GIF)".to_string(),
        ));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| BiolinkError::Image(format!("invalid base64 payload: {e}")))?;
    ensure_size(bytes.len())?;
    Ok(bytes)
}

async fn fetch_remote(client: &reqwest::Client, reference: &str) -> Result<Vec<u8>, BiolinkError> {
    let url = Url::parse(reference)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(BiolinkError::Validation(
            "Image URL must use http or https.".to_string(),
        ));
    }
    debug!(host = url.host_str().unwrap_or_default(), "fetching remote image");
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(BiolinkError::UpstreamStatus(resp.status()));
    }
    if let Some(len) = resp.content_length() {
        ensure_size(usize::try_from(len).unwrap_or(usize::MAX))?;
    }

    // the declared length is optional, so the cap is enforced while reading
    let mut body = Vec::new();
    let mut chunks = resp.bytes_stream();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        ensure_size(body.len() + chunk.len())?;
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn ensure_size(len: usize) -> Result<(), BiolinkError> {
    if len > MAX_SOURCE_BYTES {
        return Err(BiolinkError::Image(
            "Image file size must be less than 10MB".to_string(),
        ));
    }
    Ok(())
}

/// Serialize pixels as an inline `data:image/png;base64,...` string.
pub fn encode_png_data_uri(img: &RgbaImage) -> Result<String, BiolinkError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(buf.into_inner())
    ))
}
