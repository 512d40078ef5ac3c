use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

pub const JPEG_MIME: &str = "image/jpeg";

static DATA_URL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:[A-Za-z0-9.+-]+/[A-Za-z0-9.+-]+(?:;[^,;]+)*;base64,")
        .expect("valid data url regex")
});

pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    if data.len() > 12 {
        let ftyp = &data[4..12];
        if ftyp.starts_with(b"ftyp") {
            let brand = &ftyp[4..8];
            if brand == b"heic" || brand == b"heif" || brand == b"hevc" {
                return Some("image/heic".to_string());
            }
        }
    }

    infer::get(data).map(|kind| kind.mime_type().to_string())
}

pub fn strip_data_url_prefix(value: &str) -> &str {
    let trimmed = value.trim();
    match DATA_URL_PREFIX_RE.find(trimmed) {
        Some(prefix) => &trimmed[prefix.end()..],
        None => trimmed,
    }
}

/// Decodes base64 image data, with or without a `data:` URL prefix.
pub fn decode_base64_image(value: &str) -> Option<Vec<u8>> {
    let payload = strip_data_url_prefix(value);
    if payload.is_empty() {
        return None;
    }
    match BASE64_STANDARD.decode(payload) {
        Ok(bytes) if !bytes.is_empty() => Some(bytes),
        Ok(_) => None,
        Err(err) => {
            warn!("Failed to decode base64 image payload: {err}");
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Downscales so the longer edge is at most `max_dimension` and re-encodes as JPEG.
/// Undecodable input is passed through with its sniffed MIME type.
pub fn prepare_image(data: &[u8], max_dimension: u32, quality: u8) -> PreparedImage {
    let passthrough = || PreparedImage {
        bytes: data.to_vec(),
        mime_type: detect_mime_type(data).unwrap_or_else(|| JPEG_MIME.to_string()),
    };

    let decoded = match image::load_from_memory(data) {
        Ok(decoded) => decoded,
        Err(err) => {
            debug!("Image decode failed, uploading original bytes: {err}");
            return passthrough();
        }
    };

    let max_dimension = max_dimension.max(1);
    let resized = if decoded.width() > max_dimension || decoded.height() > max_dimension {
        decoded.resize(max_dimension, max_dimension, FilterType::Triangle)
    } else {
        decoded
    };

    let rgb = resized.to_rgb8();
    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut encoded, quality.clamp(1, 100));
    if let Err(err) = encoder.encode_image(&rgb) {
        warn!("JPEG re-encode failed, uploading original bytes: {err}");
        return passthrough();
    }

    PreparedImage {
        bytes: encoded,
        mime_type: JPEG_MIME.to_string(),
    }
}
