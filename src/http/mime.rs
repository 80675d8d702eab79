//! MIME type detection module
//!
//! Two detection services are offered to the response model:
//! - [`from_data`] inspects magic signatures and falls back to a text check
//! - [`from_name_and_data`] trusts a known file extension first, then the content

use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const TEXT_PLAIN: &str = "text/plain";
pub const ZERO_SIZE: &str = "application/x-zerosize";

/// Only the head of the payload is inspected
const SNIFF_LEN: usize = 512;

/// Get MIME type based on file extension, matched case-insensitively
///
/// # Examples
/// ```
/// use http_responder::http::mime::for_extension;
/// assert_eq!(for_extension(Some("html")), Some("text/html"));
/// assert_eq!(for_extension(Some("MP4")), Some("video/mp4"));
/// assert_eq!(for_extension(Some("xyz")), None);
/// ```
pub fn for_extension(extension: Option<&str>) -> Option<&'static str> {
    let ext = extension?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        // Text
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "xml" => "application/xml",

        // JavaScript/WASM
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        "webp" => "image/webp",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",

        // Audio
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/x-wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",

        _ => return None,
    };
    Some(mime)
}

/// Detect a MIME type from the payload alone
///
/// Empty payloads are `application/x-zerosize`. Unrecognised payloads are
/// `text/plain` when they read as control-free UTF-8, otherwise
/// `application/octet-stream`.
pub fn from_data(data: &[u8]) -> &'static str {
    if data.is_empty() {
        return ZERO_SIZE;
    }
    let head = &data[..data.len().min(SNIFF_LEN)];

    if let Some(mime) = match_signature(head) {
        return mime;
    }
    if let Some(mime) = match_markup(head) {
        return mime;
    }
    if looks_like_text(head, data.len() > SNIFF_LEN) {
        TEXT_PLAIN
    } else {
        OCTET_STREAM
    }
}

/// Detect a MIME type from a file name and its content
///
/// A recognised extension wins; otherwise the content decides.
pub fn from_name_and_data(path: &Path, data: &[u8]) -> &'static str {
    let extension = path.extension().and_then(|e| e.to_str());
    for_extension(extension).unwrap_or_else(|| from_data(data))
}

fn match_signature(head: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"%PDF-", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b", "application/gzip"),
        (b"\0asm", "application/wasm"),
        (b"wOFF", "font/woff"),
        (b"wOF2", "font/woff2"),
        (b"ID3", "audio/mpeg"),
        (b"OggS", "audio/ogg"),
        (b"fLaC", "audio/flac"),
    ];

    if let Some(&(_, mime)) = SIGNATURES.iter().find(|(magic, _)| head.starts_with(magic)) {
        return Some(mime);
    }

    // RIFF containers carry their form type at offset 8
    if head.len() >= 12 && head.starts_with(b"RIFF") {
        return match &head[8..12] {
            b"WEBP" => Some("image/webp"),
            b"WAVE" => Some("audio/x-wav"),
            b"AVI " => Some("video/x-msvideo"),
            _ => None,
        };
    }
    None
}

fn match_markup(head: &[u8]) -> Option<&'static str> {
    let head = head.strip_prefix(b"\xef\xbb\xbf").unwrap_or(head);
    let start = head.iter().position(|b| !b.is_ascii_whitespace())?;
    let trimmed = &head[start..];

    let starts_with_ci = |prefix: &[u8]| {
        trimmed.len() >= prefix.len() && trimmed[..prefix.len()].eq_ignore_ascii_case(prefix)
    };

    if starts_with_ci(b"<!doctype html") || starts_with_ci(b"<html") {
        Some("text/html")
    } else if starts_with_ci(b"<svg") {
        Some("image/svg+xml")
    } else if starts_with_ci(b"<?xml") {
        let is_svg = trimmed.windows(4).any(|w| w.eq_ignore_ascii_case(b"<svg"));
        Some(if is_svg { "image/svg+xml" } else { "application/xml" })
    } else {
        None
    }
}

fn looks_like_text(head: &[u8], truncated: bool) -> bool {
    let valid = match std::str::from_utf8(head) {
        Ok(_) => true,
        // A multi-byte sequence cut off at the sniff boundary is still text
        Err(e) => truncated && e.error_len().is_none(),
    };
    valid
        && !head
            .iter()
            .any(|&b| b.is_ascii_control() && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c))
}
