//! Header names and mime type names shared by the response model and the writer.

pub const CONTENT_TYPE: &[u8] = b"Content-Type";
pub const CONTENT_LENGTH: &[u8] = b"Content-Length";

/// Reported by `Response::mime_type` when no usable `Content-Type` is stored
pub const TEXT_HTML: &[u8] = b"text/html";
pub const APPLICATION_JSON: &[u8] = b"application/json";

/// Marker stored by status-only responses, meaning "intentionally typeless"
pub const X_EMPTY: &[u8] = b"application/x-empty";

/// Protocol version written on every status line
pub const HTTP_VERSION: &[u8] = b"HTTP/1.1";
