//! HTTP response model
//!
//! A [`Response`] holds a status code, a body and an ordered header multimap.
//! Every constructor normalizes its input into `{mime type, body, status}`;
//! only the headers may change afterwards. Writing is done through
//! [`Response::write`], which borrows the response and consumes a
//! [`Responder`] session.
//!
//! # Example
//! ```
//! use http_responder::http::{Connection, Responder, Response};
//!
//! let mut response = Response::from("Hello");
//! response.add_header("X-Count", "1");
//!
//! let mut connection = Connection::new(Vec::new());
//! response.write(Responder::new(&mut connection));
//!
//! let wire = connection.into_inner();
//! assert!(wire.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! assert!(wire.ends_with(b"Content-Length: 5\r\n\r\nHello"));
//! ```

use std::path::Path;

use hyper::body::Bytes;
use hyper::StatusCode;
use serde_json::{Map, Value};

use super::headers::Headers;
use super::literals;
use super::mime;
use super::responder::{Responder, Transport};

/// An outgoing HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    body: Bytes,
    headers: Headers,
}

impl Response {
    /// Create an empty response with the given status
    ///
    /// `Content-Type` is set to the `application/x-empty` marker so that the
    /// response is recognisably typeless; [`Response::mime_type`] still
    /// reports the `text/html` fallback.
    pub fn new(status: StatusCode) -> Self {
        Self::with_mime_type(literals::X_EMPTY, Bytes::new(), status)
    }

    /// Create a response from a mime type, a body and a status
    ///
    /// An empty `mime_type` leaves `Content-Type` unset.
    pub fn with_mime_type(
        mime_type: impl Into<Bytes>,
        body: impl Into<Bytes>,
        status: StatusCode,
    ) -> Self {
        let mut response = Self {
            status,
            body: body.into(),
            headers: Headers::new(),
        };
        let mime_type = mime_type.into();
        if !mime_type.is_empty() {
            response.set_header(literals::CONTENT_TYPE, mime_type);
        }
        response
    }

    /// Create a `200 OK` response whose mime type is sniffed from `body`
    pub fn from_data(body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let mime_type = mime::from_data(&body);
        Self::with_mime_type(mime_type, body, StatusCode::OK)
    }

    /// Create an `application/json` response holding the compact form of `document`
    pub fn from_json(document: &Value, status: StatusCode) -> Self {
        Self::with_mime_type(literals::APPLICATION_JSON, document.to_string(), status)
    }

    /// Build a response from the content of the file at `path`
    ///
    /// The file is read whole. If it cannot be opened for any reason, the
    /// result is an empty `404 Not Found` response rather than an error. The
    /// caller is responsible for deciding which paths may be served.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(data) => {
                let mime_type = mime::from_name_and_data(path, &data);
                Self::with_mime_type(mime_type, data, StatusCode::OK)
            }
            Err(_) => Self::new(StatusCode::NOT_FOUND),
        }
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }

    pub const fn status_code(&self) -> StatusCode {
        self.status
    }

    /// First stored `Content-Type` value other than the typeless marker of
    /// [`Response::new`]
    ///
    /// Defaults to `text/html` when there is none.
    pub fn mime_type(&self) -> &[u8] {
        let usable = self
            .headers
            .get_all(literals::CONTENT_TYPE)
            .find(|value| &value[..] != literals::X_EMPTY);
        match usable {
            Some(value) => &value[..],
            None => literals::TEXT_HTML,
        }
    }

    /// Add a header without overriding previously set headers of the same name
    pub fn add_header(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.headers.add(name, value);
    }

    /// Add every `(name, value)` pair in order, overriding nothing
    pub fn add_headers<I, N, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<Bytes>,
        V: Into<Bytes>,
    {
        for (name, value) in headers {
            self.add_header(name, value);
        }
    }

    /// Set a header, overriding every previously set header of the same name
    pub fn set_header(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.headers.set(name, value);
    }

    /// Set every `(name, value)` pair in order
    ///
    /// When a name repeats within `headers`, only its last pair survives.
    pub fn set_headers<I, N, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<Bytes>,
        V: Into<Bytes>,
    {
        for (name, value) in headers {
            self.set_header(name, value);
        }
    }

    /// Remove every header named `name`
    pub fn clear_header(&mut self, name: impl AsRef<[u8]>) {
        self.headers.remove(name.as_ref());
    }

    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    pub fn has_header(&self, name: impl AsRef<[u8]>) -> bool {
        self.headers.contains(name.as_ref())
    }

    /// True if a header named `name` carries exactly `value`
    pub fn has_header_value(&self, name: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> bool {
        self.headers.contains_value(name.as_ref(), value.as_ref())
    }

    /// Values of every header named `name`, in insertion order
    pub fn headers(&self, name: impl AsRef<[u8]>) -> Vec<Bytes> {
        self.headers.get_all(name.as_ref()).cloned().collect()
    }

    /// All stored headers in the order they will be written
    pub fn header_entries(&self) -> impl Iterator<Item = (&Bytes, &Bytes)> {
        self.headers.iter()
    }

    /// Write the response into `responder`
    ///
    /// Nothing is written if the connection is already closed. Otherwise the
    /// status line, the stored headers, a `Content-Length` computed from the
    /// body and the body itself are written, in that order.
    pub fn write<T: Transport + ?Sized>(&self, mut responder: Responder<'_, T>) {
        if !responder.is_connected() {
            return;
        }

        responder.write_status_line(self.status);

        for (name, value) in self.headers.iter() {
            responder.write_header(name, value);
        }

        let length = self.body.len().to_string();
        responder.write_header(literals::CONTENT_LENGTH, length.as_bytes());

        responder.write_body(&self.body);
    }
}

impl From<StatusCode> for Response {
    fn from(status: StatusCode) -> Self {
        Self::new(status)
    }
}

impl From<&'static str> for Response {
    fn from(data: &'static str) -> Self {
        Self::from_data(data)
    }
}

impl From<String> for Response {
    fn from(data: String) -> Self {
        Self::from_data(data)
    }
}

impl From<&'static [u8]> for Response {
    fn from(data: &'static [u8]) -> Self {
        Self::from_data(data)
    }
}

impl From<Vec<u8>> for Response {
    fn from(data: Vec<u8>) -> Self {
        Self::from_data(data)
    }
}

impl From<Bytes> for Response {
    fn from(data: Bytes) -> Self {
        Self::from_data(data)
    }
}

impl From<Map<String, Value>> for Response {
    fn from(object: Map<String, Value>) -> Self {
        Self::from_json(&Value::Object(object), StatusCode::OK)
    }
}

impl From<Vec<Value>> for Response {
    fn from(array: Vec<Value>) -> Self {
        Self::from_json(&Value::Array(array), StatusCode::OK)
    }
}
