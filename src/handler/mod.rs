//! Request handler module
//!
//! Turns a request head into a [`Response`]: the health path answers with a
//! JSON document, GET requests are served from the document root, and any
//! other method is refused.

pub mod static_files;

use serde_json::json;

use crate::config::FilesConfig;
use crate::http::{Response, StatusCode};
use crate::server::request::RequestHead;

/// Build the response for `head`
pub fn route(head: &RequestHead, files: &FilesConfig) -> Response {
    if head.method != "GET" {
        let mut response = Response::new(StatusCode::METHOD_NOT_ALLOWED);
        response.set_header("Allow", "GET");
        return response;
    }

    if head.path == files.health_path {
        return Response::from_json(&json!({"status": "ok"}), StatusCode::OK);
    }

    static_files::serve(&files.root, &head.path, &files.index_files)
}
