//! HTTP response model and wire writer
//!
//! - `http`: the [`http::Response`] model, its header multimap, mime
//!   detection and the [`http::Responder`] wire writer
//! - `config`: layered configuration for the bundled file server
//! - `logger`: access and error logging
//! - `handler` / `server`: a small static file server built on the model

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
