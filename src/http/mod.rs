//! HTTP response layer
//!
//! Response model, header multimap, mime detection and the wire writer.
//! Independent of any particular server; the transport is abstracted by
//! [`responder::Transport`].

pub mod headers;
pub mod literals;
pub mod mime;
pub mod responder;
pub mod response;

// Re-export commonly used types
pub use headers::Headers;
pub use hyper::StatusCode;
pub use responder::{Connection, ConnectionState, PeerStatus, Responder, Transport};
pub use response::Response;
