// Connection handling module
// Reads one request head, then writes one response over a blocking socket

use std::io::{self, BufWriter};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::TcpStream;

use super::request::read_request_head;
use crate::config::Config;
use crate::handler;
use crate::http::{Connection, Responder, Response, StatusCode};
use crate::logger::{self, AccessLogEntry};

/// Serve a single connection: one request, one response, then close.
///
/// The request head is read asynchronously. Building and writing the response
/// block on file and socket I/O, so both run on tokio's blocking pool.
pub async fn handle_connection(mut stream: TcpStream, peer_addr: SocketAddr, config: Arc<Config>) {
    let started = Instant::now();
    let timeout = Duration::from_secs(config.performance.read_timeout);

    let head =
        match read_request_head(&mut stream, config.performance.max_request_head, timeout).await {
            Ok(Some(head)) => head,
            // Peer left before finishing its request
            Ok(None) => return,
            Err(e) => {
                let status = match e.kind() {
                    io::ErrorKind::TimedOut => StatusCode::REQUEST_TIMEOUT,
                    io::ErrorKind::InvalidData => StatusCode::BAD_REQUEST,
                    _ => {
                        logger::log_connection_error(&e);
                        return;
                    }
                };
                logger::log_warning(&format!("Rejecting request from {peer_addr}: {e}"));
                write_blocking(stream, timeout, move || Response::new(status)).await;
                return;
            }
        };

    let files = config.files.clone();
    let route_head = head.clone();
    let Some(response) =
        write_blocking(stream, timeout, move || handler::route(&route_head, &files)).await
    else {
        return;
    };

    if config.logging.access_log {
        let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), head.method, head.path);
        entry.query = head.query;
        entry.http_version = head.version;
        entry.status = response.status_code().as_u16();
        entry.body_bytes = response.body().len();
        entry.content_type = String::from_utf8_lossy(response.mime_type()).into_owned();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &config.logging.access_log_format);
    }
}

/// Build a response on the blocking pool and write it to `stream`
///
/// Returns the written response, or `None` if the socket could not be
/// switched to blocking mode.
async fn write_blocking<F>(stream: TcpStream, timeout: Duration, build: F) -> Option<Response>
where
    F: FnOnce() -> Response + Send + 'static,
{
    let stream = match stream.into_std() {
        Ok(s) => s,
        Err(e) => {
            logger::log_connection_error(&e);
            return None;
        }
    };

    let task = tokio::task::spawn_blocking(move || -> io::Result<Response> {
        stream.set_nonblocking(false)?;
        stream.set_write_timeout((!timeout.is_zero()).then_some(timeout))?;

        let response = build();
        let mut connection = Connection::new(BufWriter::new(stream));
        response.write(Responder::new(&mut connection));
        connection.close();
        Ok(response)
    });

    match task.await {
        Ok(Ok(response)) => Some(response),
        Ok(Err(e)) => {
            logger::log_connection_error(&e);
            None
        }
        Err(e) => {
            logger::log_error(&format!("Response task failed: {e}"));
            None
        }
    }
}
