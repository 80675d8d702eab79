//! Request head reading
//!
//! Reads just enough of a request to pick a response: the request line. Header
//! fields are read and discarded.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

/// Method, target and version of a request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    /// Target path with any query string removed
    pub path: String,
    pub query: Option<String>,
    /// Version digits, e.g. "1.1"
    pub version: String,
}

impl RequestHead {
    /// Parse a request line such as `GET /index.html?v=1 HTTP/1.1`
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_ascii_whitespace();
        let method = parts.next()?;
        let target = parts.next()?;
        let version = parts.next()?.strip_prefix("HTTP/")?;
        if parts.next().is_some() {
            return None;
        }

        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (target, None),
        };

        Some(Self {
            method: method.to_string(),
            path: path.to_string(),
            query,
            version: version.to_string(),
        })
    }
}

/// Read a request head from `stream`
///
/// Returns `Ok(None)` when the peer closes the connection before sending a
/// complete head. Heads longer than `limit` bytes are rejected with
/// `InvalidData`, slow clients with `TimedOut`.
pub async fn read_request_head<R>(
    stream: &mut R,
    limit: usize,
    timeout: Duration,
) -> io::Result<Option<RequestHead>>
where
    R: AsyncRead + Unpin,
{
    let raw = match tokio::time::timeout(timeout, read_head_bytes(stream, limit)).await {
        Ok(result) => result?,
        Err(_) => return Err(io::Error::from(io::ErrorKind::TimedOut)),
    };
    let Some(raw) = raw else {
        return Ok(None);
    };

    let text = String::from_utf8_lossy(&raw);
    let line = text.lines().next().unwrap_or_default();
    RequestHead::parse(line)
        .map(Some)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "malformed request line"))
}

async fn read_head_bytes<R>(stream: &mut R, limit: usize) -> io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = find_head_end(&buf) {
            buf.truncate(end);
            return Ok(Some(buf));
        }
        if buf.len() > limit {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "request head too large",
            ));
        }
    }
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_line() {
        let head = RequestHead::parse("GET /docs/a.html?v=1&x=2 HTTP/1.1").unwrap();
        assert_eq!(head.method, "GET");
        assert_eq!(head.path, "/docs/a.html");
        assert_eq!(head.query.as_deref(), Some("v=1&x=2"));
        assert_eq!(head.version, "1.1");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(RequestHead::parse("").is_none());
        assert!(RequestHead::parse("GET /").is_none());
        assert!(RequestHead::parse("GET / FTP/1.0").is_none());
        assert!(RequestHead::parse("GET / HTTP/1.1 extra").is_none());
    }

    #[tokio::test]
    async fn test_read_head() {
        let mut input: &[u8] = b"GET /index.html HTTP/1.0\r\nHost: x\r\n\r\nignored body";
        let head = read_request_head(&mut input, 1024, Duration::from_secs(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(head.path, "/index.html");
        assert_eq!(head.version, "1.0");
    }

    #[tokio::test]
    async fn test_read_head_eof() {
        let mut input: &[u8] = b"GET / HTTP/1.1\r\n";
        let head = read_request_head(&mut input, 1024, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(head.is_none());
    }

    #[tokio::test]
    async fn test_read_head_too_large() {
        let long = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(4096));
        let mut input = long.as_bytes();
        let err = read_request_head(&mut input, 256, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
