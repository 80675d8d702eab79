//! Wire writer for HTTP/1.1 responses
//!
//! A [`Responder`] is a one-shot session bound to a single [`Transport`]. It is
//! consumed by [`Response::write`] or by one of its own convenience writers, so
//! a session can never emit two responses.
//!
//! Transport failures are not reported to the caller. The first failed write
//! is logged and the rest of the session's writes are skipped.

use std::io::{self, BufWriter, Write};
use std::net::TcpStream;

use hyper::body::Bytes;
use hyper::StatusCode;
use serde_json::Value;

use super::literals;
use super::response::Response;
use crate::logger;

/// Byte sink a response is written to
pub trait Transport {
    /// Whether the peer can still receive bytes
    fn is_connected(&self) -> bool;

    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Streams that can tell whether the remote end has gone away
pub trait PeerStatus {
    /// True once the peer is known to have closed the connection
    fn peer_closed(&self) -> bool {
        false
    }
}

impl PeerStatus for Vec<u8> {}

impl<S: Write + PeerStatus> PeerStatus for BufWriter<S> {
    fn peer_closed(&self) -> bool {
        self.get_ref().peer_closed()
    }
}

/// Peeks one byte without blocking; end-of-stream means the peer closed.
///
/// Expects a blocking socket and leaves it blocking.
impl PeerStatus for TcpStream {
    fn peer_closed(&self) -> bool {
        let mut buf = [0u8; 1];
        if self.set_nonblocking(true).is_err() {
            return true;
        }
        let peeked = self.peek(&mut buf);
        if self.set_nonblocking(false).is_err() {
            return true;
        }
        match peeked {
            Ok(0) => true,
            Ok(_) => false,
            Err(e) => !matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
            ),
        }
    }
}

/// Connection state as seen by the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Closed,
}

/// A [`Transport`] over any [`io::Write`] stream
///
/// The connection closes itself after the first failed write, and reports
/// itself disconnected once the stream sees its peer go away.
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
    state: ConnectionState,
}

impl<S: Write> Connection<S> {
    pub const fn new(stream: S) -> Self {
        Self {
            stream,
            state: ConnectionState::Connected,
        }
    }

    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Flush pending bytes and stop accepting writes
    pub fn close(&mut self) {
        if self.state == ConnectionState::Connected {
            if let Err(e) = self.stream.flush() {
                logger::log_error(&format!("Failed to flush connection: {e}"));
            }
            self.state = ConnectionState::Closed;
        }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Write + PeerStatus> Transport for Connection<S> {
    fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected && !self.stream.peer_closed()
    }

    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.state == ConnectionState::Closed {
            return Err(io::Error::from(io::ErrorKind::NotConnected));
        }
        self.stream.write_all(buf).inspect_err(|_| {
            self.state = ConnectionState::Closed;
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush().inspect_err(|_| {
            self.state = ConnectionState::Closed;
        })
    }
}

/// One-shot response writing session
///
/// Not `Clone`: moving it into a writer ends the session.
pub struct Responder<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
    failed: bool,
}

impl<'a, T: Transport + ?Sized> Responder<'a, T> {
    pub fn new(transport: &'a mut T) -> Self {
        Self {
            transport,
            failed: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Write `response` and end the session
    pub fn send(self, response: &Response) {
        response.write(self);
    }

    /// Write an empty response with `status`
    pub fn write_status(self, status: StatusCode) {
        Response::new(status).write(self);
    }

    /// Write `body` described as `mime_type`
    pub fn write_data(self, mime_type: impl Into<Bytes>, body: impl Into<Bytes>, status: StatusCode) {
        Response::with_mime_type(mime_type, body, status).write(self);
    }

    /// Write the compact form of `document` as `application/json`
    pub fn write_json(self, document: &Value, status: StatusCode) {
        Response::from_json(document, status).write(self);
    }

    pub(crate) fn write_status_line(&mut self, status: StatusCode) {
        let line = format!(
            " {} {}\r\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        );
        self.emit(literals::HTTP_VERSION);
        self.emit(line.as_bytes());
    }

    pub(crate) fn write_header(&mut self, name: &[u8], value: &[u8]) {
        self.emit(name);
        self.emit(b": ");
        self.emit(value);
        self.emit(b"\r\n");
    }

    /// Terminate the header block, then write `body` verbatim
    pub(crate) fn write_body(&mut self, body: &[u8]) {
        self.emit(b"\r\n");
        self.emit(body);
        if !self.failed {
            if let Err(e) = self.transport.flush() {
                self.fail(&e);
            }
        }
    }

    fn emit(&mut self, buf: &[u8]) {
        if self.failed || buf.is_empty() {
            return;
        }
        if let Err(e) = self.transport.write_bytes(buf) {
            self.fail(&e);
        }
    }

    fn fail(&mut self, err: &io::Error) {
        self.failed = true;
        logger::log_error(&format!("Failed to write response: {err}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use std::thread;
    use std::time::{Duration, Instant};

    fn socket_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    /// Accepts a fixed number of bytes, then fails every write
    struct Limited {
        written: Vec<u8>,
        capacity: usize,
        attempts: usize,
    }

    impl Transport for Limited {
        fn is_connected(&self) -> bool {
            true
        }

        fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
            self.attempts += 1;
            if self.written.len() + buf.len() > self.capacity {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            self.written.extend_from_slice(buf);
            Ok(())
        }
    }

    #[test]
    fn test_write_status() {
        let mut connection = Connection::new(Vec::new());
        Responder::new(&mut connection).write_status(StatusCode::NOT_FOUND);

        let wire = connection.into_inner();
        assert_eq!(
            wire,
            b"HTTP/1.1 404 Not Found\r\nContent-Type: application/x-empty\r\nContent-Length: 0\r\n\r\n"
                .to_vec()
        );
    }

    #[test]
    fn test_write_data() {
        let mut connection = Connection::new(Vec::new());
        Responder::new(&mut connection).write_data("text/css", "a{}", StatusCode::CREATED);

        let text = String::from_utf8(connection.into_inner()).unwrap();
        assert!(text.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(text.contains("Content-Type: text/css\r\n"));
        assert!(text.ends_with("Content-Length: 3\r\n\r\na{}"));
    }

    #[test]
    fn test_write_json() {
        let mut connection = Connection::new(Vec::new());
        Responder::new(&mut connection).write_json(&json!(["a", 1]), StatusCode::OK);

        let text = String::from_utf8(connection.into_inner()).unwrap();
        assert!(text.contains("Content-Type: application/json\r\n"));
        assert!(text.ends_with("\r\n\r\n[\"a\",1]"));
    }

    #[test]
    fn test_send_borrows_response() {
        let response = Response::from("shared");
        let mut first = Connection::new(Vec::new());
        let mut second = Connection::new(Vec::new());
        Responder::new(&mut first).send(&response);
        Responder::new(&mut second).send(&response);
        assert_eq!(first.into_inner(), second.into_inner());
    }

    #[test]
    fn test_unknown_status_has_empty_reason() {
        let status = StatusCode::from_u16(599).unwrap();
        let mut connection = Connection::new(Vec::new());
        Responder::new(&mut connection).write_status(status);
        assert!(connection.into_inner().starts_with(b"HTTP/1.1 599 \r\n"));
    }

    #[test]
    fn test_write_failure_stops_session() {
        let mut transport = Limited {
            written: Vec::new(),
            capacity: 12,
            attempts: 0,
        };
        Responder::new(&mut transport).write_data("text/plain", "body", StatusCode::OK);

        // "HTTP/1.1" fits, the rest of the status line does not
        assert_eq!(transport.written, b"HTTP/1.1".to_vec());
        assert_eq!(transport.attempts, 2);
    }

    #[test]
    fn test_failed_write_closes_connection() {
        struct Broken;

        impl PeerStatus for Broken {}

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::ConnectionReset))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut connection = Connection::new(Broken);
        assert!(connection.write_bytes(b"x").is_err());
        assert_eq!(connection.state(), ConnectionState::Closed);
        assert!(!connection.is_connected());
    }

    #[test]
    fn test_close_flushes_buffered_bytes() {
        let mut connection = Connection::new(BufWriter::new(Vec::new()));
        connection.write_bytes(b"pending").unwrap();
        connection.close();

        assert_eq!(connection.state(), ConnectionState::Closed);
        assert_eq!(connection.into_inner().into_inner().unwrap(), b"pending".to_vec());
    }

    #[test]
    fn test_open_socket_is_connected() {
        let (_client, server) = socket_pair();
        let connection = Connection::new(BufWriter::new(server));
        assert!(connection.is_connected());
    }

    #[test]
    fn test_unread_request_bytes_keep_socket_connected() {
        let (mut client, server) = socket_pair();
        client.write_all(b"GET / HTTP/1.1\r\n").unwrap();
        thread::sleep(Duration::from_millis(50));

        let connection = Connection::new(BufWriter::new(server));
        assert!(connection.is_connected());
    }

    #[test]
    fn test_peer_close_skips_write_without_error() {
        let (client, server) = socket_pair();
        let mut connection = Connection::new(BufWriter::new(server));
        drop(client);

        // The FIN arrives asynchronously
        let deadline = Instant::now() + Duration::from_secs(5);
        while connection.is_connected() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!connection.is_connected());

        Response::from("too late").write(Responder::new(&mut connection));

        // No write was attempted: nothing buffered and no failure recorded
        assert_eq!(connection.state(), ConnectionState::Connected);
        assert!(connection.into_inner().buffer().is_empty());
    }
}
