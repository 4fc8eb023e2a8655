use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use tungstenite::protocol::frame::coding::CloseCode;
use tungstenite::protocol::frame::Utf8Bytes;
use tungstenite::protocol::{CloseFrame, Role, WebSocket};
use tungstenite::{Error as WsError, Message};

use crate::error::{Result, TransportError};
use crate::traits::{Connector, Received, Transport};

/// Host and port of the host application's message endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The host application always listens on the local machine.
    pub fn localhost(port: u16) -> Self {
        Self::new("localhost", port)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// WebSocket URL for the upgrade request.
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Read side of the socket.
///
/// Once the upgrade is done, frames the reader produces on its own (pongs,
/// close replies) are held here instead of written, and the transport puts
/// them on the wire under the writer lock so they never split an outgoing
/// message.
struct ReadHalf {
    stream: TcpStream,
    held: Vec<u8>,
    hold_writes: bool,
}

impl ReadHalf {
    fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            held: Vec::new(),
            hold_writes: false,
        }
    }
}

impl Read for ReadHalf {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for ReadHalf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.hold_writes {
            self.held.extend_from_slice(buf);
            Ok(buf.len())
        } else {
            self.stream.write(buf)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.hold_writes {
            Ok(())
        } else {
            self.stream.flush()
        }
    }
}

/// WebSocket transport over a single TCP connection.
///
/// The socket is cloned into independent read and write halves, each driven
/// by its own protocol state, so a blocked [`receive`](Transport::receive)
/// never holds up [`send`](Transport::send). Every write to the socket,
/// including the reader's automatic replies, goes out under the writer lock.
/// [`close`](Transport::close) shuts the socket down in both directions,
/// which wakes the reader.
pub struct WsTransport {
    endpoint: Endpoint,
    reader: Mutex<WebSocket<ReadHalf>>,
    writer: Mutex<WebSocket<TcpStream>>,
    control: TcpStream,
    closed: AtomicBool,
}

impl WsTransport {
    /// Connect and perform the WebSocket upgrade (blocking).
    pub fn connect(endpoint: &Endpoint) -> Result<Self> {
        let stream = TcpStream::connect((endpoint.host(), endpoint.port())).map_err(|source| {
            TransportError::Connect {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;
        stream.set_nodelay(true)?;
        let write_stream = stream.try_clone()?;
        let control = stream.try_clone()?;

        let (mut reader, _response) = tungstenite::client(endpoint.url(), ReadHalf::new(stream))
            .map_err(|err| TransportError::Upgrade {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            })?;
        reader.get_mut().hold_writes = true;
        let writer = WebSocket::from_raw_socket(write_stream, Role::Client, None);

        info!(%endpoint, "websocket connected");

        Ok(Self {
            endpoint: endpoint.clone(),
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            control,
            closed: AtomicBool::new(false),
        })
    }

    /// The endpoint this transport is connected to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Write the reader's held replies between whole outgoing messages.
    fn forward_replies(&self, half: &mut ReadHalf) {
        if half.held.is_empty() {
            return;
        }
        let replies = std::mem::take(&mut half.held);
        if self.is_closed() {
            return;
        }

        let mut writer = lock(&self.writer);
        let stream = writer.get_mut();
        if let Err(err) = stream.write_all(&replies).and_then(|()| stream.flush()) {
            debug!(endpoint = %self.endpoint, %err, "control reply not delivered");
        }
    }
}

impl Transport for WsTransport {
    fn receive(&self) -> Result<Received> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }

        let mut reader = lock(&self.reader);
        loop {
            let result = reader.read();
            if result.is_ok() {
                // Queued pong and close replies only reach the held buffer on flush.
                let _ = reader.flush();
            }
            self.forward_replies(reader.get_mut());

            match result {
                Ok(message @ (Message::Text(_) | Message::Binary(_))) => {
                    return Ok(Received::Message(message.into_data()));
                }
                Ok(Message::Close(frame)) => return close_outcome(frame),
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => continue,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                    return Ok(Received::Closed);
                }
                Err(_) if self.is_closed() => {
                    debug!(endpoint = %self.endpoint, "read interrupted by local close");
                    return Ok(Received::Closed);
                }
                Err(err) => return Err(TransportError::Read(err)),
            }
        }
    }

    fn send(&self, message: &[u8]) -> Result<()> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }

        let frame = match std::str::from_utf8(message) {
            Ok(text) => Message::text(text.to_owned()),
            Err(_) => Message::binary(message.to_vec()),
        };

        let mut writer = lock(&self.writer);
        writer.send(frame).map_err(|err| match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::Closed,
            other => TransportError::Write(other),
        })
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        // A sender blocked on a full socket holds the writer; skip the close
        // frame rather than wait on it.
        if let Ok(mut writer) = self.writer.try_lock() {
            let frame = CloseFrame {
                code: CloseCode::Normal,
                reason: Utf8Bytes::from_static(""),
            };
            if let Err(err) = writer.close(Some(frame)).and_then(|()| writer.flush()) {
                debug!(endpoint = %self.endpoint, %err, "close frame not delivered");
            }
        }

        match self.control.shutdown(Shutdown::Both) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotConnected => {}
            Err(err) => return Err(err.into()),
        }

        info!(endpoint = %self.endpoint, "websocket closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsTransport")
            .field("endpoint", &self.endpoint)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Opens [`WsTransport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, endpoint: &Endpoint) -> Result<Arc<dyn Transport>> {
        Ok(Arc::new(WsTransport::connect(endpoint)?))
    }
}

fn close_outcome(frame: Option<CloseFrame>) -> Result<Received> {
    match frame {
        None => Ok(Received::Closed),
        Some(frame) if frame.code == CloseCode::Normal => Ok(Received::Closed),
        Some(frame) => {
            let code = u16::from(frame.code);
            warn!(code, reason = %frame.reason.as_str(), "peer closed connection abnormally");
            Err(TransportError::AbnormalClose {
                code,
                reason: frame.reason.as_str().to_owned(),
            })
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn local_server<F>(serve: F) -> (Endpoint, thread::JoinHandle<()>)
    where
        F: FnOnce(WebSocket<TcpStream>) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
        let port = listener.local_addr().expect("listener has address").port();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("server should accept");
            let ws = tungstenite::accept(stream).expect("upgrade should succeed");
            serve(ws);
        });
        (Endpoint::new("127.0.0.1", port), handle)
    }

    fn drain(ws: &mut WebSocket<TcpStream>) {
        while ws.read().is_ok() {}
    }

    #[test]
    fn send_and_receive_text_messages() {
        let (endpoint, server) = local_server(|mut ws| {
            let msg = ws.read().expect("server should read");
            assert!(msg.is_text());
            let reply = format!("echo:{}", msg.to_text().expect("text payload"));
            ws.send(Message::text(reply)).expect("server should reply");
            ws.close(None).expect("server should close");
            drain(&mut ws);
        });

        let transport = WsTransport::connect(&endpoint).expect("client should connect");
        transport.send(br#"{"event":"ping"}"#).expect("send should succeed");

        let received = transport.receive().expect("receive should succeed");
        assert_eq!(
            received,
            Received::Message(bytes::Bytes::from_static(br#"echo:{"event":"ping"}"#))
        );
        assert_eq!(transport.receive().expect("close is graceful"), Received::Closed);

        drop(transport);
        server.join().expect("server thread should finish");
    }

    #[test]
    fn pings_are_answered_while_receiving() {
        let (endpoint, server) = local_server(|mut ws| {
            ws.send(Message::Ping(vec![7u8; 4].into()))
                .expect("server should ping");
            loop {
                match ws.read().expect("server should read") {
                    Message::Pong(payload) => {
                        assert_eq!(&payload[..], &[7u8; 4]);
                        break;
                    }
                    other => panic!("expected pong, got {other:?}"),
                }
            }
            ws.send(Message::text("after pong")).expect("server should send");
            ws.close(None).expect("server should close");
            drain(&mut ws);
        });

        let transport = WsTransport::connect(&endpoint).expect("client should connect");
        assert_eq!(
            transport.receive().expect("receive should succeed"),
            Received::Message(bytes::Bytes::from_static(b"after pong"))
        );
        assert_eq!(transport.receive().expect("close is graceful"), Received::Closed);

        drop(transport);
        server.join().expect("server thread should finish");
    }

    #[test]
    fn abnormal_close_is_an_error() {
        let (endpoint, server) = local_server(|mut ws| {
            ws.close(Some(CloseFrame {
                code: CloseCode::Error,
                reason: Utf8Bytes::from_static("boom"),
            }))
            .expect("server should close");
            drain(&mut ws);
        });

        let transport = WsTransport::connect(&endpoint).expect("client should connect");
        let err = transport.receive().unwrap_err();
        match err {
            TransportError::AbnormalClose { code, reason } => {
                assert_eq!(code, 1011);
                assert_eq!(reason, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }

        drop(transport);
        server.join().expect("server thread should finish");
    }

    #[test]
    fn local_close_unblocks_receive() {
        let (endpoint, server) = local_server(|mut ws| drain(&mut ws));

        let transport =
            Arc::new(WsTransport::connect(&endpoint).expect("client should connect"));
        let reader = {
            let transport = Arc::clone(&transport);
            thread::spawn(move || transport.receive())
        };

        thread::sleep(Duration::from_millis(50));
        transport.close().expect("close should succeed");

        let outcome = reader.join().expect("reader thread should finish");
        assert_eq!(outcome.expect("blocked receive ends cleanly"), Received::Closed);
        assert!(matches!(transport.send(b"late"), Err(TransportError::Closed)));
        assert!(matches!(transport.receive(), Err(TransportError::Closed)));
        transport.close().expect("close is idempotent");

        server.join().expect("server thread should finish");
    }

    #[test]
    fn connect_to_unreachable_endpoint_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
        let port = listener.local_addr().expect("listener has address").port();
        drop(listener);

        let err = WsTransport::connect(&Endpoint::new("127.0.0.1", port)).unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
    }

    #[test]
    fn rejected_upgrade_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
        let port = listener.local_addr().expect("listener has address").port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("server should accept");
            let mut buf = [0u8; 1024];
            let _ = std::io::Read::read(&mut stream, &mut buf);
            stream
                .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n")
                .expect("server should respond");
        });

        let err = WsTransport::connect(&Endpoint::new("127.0.0.1", port)).unwrap_err();
        assert!(matches!(err, TransportError::Upgrade { .. }));
        server.join().expect("server thread should finish");
    }

    #[test]
    fn endpoint_formats() {
        let endpoint = Endpoint::localhost(28196);
        assert_eq!(endpoint.url(), "ws://localhost:28196");
        assert_eq!(endpoint.to_string(), "localhost:28196");
    }
}
