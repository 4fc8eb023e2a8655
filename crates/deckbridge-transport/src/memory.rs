use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::error::{Result, TransportError};
use crate::traits::{Connector, Received, Transport};
use crate::ws::Endpoint;

/// WebSocket close code for a normal closure.
pub const NORMAL_CLOSURE: u16 = 1000;
/// Close code reported to the peer when a transport is dropped without closing.
pub const ABNORMAL_CLOSURE: u16 = 1006;

enum Signal {
    Message(Bytes),
    Close { code: u16, reason: String },
    Wake,
}

/// One end of an in-memory duplex channel.
///
/// Behaves like a connected [`WsTransport`](crate::WsTransport): messages
/// arrive whole and in order, closing wakes a blocked receive on both ends,
/// and dropping an end without closing it looks like a broken connection to
/// the other end. Once either end has closed, sends on both ends fail.
pub struct MemoryTransport {
    inbox: Mutex<Receiver<Signal>>,
    wake: Sender<Signal>,
    peer: Sender<Signal>,
    closed: Arc<AtomicBool>,
    peer_closed: Arc<AtomicBool>,
}

impl MemoryTransport {
    /// Create two connected ends.
    pub fn pair() -> (Self, Self) {
        let (left_tx, left_rx) = mpsc::channel();
        let (right_tx, right_rx) = mpsc::channel();
        let left_closed = Arc::new(AtomicBool::new(false));
        let right_closed = Arc::new(AtomicBool::new(false));

        let left = Self {
            inbox: Mutex::new(left_rx),
            wake: left_tx.clone(),
            peer: right_tx.clone(),
            closed: Arc::clone(&left_closed),
            peer_closed: Arc::clone(&right_closed),
        };
        let right = Self {
            inbox: Mutex::new(right_rx),
            wake: right_tx,
            peer: left_tx,
            closed: right_closed,
            peer_closed: left_closed,
        };
        (left, right)
    }

    /// Close this end, reporting `code` to the peer.
    pub fn close_with(&self, code: u16, reason: impl Into<String>) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let _ = self.peer.send(Signal::Close {
            code,
            reason: reason.into(),
        });
        let _ = self.wake.send(Signal::Wake);
        Ok(())
    }
}

impl Transport for MemoryTransport {
    fn receive(&self) -> Result<Received> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }

        let inbox = lock(&self.inbox);
        match inbox.recv() {
            Ok(Signal::Message(message)) => Ok(Received::Message(message)),
            Ok(Signal::Close { code, reason }) => {
                // The channel is finished once the peer has closed.
                self.closed.store(true, Ordering::SeqCst);
                if code == NORMAL_CLOSURE {
                    Ok(Received::Closed)
                } else {
                    Err(TransportError::AbnormalClose { code, reason })
                }
            }
            Ok(Signal::Wake) | Err(_) => Ok(Received::Closed),
        }
    }

    fn send(&self, message: &[u8]) -> Result<()> {
        if self.is_closed() || self.peer_closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.peer
            .send(Signal::Message(Bytes::copy_from_slice(message)))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&self) -> Result<()> {
        self.close_with(NORMAL_CLOSURE, "")
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let _ = self.peer.send(Signal::Close {
                code: ABNORMAL_CLOSURE,
                reason: "peer dropped without closing".to_string(),
            });
        }
    }
}

impl fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTransport")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Hands out a single pre-built [`MemoryTransport`] on the first connect.
///
/// Later connects, and connects on an [`unreachable`](Self::unreachable)
/// connector, fail with a connection-refused error.
pub struct MemoryConnector {
    transport: Mutex<Option<MemoryTransport>>,
}

impl MemoryConnector {
    pub fn new(transport: MemoryTransport) -> Self {
        Self {
            transport: Mutex::new(Some(transport)),
        }
    }

    /// A connector whose endpoint never answers.
    pub fn unreachable() -> Self {
        Self {
            transport: Mutex::new(None),
        }
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, endpoint: &Endpoint) -> Result<Arc<dyn Transport>> {
        match lock(&self.transport).take() {
            Some(transport) => Ok(Arc::new(transport)),
            None => Err(TransportError::Connect {
                endpoint: endpoint.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "no in-memory transport available",
                ),
            }),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
