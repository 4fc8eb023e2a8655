use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;
use crate::ws::Endpoint;

/// Outcome of a blocking receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// One complete message.
    Message(Bytes),
    /// The channel was closed gracefully, either by the peer with a normal
    /// closure or locally through [`Transport::close`].
    Closed,
}

/// A full-duplex, message-oriented channel.
///
/// Reads and writes are independent directions: one thread may block in
/// [`receive`](Transport::receive) while others call
/// [`send`](Transport::send) or [`close`](Transport::close).
pub trait Transport: Send + Sync {
    /// Block until one complete message arrives or the channel closes.
    ///
    /// A receive that is blocked when the transport is closed locally
    /// returns `Ok(Received::Closed)`. Calls made after close fail with
    /// [`TransportError::Closed`](crate::TransportError::Closed).
    fn receive(&self) -> Result<Received>;

    /// Transmit one complete message.
    fn send(&self, message: &[u8]) -> Result<()>;

    /// Release the channel. Idempotent.
    fn close(&self) -> Result<()>;

    /// Whether [`close`](Transport::close) has been called.
    fn is_closed(&self) -> bool;
}

/// Opens transports against an endpoint.
///
/// This is the seam where the dispatch client obtains its channel, so tests
/// can substitute an in-memory pair for the real socket.
pub trait Connector: Send + Sync {
    fn connect(&self, endpoint: &Endpoint) -> Result<Arc<dyn Transport>>;
}
