//! Message transport for Stream Deck plugins.
//!
//! Carries whole, opaque messages over a persistent duplex channel:
//! - WebSocket over TCP to the host's local endpoint ([`WsTransport`])
//! - An in-memory pair for tests and embedders ([`MemoryTransport`])
//!
//! This is the lowest layer of deckbridge. Framing belongs to the channel;
//! callers always send and receive complete messages.

pub mod error;
pub mod memory;
pub mod traits;
pub mod ws;

pub use error::{Result, TransportError};
pub use memory::{MemoryConnector, MemoryTransport};
pub use traits::{Connector, Received, Transport};
pub use ws::{Endpoint, WsConnector, WsTransport};
