//! Stream Deck plugin SDK.
//!
//! A plugin is launched by the host with a port, a plugin UUID, a
//! registration event name, and an info blob. deckbridge connects to the
//! host's local WebSocket endpoint, registers, and routes each inbound event
//! to a typed handler while commands flow back from any thread.
//!
//! # Crate Structure
//!
//! - [`transport`]: message transports (WebSocket over TCP, in-memory pair)
//! - [`protocol`]: event kinds, typed events, commands, launch info
//! - [`client`]: the dispatch client (behind the `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use deckbridge_transport::*;
}

/// Re-export protocol types.
pub mod protocol {
    pub use deckbridge_protocol::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use deckbridge_client::*;
}
