//! Event dispatch client for Stream Deck plugins.
//!
//! Connects to the host, sends the registration handshake, and runs a
//! blocking receive loop that routes each tagged message to at most one
//! handler per event kind. Commands can be sent from any thread while the
//! loop runs.
//!
//! ```no_run
//! use deckbridge_client::{Client, ClientConfig};
//! use deckbridge_protocol::{KeyDownEvent, Target};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new(28196, "plugin-uuid", "registerPlugin", "{}");
//! let client = Client::new(config)?;
//! client.on(|client: &Client, event: &KeyDownEvent| {
//!     let _ = client.set_title(&event.context, "pressed", Target::Both);
//! });
//! client.run()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod devices;
pub mod error;
pub mod handler;
mod registry;
pub mod state;

pub use client::{Client, DispatchOutcome};
pub use config::{ClientConfig, ConfigError};
pub use devices::DeviceRegistry;
pub use error::{ClientError, Result};
pub use handler::Handler;
pub use state::ClientState;
