use deckbridge_protocol::ProtocolError;
use deckbridge_transport::TransportError;

use crate::config::ConfigError;
use crate::state::ClientState;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Startup parameters were missing or out of range.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A message or the registration info could not be decoded or encoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The initial connection to the host failed.
    #[error("connection failed: {0}")]
    Connection(#[source] TransportError),

    /// The receive loop ended on a broken or abnormally closed channel.
    #[error("receive failed: {0}")]
    Read(#[source] TransportError),

    /// A message could not be sent.
    #[error("send failed: {0}")]
    Write(#[source] TransportError),

    /// The operation needs a live connection the client does not have.
    #[error("client not connected (state: {state})")]
    NotConnected { state: ClientState },
}

pub type Result<T> = std::result::Result<T, ClientError>;
