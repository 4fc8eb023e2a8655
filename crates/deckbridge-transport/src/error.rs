/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The TCP connection to the endpoint could not be established.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        source: std::io::Error,
    },

    /// The WebSocket upgrade handshake was rejected or failed.
    #[error("websocket upgrade with {endpoint} failed: {reason}")]
    Upgrade { endpoint: String, reason: String },

    /// Reading from the channel failed.
    #[error("read failed: {0}")]
    Read(#[source] tungstenite::Error),

    /// Writing to the channel failed.
    #[error("write failed: {0}")]
    Write(#[source] tungstenite::Error),

    /// The peer closed the channel with a code other than normal closure.
    #[error("connection closed abnormally (code {code}): {reason}")]
    AbnormalClose { code: u16, reason: String },

    /// An I/O error occurred on the underlying socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport has been closed.
    #[error("transport closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
