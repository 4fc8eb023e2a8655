use std::fmt;

/// Lifecycle of a [`Client`](crate::Client).
///
/// `Configured → Connected → Running → Stopped`. A client only exists once
/// its configuration has been validated, so there is no unconfigured state.
/// `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientState {
    /// Constructed; no connection yet.
    Configured,
    /// Connected and the registration handshake has been sent.
    Connected,
    /// Inside the receive loop.
    Running,
    /// Closed, either gracefully or after an error.
    Stopped,
}

impl ClientState {
    /// Whether commands may be sent in this state.
    pub fn is_connected(self) -> bool {
        matches!(self, ClientState::Connected | ClientState::Running)
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClientState::Configured => "configured",
            ClientState::Connected => "connected",
            ClientState::Running => "running",
            ClientState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
