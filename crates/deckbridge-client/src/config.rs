use deckbridge_transport::Endpoint;

/// Errors in the startup parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The port is outside 1-65535.
    #[error("invalid port {0} (expected 1-65535)")]
    InvalidPort(i64),

    /// A required parameter was empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// The four parameters the host passes to a plugin at launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// TCP port of the host's local WebSocket endpoint.
    pub port: i64,
    /// Identifier the host assigned to this plugin instance.
    pub plugin_uuid: String,
    /// Event name to use for the registration handshake.
    pub register_event: String,
    /// JSON blob describing the host environment and attached devices.
    pub info: String,
}

impl ClientConfig {
    pub fn new(
        port: i64,
        plugin_uuid: impl Into<String>,
        register_event: impl Into<String>,
        info: impl Into<String>,
    ) -> Self {
        Self {
            port,
            plugin_uuid: plugin_uuid.into(),
            register_event: register_event.into(),
            info: info.into(),
        }
    }

    /// Check ranges and presence, returning the validated port.
    pub fn validate(&self) -> Result<u16, ConfigError> {
        let port = u16::try_from(self.port)
            .ok()
            .filter(|port| *port != 0)
            .ok_or(ConfigError::InvalidPort(self.port))?;

        if self.plugin_uuid.is_empty() {
            return Err(ConfigError::Empty("pluginUUID"));
        }
        if self.register_event.is_empty() {
            return Err(ConfigError::Empty("registerEvent"));
        }
        if self.info.is_empty() {
            return Err(ConfigError::Empty("info"));
        }

        Ok(port)
    }

    /// The host endpoint on the local machine.
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        Ok(Endpoint::localhost(self.validate()?))
    }
}
