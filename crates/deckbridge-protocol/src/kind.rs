//! Inbound event kinds.
//!
//! The host tags every message with an `"event"` string. Known tags map onto
//! [`EventKind`]; anything else is kept as [`EventTag::Unknown`] so it can be
//! logged without being mistaken for a typo of a known kind.

use std::fmt;

use serde::Deserialize;

use crate::error::{ProtocolError, Result};

/// The nine inbound event kinds a plugin can handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    ApplicationDidLaunch,
    ApplicationDidTerminate,
    DeviceDidConnect,
    DeviceDidDisconnect,
    KeyDown,
    KeyUp,
    TitleParametersDidChange,
    WillAppear,
    WillDisappear,
}

impl EventKind {
    pub const ALL: [EventKind; 9] = [
        EventKind::ApplicationDidLaunch,
        EventKind::ApplicationDidTerminate,
        EventKind::DeviceDidConnect,
        EventKind::DeviceDidDisconnect,
        EventKind::KeyDown,
        EventKind::KeyUp,
        EventKind::TitleParametersDidChange,
        EventKind::WillAppear,
        EventKind::WillDisappear,
    ];

    /// Wire tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ApplicationDidLaunch => "applicationDidLaunch",
            EventKind::ApplicationDidTerminate => "applicationDidTerminate",
            EventKind::DeviceDidConnect => "deviceDidConnect",
            EventKind::DeviceDidDisconnect => "deviceDidDisconnect",
            EventKind::KeyDown => "keyDown",
            EventKind::KeyUp => "keyUp",
            EventKind::TitleParametersDidChange => "titleParametersDidChange",
            EventKind::WillAppear => "willAppear",
            EventKind::WillDisappear => "willDisappear",
        }
    }

    /// Exact, case-sensitive match against the wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decoded `"event"` field of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTag {
    Known(EventKind),
    Unknown(String),
    /// The message carried no `"event"` field.
    Missing,
}

impl EventTag {
    pub fn parse(tag: &str) -> Self {
        match EventKind::from_tag(tag) {
            Some(kind) => EventTag::Known(kind),
            None => EventTag::Unknown(tag.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    event: Option<String>,
}

/// Read only the `"event"` field of a message.
pub fn read_tag(message: &[u8]) -> Result<EventTag> {
    let envelope: Envelope =
        serde_json::from_slice(message).map_err(|source| ProtocolError::Decode {
            what: "message envelope",
            source,
        })?;
    Ok(match envelope.event {
        Some(tag) => EventTag::parse(&tag),
        None => EventTag::Missing,
    })
}
