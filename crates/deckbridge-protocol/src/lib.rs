//! Typed events and commands of the Stream Deck plugin protocol.
//!
//! Every message on the wire is a JSON object whose `"event"` field names
//! its kind. This crate knows the shapes:
//! - [`kind`]: the closed set of inbound event kinds and tag parsing
//! - [`events`]: inbound event structures, decoded on demand
//! - [`commands`]: outbound commands and the registration handshake
//! - [`info`]: the host's launch-time environment and device descriptors

pub mod commands;
pub mod error;
pub mod events;
pub mod info;
pub mod kind;

pub use commands::{Command, Registration, Target};
pub use error::{ProtocolError, Result};
pub use events::{
    AppearancePayload, ApplicationDidLaunchEvent, ApplicationDidTerminateEvent,
    ApplicationPayload, Coordinates, DeviceDidConnectEvent, DeviceDidDisconnectEvent,
    DeviceDescription, InboundEvent, KeyDownEvent, KeyPayload, KeyUpEvent,
    TitleParameters, TitleParametersDidChangeEvent, TitleParametersPayload, WillAppearEvent,
    WillDisappearEvent,
};
pub use info::{ApplicationInfo, Device, DeviceType, RegistrationInfo, Size};
pub use kind::{read_tag, EventKind, EventTag};
