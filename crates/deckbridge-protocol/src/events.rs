//! Inbound events.
//!
//! Each event structure decodes from the full message; the `"event"` tag
//! itself is not repeated in the structure since [`InboundEvent::KIND`]
//! already names it.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, Result};
use crate::info::{DeviceType, Size};
use crate::kind::EventKind;

/// An event structure that can be decoded from an inbound message.
pub trait InboundEvent: DeserializeOwned + fmt::Debug + Send + 'static {
    const KIND: EventKind;

    fn decode(message: &[u8]) -> Result<Self> {
        serde_json::from_slice(message).map_err(|source| ProtocolError::Decode {
            what: Self::KIND.as_str(),
            source,
        })
    }
}

/// Position of a key on its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub column: u32,
    pub row: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApplicationPayload {
    pub application: String,
}

/// A monitored application launched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApplicationDidLaunchEvent {
    pub payload: ApplicationPayload,
}

/// A monitored application terminated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApplicationDidTerminateEvent {
    pub payload: ApplicationPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeviceDescription {
    #[serde(rename = "type", default)]
    pub device_type: DeviceType,
    #[serde(default)]
    pub size: Size,
}

/// A device was plugged in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDidConnectEvent {
    pub device: String,
    pub device_info: DeviceDescription,
}

/// A device was unplugged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceDidDisconnectEvent {
    pub device: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPayload {
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub is_in_multi_action: bool,
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub state: u32,
    /// Only present when the key is part of a multi action.
    #[serde(default)]
    pub user_desired_state: Option<u32>,
}

/// A key belonging to one of this plugin's actions was pressed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyDownEvent {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: KeyPayload,
}

/// A key belonging to one of this plugin's actions was released.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyUpEvent {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: KeyPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleParameters {
    pub font_family: String,
    pub font_size: u32,
    pub font_style: String,
    pub font_underline: bool,
    pub show_title: bool,
    pub title_alignment: String,
    pub title_color: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleParametersPayload {
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub state: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_parameters: TitleParameters,
}

/// The user changed the title or its styling for a context.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TitleParametersDidChangeEvent {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: TitleParametersPayload,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearancePayload {
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub is_in_multi_action: bool,
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub state: u32,
}

/// A context is about to be shown.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WillAppearEvent {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: AppearancePayload,
}

/// A context is about to be hidden.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WillDisappearEvent {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: AppearancePayload,
}

impl InboundEvent for ApplicationDidLaunchEvent {
    const KIND: EventKind = EventKind::ApplicationDidLaunch;
}

impl InboundEvent for ApplicationDidTerminateEvent {
    const KIND: EventKind = EventKind::ApplicationDidTerminate;
}

impl InboundEvent for DeviceDidConnectEvent {
    const KIND: EventKind = EventKind::DeviceDidConnect;
}

impl InboundEvent for DeviceDidDisconnectEvent {
    const KIND: EventKind = EventKind::DeviceDidDisconnect;
}

impl InboundEvent for KeyDownEvent {
    const KIND: EventKind = EventKind::KeyDown;
}

impl InboundEvent for KeyUpEvent {
    const KIND: EventKind = EventKind::KeyUp;
}

impl InboundEvent for TitleParametersDidChangeEvent {
    const KIND: EventKind = EventKind::TitleParametersDidChange;
}

impl InboundEvent for WillAppearEvent {
    const KIND: EventKind = EventKind::WillAppear;
}

impl InboundEvent for WillDisappearEvent {
    const KIND: EventKind = EventKind::WillDisappear;
}
