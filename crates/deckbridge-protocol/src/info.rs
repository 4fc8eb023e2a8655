use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// Hardware family of a connected device.
///
/// Serialized as the host's integer code. Codes this crate does not know
/// are preserved in [`DeviceType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum DeviceType {
    #[default]
    StreamDeck,
    StreamDeckMini,
    StreamDeckXl,
    StreamDeckMobile,
    CorsairGKeys,
    StreamDeckPedal,
    CorsairVoyager,
    StreamDeckPlus,
    Other(u8),
}

impl From<u8> for DeviceType {
    fn from(code: u8) -> Self {
        match code {
            0 => DeviceType::StreamDeck,
            1 => DeviceType::StreamDeckMini,
            2 => DeviceType::StreamDeckXl,
            3 => DeviceType::StreamDeckMobile,
            4 => DeviceType::CorsairGKeys,
            5 => DeviceType::StreamDeckPedal,
            6 => DeviceType::CorsairVoyager,
            7 => DeviceType::StreamDeckPlus,
            other => DeviceType::Other(other),
        }
    }
}

impl From<DeviceType> for u8 {
    fn from(device_type: DeviceType) -> Self {
        match device_type {
            DeviceType::StreamDeck => 0,
            DeviceType::StreamDeckMini => 1,
            DeviceType::StreamDeckXl => 2,
            DeviceType::StreamDeckMobile => 3,
            DeviceType::CorsairGKeys => 4,
            DeviceType::StreamDeckPedal => 5,
            DeviceType::CorsairVoyager => 6,
            DeviceType::StreamDeckPlus => 7,
            DeviceType::Other(code) => code,
        }
    }
}

/// Key grid dimensions of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub rows: u32,
    pub columns: u32,
}

/// A connected device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    #[serde(rename = "type", default)]
    pub device_type: DeviceType,
    #[serde(default)]
    pub size: Size,
}

impl Device {
    pub fn new(id: impl Into<String>, device_type: DeviceType, size: Size) -> Self {
        Self {
            id: id.into(),
            device_type,
            size,
        }
    }
}

/// The host application's self-reported environment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationInfo {
    pub language: String,
    pub platform: String,
    pub version: String,
}

/// The `info` blob the host passes to the plugin at launch.
///
/// Fields this crate does not model (plugin version, colors, pixel ratio)
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationInfo {
    pub application: ApplicationInfo,
    pub devices: Vec<Device>,
}

impl RegistrationInfo {
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| ProtocolError::Decode {
            what: "registration info",
            source,
        })
    }
}
