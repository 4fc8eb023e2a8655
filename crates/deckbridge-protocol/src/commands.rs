//! Outbound commands.
//!
//! https://developer.elgato.com/documentation/stream-deck/sdk/events-sent/

use serde::Serialize;
use serde_json::Value;

use crate::error::{ProtocolError, Result};

/// Which surface a title or image applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "u8")]
pub enum Target {
    /// Hardware and software.
    #[default]
    Both,
    Hardware,
    Software,
}

impl From<Target> for u8 {
    fn from(target: Target) -> Self {
        match target {
            Target::Both => 0,
            Target::Hardware => 1,
            Target::Software => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlPayload {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagePayload {
    pub image: String,
    pub target: Target,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitlePayload {
    pub title: String,
    pub target: Target,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatePayload {
    pub state: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilePayload {
    pub profile: String,
}

/// A command sent from the plugin to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Command {
    OpenUrl {
        payload: UrlPayload,
    },
    SendToPropertyInspector {
        action: String,
        context: String,
        payload: Value,
    },
    SetImage {
        context: String,
        payload: ImagePayload,
    },
    SetTitle {
        context: String,
        payload: TitlePayload,
    },
    ShowAlert {
        context: String,
    },
    ShowOk {
        context: String,
    },
    SetSettings {
        context: String,
        payload: Value,
    },
    SetState {
        context: String,
        payload: StatePayload,
    },
    SwitchToProfile {
        context: String,
        device: String,
        payload: ProfilePayload,
    },
}

impl Command {
    /// Open `url` in the default browser.
    pub fn open_url(url: impl Into<String>) -> Self {
        Command::OpenUrl {
            payload: UrlPayload { url: url.into() },
        }
    }

    /// Forward opaque JSON to the property inspector of a context.
    pub fn send_to_property_inspector(
        context: impl Into<String>,
        action: impl Into<String>,
        payload: Value,
    ) -> Self {
        Command::SendToPropertyInspector {
            action: action.into(),
            context: context.into(),
            payload,
        }
    }

    /// `image` is a base64 data URL or SVG string.
    pub fn set_image(context: impl Into<String>, image: impl Into<String>, target: Target) -> Self {
        Command::SetImage {
            context: context.into(),
            payload: ImagePayload {
                image: image.into(),
                target,
            },
        }
    }

    pub fn set_title(context: impl Into<String>, title: impl Into<String>, target: Target) -> Self {
        Command::SetTitle {
            context: context.into(),
            payload: TitlePayload {
                title: title.into(),
                target,
            },
        }
    }

    pub fn show_alert(context: impl Into<String>) -> Self {
        Command::ShowAlert {
            context: context.into(),
        }
    }

    pub fn show_ok(context: impl Into<String>) -> Self {
        Command::ShowOk {
            context: context.into(),
        }
    }

    /// Persist opaque settings for a context.
    pub fn set_settings(context: impl Into<String>, settings: Value) -> Self {
        Command::SetSettings {
            context: context.into(),
            payload: settings,
        }
    }

    pub fn set_state(context: impl Into<String>, state: u32) -> Self {
        Command::SetState {
            context: context.into(),
            payload: StatePayload { state },
        }
    }

    /// Switch `device` to a read-only profile bundled with the plugin.
    pub fn switch_to_profile(
        context: impl Into<String>,
        device: impl Into<String>,
        profile: impl Into<String>,
    ) -> Self {
        Command::SwitchToProfile {
            context: context.into(),
            device: device.into(),
            payload: ProfilePayload {
                profile: profile.into(),
            },
        }
    }

    /// Wire tag of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::OpenUrl { .. } => "openUrl",
            Command::SendToPropertyInspector { .. } => "sendToPropertyInspector",
            Command::SetImage { .. } => "setImage",
            Command::SetTitle { .. } => "setTitle",
            Command::ShowAlert { .. } => "showAlert",
            Command::ShowOk { .. } => "showOk",
            Command::SetSettings { .. } => "setSettings",
            Command::SetState { .. } => "setState",
            Command::SwitchToProfile { .. } => "switchToProfile",
        }
    }

    pub fn to_message(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|source| ProtocolError::Encode {
            what: self.name(),
            source,
        })
    }
}

/// The first message a plugin sends after connecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration<'a> {
    pub event: &'a str,
    pub uuid: &'a str,
}

impl<'a> Registration<'a> {
    pub fn new(register_event: &'a str, plugin_uuid: &'a str) -> Self {
        Self {
            event: register_event,
            uuid: plugin_uuid,
        }
    }

    pub fn to_message(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|source| ProtocolError::Encode {
            what: "registration",
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn wire(command: &Command) -> String {
        String::from_utf8(command.to_message().unwrap()).unwrap()
    }

    #[test]
    fn registration_message_is_exact() {
        let message = Registration::new("registerPlugin", "u1").to_message().unwrap();
        assert_eq!(message, br#"{"event":"registerPlugin","uuid":"u1"}"#);
    }

    #[test]
    fn registration_escapes_identifiers() {
        let message = Registration::new("registerPlugin", r#"a"b"#).to_message().unwrap();
        assert_eq!(message, br#"{"event":"registerPlugin","uuid":"a\"b"}"#);
    }

    #[test]
    fn set_title_shape() {
        assert_eq!(
            wire(&Command::set_title("ctx", "7", Target::Hardware)),
            r#"{"event":"setTitle","context":"ctx","payload":{"title":"7","target":1}}"#
        );
    }

    #[test]
    fn set_image_shape() {
        assert_eq!(
            wire(&Command::set_image("ctx", "data:image/png;base64,AA", Target::Software)),
            r#"{"event":"setImage","context":"ctx","payload":{"image":"data:image/png;base64,AA","target":2}}"#
        );
    }

    #[test]
    fn context_only_commands() {
        assert_eq!(
            wire(&Command::show_alert("c")),
            r#"{"event":"showAlert","context":"c"}"#
        );
        assert_eq!(wire(&Command::show_ok("c")), r#"{"event":"showOk","context":"c"}"#);
    }

    #[test]
    fn opaque_payload_commands() {
        assert_eq!(
            wire(&Command::set_settings("c", json!({"count": 3}))),
            r#"{"event":"setSettings","context":"c","payload":{"count":3}}"#
        );
        assert_eq!(
            wire(&Command::send_to_property_inspector("c", "com.x.a", json!([1, 2]))),
            r#"{"event":"sendToPropertyInspector","action":"com.x.a","context":"c","payload":[1,2]}"#
        );
    }

    #[test]
    fn remaining_command_shapes() {
        assert_eq!(
            wire(&Command::open_url("https://example.com")),
            r#"{"event":"openUrl","payload":{"url":"https://example.com"}}"#
        );
        assert_eq!(
            wire(&Command::set_state("c", 1)),
            r#"{"event":"setState","context":"c","payload":{"state":1}}"#
        );
        assert_eq!(
            wire(&Command::switch_to_profile("c", "D1", "Work")),
            r#"{"event":"switchToProfile","context":"c","device":"D1","payload":{"profile":"Work"}}"#
        );
    }

    #[test]
    fn name_matches_serialized_tag() {
        let command = Command::show_ok("c");
        let value: Value = serde_json::from_slice(&command.to_message().unwrap()).unwrap();
        assert_eq!(value["event"], command.name());
    }
}
