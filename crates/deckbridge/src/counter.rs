//! Demo action: counts key presses per context.
//!
//! The count lives in the action's settings as `{"count": n}`, so the host
//! persists it and hands it back with every event.

use deckbridge_client::Client;
use deckbridge_protocol::{KeyDownEvent, Target, WillAppearEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Settings {
    #[serde(default)]
    count: u64,
}

impl Settings {
    /// Missing or malformed settings start the count at zero.
    fn import(settings: &Value) -> Self {
        Settings::deserialize(settings).unwrap_or_default()
    }
}

pub fn register(client: &Client) {
    client.on(|client: &Client, event: &WillAppearEvent| {
        let settings = Settings::import(&event.payload.settings);
        update_title(client, &event.context, settings);
    });

    client.on(|client: &Client, event: &KeyDownEvent| {
        let mut settings = Settings::import(&event.payload.settings);
        settings.count = settings.count.saturating_add(1);
        debug!(context = %event.context, count = settings.count, "key pressed");
        persist(client, &event.context, settings);
        update_title(client, &event.context, settings);
    });
}

fn persist(client: &Client, context: &str, settings: Settings) {
    let value = match serde_json::to_value(settings) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "cannot encode counter settings");
            return;
        }
    };
    if let Err(err) = client.set_settings(context, value) {
        warn!(%context, error = %err, "failed to persist counter");
    }
}

fn update_title(client: &Client, context: &str, settings: Settings) {
    if let Err(err) = client.set_title(context, &settings.count.to_string(), Target::Both) {
        warn!(%context, error = %err, "failed to update title");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn imports_existing_count() {
        assert_eq!(Settings::import(&json!({"count": 7})), Settings { count: 7 });
    }

    #[test]
    fn missing_or_malformed_settings_start_at_zero() {
        assert_eq!(Settings::import(&Value::Null), Settings::default());
        assert_eq!(Settings::import(&json!({})), Settings::default());
        assert_eq!(Settings::import(&json!({"count": "seven"})), Settings::default());
        assert_eq!(Settings::import(&json!([1, 2])), Settings::default());
    }

    #[test]
    fn settings_shape() {
        let value = serde_json::to_value(Settings { count: 3 }).expect("settings should encode");
        assert_eq!(value, json!({"count": 3}));
    }
}
