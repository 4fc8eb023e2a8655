//! Smallest useful plugin: shows an OK badge on every key press.
//!
//! The host launches plugins with its own arguments; run by hand against
//! the fake host:
//!   cargo run --example fake-host
//!   cargo run --example minimal-plugin -- <port>

use deckbridge::client::{Client, ClientConfig};
use deckbridge::protocol::KeyDownEvent;

const INFO: &str = r#"{"application":{"language":"en","platform":"mac","version":"6.0"},"devices":[]}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port: i64 = std::env::args()
        .nth(1)
        .ok_or("usage: minimal-plugin <port>")?
        .parse()?;

    let client = Client::new(ClientConfig::new(port, "minimal-plugin", "registerPlugin", INFO))?;
    client.on(|client: &Client, event: &KeyDownEvent| {
        if let Err(err) = client.show_ok(&event.context) {
            eprintln!("showOk failed: {err}");
        }
    });

    eprintln!("Connecting to {}", client.endpoint());
    client.run()?;
    eprintln!("Host closed the connection");
    Ok(())
}
