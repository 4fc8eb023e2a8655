//! Stand-in host: accepts one plugin, prints what it sends, and presses a key.
//!
//! Run with:
//!   cargo run --example fake-host [port]
//!
//! Then launch a plugin against the printed port, for example:
//!   cargo run --features cli -- -port <port> -pluginUUID demo \
//!     -registerEvent registerPlugin -info '{}'

use std::io;
use std::net::TcpListener;
use std::time::Duration;

use serde_json::json;
use tungstenite::protocol::frame::coding::CloseCode;
use tungstenite::protocol::CloseFrame;
use tungstenite::{Error as WsError, Message};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port: u16 = match std::env::args().nth(1) {
        Some(port) => port.parse()?,
        None => 0,
    };

    let listener = TcpListener::bind(("127.0.0.1", port))?;
    eprintln!("Listening on ws://{}", listener.local_addr()?);

    let (stream, peer) = listener.accept()?;
    stream.set_read_timeout(Some(Duration::from_secs(2)))?;
    let mut socket = tungstenite::accept(stream)?;
    eprintln!("Plugin connected from {peer}");

    let context = "fake-context";
    let appearance = json!({"coordinates": {"column": 0, "row": 0}, "settings": {},
                            "state": 0, "isInMultiAction": false});
    let script = [
        json!({"event": "willAppear", "action": "com.example.counter", "context": context,
               "device": "fake-device", "payload": appearance}),
        json!({"event": "keyDown", "action": "com.example.counter", "context": context,
               "device": "fake-device", "payload": appearance}),
    ];

    let registration = socket.read()?;
    eprintln!("<- {registration}");

    for event in script {
        eprintln!("-> {event}");
        socket.send(Message::text(event.to_string()))?;
    }

    loop {
        match socket.read() {
            Ok(Message::Text(text)) => eprintln!("<- {text}"),
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(WsError::Io(err))
                if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
            {
                break
            }
            Err(err) => return Err(err.into()),
        }
    }

    eprintln!("Closing");
    socket.close(Some(CloseFrame {
        code: CloseCode::Normal,
        reason: "".into(),
    }))?;
    while socket.read().is_ok() {}
    Ok(())
}
