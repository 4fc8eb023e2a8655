#![cfg(all(unix, feature = "cli"))]

use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tungstenite::protocol::frame::coding::CloseCode;
use tungstenite::protocol::CloseFrame;
use tungstenite::{Message, WebSocket};

const INFO: &str = r#"{"application":{"language":"en","platform":"mac","version":"6.0"},
    "devices":[{"id":"DEV","type":0,"size":{"rows":3,"columns":5}}]}"#;

fn launch(port: u16) -> Child {
    Command::new(env!("CARGO_BIN_EXE_deckbridge"))
        .args(["-port", &port.to_string()])
        .args(["-pluginUUID", "u1"])
        .args(["-registerEvent", "registerPlugin"])
        .args(["-info", INFO])
        .args(["--log-level", "error"])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("plugin should start")
}

fn accept_within(listener: &TcpListener, timeout: Duration) -> TcpStream {
    listener
        .set_nonblocking(true)
        .expect("listener should switch to nonblocking");
    let start = Instant::now();
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream
                    .set_nonblocking(false)
                    .expect("stream should switch to blocking");
                stream
                    .set_read_timeout(Some(timeout))
                    .expect("read timeout should be settable");
                return stream;
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                assert!(start.elapsed() < timeout, "plugin never connected");
                thread::sleep(Duration::from_millis(25));
            }
            Err(err) => panic!("accept failed: {err}"),
        }
    }
}

fn wait_exit(child: &mut Child, timeout: Duration) -> ExitStatus {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().expect("try_wait should succeed") {
            return status;
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            panic!("plugin did not exit within {timeout:?}");
        }
        thread::sleep(Duration::from_millis(25));
    }
}

fn read_json(socket: &mut WebSocket<TcpStream>) -> Value {
    match socket.read().expect("host read should succeed") {
        Message::Text(text) => serde_json::from_str(text.as_str()).expect("plugin should send JSON"),
        other => panic!("unexpected message from plugin: {other:?}"),
    }
}

fn event(name: &str, count: u64) -> Message {
    Message::text(
        json!({
            "event": name,
            "action": "com.example.counter",
            "context": "ctx1",
            "device": "DEV",
            "payload": {
                "coordinates": {"column": 1, "row": 0},
                "settings": {"count": count},
                "state": 0,
                "isInMultiAction": false
            }
        })
        .to_string(),
    )
}

#[test]
fn counter_plugin_session() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let port = listener.local_addr().expect("listener should have an address").port();
    let mut child = launch(port);

    let stream = accept_within(&listener, Duration::from_secs(5));
    let mut socket = tungstenite::accept(stream).expect("handshake should succeed");

    assert_eq!(
        read_json(&mut socket),
        json!({"event": "registerPlugin", "uuid": "u1"})
    );

    socket.send(event("willAppear", 4)).expect("willAppear should send");
    assert_eq!(
        read_json(&mut socket),
        json!({"event": "setTitle", "context": "ctx1", "payload": {"title": "4", "target": 0}})
    );

    socket.send(event("keyDown", 4)).expect("keyDown should send");
    assert_eq!(
        read_json(&mut socket),
        json!({"event": "setSettings", "context": "ctx1", "payload": {"count": 5}})
    );
    assert_eq!(
        read_json(&mut socket),
        json!({"event": "setTitle", "context": "ctx1", "payload": {"title": "5", "target": 0}})
    );

    socket
        .send(Message::text(r#"{"event":"someFutureEvent","context":"ctx1"}"#))
        .expect("unknown event should send");
    socket
        .close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "".into(),
        }))
        .expect("close should send");
    while socket.read().is_ok() {}

    let status = wait_exit(&mut child, Duration::from_secs(5));
    assert_eq!(status.code(), Some(0));
}

#[test]
fn missing_parameters_exit_with_usage() {
    let output = Command::new(env!("CARGO_BIN_EXE_deckbridge"))
        .args(["-port", "28196", "-pluginUUID", "u1"])
        .output()
        .expect("plugin should run");

    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("registerEvent"), "stderr: {stderr}");
}

#[test]
fn invalid_port_exits_with_usage() {
    let output = Command::new(env!("CARGO_BIN_EXE_deckbridge"))
        .args(["-port", "0", "-pluginUUID", "u1"])
        .args(["-registerEvent", "registerPlugin", "-info", "{}"])
        .output()
        .expect("plugin should run");

    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid port"), "stderr: {stderr}");
}

#[test]
fn malformed_info_exits_with_data_invalid() {
    let output = Command::new(env!("CARGO_BIN_EXE_deckbridge"))
        .args(["-port", "28196", "-pluginUUID", "u1"])
        .args(["-registerEvent", "registerPlugin", "-info", "{oops"])
        .output()
        .expect("plugin should run");

    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn refused_connection_exits_with_failure() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        listener.local_addr().expect("listener should have an address").port()
    };

    let output = Command::new(env!("CARGO_BIN_EXE_deckbridge"))
        .args(["-port", &port.to_string(), "-pluginUUID", "u1"])
        .args(["-registerEvent", "registerPlugin", "-info", "{}"])
        .output()
        .expect("plugin should run");

    assert_eq!(output.status.code(), Some(1));
}
