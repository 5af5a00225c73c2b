//! End-to-end tests against a real relay using WebSocket and HTTP clients.
#![allow(clippy::panic, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use wfl_relay::app_state::AppState;
use wfl_relay::config::RelayConfig;
use wfl_relay::server;

const TOKEN: &str = "s3cret";
const TIMEOUT: Duration = Duration::from_secs(3);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Boots a relay on an ephemeral port and returns its address.
async fn boot() -> SocketAddr {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    let config = RelayConfig {
        control_token: TOKEN.to_string(),
        classify_grace: Duration::from_millis(150),
        ..RelayConfig::default()
    };
    let state = AppState::new(config);
    tokio::spawn(server::run(listener, state, std::future::pending()));
    addr
}

async fn connect(addr: SocketAddr, token: &str) -> WsStream {
    let url = format!("ws://{addr}/?token={token}");
    let Ok((ws, _)) = connect_async(url).await else {
        panic!("websocket connect failed");
    };
    ws
}

async fn send_json(ws: &mut WsStream, text: &str) {
    if ws.send(Message::text(text)).await.is_err() {
        panic!("send failed");
    }
}

/// Next text frame as JSON, skipping control frames.
async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let Ok(frame) = timeout(TIMEOUT, ws.next()).await else {
            panic!("timed out waiting for a frame");
        };
        match frame {
            Some(Ok(Message::Text(text))) => {
                let Ok(json) = serde_json::from_str(text.as_str()) else {
                    panic!("frame is not JSON: {text}");
                };
                return json;
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Waits for the server to close the socket and returns the close code.
async fn close_code(ws: &mut WsStream) -> Option<CloseCode> {
    loop {
        let Ok(frame) = timeout(TIMEOUT, ws.next()).await else {
            panic!("timed out waiting for close");
        };
        match frame {
            Some(Ok(Message::Close(frame))) => return frame.map(|f| f.code),
            Some(Ok(_)) => {}
            Some(Err(_)) | None => return None,
        }
    }
}

async fn http_get(addr: SocketAddr, path: &str, token: Option<&str>) -> (u16, Value) {
    let client = reqwest::Client::new();
    let mut request = client.get(format!("http://{addr}{path}"));
    if let Some(token) = token {
        request = request.header("X-WFL-Token", token);
    }
    let Ok(response) = request.send().await else {
        panic!("request to {path} failed");
    };
    let status = response.status().as_u16();
    let json = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, json)
}

async fn renderer(addr: SocketAddr) -> WsStream {
    let mut ws = connect(addr, TOKEN).await;
    send_json(&mut ws, r#"{"type":"status","riveLoaded":true}"#).await;
    let sync = next_json(&mut ws).await;
    assert_eq!(sync["command"], "sync");
    ws
}

#[tokio::test]
async fn silent_client_becomes_observer_with_one_snapshot() {
    let addr = boot().await;
    let mut ws = connect(addr, TOKEN).await;

    let sync = next_json(&mut ws).await;
    assert_eq!(sync["command"], "sync");
    assert_eq!(sync["state"]["terry"]["mouthShape"], 0);

    let more = timeout(Duration::from_millis(400), ws.next()).await;
    assert!(more.is_err(), "expected no second frame, got {more:?}");

    let (_, status) = http_get(addr, "/status", Some(TOKEN)).await;
    assert_eq!(status["webClients"], 1);
    assert_eq!(status["flutter"], false);
}

#[tokio::test]
async fn renderer_receives_commands_and_observers_mirror_them() {
    let addr = boot().await;
    let mut main = renderer(addr).await;
    let mut watcher = connect(addr, TOKEN).await;
    send_json(&mut watcher, r#"{"type":"web-hello"}"#).await;
    assert_eq!(next_json(&mut watcher).await["command"], "sync");

    let (status, body) = http_get(addr, "/terry/lip?shape=3", Some(TOKEN)).await;
    assert_eq!(status, 200);
    assert_eq!(body["sent"], true);
    assert_eq!(body["shape"], 3);

    let frame = next_json(&mut main).await;
    assert_eq!(frame["command"], "rive");
    assert_eq!(frame["input"], "lipShape");
    assert_eq!(frame["value"], 3);
    assert_eq!(frame["character"], "terry");

    let mirrored = next_json(&mut watcher).await;
    assert_eq!(mirrored, frame);
}

#[tokio::test]
async fn new_renderer_displaces_the_old_one() {
    let addr = boot().await;
    let mut first = renderer(addr).await;
    let mut second = renderer(addr).await;

    assert!(matches!(close_code(&mut first).await, Some(CloseCode::Normal) | None));

    let (_, body) = http_get(addr, "/nigel/head?angle=-12", Some(TOKEN)).await;
    assert_eq!(body["sent"], true);
    let frame = next_json(&mut second).await;
    assert_eq!(frame["input"], "nigel_headTurn");
    assert_eq!(frame["value"], -12.0);

    let (_, status) = http_get(addr, "/status", Some(TOKEN)).await;
    assert_eq!(status["flutter"], true);
}

#[tokio::test]
async fn application_ping_is_answered() {
    let addr = boot().await;
    let mut ws = renderer(addr).await;
    send_json(&mut ws, r#"{"type":"ping"}"#).await;
    assert_eq!(next_json(&mut ws).await["type"], "pong");
}

#[tokio::test]
async fn malformed_message_keeps_connection_open() {
    let addr = boot().await;
    let mut ws = renderer(addr).await;
    send_json(&mut ws, "definitely not json").await;
    send_json(&mut ws, r#"{"type":"ping"}"#).await;
    assert_eq!(next_json(&mut ws).await["type"], "pong");
}

#[tokio::test]
async fn websocket_with_wrong_token_is_closed_with_policy_code() {
    let addr = boot().await;
    let mut ws = connect(addr, "wrong").await;
    assert_eq!(close_code(&mut ws).await, Some(CloseCode::Policy));
}

#[tokio::test]
async fn http_requires_token() {
    let addr = boot().await;

    let (status, body) = http_get(addr, "/pupils?x=3", None).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = http_get(addr, "/pupils?x=3", Some(TOKEN)).await;
    assert_eq!(status, 200);
    assert_eq!(body["sent"], false);

    let (status, _) = http_get(addr, "/health", None).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn reset_burst_reaches_renderer() {
    let addr = boot().await;
    let mut ws = renderer(addr).await;

    let (_, body) = http_get(addr, "/reset", Some(TOKEN)).await;
    assert_eq!(body["reset"], true);

    let mut inputs = Vec::new();
    for _ in 0..11 {
        let frame = next_json(&mut ws).await;
        inputs.push(frame["input"].as_str().unwrap_or_default().to_string());
    }
    assert!(inputs.iter().any(|i| i == "pupil"));
    assert!(inputs.iter().any(|i| i == "terry_headTurn"));
    assert!(inputs.iter().any(|i| i == "nigelEyes"));
}
