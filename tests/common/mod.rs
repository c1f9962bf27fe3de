#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};

pub enum ServerCmd {
    Frame(serde_json::Value),
    Raw(String),
    Close,
}

type Slot = Arc<
    Mutex<
        Option<(
            mpsc::UnboundedReceiver<ServerCmd>,
            mpsc::UnboundedSender<serde_json::Value>,
        )>,
    >,
>;

/// Scripted single-connection gateway server. Tests push frames at the
/// client through `push`/`push_raw`/`close` and observe what the client
/// sent with `recv_json`.
pub struct MockGateway {
    pub url: String,
    cmd_tx: mpsc::UnboundedSender<ServerCmd>,
    client_rx: mpsc::UnboundedReceiver<serde_json::Value>,
}

impl MockGateway {
    pub async fn spawn() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (client_tx, client_rx) = mpsc::unbounded_channel();
        let slot: Slot = Arc::new(Mutex::new(Some((cmd_rx, client_tx))));

        let app = Router::new().route("/", any(ws_upgrade)).with_state(slot);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("ws://127.0.0.1:{}/", addr.port()),
            cmd_tx,
            client_rx,
        }
    }

    /// HELLO frame with the given heartbeat cadence.
    pub fn hello(interval_ms: u64) -> serde_json::Value {
        serde_json::json!({ "op": 10, "d": { "heartbeat_interval": interval_ms } })
    }

    pub fn push(&self, frame: serde_json::Value) {
        self.cmd_tx.send(ServerCmd::Frame(frame)).unwrap();
    }

    pub fn push_raw(&self, text: &str) {
        self.cmd_tx.send(ServerCmd::Raw(text.to_string())).unwrap();
    }

    pub fn close(&self) {
        self.cmd_tx.send(ServerCmd::Close).unwrap();
    }

    /// Next JSON frame the client sent.
    pub async fn recv_json(&mut self) -> serde_json::Value {
        tokio::time::timeout(Duration::from_secs(5), self.client_rx.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("client connection ended")
    }
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(slot): State<Slot>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, slot))
}

async fn handle_socket(mut socket: WebSocket, slot: Slot) {
    // single-connection server: the first client takes the script
    let Some((mut cmd_rx, client_tx)) = slot.lock().await.take() else {
        return;
    };

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(ServerCmd::Frame(frame)) => {
                    if socket.send(Message::Text(frame.to_string().into())).await.is_err() {
                        break;
                    }
                }
                Some(ServerCmd::Raw(text)) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Some(ServerCmd::Close) | None => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            },
            msg = socket.recv() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Ok(frame) = serde_json::from_str(&text) {
                        let _ = client_tx.send(frame);
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                _ => {}
            },
        }
    }
}
