use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::events::GatewayMessage;
use crate::error::GatewayError;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Duplex message channel to the gateway.
///
/// The reader half is consumed only by the read loop. Writes are queued
/// on an unbounded channel and drained by a dedicated writer task, so
/// identify and heartbeat sends are serialized without any lock near
/// the read path.
pub struct Transport {
    outbound: mpsc::UnboundedSender<GatewayMessage>,
    reader: SplitStream<WsStream>,
    writer: JoinHandle<()>,
}

impl Transport {
    /// Open the socket and start the writer task.
    pub async fn connect(url: &str) -> Result<Self, GatewayError> {
        let (socket, _) = connect_async(url).await?;
        Ok(Self::from_socket(socket))
    }

    pub(crate) fn from_socket(socket: WsStream) -> Self {
        let (sink, reader) = socket.split();
        let (outbound, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_loop(sink, rx));
        Self {
            outbound,
            reader,
            writer,
        }
    }

    /// Queue a frame for sending. Fails once the writer task is gone.
    pub fn send(&self, frame: GatewayMessage) -> Result<(), GatewayError> {
        self.outbound
            .send(frame)
            .map_err(|_| GatewayError::Send("connection closed".to_string()))
    }

    /// A cloneable sender for tasks that outlive borrows of `self`.
    pub fn sender(&self) -> mpsc::UnboundedSender<GatewayMessage> {
        self.outbound.clone()
    }

    /// Next raw frame from the peer. `None` once the stream ends.
    pub async fn next(&mut self) -> Option<Result<Message, tungstenite::Error>> {
        self.reader.next().await
    }
}

impl Drop for Transport {
    // No graceful drain: in-flight sends are abandoned with the session.
    fn drop(&mut self) {
        self.writer.abort();
    }
}

async fn write_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut rx: mpsc::UnboundedReceiver<GatewayMessage>,
) {
    while let Some(frame) = rx.recv().await {
        let text = match serde_json::to_string(&frame) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!("failed to serialize outbound frame: {e}");
                continue;
            }
        };
        if let Err(e) = sink.send(Message::Text(text.into())).await {
            tracing::debug!("gateway write failed: {e}");
            break;
        }
    }
}
