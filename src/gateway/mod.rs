pub mod dispatcher;
pub mod events;
pub mod intents;
pub mod keep_alive;
pub mod transport;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::config::Config;
use crate::error::GatewayError;
use dispatcher::{Event, EventDispatcher};
use events::{GatewayMessage, HelloData, Opcode};
use keep_alive::KeepAlive;
use transport::Transport;

/// One live gateway session: the socket read loop, the opcode state
/// machine, and the heartbeat task it owns.
pub struct GatewayConnection {
    transport: Transport,
    session: Session,
}

impl GatewayConnection {
    /// Open the socket and hold the session in the
    /// *connected, unidentified* state. The handshake completes inside
    /// [`run`](Self::run) when the peer's HELLO arrives.
    pub async fn connect(
        config: &Config,
        dispatcher: EventDispatcher,
    ) -> Result<Self, GatewayError> {
        let transport = Transport::connect(&config.gateway_url).await?;
        tracing::info!(url = %config.gateway_url, "gateway socket open");
        let session = Session::new(
            config.token.clone(),
            config.intents,
            transport.sender(),
            dispatcher,
        );
        Ok(Self { transport, session })
    }

    /// Accessors usable concurrently with the read loop.
    pub fn handle(&self) -> SessionHandle {
        self.session.handle()
    }

    /// Heartbeat cadence from the HELLO payload; `None` until then.
    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.session.heartbeat_interval
    }

    /// Drive the read loop until the session ends.
    ///
    /// Inbound frames are processed strictly in arrival order. A
    /// malformed text frame is dropped and the loop continues; non-text
    /// frames are ignored. Returns `Err(SessionEnded)` when the peer
    /// closes the stream and `Err(Connect)` on a read error. The
    /// heartbeat task is torn down with the session either way.
    pub async fn run(mut self) -> Result<(), GatewayError> {
        loop {
            match self.transport.next().await {
                Some(Ok(Message::Text(text))) => {
                    let frame: GatewayMessage = match serde_json::from_str(&text) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::warn!("dropping malformed gateway frame: {e}");
                            continue;
                        }
                    };
                    self.session.handle_frame(frame).await?;
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "gateway closed the session");
                    return Err(GatewayError::SessionEnded);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("gateway read error: {e}");
                    return Err(GatewayError::Connect(e));
                }
                None => {
                    tracing::info!("gateway stream ended");
                    return Err(GatewayError::SessionEnded);
                }
            }
        }
    }
}

/// Cheap cloneable view of a running session.
#[derive(Clone)]
pub struct SessionHandle {
    latency: watch::Receiver<Option<Duration>>,
    sequence: Arc<AtomicU64>,
}

impl SessionHandle {
    /// Last measured heartbeat round-trip. `None` until the first ack;
    /// stays at its last value if acks stop arriving.
    pub fn latency(&self) -> Option<Duration> {
        *self.latency.borrow()
    }

    /// Dispatch frames observed so far this session.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

/// Per-session state machine, kept apart from the socket so opcode
/// handling can be driven directly in tests.
struct Session {
    token: String,
    intents: u64,
    outbound: mpsc::UnboundedSender<GatewayMessage>,
    dispatcher: EventDispatcher,
    keep_alive: KeepAlive,
    /// Doubles as the identified flag: present once HELLO was handled.
    heartbeat: Option<JoinHandle<()>>,
    heartbeat_interval: Option<Duration>,
    latency_tx: watch::Sender<Option<Duration>>,
    latency_rx: watch::Receiver<Option<Duration>>,
}

impl Session {
    fn new(
        token: String,
        intents: u64,
        outbound: mpsc::UnboundedSender<GatewayMessage>,
        dispatcher: EventDispatcher,
    ) -> Self {
        let (latency_tx, latency_rx) = watch::channel(None);
        Self {
            token,
            intents,
            outbound,
            dispatcher,
            keep_alive: KeepAlive::new(),
            heartbeat: None,
            heartbeat_interval: None,
            latency_tx,
            latency_rx,
        }
    }

    fn handle(&self) -> SessionHandle {
        SessionHandle {
            latency: self.latency_rx.clone(),
            sequence: self.keep_alive.shared_sequence(),
        }
    }

    fn identify_payload(&self) -> GatewayMessage {
        events::identify(&self.token, self.intents)
    }

    async fn handle_frame(&mut self, frame: GatewayMessage) -> Result<(), GatewayError> {
        match Opcode::from_op(frame.op) {
            Some(Opcode::Hello) => self.on_hello(frame.d.unwrap_or(serde_json::Value::Null)),
            Some(Opcode::Dispatch) => self.on_dispatch(frame),
            Some(Opcode::HeartbeatAck) => self.on_heartbeat_ack().await,
            _ => {
                tracing::trace!(op = frame.op, "ignoring gateway opcode");
                Ok(())
            }
        }
    }

    fn on_hello(&mut self, data: serde_json::Value) -> Result<(), GatewayError> {
        if self.heartbeat.is_some() {
            tracing::warn!("peer sent a second HELLO, ignoring");
            return Ok(());
        }
        let hello: HelloData = match serde_json::from_value(data) {
            Ok(hello) => hello,
            Err(e) => {
                tracing::warn!("dropping HELLO with bad payload: {e}");
                return Ok(());
            }
        };

        self.send(self.identify_payload())?;
        let interval = Duration::from_secs_f64(hello.heartbeat_interval / 1000.0);
        self.heartbeat_interval = Some(interval);
        self.heartbeat = Some(self.keep_alive.start(interval, self.outbound.clone()));
        tracing::info!(
            interval_ms = hello.heartbeat_interval,
            "identify sent, heartbeat loop started"
        );
        Ok(())
    }

    fn on_dispatch(&mut self, frame: GatewayMessage) -> Result<(), GatewayError> {
        // The cursor tracks the peer's message ordering, so it counts
        // every dispatch frame, not just event types we understand.
        let seq = self.keep_alive.bump_sequence();

        let Some(event_type) = frame.t else {
            return Ok(());
        };
        let data = frame.d.unwrap_or(serde_json::Value::Null);
        match Event::from_dispatch(&event_type, data) {
            Ok(Some(event)) => {
                tracing::debug!(%event_type, sequence = seq, "dispatching event");
                self.dispatcher.dispatch(event);
            }
            Ok(None) => {
                tracing::trace!(%event_type, "unhandled event type");
            }
            Err(e) => {
                tracing::warn!(%event_type, "dropping dispatch with bad payload: {e}");
            }
        }
        Ok(())
    }

    async fn on_heartbeat_ack(&mut self) -> Result<(), GatewayError> {
        // An ack before any heartbeat has nothing to measure.
        if let Some(rtt) = self.keep_alive.rtt_since_last_beat().await {
            tracing::debug!(latency_ms = rtt.as_millis() as u64, "heartbeat acknowledged");
            let _ = self.latency_tx.send(Some(rtt));
        }
        Ok(())
    }

    fn send(&self, frame: GatewayMessage) -> Result<(), GatewayError> {
        self.outbound
            .send(frame)
            .map_err(|_| GatewayError::Send("connection closed".to_string()))
    }
}

impl Drop for Session {
    // Teardown cancels the heartbeat task deterministically.
    fn drop(&mut self) {
        if let Some(handle) = self.heartbeat.take() {
            handle.abort();
        }
    }
}
