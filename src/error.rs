use std::fmt;

use tokio_tungstenite::tungstenite;

/// Errors surfaced by a gateway session.
///
/// Decode failures on individual frames are contained inside the read
/// loop (the frame is dropped); everything else is fatal to the session
/// and propagates to whoever owns it. This crate never reconnects on
/// its own.
#[derive(Debug)]
pub enum GatewayError {
    /// The transport could not be acquired, or failed mid-read.
    Connect(tungstenite::Error),
    /// The outbound write path is gone.
    Send(String),
    /// A frame or payload failed to decode.
    Decode(serde_json::Error),
    /// The remote peer closed the connection.
    SessionEnded,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Connect(e) => write!(f, "gateway connection error: {e}"),
            GatewayError::Send(msg) => write!(f, "gateway send failed: {msg}"),
            GatewayError::Decode(e) => write!(f, "failed to decode gateway payload: {e}"),
            GatewayError::SessionEnded => write!(f, "gateway session ended"),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<tungstenite::Error> for GatewayError {
    fn from(e: tungstenite::Error) -> Self {
        GatewayError::Connect(e)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Decode(e)
    }
}
