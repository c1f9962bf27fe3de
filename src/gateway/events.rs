use serde::{Deserialize, Serialize};
use serde_json::json;

/// Gateway opcodes. The numeric values are fixed by the remote protocol
/// and must not be reinvented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Dispatch = 0,
    Heartbeat = 1,
    Identify = 2,
    PresenceUpdate = 3,
    VoiceStateUpdate = 4,
    Resume = 6,
    Reconnect = 7,
    RequestGuildMembers = 8,
    InvalidSession = 9,
    Hello = 10,
    HeartbeatAck = 11,
}

impl Opcode {
    pub fn from_op(op: u8) -> Option<Opcode> {
        match op {
            0 => Some(Opcode::Dispatch),
            1 => Some(Opcode::Heartbeat),
            2 => Some(Opcode::Identify),
            3 => Some(Opcode::PresenceUpdate),
            4 => Some(Opcode::VoiceStateUpdate),
            6 => Some(Opcode::Resume),
            7 => Some(Opcode::Reconnect),
            8 => Some(Opcode::RequestGuildMembers),
            9 => Some(Opcode::InvalidSession),
            10 => Some(Opcode::Hello),
            11 => Some(Opcode::HeartbeatAck),
            _ => None,
        }
    }
}

/// Gateway message envelope. `t` and `s` are only present on DISPATCH
/// frames; the remote sends them as `null` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    pub op: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<serde_json::Value>,
}

/// HELLO payload data.
#[derive(Debug, Deserialize)]
pub struct HelloData {
    /// Required heartbeat cadence, in milliseconds.
    pub heartbeat_interval: f64,
}

/// Build the IDENTIFY frame from credential and intent data.
pub fn identify(token: &str, intents: u64) -> GatewayMessage {
    GatewayMessage {
        op: Opcode::Identify as u8,
        s: None,
        t: None,
        d: Some(json!({
            "token": token,
            "intents": intents,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "clyde",
                "device": "clyde",
            },
        })),
    }
}

/// Build a HEARTBEAT frame echoing the current sequence cursor.
pub fn heartbeat(sequence: u64) -> GatewayMessage {
    GatewayMessage {
        op: Opcode::Heartbeat as u8,
        s: None,
        t: None,
        d: Some(json!(sequence)),
    }
}
