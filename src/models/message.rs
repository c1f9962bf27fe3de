use serde::{Deserialize, Serialize};

use super::user::User;
use crate::snowflake;

/// A chat message, as carried by a MESSAGE_CREATE dispatch payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub author: User,
    pub content: String,
    #[serde(rename = "type", default)]
    pub message_type: i64,
    pub timestamp: String,
    pub edited_timestamp: Option<String>,
    #[serde(default)]
    pub tts: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub mention_everyone: bool,
    #[serde(default)]
    pub mentions: Vec<User>,
}

impl Message {
    /// Creation time derived from the message's snowflake ID.
    pub fn created_at(&self) -> Option<std::time::SystemTime> {
        snowflake::created_at(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "id": "175928847299117063",
            "channel_id": "278325129692446722",
            "guild_id": "278325129692446720",
            "author": { "id": "80351110224678912", "username": "nelly" },
            "content": "supa hot",
            "type": 0,
            "timestamp": "2016-04-30T11:18:25.796000+00:00",
            "edited_timestamp": null,
            "tts": false,
            "pinned": false,
            "mention_everyone": false,
            "mentions": []
        })
    }

    #[test]
    fn test_decode_message_create_payload() {
        let msg: Message = serde_json::from_value(sample()).unwrap();
        assert_eq!(msg.content, "supa hot");
        assert_eq!(msg.author.username, "nelly");
        assert_eq!(msg.guild_id.as_deref(), Some("278325129692446720"));
        assert!(!msg.tts);
    }

    #[test]
    fn test_created_at_from_snowflake() {
        let msg: Message = serde_json::from_value(sample()).unwrap();
        let at = msg.created_at().unwrap();
        let ms = at
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        assert_eq!(ms, 1_462_015_105_796);
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let mut payload = sample();
        payload.as_object_mut().unwrap().remove("channel_id");
        assert!(serde_json::from_value::<Message>(payload).is_err());
    }
}
