use crate::gateway::intents;

pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Bot token, sent verbatim in the IDENTIFY payload.
    pub token: String,
    pub gateway_url: String,
    /// Intent bitmask for IDENTIFY.
    pub intents: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let token = std::env::var("CLYDE_TOKEN").expect("CLYDE_TOKEN is required");

        let gateway_url = std::env::var("CLYDE_GATEWAY_URL")
            .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string());

        let intents = match std::env::var("CLYDE_INTENTS") {
            Ok(spec) => intents::parse_spec(&spec)
                .expect("CLYDE_INTENTS must be a bitmask or comma-separated intent names"),
            Err(_) => intents::DEFAULT,
        };

        Self {
            token,
            gateway_url,
            intents,
        }
    }
}
