/// Gateway intent bits, as sent in the IDENTIFY payload. The values are
/// fixed by the remote protocol.
pub const GUILDS: u64 = 1 << 0;
pub const GUILD_MEMBERS: u64 = 1 << 1;
pub const GUILD_MODERATION: u64 = 1 << 2;
pub const GUILD_EMOJIS: u64 = 1 << 3;
pub const GUILD_INTEGRATIONS: u64 = 1 << 4;
pub const GUILD_WEBHOOKS: u64 = 1 << 5;
pub const GUILD_INVITES: u64 = 1 << 6;
pub const GUILD_VOICE_STATES: u64 = 1 << 7;
pub const GUILD_PRESENCES: u64 = 1 << 8;
pub const GUILD_MESSAGES: u64 = 1 << 9;
pub const GUILD_MESSAGE_REACTIONS: u64 = 1 << 10;
pub const GUILD_MESSAGE_TYPING: u64 = 1 << 11;
pub const DIRECT_MESSAGES: u64 = 1 << 12;
pub const DIRECT_MESSAGE_REACTIONS: u64 = 1 << 13;
pub const DIRECT_MESSAGE_TYPING: u64 = 1 << 14;
pub const MESSAGE_CONTENT: u64 = 1 << 15;
pub const GUILD_SCHEDULED_EVENTS: u64 = 1 << 16;

/// Intents requiring explicit approval on the developer portal.
pub const PRIVILEGED: u64 = GUILD_MEMBERS | GUILD_PRESENCES | MESSAGE_CONTENT;

/// Default mask for a message-reading bot.
pub const DEFAULT: u64 = GUILDS | GUILD_MESSAGES | MESSAGE_CONTENT;

/// All known intent names, in bit order.
const NAMES: &[(&str, u64)] = &[
    ("guilds", GUILDS),
    ("guild_members", GUILD_MEMBERS),
    ("guild_moderation", GUILD_MODERATION),
    ("guild_emojis", GUILD_EMOJIS),
    ("guild_integrations", GUILD_INTEGRATIONS),
    ("guild_webhooks", GUILD_WEBHOOKS),
    ("guild_invites", GUILD_INVITES),
    ("guild_voice_states", GUILD_VOICE_STATES),
    ("guild_presences", GUILD_PRESENCES),
    ("guild_messages", GUILD_MESSAGES),
    ("guild_message_reactions", GUILD_MESSAGE_REACTIONS),
    ("guild_message_typing", GUILD_MESSAGE_TYPING),
    ("direct_messages", DIRECT_MESSAGES),
    ("direct_message_reactions", DIRECT_MESSAGE_REACTIONS),
    ("direct_message_typing", DIRECT_MESSAGE_TYPING),
    ("message_content", MESSAGE_CONTENT),
    ("guild_scheduled_events", GUILD_SCHEDULED_EVENTS),
];

/// Look up a single intent bit by name.
pub fn from_name(name: &str) -> Option<u64> {
    let name = name.trim().to_lowercase();
    NAMES.iter().find(|(n, _)| *n == name).map(|(_, bit)| *bit)
}

/// Parse an intent spec: either a raw decimal bitmask or a
/// comma-separated list of intent names. Returns `None` on any unknown
/// name.
pub fn parse_spec(spec: &str) -> Option<u64> {
    if let Ok(mask) = spec.trim().parse::<u64>() {
        return Some(mask);
    }
    let mut mask = 0;
    for part in spec.split(',') {
        if part.trim().is_empty() {
            continue;
        }
        mask |= from_name(part)?;
    }
    Some(mask)
}

/// Check whether a mask carries a given intent bit.
pub fn contains(mask: u64, intent: u64) -> bool {
    mask & intent == intent
}
