//! Protocol tokens
//!
//! Inbound tokens are matched by substring containment, never by exact
//! equality, because the console may wrap them in OSC padding and type
//! tags.

/// Sent by the console to ask whether an OSC device is attached
pub const HANDSHAKE_QUERY: &str = "ETCOSC?";

/// Reply to [`HANDSHAKE_QUERY`]
pub const HANDSHAKE_REPLY: &str = "OK";

/// Console echo of our keepalive ping
pub const PING_ECHO: &str = "/eos/out/ping";

/// Keepalive ping; the console answers with [`PING_ECHO`]
pub const PING: &str = "/eos/ping ElementWing_hello";

/// Sent once at startup so the console forwards [`PING_ECHO`] to us
pub const FILTER_REGISTRATION: &str = "/eos/filter/add /eos/out/ping";

/// Length of the longest inbound token
pub const MAX_INBOUND_TOKEN_LEN: usize = if HANDSHAKE_QUERY.len() > PING_ECHO.len() {
    HANDSHAKE_QUERY.len()
} else {
    PING_ECHO.len()
};

/// Tokens the panel reacts to
pub const INBOUND_TOKENS: [&str; 2] = [HANDSHAKE_QUERY, PING_ECHO];

/// Check whether `haystack` contains `needle`
pub fn contains(haystack: &[u8], needle: &str) -> bool {
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return true;
    }
    if haystack.len() < needle.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Index just past the last occurrence of `needle` in `haystack`
pub fn last_match_end(haystack: &[u8], needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .rposition(|w| w == needle)
        .map(|start| start + needle.len())
}
