//! Events produced by session transitions

use eoswing_protocol::tokens;

/// Something the session did in response to a message or a time check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    /// Handshake query received while disconnected; now connected
    HandshakeCompleted,
    /// Handshake query received while already connected
    HandshakeRepeated,
    /// Ping echo received; liveness timestamp refreshed
    LivenessReceived,
    /// Idle long enough that a keepalive ping must go out
    PingDue,
    /// No liveness signal within the timeout; session dropped
    TimedOut,
}

impl SessionEvent {
    /// Message the caller must send for this event, if any
    pub fn reply(&self) -> Option<&'static str> {
        match self {
            SessionEvent::HandshakeCompleted | SessionEvent::HandshakeRepeated => {
                Some(tokens::HANDSHAKE_REPLY)
            }
            SessionEvent::PingDue => Some(tokens::PING),
            SessionEvent::LivenessReceived | SessionEvent::TimedOut => None,
        }
    }
}
