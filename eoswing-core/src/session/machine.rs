//! Session state machine definition
//!
//! The session is a single record: connected flag, time of the last
//! liveness signal, and whether a ping is outstanding. The observable
//! [`State`] is derived from it.
//!
//! Timestamps are milliseconds from any monotonic origin. A missing
//! liveness timestamp (`None`) means "never" and counts as overdue for
//! the ping check, so the first keepalive check after a handshake sends a
//! ping straight away. The timeout is only armed once a liveness signal
//! has been seen.

use eoswing_protocol::ConsoleMessage;

use super::events::SessionEvent;
use crate::config::SessionConfig;

/// Observable session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// No handshake yet, or the link timed out
    Disconnected,
    /// Handshake done, no ping outstanding
    ConnectedIdle,
    /// Handshake done, waiting for the ping echo
    ConnectedPingSent,
}

impl State {
    /// Check if the console is connected
    pub fn is_connected(&self) -> bool {
        !matches!(self, State::Disconnected)
    }
}

/// Console session record
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Session {
    config: SessionConfig,
    /// Handshake succeeded and no timeout since
    connected: bool,
    /// Time of the last liveness signal, `None` for never
    last_message_ms: Option<u64>,
    /// Ping sent without a liveness signal since
    ping_outstanding: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// Create a disconnected session
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            connected: false,
            last_message_ms: None,
            ping_outstanding: false,
        }
    }

    pub fn state(&self) -> State {
        match (self.connected, self.ping_outstanding) {
            (false, _) => State::Disconnected,
            (true, false) => State::ConnectedIdle,
            (true, true) => State::ConnectedPingSent,
        }
    }

    pub fn last_message_ms(&self) -> Option<u64> {
        self.last_message_ms
    }

    pub fn ping_outstanding(&self) -> bool {
        self.ping_outstanding
    }

    /// Process an inbound message
    ///
    /// Only the handshake query is acted on while disconnected.
    pub fn handle_message(&mut self, message: ConsoleMessage, now_ms: u64) -> Option<SessionEvent> {
        match message {
            ConsoleMessage::HandshakeQuery => {
                if self.connected {
                    Some(SessionEvent::HandshakeRepeated)
                } else {
                    self.connected = true;
                    Some(SessionEvent::HandshakeCompleted)
                }
            }
            ConsoleMessage::PingEcho if self.connected => {
                self.last_message_ms = Some(now_ms);
                self.ping_outstanding = false;
                Some(SessionEvent::LivenessReceived)
            }
            ConsoleMessage::PingEcho | ConsoleMessage::Other => None,
        }
    }

    /// Run the time-driven transitions
    ///
    /// Call once per control-loop cycle, after inbound messages.
    pub fn poll(&mut self, now_ms: u64) -> Option<SessionEvent> {
        if !self.connected {
            return None;
        }

        if let Some(last) = self.last_message_ms {
            if now_ms.saturating_sub(last) > self.config.timeout_ms {
                self.reset();
                return Some(SessionEvent::TimedOut);
            }
        }

        if !self.ping_outstanding && self.ping_overdue(now_ms) {
            self.ping_outstanding = true;
            return Some(SessionEvent::PingDue);
        }

        None
    }

    fn ping_overdue(&self, now_ms: u64) -> bool {
        match self.last_message_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > self.config.ping_interval_ms,
        }
    }

    fn reset(&mut self) {
        self.connected = false;
        self.last_message_ms = None;
        self.ping_outstanding = false;
    }
}
