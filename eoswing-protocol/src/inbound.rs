//! Inbound message handling
//!
//! The console's output arrives as a raw byte stream with no framing the
//! panel depends on. Bytes are accumulated by [`MessageSplitter`] and cut
//! at any delimiter:
//! - `\n`, `\r` (text lines)
//! - `0x00` (OSC padding)
//! - `0xC0` (SLIP END)
//!
//! Each non-empty, whitespace-trimmed run is a message, which
//! [`ConsoleMessage::classify`] matches against the protocol tokens.

use heapless::Vec;

use crate::tokens;

/// Receive accumulator size
pub const RX_BUFFER_SIZE: usize = 128;

/// SLIP frame delimiter
const SLIP_END: u8 = 0xC0;

/// Messages recognised from the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleMessage {
    /// Console asks whether a device is attached
    HandshakeQuery,
    /// Console echoed our keepalive ping
    PingEcho,
    /// Anything else; ignored
    Other,
}

impl ConsoleMessage {
    /// Classify a message by substring containment
    ///
    /// The handshake query wins if a message contains both tokens.
    pub fn classify(message: &[u8]) -> Self {
        if tokens::contains(message, tokens::HANDSHAKE_QUERY) {
            ConsoleMessage::HandshakeQuery
        } else if tokens::contains(message, tokens::PING_ECHO) {
            ConsoleMessage::PingEcho
        } else {
            ConsoleMessage::Other
        }
    }
}

/// Splits the inbound byte stream into messages
#[derive(Debug, Clone)]
pub struct MessageSplitter<const N: usize = RX_BUFFER_SIZE> {
    buffer: Vec<u8, N>,
}

impl<const N: usize> Default for MessageSplitter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MessageSplitter<N> {
    /// Create an empty splitter
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed a single byte
    ///
    /// Returns `Some(message)` when a delimiter completes a non-empty
    /// message. If the buffer is full, the accumulated bytes are emitted
    /// as a message so tokens inside them are still seen. Its tail, up to
    /// one byte short of the longest token and never overlapping a token
    /// already matched, is carried into the next message ahead of `byte`
    /// so a token cut by the flush is still found.
    pub fn feed(&mut self, byte: u8) -> Option<Vec<u8, N>> {
        if is_delimiter(byte) {
            return self.take();
        }

        if self.buffer.is_full() {
            let carry_from = carry_start(&self.buffer, N);
            // Cannot fail: a strict suffix of a buffer of capacity N
            let carry: Vec<u8, N> = Vec::from_slice(&self.buffer[carry_from..]).unwrap_or_default();
            let message = self.take();
            self.buffer = carry;
            let _ = self.buffer.push(byte);
            return message;
        }

        let _ = self.buffer.push(byte);
        None
    }

    /// Emit the partial message early if it already holds a token
    ///
    /// Call after draining a read, so a token the console sent without a
    /// trailing delimiter is not left waiting for the next one.
    pub fn take_recognised(&mut self) -> Option<Vec<u8, N>> {
        match ConsoleMessage::classify(&self.buffer) {
            ConsoleMessage::Other => None,
            _ => self.take(),
        }
    }

    /// Take the accumulated bytes as a trimmed message
    fn take(&mut self) -> Option<Vec<u8, N>> {
        let message = trim(&self.buffer);
        let result = if message.is_empty() {
            None
        } else {
            Vec::from_slice(message).ok()
        };
        self.buffer.clear();
        result
    }
}

/// Start of the bytes kept after an overflow flush
fn carry_start(bytes: &[u8], capacity: usize) -> usize {
    let keep = (tokens::MAX_INBOUND_TOKEN_LEN - 1).min(capacity.saturating_sub(1));
    let mut start = bytes.len().saturating_sub(keep);
    for token in tokens::INBOUND_TOKENS {
        if let Some(end) = tokens::last_match_end(bytes, token) {
            start = start.max(end);
        }
    }
    start
}

fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b'\n' | b'\r' | 0x00 | SLIP_END)
}

/// Strip leading and trailing ASCII whitespace
fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}
