//! Eos OSC Serial Remote Protocol
//!
//! This crate defines the text protocol spoken between the button panel
//! and an ETC Eos family lighting console over a serial link. Only the
//! small subset the panel needs is implemented:
//!
//! - Outbound: OSC addresses with no arguments, each followed by three
//!   NUL padding bytes (`/eos/key/go\0\0\0`).
//! - Inbound: arbitrary text chunks, split at line, NUL and SLIP END
//!   delimiters and recognised by substring containment of a handful of
//!   protocol tokens.
//!
//! # Session exchange
//!
//! ```text
//! panel                                   console
//!   │ /eos/filter/add /eos/out/ping ───────▶ │
//!   │ ◀─────────────────────────── ETCOSC?  │
//!   │ OK ──────────────────────────────────▶ │
//!   │ /eos/ping ElementWing_hello ─────────▶ │
//!   │ ◀───────────────────── /eos/out/ping  │
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod inbound;
pub mod message;
pub mod tokens;

pub use inbound::{ConsoleMessage, MessageSplitter, RX_BUFFER_SIZE};
pub use message::{
    encode_address, encode_address_to_vec, EncodeError, MAX_ADDRESS_LEN, MAX_MESSAGE_SIZE, PADDING,
};
