//! Board-agnostic core logic for the button panel firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Key matrix scanning
//! - Key-to-console-address command table
//! - Console session state machine (handshake, keepalive, timeout)
//! - The single control-loop cycle tying them together
//! - Timing configuration

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod keymap;
pub mod matrix;
pub mod runner;
pub mod session;
