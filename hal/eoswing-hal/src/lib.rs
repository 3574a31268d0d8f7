//! EOS Wing Hardware Abstraction Layer
//!
//! This crate defines the hardware boundary of the button panel firmware:
//! the GPIO pins that make up the key matrix and the serial stream that
//! connects the panel to the lighting console. Chip-specific crates
//! implement these traits so the scanning and session logic in
//! `eoswing-core` can be tested on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (eoswing-firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  eoswing-core (scanner, session, loop)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  eoswing-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  eoswing-hal-rp2040                     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Matrix rows and columns
//! - [`uart::UartTx`], [`uart::UartRx`] - Console serial link

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use uart::{UartConfig, UartRx, UartTx};
