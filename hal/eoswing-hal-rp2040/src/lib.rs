//! RP2040-specific HAL for the button panel firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `eoswing-hal` traits, plus the board wiring:
//!
//! - Matrix row/column adapters over `embedded-hal` digital pins
//!   (embassy-rp `Output` / `Input`)
//! - Console serial adapters over `embedded-io` streams
//!   (embassy-rp `BufferedUartTx` / `BufferedUartRx`)
//! - Default pin assignment and UART pin validation

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod pins;
pub mod uart;

// Re-export shared traits from eoswing-hal for convenience
pub use eoswing_hal::{InputPin, OutputPin, UartRx, UartTx};
pub use gpio::{MatrixColumn, MatrixRow};
pub use uart::{SerialError, SerialRx, SerialTx};
