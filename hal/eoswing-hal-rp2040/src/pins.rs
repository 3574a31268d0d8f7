//! Board pin assignment
//!
//! Default wiring of the button panel on a Raspberry Pi Pico. The firmware
//! takes the embassy-rp peripherals matching these numbers; the
//! assignment is checked once at startup so a wiring edit that reuses a
//! pin, or moves the console link off a UART-capable pair, is caught early.

use crate::uart::{gpio_to_uart, UartId};

/// Maximum number of GPIO pins on RP2040
pub const GPIO_COUNT: u8 = 30;

/// Matrix row outputs (driven high one at a time)
pub const ROW_PINS: [u8; 3] = [3, 4, 5];

/// Matrix column inputs (pull-down)
pub const COLUMN_PINS: [u8; 3] = [7, 8, 9];

/// Console UART transmit pin
pub const CONSOLE_TX_PIN: u8 = 0;

/// Console UART receive pin
pub const CONSOLE_RX_PIN: u8 = 1;

/// Error in a pin assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin assigned twice
    AlreadyTaken(u8),
    /// Pin cannot carry the requested UART signal
    NotUartCapable(u8),
    /// TX and RX belong to different UART peripherals
    UartMismatch,
}

/// GPIO allocator to track pin usage
pub struct GpioAllocator {
    /// Bitmask of allocated GPIO pins
    allocated: u32,
}

impl Default for GpioAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioAllocator {
    /// Create a new GPIO allocator
    pub fn new() -> Self {
        Self { allocated: 0 }
    }

    /// Allocate a GPIO pin
    pub fn allocate(&mut self, pin: u8) -> Result<(), PinError> {
        if pin >= GPIO_COUNT {
            return Err(PinError::InvalidPin(pin));
        }
        let mask = 1 << pin;
        if self.allocated & mask != 0 {
            return Err(PinError::AlreadyTaken(pin));
        }
        self.allocated |= mask;
        Ok(())
    }
}

/// Complete pin assignment of the panel
#[derive(Debug, Clone, Copy)]
pub struct PinAssignment<'a> {
    pub rows: &'a [u8],
    pub columns: &'a [u8],
    pub console_tx: u8,
    pub console_rx: u8,
}

impl PinAssignment<'static> {
    /// The board's default wiring
    pub const fn board_default() -> Self {
        Self {
            rows: &ROW_PINS,
            columns: &COLUMN_PINS,
            console_tx: CONSOLE_TX_PIN,
            console_rx: CONSOLE_RX_PIN,
        }
    }
}

impl PinAssignment<'_> {
    /// Check that no pin is used twice and the console pins share a UART
    ///
    /// Returns the UART peripheral that carries the console link.
    pub fn validate(&self) -> Result<UartId, PinError> {
        let mut alloc = GpioAllocator::new();

        for &pin in self.rows.iter().chain(self.columns) {
            alloc.allocate(pin)?;
        }
        alloc.allocate(self.console_tx)?;
        alloc.allocate(self.console_rx)?;

        let tx = gpio_to_uart(self.console_tx).ok_or(PinError::NotUartCapable(self.console_tx))?;
        let rx = gpio_to_uart(self.console_rx).ok_or(PinError::NotUartCapable(self.console_rx))?;
        if tx != rx {
            return Err(PinError::UartMismatch);
        }

        Ok(tx)
    }
}
