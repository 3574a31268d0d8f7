//! Console serial adapters
//!
//! Wrap `embedded-io` byte streams (embassy-rp `BufferedUartTx` and
//! `BufferedUartRx`) so they implement the `eoswing-hal` UART traits.
//! The receive side relies on `ReadReady` for the zero-timeout poll.

use embedded_io::{Error as _, ErrorKind, Read, ReadReady, Write};

/// UART peripheral identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartId {
    Uart0,
    Uart1,
}

/// Determine which UART can use a given GPIO pin
///
/// RP2040 has specific pin mappings for each UART.
pub fn gpio_to_uart(gpio: u8) -> Option<UartId> {
    // UART0: GPIO 0/1, 12/13, 16/17, 28/29
    // UART1: GPIO 4/5, 8/9, 20/21, 24/25
    match gpio {
        0 | 1 | 12 | 13 | 16 | 17 | 28 | 29 => Some(UartId::Uart0),
        4 | 5 | 8 | 9 | 20 | 21 | 24 | 25 => Some(UartId::Uart1),
        _ => None,
    }
}

/// Error from serial operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// Received data was corrupted (framing, parity, break)
    InvalidData,
    /// Receive buffer overrun or allocation failure
    Overrun,
    /// The stream accepted zero bytes of a write
    WriteZero,
    /// Any other driver error
    Other,
}

impl From<ErrorKind> for SerialError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidData => SerialError::InvalidData,
            ErrorKind::OutOfMemory => SerialError::Overrun,
            ErrorKind::WriteZero => SerialError::WriteZero,
            _ => SerialError::Other,
        }
    }
}

/// Console transmitter over an `embedded-io` writer
pub struct SerialTx<W> {
    inner: W,
}

impl<W: Write> SerialTx<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> eoswing_hal::UartTx for SerialTx<W> {
    type Error = SerialError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.inner
            .write_all(data)
            .map_err(|e| SerialError::from(e.kind()))
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        self.inner.flush().map_err(|e| SerialError::from(e.kind()))
    }
}

/// Console receiver over an `embedded-io` reader
pub struct SerialRx<R> {
    inner: R,
}

impl<R: Read + ReadReady> SerialRx<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read + ReadReady> eoswing_hal::UartRx for SerialRx<R> {
    type Error = SerialError;

    fn poll_ready(&mut self) -> Result<bool, SerialError> {
        self.inner
            .read_ready()
            .map_err(|e| SerialError::from(e.kind()))
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.inner.read(buf).map_err(|e| SerialError::from(e.kind()))
    }
}
