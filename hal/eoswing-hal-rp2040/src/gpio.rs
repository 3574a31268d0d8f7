//! Matrix GPIO adapters
//!
//! Wrap `embedded-hal` 1.0 digital pins so they implement the
//! `eoswing-hal` traits. RP2040 GPIO operations are infallible, so pin
//! errors are discarded rather than threaded through the scanner.

use embedded_hal::digital;

/// Matrix row driven through an `embedded-hal` output pin
///
/// Tracks the level it last drove, so reading back the row state does
/// not need a `StatefulOutputPin`.
pub struct MatrixRow<P> {
    pin: P,
    high: bool,
}

impl<P: digital::OutputPin> MatrixRow<P> {
    /// Wrap an output pin and drive it low (row de-asserted)
    pub fn new(pin: P) -> Self {
        let mut row = Self { pin, high: true };
        eoswing_hal::OutputPin::set_low(&mut row);
        row
    }
}

impl<P: digital::OutputPin> eoswing_hal::OutputPin for MatrixRow<P> {
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Matrix column sampled through an `embedded-hal` input pin
///
/// A failed read is reported as low (key not pressed).
pub struct MatrixColumn<P> {
    pin: P,
}

impl<P: digital::InputPin> MatrixColumn<P> {
    /// Wrap an input pin (expected to be configured with a pull-down)
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: digital::InputPin> eoswing_hal::InputPin for MatrixColumn<P> {
    fn is_high(&mut self) -> bool {
        self.pin.is_high().unwrap_or(false)
    }
}
