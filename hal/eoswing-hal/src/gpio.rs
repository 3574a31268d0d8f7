//! GPIO pin abstractions
//!
//! Rows of the key matrix are driven through [`OutputPin`], columns are
//! sampled through [`InputPin`].

/// Digital output pin (matrix row)
///
/// Implementations drive the physical pin. A row is "asserted" when it
/// is set high.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;
}

/// Digital input pin (matrix column)
///
/// Columns are biased low with a pull-down, so a pressed key on the
/// asserted row reads high. Sampling takes `&mut self` to match
/// `embedded-hal` 1.0 input pins.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&mut self) -> bool;
}
