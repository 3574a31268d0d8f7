//! Key-to-command table
//!
//! Maps matrix coordinates to the console key address sent when that key
//! is pressed. The table is fixed at build time. The matrix may be larger
//! than the table; unmapped keys are ignored.

use crate::matrix::Coordinate;

/// One key binding: coordinate and console address
pub type Binding = (Coordinate, &'static str);

/// Default 3×3 panel layout
pub const DEFAULT_COMMANDS: [Binding; 9] = [
    (Coordinate::new(0, 0), "/eos/key/go"),
    (Coordinate::new(0, 1), "/eos/key/stop"),
    (Coordinate::new(0, 2), "/eos/key/record"),
    (Coordinate::new(1, 0), "/eos/key/cue"),
    (Coordinate::new(1, 1), "/eos/key/next"),
    (Coordinate::new(1, 2), "/eos/key/prev"),
    (Coordinate::new(2, 0), "/eos/key/clear"),
    (Coordinate::new(2, 1), "/eos/key/update"),
    (Coordinate::new(2, 2), "/eos/key/save"),
];

/// Immutable lookup from coordinate to console address
#[derive(Debug, Clone, Copy)]
pub struct CommandTable {
    bindings: &'static [Binding],
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new(&DEFAULT_COMMANDS)
    }
}

impl CommandTable {
    pub const fn new(bindings: &'static [Binding]) -> Self {
        Self { bindings }
    }

    /// Address bound to `coord`, if any
    ///
    /// With duplicate bindings the first one wins.
    pub fn lookup(&self, coord: Coordinate) -> Option<&'static str> {
        self.bindings
            .iter()
            .find(|(c, _)| *c == coord)
            .map(|&(_, address)| address)
    }
}
