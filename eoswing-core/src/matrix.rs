//! Key matrix scanning
//!
//! Rows are outputs, columns are pull-down inputs. A scan drives one row
//! high at a time, samples every column, and drives the row low again
//! before moving on, so no two rows are ever asserted together.
//!
//! The scanner keeps no state between scans: a held key is reported on
//! every scan. Repeat throttling comes from the control-loop period.

use eoswing_hal::{InputPin, OutputPin};

/// Position of a key in the matrix (zero-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coordinate {
    pub row: u8,
    pub col: u8,
}

impl Coordinate {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Set of keys found pressed by one full scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressedKeys<const ROWS: usize, const COLS: usize> {
    grid: [[bool; COLS]; ROWS],
}

impl<const ROWS: usize, const COLS: usize> Default for PressedKeys<ROWS, COLS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const ROWS: usize, const COLS: usize> PressedKeys<ROWS, COLS> {
    /// Empty set
    pub const fn new() -> Self {
        Self {
            grid: [[false; COLS]; ROWS],
        }
    }

    fn insert(&mut self, row: usize, col: usize) {
        self.grid[row][col] = true;
    }

    /// Pressed coordinates in row-major order
    pub fn iter(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.grid.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, &pressed)| pressed)
                .map(move |(c, _)| Coordinate::new(r as u8, c as u8))
        })
    }
}

/// Drives the row outputs and samples the column inputs
pub struct MatrixScanner<R, C, const ROWS: usize, const COLS: usize> {
    rows: [R; ROWS],
    cols: [C; COLS],
    /// Called between asserting a row and sampling the columns
    settle: fn(),
}

impl<R: OutputPin, C: InputPin, const ROWS: usize, const COLS: usize>
    MatrixScanner<R, C, ROWS, COLS>
{
    /// Create a scanner, de-asserting every row
    pub fn new(rows: [R; ROWS], cols: [C; COLS]) -> Self {
        Self::with_settle(rows, cols, || {})
    }

    /// Create a scanner with a pin settling delay
    ///
    /// `settle` runs after each row is driven high and before its columns
    /// are read.
    pub fn with_settle(mut rows: [R; ROWS], cols: [C; COLS], settle: fn()) -> Self {
        for row in rows.iter_mut() {
            row.set_low();
        }
        Self { rows, cols, settle }
    }

    /// Scan the whole matrix once
    pub fn scan(&mut self) -> PressedKeys<ROWS, COLS> {
        let mut pressed = PressedKeys::new();

        for (row_idx, row) in self.rows.iter_mut().enumerate() {
            row.set_high();
            (self.settle)();

            for (col_idx, col) in self.cols.iter_mut().enumerate() {
                if col.is_high() {
                    pressed.insert(row_idx, col_idx);
                }
            }

            row.set_low();
        }

        pressed
    }
}
