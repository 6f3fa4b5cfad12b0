//! LED bit-matrix shared by both chains
//!
//! The LED driver exposes 16 column registers of 8 bits each. The two
//! physical strings are interleaved, so only the even registers carry lit
//! segments; odd registers stay dark.

/// Number of column registers on one driver
pub const COLUMNS: usize = 16;

/// Number of rows (bits) per column register
pub const ROWS: u8 = 8;

/// Column stride between two lit registers
pub const COLUMN_STEP: usize = 2;

/// Bitmap of one LED chain, one byte per column register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedMatrix {
    columns: [u8; COLUMNS],
}

impl LedMatrix {
    /// Create a dark matrix
    pub const fn new() -> Self {
        Self {
            columns: [0; COLUMNS],
        }
    }

    /// Build the bitmap lighting exactly `count` segments, packed low to high.
    ///
    /// Every group of 8 segments fills one even register with `0xFF`, the
    /// remainder sets the low bits of the next even register. Counts above
    /// the physical capacity are clamped.
    pub fn with_lit_count(count: u8) -> Self {
        let mut matrix = Self::new();
        let capacity = (COLUMNS / COLUMN_STEP) * ROWS as usize;
        let count = usize::from(count).min(capacity);

        let full = count / ROWS as usize;
        let partial = count % ROWS as usize;

        for register in 0..full {
            matrix.columns[register * COLUMN_STEP] = 0xFF;
        }
        if partial > 0 {
            matrix.columns[full * COLUMN_STEP] = (1u8 << partial) - 1;
        }

        matrix
    }

    /// Toggle a single segment
    ///
    /// Out-of-range positions are ignored.
    pub fn toggle(&mut self, column: usize, row: u8) {
        if row >= ROWS {
            return;
        }
        if let Some(bits) = self.columns.get_mut(column) {
            *bits ^= 1 << row;
        }
    }

    /// Bitmap of a single column register
    pub fn column(&self, column: usize) -> Option<u8> {
        self.columns.get(column).copied()
    }

    /// All column registers
    pub const fn columns(&self) -> &[u8; COLUMNS] {
        &self.columns
    }

    /// Check if a single segment is lit
    pub fn is_lit(&self, column: usize, row: u8) -> bool {
        row < ROWS && self.column(column).is_some_and(|bits| bits & (1 << row) != 0)
    }

    /// Number of lit segments
    pub fn lit_count(&self) -> u32 {
        self.columns.iter().map(|bits| bits.count_ones()).sum()
    }
}
