//! Day boundary signal shared between the tick interrupt and the main loop.
//!
//! A single advisory flag built on `critical-section`. The interrupt side
//! raises it when the daylight sweep finishes a day; the main loop
//! acknowledges it to restart its day clock. Safe to keep in a `static`.

use core::cell::Cell;

use critical_section::Mutex;

/// Flag published by the daylight tick.
///
/// The flag starts raised so that the first control iteration starts the
/// day clock at zero.
pub struct DayBoundary {
    pending: Mutex<Cell<bool>>,
}

impl DayBoundary {
    /// Create a new raised flag.
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(true)),
        }
    }

    /// Create a flag that is not raised.
    pub const fn cleared() -> Self {
        Self {
            pending: Mutex::new(Cell::new(false)),
        }
    }

    /// Raise the flag. Called from the tick handler.
    pub fn raise(&self) {
        critical_section::with(|cs| self.pending.borrow(cs).set(true));
    }

    /// Check the flag without consuming it.
    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| self.pending.borrow(cs).get())
    }

    /// Consume the flag.
    ///
    /// Returns `true` if a day boundary was pending.
    pub fn acknowledge(&self) -> bool {
        critical_section::with(|cs| self.pending.borrow(cs).replace(false))
    }
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self::new()
    }
}
