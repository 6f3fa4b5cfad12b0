//! Sunrise/sunset sweep state machine
//!
//! Pure state: one call to [`SunCycle::tick`] per hardware tick, no I/O.
//! The caller pushes the returned [`TickEffect`] to the LED driver.

use crate::action::MAX_DUTY;
use crate::matrix::{COLUMN_STEP, COLUMNS, LedMatrix, ROWS};

/// Ticks spent on the plateau after a full sweep, flip tick included
pub const HOLD_TICKS: u8 = 56;

/// Ticks needed to sweep every lit segment once
#[allow(clippy::cast_possible_truncation)]
pub const SWEEP_TICKS: u32 = (COLUMNS / COLUMN_STEP) as u32 * ROWS as u32;

/// Ticks in one half of the day (sweep plus plateau)
pub const HALF_DAY_TICKS: u32 = SWEEP_TICKS + HOLD_TICKS as u32;

/// Row that steps the dimming level in the middle of a column
const MID_DIMMING_ROW: u8 = 4;

/// Half of the daylight cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Sunrise,
    Sunset,
}

impl Phase {
    const fn flipped(self) -> Self {
        match self {
            Self::Sunrise => Self::Sunset,
            Self::Sunset => Self::Sunrise,
        }
    }
}

/// Observable state of the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    SunriseAdvancing,
    SunriseHolding,
    SunsetAdvancing,
    SunsetHolding,
}

/// Hardware writes produced by a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickEffect {
    /// Dimming level to push, if this tick steps the dimming
    pub dimming: Option<u8>,
    /// Column register to push: `(index, bitmap)`
    pub column: Option<(usize, u8)>,
    /// Phase entered on this tick, if the cycle flipped
    pub flipped_to: Option<Phase>,
}

impl TickEffect {
    /// Check if this tick completed a day
    pub const fn is_day_reset(&self) -> bool {
        matches!(self.flipped_to, Some(Phase::Sunrise))
    }
}

/// Daylight sweep over the LED matrix
#[derive(Debug, Clone)]
pub struct SunCycle {
    column: usize,
    row: u8,
    phase: Phase,
    dim_level: u8,
    /// Remaining plateau ticks, `None` while advancing
    hold_counter: Option<u8>,
    matrix: LedMatrix,
}

impl Default for SunCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl SunCycle {
    /// Create a cycle at the start of a sunrise on a dark matrix
    pub const fn new() -> Self {
        Self {
            column: 0,
            row: 0,
            phase: Phase::Sunrise,
            dim_level: 0,
            hold_counter: None,
            matrix: LedMatrix::new(),
        }
    }

    /// Advance the sweep by one tick
    pub fn tick(&mut self) -> TickEffect {
        match self.hold_counter {
            Some(remaining) => self.hold(remaining),
            None => self.advance(),
        }
    }

    fn advance(&mut self) -> TickEffect {
        let mut effect = TickEffect::default();

        self.matrix.toggle(self.column, self.row);

        if self.row == 0 || self.row == MID_DIMMING_ROW {
            effect.dimming = Some(self.dim_level);
            self.dim_level = match self.phase {
                Phase::Sunrise => (self.dim_level + 1).min(MAX_DUTY),
                Phase::Sunset => self.dim_level.saturating_sub(1),
            };
        }

        effect.column = self
            .matrix
            .column(self.column)
            .map(|bits| (self.column, bits));

        self.row += 1;
        if self.row >= ROWS {
            self.row = 0;
            self.column += COLUMN_STEP;
        }

        if self.column >= COLUMNS {
            self.hold_counter = Some(HOLD_TICKS);
        }

        effect
    }

    fn hold(&mut self, remaining: u8) -> TickEffect {
        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.hold_counter = Some(remaining);
            return TickEffect::default();
        }

        self.phase = self.phase.flipped();
        self.column = 0;
        self.row = 0;
        self.hold_counter = None;

        TickEffect {
            flipped_to: Some(self.phase),
            ..TickEffect::default()
        }
    }

    /// Current sweep state
    pub const fn state(&self) -> SweepState {
        match (self.phase, self.hold_counter.is_some()) {
            (Phase::Sunrise, false) => SweepState::SunriseAdvancing,
            (Phase::Sunrise, true) => SweepState::SunriseHolding,
            (Phase::Sunset, false) => SweepState::SunsetAdvancing,
            (Phase::Sunset, true) => SweepState::SunsetHolding,
        }
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn column(&self) -> usize {
        self.column
    }

    pub const fn row(&self) -> u8 {
        self.row
    }

    /// Next dimming level to be pushed
    pub const fn dim_level(&self) -> u8 {
        self.dim_level
    }

    /// Remaining plateau ticks
    pub const fn hold_counter(&self) -> u8 {
        match self.hold_counter {
            Some(remaining) => remaining,
            None => 0,
        }
    }

    pub const fn matrix(&self) -> &LedMatrix {
        &self.matrix
    }
}
