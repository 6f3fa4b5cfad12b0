//! Learning actions
//!
//! An action is the pair of knobs the learning chain can turn: how many LED
//! segments are lit and how hard the chain is dimmed.

use core::fmt;

/// Maximum number of lit segments on the learning chain
pub const MAX_ON_LEDS: u8 = 64;

/// Maximum dimming duty level
pub const MAX_DUTY: u8 = 15;

/// Number of distinct `num_on_leds` values (`0..=MAX_ON_LEDS`)
pub const ON_LED_LEVELS: usize = MAX_ON_LEDS as usize + 1;

/// Number of distinct duty values (`0..=MAX_DUTY`)
pub const DUTY_LEVELS: usize = MAX_DUTY as usize + 1;

/// Total number of actions in the action space
pub const ACTION_COUNT: usize = ON_LED_LEVELS * DUTY_LEVELS;

/// A `(num_on_leds, duty)` pair.
///
/// Both fields are always within range: the constructor clamps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Action {
    num_on_leds: u8,
    duty: u8,
}

impl Action {
    /// The darkest action, every segment off
    pub const OFF: Self = Self {
        num_on_leds: 0,
        duty: 0,
    };

    /// Create a new action, clamping both fields into range
    pub const fn new(num_on_leds: u8, duty: u8) -> Self {
        Self {
            num_on_leds: if num_on_leds > MAX_ON_LEDS {
                MAX_ON_LEDS
            } else {
                num_on_leds
            },
            duty: if duty > MAX_DUTY { MAX_DUTY } else { duty },
        }
    }

    /// Number of lit segments
    pub const fn num_on_leds(self) -> u8 {
        self.num_on_leds
    }

    /// Dimming duty level
    pub const fn duty(self) -> u8 {
        self.duty
    }

    /// Row-major position of this action inside a table grid
    pub(crate) const fn grid_index(self) -> (usize, usize) {
        (self.num_on_leds as usize, self.duty as usize)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "numOnLeds: {} duty: {}", self.num_on_leds, self.duty)
    }
}
