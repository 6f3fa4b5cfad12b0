//! Brightness actuator for the learning chain
//!
//! Translates an [`Action`] into a column bitmap and a dimming level and
//! pushes both to the driver while interrupts are masked, so the daylight
//! tick never observes a half-written chain.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::LedDriver;
use crate::action::Action;
use crate::matrix::LedMatrix;

/// Drives the learning LED chain
pub struct BrightnessActuator<D: LedDriver> {
    driver: D,
    matrix: LedMatrix,
    applied: Action,
}

impl<D: LedDriver> BrightnessActuator<D> {
    /// Create a new actuator around the learning chain driver
    pub const fn new(driver: D) -> Self {
        Self {
            driver,
            matrix: LedMatrix::new(),
            applied: Action::OFF,
        }
    }

    /// Initialize the chain and switch it dark
    pub fn init(&mut self) {
        self.driver.init();
        self.apply(Action::OFF);
    }

    /// Apply an action to the chain
    ///
    /// Returns the action as written to the hardware. A dark chain always
    /// gets duty 0.
    pub fn apply(&mut self, action: Action) -> Action {
        let num_on_leds = action.num_on_leds();
        let duty = if num_on_leds == 0 { 0 } else { action.duty() };
        let applied = Action::new(num_on_leds, duty);
        let matrix = LedMatrix::with_lit_count(num_on_leds);

        critical_section::with(|_| {
            for (index, bits) in matrix.columns().iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                self.driver.set_column(index as u8, *bits);
            }
            self.driver.set_dimming(duty);
        });

        #[cfg(feature = "esp32-log")]
        if applied != action {
            println!("[BrightnessActuator.apply] requested {} applied {}", action, applied);
        }

        self.matrix = matrix;
        self.applied = applied;
        applied
    }

    /// The action currently shown on the chain
    pub const fn applied(&self) -> Action {
        self.applied
    }

    /// The bitmap currently shown on the chain
    pub const fn matrix(&self) -> &LedMatrix {
        &self.matrix
    }

    /// Get a reference to the driver
    pub const fn driver(&self) -> &D {
        &self.driver
    }
}
