//! Daylight animation driven from the timer interrupt
//!
//! [`AnimationEngine`] owns the sweep state and the daylight chain driver.
//! [`DaylightTicker`] is the object the tick handler owns: it pairs the
//! engine with the [`DayBoundary`] flag, which is the only thing the main
//! loop ever sees of the animation.

mod sun_cycle;

pub use sun_cycle::{
    HALF_DAY_TICKS, HOLD_TICKS, Phase, SWEEP_TICKS, SunCycle, SweepState, TickEffect,
};

use crate::LedDriver;
use crate::matrix::{COLUMNS, LedMatrix};
use crate::signal::DayBoundary;

/// Sunrise/sunset animation on the daylight chain
pub struct AnimationEngine<D: LedDriver> {
    driver: D,
    cycle: SunCycle,
}

impl<D: LedDriver> AnimationEngine<D> {
    /// Create a new engine at the start of a sunrise
    pub const fn new(driver: D) -> Self {
        Self {
            driver,
            cycle: SunCycle::new(),
        }
    }

    /// Initialize the chain: all columns dark, lowest dimming
    pub fn init(&mut self) {
        self.driver.init();
        for index in 0..COLUMNS {
            #[allow(clippy::cast_possible_truncation)]
            self.driver.set_column(index as u8, 0);
        }
        self.driver.set_dimming(0);
    }

    /// Advance the animation by one tick
    ///
    /// Returns `true` if this tick completed a day.
    pub fn step(&mut self) -> bool {
        let effect = self.cycle.tick();

        if let Some(level) = effect.dimming {
            self.driver.set_dimming(level);
        }
        if let Some((index, bits)) = effect.column {
            #[allow(clippy::cast_possible_truncation)]
            self.driver.set_column(index as u8, bits);
        }

        effect.is_day_reset()
    }

    /// Current sweep state
    pub const fn state(&self) -> SweepState {
        self.cycle.state()
    }

    pub const fn cycle(&self) -> &SunCycle {
        &self.cycle
    }

    pub const fn matrix(&self) -> &LedMatrix {
        self.cycle.matrix()
    }

    pub const fn driver(&self) -> &D {
        &self.driver
    }
}

/// Tick handler state.
///
/// While a day boundary is still waiting to be acknowledged by the main
/// loop, ticks are ignored and the sweep stays parked at sunrise.
pub struct DaylightTicker<'a, D: LedDriver> {
    engine: AnimationEngine<D>,
    boundary: &'a DayBoundary,
}

impl<'a, D: LedDriver> DaylightTicker<'a, D> {
    pub const fn new(engine: AnimationEngine<D>, boundary: &'a DayBoundary) -> Self {
        Self { engine, boundary }
    }

    /// Handle one hardware tick
    ///
    /// Returns `true` if the animation advanced.
    pub fn on_tick(&mut self) -> bool {
        if self.boundary.is_pending() {
            return false;
        }
        if self.engine.step() {
            self.boundary.raise();
        }
        true
    }

    pub const fn engine(&self) -> &AnimationEngine<D> {
        &self.engine
    }
}
