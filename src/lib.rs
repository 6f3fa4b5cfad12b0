#![no_std]

pub mod action;
pub mod actuator;
pub mod animation;
pub mod controller;
pub mod error;
pub mod learning;
pub mod matrix;
pub mod qtable;
pub mod report;
pub mod reward;
pub mod signal;
pub mod storage;
pub mod time_slot;

pub use action::Action;
pub use actuator::BrightnessActuator;
pub use animation::{AnimationEngine, DaylightTicker, Phase, SweepState};
pub use controller::{Controller, ControllerConfig, ControllerParts};
pub use error::{Error, Recovery, StorageFault};
pub use learning::{LearningConfig, LearningEngine, Selection};
pub use matrix::LedMatrix;
pub use qtable::QTable;
pub use report::IterationReport;
pub use reward::compute_reward;
pub use signal::DayBoundary;
pub use storage::QTableStore;
pub use time_slot::TimeSlot;

pub use embassy_time::{Duration, Instant};

/// Abstract LED matrix driver
///
/// One instance drives one chain. The daylight chain is owned by the
/// animation tick, the learning chain by the actuator.
pub trait LedDriver {
    /// Reset the chip: oscillator on, display on
    fn init(&mut self);

    /// Write the bitmap of a single column register
    fn set_column(&mut self, index: u8, bits: u8);

    /// Set the global dimming level (`0..=15`)
    fn set_dimming(&mut self, level: u8);
}

/// Ambient light sensor
pub trait LightSensor {
    /// Read the visible-channel luminosity
    fn luminosity(&mut self) -> u16;
}

/// Block storage holding one fixed-size block per time slot
///
/// Implementations create and zero-fill the backing data on `open` if it
/// does not exist yet. Reads and writes cover a whole table pair; a short
/// transfer is a failure.
pub trait BlockStorage {
    /// Mount the medium
    fn mount(&mut self) -> Result<(), StorageFault>;

    /// Open (and on first use, initialize) the data file
    fn open(&mut self) -> Result<(), StorageFault>;

    /// Flush and close the data file
    fn close(&mut self) -> Result<(), StorageFault>;

    /// Read the start of a slot block into `buf`
    fn read(&mut self, slot: TimeSlot, buf: &mut [u8]) -> Result<(), StorageFault>;

    /// Write `buf` to the start of a slot block and sync it
    fn write(&mut self, slot: TimeSlot, buf: &[u8]) -> Result<(), StorageFault>;

    /// Number of slot blocks available
    fn slot_count(&self) -> u16 {
        time_slot::SLOT_COUNT
    }
}

/// Source of the random seed for action sampling
pub trait SeedSource {
    /// Best-effort true random seed
    fn seed(&mut self) -> Option<u32>;
}

impl SeedSource for Option<u32> {
    fn seed(&mut self) -> Option<u32> {
        *self
    }
}
