//! Main control loop
//!
//! The controller runs one learning iteration per call. The caller owns the
//! loop and the clock: it passes the current [`Instant`] in and decides what
//! to do with an error (see [`Controller::escalate`]).
//!
//! ```ignore
//! static DAY_BOUNDARY: DayBoundary = DayBoundary::new();
//!
//! let mut controller = Controller::new(parts, &DAY_BOUNDARY, &config, &mut trng);
//! controller.start()?;
//! loop {
//!     if let Err(error) = controller.run_iteration(now()) {
//!         match controller.escalate(error) {
//!             Recovery::ShutdownAndReset => watchdog_reset(),
//!             Recovery::AbortStartup => halt(),
//!         }
//!     }
//! }
//! ```

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::actuator::BrightnessActuator;
use crate::error::{Error, Recovery};
use crate::learning::{LearningConfig, LearningEngine};
use crate::report::IterationReport;
use crate::signal::DayBoundary;
use crate::time_slot::TimeSlot;
use crate::{BlockStorage, LedDriver, LightSensor, SeedSource};

/// Default number of sensor readings per iteration; only the last is used
pub const DEFAULT_SENSOR_SAMPLES: u8 = 2;

/// Configuration for the controller
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub learning: LearningConfig,
    /// Sensor readings taken per iteration, the last one counts
    pub sensor_samples: u8,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            learning: LearningConfig::default(),
            sensor_samples: DEFAULT_SENSOR_SAMPLES,
        }
    }
}

/// Hardware the controller runs on
pub struct ControllerParts<S, L, D> {
    /// Table storage
    pub storage: S,
    /// Ambient light sensor
    pub sensor: L,
    /// Driver of the learning LED chain
    pub learning_chain: D,
}

/// Learning control loop
pub struct Controller<'a, S: BlockStorage, L: LightSensor, D: LedDriver> {
    learning: LearningEngine<S>,
    actuator: BrightnessActuator<D>,
    sensor: L,
    boundary: &'a DayBoundary,
    day_start: Instant,
    sensor_samples: u8,
}

impl<'a, S: BlockStorage, L: LightSensor, D: LedDriver> Controller<'a, S, L, D> {
    /// Create a new controller
    pub fn new(
        parts: ControllerParts<S, L, D>,
        boundary: &'a DayBoundary,
        config: &ControllerConfig,
        seed: &mut impl SeedSource,
    ) -> Self {
        Self {
            learning: LearningEngine::new(parts.storage, &config.learning, seed),
            actuator: BrightnessActuator::new(parts.learning_chain),
            sensor: parts.sensor,
            boundary,
            day_start: Instant::from_millis(0),
            sensor_samples: config.sensor_samples.max(1),
        }
    }

    /// Bring up the learning chain and the table storage
    pub fn start(&mut self) -> Result<(), Error> {
        self.actuator.init();
        self.learning.init()
    }

    /// Run one control iteration
    pub fn run_iteration(&mut self, now: Instant) -> Result<IterationReport, Error> {
        if self.boundary.acknowledge() {
            #[cfg(feature = "esp32-log")]
            println!("[Controller] day started at {} ms", now.as_millis());
            self.day_start = now;
        }
        let day_time = self.day_time(now);

        let explore = self.learning.decide_explore();
        let slot = TimeSlot::from_day_time(day_time);
        let selection = self.learning.select_action(slot, explore)?;

        let applied = self.actuator.apply(selection.action);

        let lux = self.read_lux();
        let reward = self.learning.compute_reward(u32::from(lux));

        let report = IterationReport {
            day_time,
            slot,
            action: selection.action,
            applied,
            lux,
            reward,
            explored: selection.explored,
        };

        #[cfg(feature = "esp32-log")]
        println!("{}", report);

        self.learning.update_table(slot, selection.action, reward)?;

        Ok(report)
    }

    /// Handle a fatal error
    ///
    /// Closes storage when the device is about to be reset and tells the
    /// caller what to do next. A failed close does not change the outcome.
    /// The controller never resets the device itself.
    pub fn escalate(&mut self, error: Error) -> Recovery {
        let recovery = error.recovery();

        #[cfg(feature = "esp32-log")]
        println!("[Controller] runtime failed: {}", error);

        if recovery == Recovery::ShutdownAndReset {
            if let Err(close_error) = self.shutdown() {
                #[cfg(feature = "esp32-log")]
                println!("[Controller.escalate] shutdown failed: {}", close_error);
                #[cfg(not(feature = "esp32-log"))]
                let _ = close_error;
            }
        }
        recovery
    }

    /// Close the table storage
    pub fn shutdown(&mut self) -> Result<(), Error> {
        self.learning.shutdown()
    }

    /// Time elapsed since the current day started
    pub fn day_time(&self, now: Instant) -> Duration {
        now.checked_duration_since(self.day_start)
            .unwrap_or(Duration::from_millis(0))
    }

    fn read_lux(&mut self) -> u16 {
        let mut lux = 0;
        for _ in 0..self.sensor_samples {
            lux = self.sensor.luminosity();
        }
        lux
    }

    pub const fn learning(&self) -> &LearningEngine<S> {
        &self.learning
    }

    pub const fn actuator(&self) -> &BrightnessActuator<D> {
        &self.actuator
    }

    pub const fn sensor(&self) -> &L {
        &self.sensor
    }
}
