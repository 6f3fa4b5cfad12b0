use core::fmt::{self, Write};

use embassy_time::Duration;
use heapless::String;

use crate::action::Action;
use crate::time_slot::TimeSlot;

/// Maximum length of a rendered report line
pub const REPORT_LINE_LEN: usize = 96;

const EXPLORE_TAG: &str = "[EXPLORE]";
const EXPLOIT_TAG: &str = "[EXPLOIT]";

/// Outcome of one control iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationReport {
    /// Time elapsed since the start of the simulated day
    pub day_time: Duration,
    pub slot: TimeSlot,
    /// Action picked by the learning engine
    pub action: Action,
    /// Action written to the chain
    pub applied: Action,
    /// Measured illumination
    pub lux: u16,
    pub reward: u8,
    pub explored: bool,
}

impl IterationReport {
    /// Render the console line into a fixed buffer
    ///
    /// The line is truncated if it does not fit.
    pub fn line(&self) -> String<REPORT_LINE_LEN> {
        let mut line = String::new();
        let _ = write!(line, "{self}");
        line
    }

    pub const fn tag(&self) -> &'static str {
        if self.explored { EXPLORE_TAG } else { EXPLOIT_TAG }
    }
}

impl fmt::Display for IterationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} ms] [{}] {} Lum: {} reward: {} {}",
            self.day_time.as_millis(),
            self.slot,
            self.action,
            self.lux,
            self.reward,
            self.tag()
        )
    }
}
