use core::fmt;

use embassy_time::Duration;

use crate::error::Error;

/// Number of time slots in a day table
pub const SLOT_COUNT: u16 = 1000;

/// Highest valid slot index
pub const MAX_SLOT: u16 = SLOT_COUNT - 1;

/// Slots per second of day time
const SLOTS_PER_SECOND: u64 = 2;

/// Discretized time of day, the key of a stored table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TimeSlot(u16);

impl TimeSlot {
    /// Map elapsed day time to its slot, capped at [`MAX_SLOT`]
    pub fn from_day_time(day_time: Duration) -> Self {
        let index = day_time.as_millis() * SLOTS_PER_SECOND / 1000;
        #[allow(clippy::cast_possible_truncation)]
        let index = index.min(u64::from(MAX_SLOT)) as u16;
        Self(index)
    }

    /// Create a slot from a raw index
    pub const fn new(index: u16) -> Result<Self, Error> {
        if index > MAX_SLOT {
            return Err(Error::SlotIndexOutOfRange);
        }
        Ok(Self(index))
    }

    pub const fn index(self) -> u16 {
        self.0
    }
}

impl TryFrom<u32> for TimeSlot {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .map_err(|_| Error::SlotIndexOutOfRange)
            .and_then(Self::new)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
