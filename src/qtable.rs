//! Per-slot learning table
//!
//! Two dense grids indexed by action: the reward estimate and the prune
//! counter. They live in one entity so they are always loaded and persisted
//! together.

use core::fmt;

use crate::action::{Action, DUTY_LEVELS, ON_LED_LEVELS};

/// Prune counter value at which an action is considered fully pruned
pub const PRUNE_LIMIT: u8 = 3;

/// Bytes taken by one grid
pub const GRID_BYTES: usize = ON_LED_LEVELS * DUTY_LEVELS;

/// Bytes taken by a serialized table pair
pub const QTABLE_BYTES: usize = 2 * GRID_BYTES;

type Grid = [[u8; DUTY_LEVELS]; ON_LED_LEVELS];

/// Estimate and prune counter of a single action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub estimate: u8,
    pub prune_count: u8,
}

/// Learning table of one time slot
#[derive(Clone, PartialEq, Eq)]
pub struct QTable {
    estimate: Grid,
    prune: Grid,
}

impl Default for QTable {
    fn default() -> Self {
        Self::new()
    }
}

impl QTable {
    /// Create a zeroed table, the state of a never-visited slot
    pub const fn new() -> Self {
        Self {
            estimate: [[0; DUTY_LEVELS]; ON_LED_LEVELS],
            prune: [[0; DUTY_LEVELS]; ON_LED_LEVELS],
        }
    }

    /// Look up a cell by raw indices
    ///
    /// Returns `None` when either index is out of range.
    pub fn get(&self, num_on_leds: usize, duty: usize) -> Option<Cell> {
        let estimate = *self.estimate.get(num_on_leds)?.get(duty)?;
        let prune_count = self.prune[num_on_leds][duty];
        Some(Cell {
            estimate,
            prune_count,
        })
    }

    /// Reward estimate of an action
    pub const fn estimate(&self, action: Action) -> u8 {
        let (n, d) = action.grid_index();
        self.estimate[n][d]
    }

    pub const fn set_estimate(&mut self, action: Action, value: u8) {
        let (n, d) = action.grid_index();
        self.estimate[n][d] = value;
    }

    /// Consecutive low-reward count of an action
    pub const fn prune_count(&self, action: Action) -> u8 {
        let (n, d) = action.grid_index();
        self.prune[n][d]
    }

    /// Check if an action is excluded from random exploration
    pub const fn is_pruned(&self, action: Action) -> bool {
        self.prune_count(action) >= PRUNE_LIMIT
    }

    /// Count one more low reward, saturating at [`PRUNE_LIMIT`]
    pub const fn bump_prune(&mut self, action: Action) {
        let (n, d) = action.grid_index();
        if self.prune[n][d] < PRUNE_LIMIT {
            self.prune[n][d] += 1;
        }
    }

    pub const fn clear_prune(&mut self, action: Action) {
        let (n, d) = action.grid_index();
        self.prune[n][d] = 0;
    }

    /// Action with the highest estimate
    ///
    /// Scans row-major, so on ties the lowest `num_on_leds`, then the lowest
    /// duty wins.
    pub fn best_action(&self) -> Action {
        let mut best = (0, 0);
        for (n, row) in self.estimate.iter().enumerate() {
            for (d, value) in row.iter().enumerate() {
                if *value > self.estimate[best.0][best.1] {
                    best = (n, d);
                }
            }
        }
        #[allow(clippy::cast_possible_truncation)]
        Action::new(best.0 as u8, best.1 as u8)
    }

    /// Number of actions that are not fully pruned
    pub fn open_actions(&self) -> usize {
        self.prune
            .iter()
            .flatten()
            .filter(|count| **count < PRUNE_LIMIT)
            .count()
    }

    /// Serialize into the storage layout: estimate grid then prune grid,
    /// both row-major
    pub fn write_bytes(&self, out: &mut [u8; QTABLE_BYTES]) {
        let (estimate, prune) = out.split_at_mut(GRID_BYTES);
        for (dst, src) in estimate.iter_mut().zip(self.estimate.iter().flatten()) {
            *dst = *src;
        }
        for (dst, src) in prune.iter_mut().zip(self.prune.iter().flatten()) {
            *dst = *src;
        }
    }

    /// Deserialize from the storage layout
    pub fn read_bytes(&mut self, bytes: &[u8; QTABLE_BYTES]) {
        let (estimate, prune) = bytes.split_at(GRID_BYTES);
        for (dst, src) in self.estimate.iter_mut().flatten().zip(estimate) {
            *dst = *src;
        }
        for (dst, src) in self.prune.iter_mut().flatten().zip(prune) {
            *dst = *src;
        }
    }

    pub fn from_bytes(bytes: &[u8; QTABLE_BYTES]) -> Self {
        let mut table = Self::new();
        table.read_bytes(bytes);
        table
    }
}

impl fmt::Debug for QTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QTable")
            .field("best", &self.best_action())
            .field("open_actions", &self.open_actions())
            .finish_non_exhaustive()
    }
}

/// Row dump: `R-<num_on_leds>:` followed by `estimate [prune]` per duty
impl fmt::Display for QTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, (estimates, prunes)) in self.estimate.iter().zip(&self.prune).enumerate() {
            write!(f, "R-{n}:")?;
            for (estimate, prune) in estimates.iter().zip(prunes) {
                write!(f, "\t{estimate} [{prune}]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
