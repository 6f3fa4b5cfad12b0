//! Tabular learning engine
//!
//! Keeps one [`QTable`] per time slot on block storage. Each control
//! iteration picks an action for the current slot (explore or exploit),
//! observes a reward and folds it into the slot's table with a damped
//! average. There is no discounted future term: the next state is dictated
//! by the wall clock, not by the action taken.
//!
//! Actions that keep earning poor rewards are pruned from random
//! exploration once their prune counter reaches
//! [`PRUNE_LIMIT`](crate::qtable::PRUNE_LIMIT).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::action::{ACTION_COUNT, Action, MAX_DUTY, MAX_ON_LEDS};
use crate::error::Error;
use crate::qtable::QTable;
use crate::reward::{DEFAULT_TARGET_LUX, compute_reward};
use crate::storage::QTableStore;
use crate::time_slot::TimeSlot;
use crate::{BlockStorage, SeedSource};

/// Seed used when the seed source has nothing to offer
pub const DEFAULT_SEED: u32 = 1234;

/// Lowest reward that does not count towards pruning
pub const MIN_ACCEPTABLE_REWARD: u8 = 8;

/// Redraws allowed when a random pick lands on a pruned action
const EXPLORE_ATTEMPTS: usize = ACTION_COUNT;

/// Configuration for the learning engine
#[derive(Debug, Clone)]
pub struct LearningConfig {
    /// Illumination the controller is trying to reach
    pub target_lux: u32,
    /// Chance of exploring on an iteration, in percent (`0..=100`)
    pub explore_percent: u8,
    /// Rewards below this count towards pruning
    pub min_reward: u8,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            target_lux: DEFAULT_TARGET_LUX,
            explore_percent: 0,
            min_reward: MIN_ACCEPTABLE_REWARD,
        }
    }
}

/// An action picked for a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub action: Action,
    /// `true` if the action was drawn at random
    pub explored: bool,
}

/// Learning engine over slot tables kept in block storage
pub struct LearningEngine<S: BlockStorage> {
    store: QTableStore<S>,
    table: QTable,
    loaded: Option<TimeSlot>,
    rng: SmallRng,
    config: LearningConfig,
}

impl<S: BlockStorage> LearningEngine<S> {
    /// Create a new engine seeded from `seed`, or from [`DEFAULT_SEED`] if
    /// the source fails
    pub fn new(storage: S, config: &LearningConfig, seed: &mut impl SeedSource) -> Self {
        let seed = seed.seed().unwrap_or_else(|| {
            #[cfg(feature = "esp32-log")]
            println!("[LearningEngine.new] no seed available, using default");
            DEFAULT_SEED
        });
        Self::with_seed(storage, config, seed)
    }

    /// Create a new engine with a fixed seed
    pub fn with_seed(storage: S, config: &LearningConfig, seed: u32) -> Self {
        Self {
            store: QTableStore::new(storage),
            table: QTable::new(),
            loaded: None,
            rng: SmallRng::seed_from_u64(u64::from(seed)),
            config: config.clone(),
        }
    }

    /// Mount and open the table storage
    pub fn init(&mut self) -> Result<(), Error> {
        self.store.init()
    }

    /// Close the table storage
    pub fn shutdown(&mut self) -> Result<(), Error> {
        self.loaded = None;
        self.store.close()
    }

    /// Weighted coin flip between exploring and exploiting
    ///
    /// Returns `true` to explore.
    pub fn decide_explore(&mut self) -> bool {
        match self.config.explore_percent {
            0 => false,
            percent if percent >= 100 => true,
            percent => self.rng.gen_range(0..100u8) < percent,
        }
    }

    /// Pick an action for `slot`, loading its table from storage first
    pub fn select_action(&mut self, slot: TimeSlot, explore: bool) -> Result<Selection, Error> {
        self.load(slot)?;
        Ok(self.choose(explore))
    }

    /// Pick an action from the loaded table
    ///
    /// Exploiting takes the best estimate. If that action is fully pruned its
    /// estimate is forgotten and the pick falls through to a random one; the
    /// reset guarantees this happens at most once per call.
    pub fn choose(&mut self, explore: bool) -> Selection {
        if !explore {
            let best = self.table.best_action();
            if !self.table.is_pruned(best) {
                return Selection {
                    action: best,
                    explored: false,
                };
            }
            self.table.set_estimate(best, 0);
        }

        Selection {
            action: self.explore_action(),
            explored: true,
        }
    }

    /// Reward of a measurement against the configured target
    pub const fn compute_reward(&self, measured_lux: u32) -> u8 {
        compute_reward(measured_lux, self.config.target_lux)
    }

    /// Fold a reward into the table of `slot` and persist it
    pub fn update_table(&mut self, slot: TimeSlot, action: Action, reward: u8) -> Result<(), Error> {
        if self.loaded != Some(slot) {
            self.load(slot)?;
        }

        let old = self.table.estimate(action);
        #[allow(clippy::cast_possible_truncation)]
        let updated = ((u16::from(old) + u16::from(reward) + 1) / 2) as u8;
        self.table.set_estimate(action, updated);

        if reward < self.config.min_reward {
            self.table.bump_prune(action);
        } else {
            self.table.clear_prune(action);
        }

        self.store.save(slot, &self.table)
    }

    /// Uniform random action, avoiding pruned ones when possible
    ///
    /// Falls back to the first draw if every redraw lands on a pruned action.
    fn explore_action(&mut self) -> Action {
        let first = self.random_action();
        let mut candidate = first;
        for _ in 0..EXPLORE_ATTEMPTS {
            if !self.table.is_pruned(candidate) {
                return candidate;
            }
            candidate = self.random_action();
        }
        first
    }

    fn random_action(&mut self) -> Action {
        let num_on_leds = self.rng.gen_range(0..=MAX_ON_LEDS);
        let duty = if num_on_leds == 0 {
            0
        } else {
            self.rng.gen_range(0..=MAX_DUTY)
        };
        Action::new(num_on_leds, duty)
    }

    fn load(&mut self, slot: TimeSlot) -> Result<(), Error> {
        self.loaded = None;
        self.store.load(slot, &mut self.table)?;
        self.loaded = Some(slot);
        Ok(())
    }

    /// Table of the loaded slot
    pub const fn table(&self) -> &QTable {
        &self.table
    }

    pub const fn loaded_slot(&self) -> Option<TimeSlot> {
        self.loaded
    }

    pub const fn store(&self) -> &QTableStore<S> {
        &self.store
    }
}
