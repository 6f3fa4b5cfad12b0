//! Slot persistence for learning tables
//!
//! Every time slot owns one fixed-size block at `slot * SLOT_BLOCK_SIZE`.
//! A table pair is always read and written as a whole block, never in
//! parts.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::BlockStorage;
use crate::error::Error;
use crate::qtable::{QTABLE_BYTES, QTable};
use crate::time_slot::TimeSlot;

/// Size of one slot block on the medium
pub const SLOT_BLOCK_SIZE: u32 = 4096;

#[allow(clippy::cast_possible_truncation)]
const _: () = assert!(QTABLE_BYTES as u32 <= SLOT_BLOCK_SIZE);

/// Byte offset of a slot block
#[allow(clippy::cast_lossless)]
pub const fn slot_offset(slot: TimeSlot) -> u32 {
    slot.index() as u32 * SLOT_BLOCK_SIZE
}

/// Loads and persists [`QTable`]s through a [`BlockStorage`]
pub struct QTableStore<S: BlockStorage> {
    storage: S,
    buffer: [u8; QTABLE_BYTES],
    open: bool,
}

impl<S: BlockStorage> QTableStore<S> {
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            buffer: [0; QTABLE_BYTES],
            open: false,
        }
    }

    /// Mount the medium and open the data file
    pub fn init(&mut self) -> Result<(), Error> {
        self.storage.mount().map_err(|fault| {
            #[cfg(feature = "esp32-log")]
            println!("[QTableStore.init] {}", fault);
            Error::StorageUnavailable(fault)
        })?;
        self.storage.open().map_err(|fault| {
            #[cfg(feature = "esp32-log")]
            println!("[QTableStore.init] {}", fault);
            Error::StorageUnavailable(fault)
        })?;
        self.open = true;
        Ok(())
    }

    /// Read the table of a slot into `table`
    ///
    /// On failure `table` is left untouched.
    pub fn load(&mut self, slot: TimeSlot, table: &mut QTable) -> Result<(), Error> {
        self.check_slot(slot)?;
        self.storage.read(slot, &mut self.buffer).map_err(|fault| {
            #[cfg(feature = "esp32-log")]
            println!("[QTableStore.load] slot {}: {}", slot, fault);
            Error::StorageIo(fault)
        })?;
        table.read_bytes(&self.buffer);
        Ok(())
    }

    /// Persist the whole table pair of a slot
    pub fn save(&mut self, slot: TimeSlot, table: &QTable) -> Result<(), Error> {
        self.check_slot(slot)?;
        table.write_bytes(&mut self.buffer);
        self.storage.write(slot, &self.buffer).map_err(|fault| {
            #[cfg(feature = "esp32-log")]
            println!("[QTableStore.save] slot {}: {}", slot, fault);
            Error::StorageIo(fault)
        })
    }

    /// Flush and close the data file
    ///
    /// Does nothing if the store was never opened.
    pub fn close(&mut self) -> Result<(), Error> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.storage.close().map_err(Error::StorageIo)
    }

    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn check_slot(&self, slot: TimeSlot) -> Result<(), Error> {
        if slot.index() >= self.storage.slot_count() {
            return Err(Error::SlotIndexOutOfRange);
        }
        Ok(())
    }
}
