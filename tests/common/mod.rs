//! Host-side fakes for the hardware traits.
//!
//! Every fake is a cheap handle over shared state so a test can keep one
//! clone for inspection and fault injection while the code under test owns
//! another.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rlic::qtable::{QTABLE_BYTES, QTable};
use rlic::storage::{SLOT_BLOCK_SIZE, slot_offset};
use rlic::{BlockStorage, LedDriver, LightSensor, StorageFault, TimeSlot};

#[derive(Debug, Default)]
pub struct StorageState {
    pub blocks: Vec<u8>,
    pub slots: u16,
    pub mounted: bool,
    pub opened: bool,
    pub fail_mount: bool,
    pub fail_open: bool,
    pub fail_read: bool,
    pub fail_write: bool,
    pub fail_close: bool,
    pub reads: usize,
    pub writes: usize,
    pub closes: usize,
}

/// Zero-filled block storage in RAM
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    state: Rc<RefCell<StorageState>>,
}

impl MemoryStorage {
    pub fn new(slots: u16) -> Self {
        let state = StorageState {
            blocks: vec![0; usize::from(slots) * SLOT_BLOCK_SIZE as usize],
            slots,
            ..StorageState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn state(&self) -> std::cell::Ref<'_, StorageState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> std::cell::RefMut<'_, StorageState> {
        self.state.borrow_mut()
    }

    /// Raw bytes of a slot's table pair
    pub fn slot_bytes(&self, slot: u16) -> [u8; QTABLE_BYTES] {
        let offset = slot_offset(TimeSlot::new(slot).unwrap()) as usize;
        let mut bytes = [0; QTABLE_BYTES];
        bytes.copy_from_slice(&self.state().blocks[offset..offset + QTABLE_BYTES]);
        bytes
    }

    /// Decoded table of a slot
    pub fn table(&self, slot: u16) -> QTable {
        QTable::from_bytes(&self.slot_bytes(slot))
    }

    /// Store a table directly, bypassing the controller
    pub fn put_table(&self, slot: u16, table: &QTable) {
        let mut bytes = [0; QTABLE_BYTES];
        table.write_bytes(&mut bytes);
        let offset = slot_offset(TimeSlot::new(slot).unwrap()) as usize;
        self.state_mut().blocks[offset..offset + QTABLE_BYTES].copy_from_slice(&bytes);
    }

    fn block_range(state: &StorageState, slot: TimeSlot, len: usize) -> Option<std::ops::Range<usize>> {
        if slot.index() >= state.slots || len > SLOT_BLOCK_SIZE as usize {
            return None;
        }
        let offset = slot_offset(slot) as usize;
        Some(offset..offset + len)
    }
}

impl BlockStorage for MemoryStorage {
    fn mount(&mut self) -> Result<(), StorageFault> {
        let mut state = self.state_mut();
        if state.fail_mount {
            return Err(StorageFault::Mount);
        }
        state.mounted = true;
        Ok(())
    }

    fn open(&mut self) -> Result<(), StorageFault> {
        let mut state = self.state_mut();
        if state.fail_open || !state.mounted {
            return Err(StorageFault::Open);
        }
        state.opened = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageFault> {
        let mut state = self.state_mut();
        state.closes += 1;
        if state.fail_close {
            return Err(StorageFault::Close);
        }
        state.opened = false;
        Ok(())
    }

    fn read(&mut self, slot: TimeSlot, buf: &mut [u8]) -> Result<(), StorageFault> {
        let mut state = self.state_mut();
        if state.fail_read || !state.opened {
            return Err(StorageFault::Read);
        }
        let range = Self::block_range(&state, slot, buf.len()).ok_or(StorageFault::Read)?;
        buf.copy_from_slice(&state.blocks[range]);
        state.reads += 1;
        Ok(())
    }

    fn write(&mut self, slot: TimeSlot, buf: &[u8]) -> Result<(), StorageFault> {
        let mut state = self.state_mut();
        if state.fail_write || !state.opened {
            return Err(StorageFault::Write);
        }
        let range = Self::block_range(&state, slot, buf.len()).ok_or(StorageFault::Write)?;
        state.blocks[range].copy_from_slice(buf);
        state.writes += 1;
        Ok(())
    }

    fn slot_count(&self) -> u16 {
        self.state().slots
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverOp {
    Init,
    Column(u8, u8),
    Dimming(u8),
}

#[derive(Debug, Default)]
pub struct ChainState {
    pub columns: [u8; 16],
    pub dimming: u8,
    pub ops: Vec<DriverOp>,
}

impl ChainState {
    pub fn lit_count(&self) -> u32 {
        self.columns.iter().map(|bits| bits.count_ones()).sum()
    }

    pub fn dimming_ops(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DriverOp::Dimming(level) => Some(*level),
                _ => None,
            })
            .collect()
    }
}

/// LED driver that records every register write
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    state: Rc<RefCell<ChainState>>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> std::cell::Ref<'_, ChainState> {
        self.state.borrow()
    }

    pub fn clear_ops(&self) {
        self.state.borrow_mut().ops.clear();
    }
}

impl LedDriver for RecordingDriver {
    fn init(&mut self) {
        self.state.borrow_mut().ops.push(DriverOp::Init);
    }

    fn set_column(&mut self, index: u8, bits: u8) {
        let mut state = self.state.borrow_mut();
        state.columns[usize::from(index)] = bits;
        state.ops.push(DriverOp::Column(index, bits));
    }

    fn set_dimming(&mut self, level: u8) {
        let mut state = self.state.borrow_mut();
        state.dimming = level;
        state.ops.push(DriverOp::Dimming(level));
    }
}

/// Sensor replaying queued readings, then repeating a fallback value
#[derive(Debug, Clone, Default)]
pub struct ScriptedSensor {
    state: Rc<RefCell<(VecDeque<u16>, u16, usize)>>,
}

impl ScriptedSensor {
    pub fn constant(lux: u16) -> Self {
        Self {
            state: Rc::new(RefCell::new((VecDeque::new(), lux, 0))),
        }
    }

    pub fn push(&self, readings: &[u16]) {
        self.state.borrow_mut().0.extend(readings);
    }

    pub fn reads(&self) -> usize {
        self.state.borrow().2
    }
}

impl LightSensor for ScriptedSensor {
    fn luminosity(&mut self) -> u16 {
        let mut state = self.state.borrow_mut();
        state.2 += 1;
        let fallback = state.1;
        state.0.pop_front().unwrap_or(fallback)
    }
}
