//! Simulated hardware for the preview
//!
//! Both LED chains and the light sensor share state through cheap handles,
//! so the UI can read what the controller and the tick wrote.

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::rc::Rc;

use rlic::matrix::COLUMNS;
use rlic::qtable::QTABLE_BYTES;
use rlic::storage::{SLOT_BLOCK_SIZE, slot_offset};
use rlic::time_slot::SLOT_COUNT;
use rlic::{BlockStorage, LedDriver, LightSensor, StorageFault, TimeSlot};

/// Illumination added per lit segment and dimming step of the lamp chain
const LAMP_LUX_PER_STEP: u32 = 5;

/// Illumination added per lit segment and dimming step of the daylight chain
const DAYLIGHT_LUX_PER_STEP: u32 = 4;

/// Table storage in a flat file, one 4 KiB block per slot
pub struct FileStorage {
    path: PathBuf,
    file: Option<File>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    fn file(&mut self, fault: StorageFault) -> Result<&mut File, StorageFault> {
        self.file.as_mut().ok_or(fault)
    }
}

impl BlockStorage for FileStorage {
    fn mount(&mut self) -> Result<(), StorageFault> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                std::fs::create_dir_all(dir).map_err(|_| StorageFault::Mount)
            }
            _ => Ok(()),
        }
    }

    fn open(&mut self) -> Result<(), StorageFault> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|_| StorageFault::Open)?;

        let size = u64::from(SLOT_COUNT) * u64::from(SLOT_BLOCK_SIZE);
        let len = file.metadata().map_err(|_| StorageFault::Open)?.len();
        if len < size {
            // set_len zero-fills the new blocks
            file.set_len(size).map_err(|_| StorageFault::Open)?;
        }

        self.file = Some(file);
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageFault> {
        match self.file.take() {
            Some(file) => file.sync_all().map_err(|_| StorageFault::Close),
            None => Ok(()),
        }
    }

    fn read(&mut self, slot: TimeSlot, buf: &mut [u8]) -> Result<(), StorageFault> {
        let file = self.file(StorageFault::Read)?;
        file.seek(SeekFrom::Start(u64::from(slot_offset(slot))))
            .map_err(|_| StorageFault::Read)?;
        file.read_exact(buf).map_err(|_| StorageFault::Read)
    }

    fn write(&mut self, slot: TimeSlot, buf: &[u8]) -> Result<(), StorageFault> {
        debug_assert_eq!(buf.len(), QTABLE_BYTES);
        let file = self.file(StorageFault::Write)?;
        file.seek(SeekFrom::Start(u64::from(slot_offset(slot))))
            .map_err(|_| StorageFault::Write)?;
        file.write_all(buf).map_err(|_| StorageFault::Write)?;
        file.sync_data().map_err(|_| StorageFault::Write)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ChainState {
    pub columns: [u8; COLUMNS],
    pub dimming: u8,
}

impl ChainState {
    pub fn lit_count(&self) -> u32 {
        self.columns.iter().map(|bits| bits.count_ones()).sum()
    }

    pub fn is_lit(&self, column: usize, row: usize) -> bool {
        self.columns[column] & (1 << row) != 0
    }

    /// Light output in segment-steps: lit segments times dimming steps
    fn output(&self) -> u32 {
        self.lit_count() * (u32::from(self.dimming) + 1)
    }
}

/// LED chain keeping its registers in shared memory
#[derive(Debug, Default, Clone)]
pub struct SimChain {
    state: Rc<RefCell<ChainState>>,
}

impl SimChain {
    pub fn snapshot(&self) -> ChainState {
        *self.state.borrow()
    }
}

impl LedDriver for SimChain {
    fn init(&mut self) {
        *self.state.borrow_mut() = ChainState::default();
    }

    fn set_column(&mut self, index: u8, bits: u8) {
        if let Some(column) = self.state.borrow_mut().columns.get_mut(usize::from(index)) {
            *column = bits;
        }
    }

    fn set_dimming(&mut self, level: u8) {
        self.state.borrow_mut().dimming = level;
    }
}

/// Light sensor summing room light and both chains
pub struct SimSensor {
    lamp: SimChain,
    daylight: SimChain,
    ambient: Rc<RefCell<u32>>,
}

impl SimSensor {
    pub fn new(lamp: SimChain, daylight: SimChain, ambient: Rc<RefCell<u32>>) -> Self {
        Self {
            lamp,
            daylight,
            ambient,
        }
    }

    pub fn lux(&self) -> u32 {
        *self.ambient.borrow()
            + self.lamp.snapshot().output() * LAMP_LUX_PER_STEP
            + self.daylight.snapshot().output() * DAYLIGHT_LUX_PER_STEP
    }
}

impl LightSensor for SimSensor {
    fn luminosity(&mut self) -> u16 {
        u16::try_from(self.lux()).unwrap_or(u16::MAX)
    }
}
