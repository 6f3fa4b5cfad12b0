use core::fmt;

/// Failure reported by a [`BlockStorage`](crate::BlockStorage) implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFault {
    /// The medium or volume could not be mounted
    Mount,
    /// The data file could not be opened or initialized
    Open,
    /// A slot read failed or came back short
    Read,
    /// A slot write or sync failed
    Write,
    /// The data file could not be closed
    Close,
}

impl fmt::Display for StorageFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Self::Mount => "mount failed",
            Self::Open => "open failed",
            Self::Read => "read failed",
            Self::Write => "write failed",
            Self::Close => "close failed",
        };
        f.write_str(what)
    }
}

/// Controller errors. Every variant is fatal for the current operating cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Storage could not be mounted or opened at startup
    StorageUnavailable(StorageFault),
    /// A slot read or write failed while running
    StorageIo(StorageFault),
    /// A slot index past the last slot was produced
    SlotIndexOutOfRange,
}

/// What the enclosing application must do after an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Do not start the control loop
    AbortStartup,
    /// Close storage, then reset the device
    ShutdownAndReset,
}

impl Error {
    pub const fn recovery(&self) -> Recovery {
        match self {
            Self::StorageUnavailable(_) => Recovery::AbortStartup,
            Self::StorageIo(_) | Self::SlotIndexOutOfRange => Recovery::ShutdownAndReset,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageUnavailable(fault) => write!(f, "storage unavailable: {fault}"),
            Self::StorageIo(fault) => write!(f, "storage i/o failure: {fault}"),
            Self::SlotIndexOutOfRange => f.write_str("time slot index out of range"),
        }
    }
}

impl core::error::Error for Error {}
