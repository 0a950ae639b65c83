//! Status codes shared by both engines.
//!
//! Every public entry point checks its failure classes in a fixed order:
//! input parameters first, then initialization status, then resources.

use core::fmt;

/// Error returned by the LED and serial engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The caller violated a documented precondition (channel out of range,
    /// empty data, malformed pattern).
    InputParam,
    /// The component is not initialized, or is already initialized.
    InitStatus,
    /// An underlying primitive (queue, ring buffer, actuator, DMA) failed.
    Resource,
    /// The payload is larger than the transmit ring buffer can ever hold.
    TxSizeExceeded,
    /// The payload fits the ring buffer but not its current free space.
    TxOverflow,
    /// A DMA transfer is still in flight.
    TxBusy,
}

impl Error {
    /// Short, stable name for log output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputParam => "input parameter error",
            Self::InitStatus => "init status error",
            Self::Resource => "resource error",
            Self::TxSizeExceeded => "tx size exceeded",
            Self::TxOverflow => "tx overflow",
            Self::TxBusy => "tx busy",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::error::Error for Error {}

/// Result alias used across the crate.
pub type Result<T> = core::result::Result<T, Error>;
