#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod led;
pub mod queue;
pub mod serial;
pub mod timebase;

mod log;

pub use config::{
    DEFAULT_TICK_INTERVAL, INTENT_QUEUE_SIZE, MAX_CHANNELS, MAX_PATTERN_STEPS,
    PatternEngineConfig, TX_CHUNK_SIZE,
};
pub use error::{Error, Result};
pub use led::{
    Display, DisplayOps, Level, LedId, Pattern, PatternEngine, PatternIntent, PatternMailbox,
    PatternStatus, Preset, Repeat, Step, StepDuration,
};
pub use queue::{Queue, QueueFull};
pub use serial::{RingBuffer, SerialHardware, SerialTransport, TransportDriver, TxStatus};
pub use timebase::{EmbassyTimebase, Timebase, elapsed_ms};

pub use embassy_time::Duration;
