//! Engine limits and tunables.

use embassy_time::Duration;

/// Maximum number of display channels a pattern engine can drive.
pub const MAX_CHANNELS: usize = 4;

/// Maximum number of steps in one display pattern.
pub const MAX_PATTERN_STEPS: usize = 16;

/// Default depth of the pattern intent queue.
pub const INTENT_QUEUE_SIZE: usize = 10;

/// Default interval between two pattern engine ticks.
///
/// This is the timing resolution of every pattern step.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Largest single DMA transfer started by the serial transport.
pub const TX_CHUNK_SIZE: usize = 512;

/// Configuration for the pattern engine worker
#[derive(Debug, Clone, Copy)]
pub struct PatternEngineConfig {
    /// Sleep between two ticks of [`PatternEngine::run`](crate::led::PatternEngine::run)
    pub tick_interval: Duration,
}

impl Default for PatternEngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}
