//! Monotonic millisecond clock consumed by the pattern engine.

use embassy_time::Instant;

/// Milliseconds since boot, wrapping at 2^32.
///
/// Consumers must compare readings with [`elapsed_ms`] so a counter
/// rollover does not corrupt timing.
pub trait Timebase {
    fn now_ms(&self) -> u32;
}

impl<T: Timebase + ?Sized> Timebase for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Timebase backed by the embassy time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyTimebase;

impl Timebase for EmbassyTimebase {
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> u32 {
        // Truncation is the wraparound.
        Instant::now().as_millis() as u32
    }
}

/// Time elapsed from `since` to `now`, correct across one counter wrap.
pub const fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}
