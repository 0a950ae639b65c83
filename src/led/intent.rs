//! Pattern intents and the mailbox that carries them to the engine.
//!
//! The mailbox is the only mutation entry point reachable from arbitrary
//! caller context. It validates, enqueues and returns; it never touches the
//! engine's runtime state.

use core::sync::atomic::{AtomicU8, Ordering};

use super::pattern::Pattern;
use super::preset::Preset;
use crate::config::{INTENT_QUEUE_SIZE, MAX_CHANNELS};
use crate::error::{Error, Result};
use crate::queue::Queue;

/// Logical display channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LedId {
    Led0 = 0,
    Led1 = 1,
    Led2 = 2,
    Led3 = 3,
}

impl LedId {
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Led0,
            1 => Self::Led1,
            2 => Self::Led2,
            3 => Self::Led3,
            _ => return None,
        })
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

const _: () = assert!(MAX_CHANNELS == 4, "LedId must cover every channel");

/// A requested change of one channel's pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternIntent {
    /// Switch to a built-in preset
    SetPreset(Preset),
    /// Copy a caller-supplied pattern into the channel's custom slot
    SetCustom(Pattern),
}

impl PatternIntent {
    /// Check the intent's payload.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::SetPreset(_) => Ok(()),
            Self::SetCustom(pattern) => pattern.validate(),
        }
    }
}

/// An intent addressed to a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternEvent {
    pub channel: LedId,
    pub intent: PatternIntent,
}

/// Bounded FIFO of pattern events shared between callers and the engine
///
/// Place it in a `static` and hand `&'static` references to every producer.
/// The engine opens it on `init` and closes it on `deinit`; submissions to a
/// closed mailbox fail with [`Error::InitStatus`].
pub struct PatternMailbox<const SIZE: usize = INTENT_QUEUE_SIZE> {
    queue: Queue<PatternEvent, SIZE>,
    /// Number of channels of the engine that owns this mailbox, 0 when closed.
    channels: AtomicU8,
}

impl<const SIZE: usize> PatternMailbox<SIZE> {
    /// Create a closed, empty mailbox.
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
            channels: AtomicU8::new(0),
        }
    }

    /// Queue an intent for `channel`.
    ///
    /// Never blocks. Fails with [`Error::InputParam`] for a malformed custom
    /// pattern or a channel the engine does not drive, with
    /// [`Error::InitStatus`] before the engine is initialized, and with
    /// [`Error::Resource`] if the queue is full.
    pub fn submit(&self, channel: LedId, intent: PatternIntent) -> Result<()> {
        intent.validate()?;

        let channels = self.channels.load(Ordering::Acquire);
        if channels == 0 {
            return Err(Error::InitStatus);
        }
        if channel.index() >= usize::from(channels) {
            return Err(Error::InputParam);
        }

        self.queue
            .try_send(PatternEvent { channel, intent })
            .map_err(|_| Error::Resource)
    }

    /// Switch `channel` to a built-in preset.
    pub fn set_preset(&self, channel: LedId, preset: Preset) -> Result<()> {
        self.submit(channel, PatternIntent::SetPreset(preset))
    }

    /// Switch `channel` to a caller-supplied pattern.
    pub fn set_custom(&self, channel: LedId, pattern: &Pattern) -> Result<()> {
        self.submit(channel, PatternIntent::SetCustom(*pattern))
    }

    /// Raw-id variant of [`set_preset`](Self::set_preset) for shell and
    /// protocol layers.
    pub fn set_preset_raw(&self, channel: u8, preset: u8) -> Result<()> {
        let channel = LedId::from_raw(channel).ok_or(Error::InputParam)?;
        let preset = Preset::from_raw(preset).ok_or(Error::InputParam)?;
        self.set_preset(channel, preset)
    }

    /// Number of intents waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_open(&self) -> bool {
        self.channels.load(Ordering::Acquire) != 0
    }

    pub(crate) fn open(&self, channels: u8) {
        self.queue.clear();
        self.channels.store(channels, Ordering::Release);
    }

    pub(crate) fn close(&self) {
        self.channels.store(0, Ordering::Release);
        self.queue.clear();
    }

    pub(crate) fn try_receive(&self) -> Option<PatternEvent> {
        self.queue.try_receive()
    }

    /// Take the intents queued at the time of the call. Intents submitted
    /// while iterating stay queued.
    pub(crate) fn drain_queued(&self) -> impl Iterator<Item = PatternEvent> + '_ {
        let queued = self.pending();
        (0..queued).map_while(|_| self.try_receive())
    }
}

impl<const SIZE: usize> Default for PatternMailbox<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}
