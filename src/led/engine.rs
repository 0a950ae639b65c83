use embassy_time::Timer;
use heapless::Vec;

use super::display::{Display, DisplayOps};
use super::intent::{LedId, PatternEvent, PatternIntent, PatternMailbox};
use super::pattern::{Level, Pattern, Repeat, StepDuration};
use super::preset::Preset;
use crate::config::{INTENT_QUEUE_SIZE, MAX_CHANNELS, PatternEngineConfig};
use crate::error::{Error, Result};
use crate::log::log;
use crate::timebase::{Timebase, elapsed_ms};

/// Lifecycle of one channel's pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternStatus {
    #[default]
    NotStarted,
    Running,
    /// A finite pattern completed and holds its last step's level.
    Finished,
    /// The pattern was found malformed when it was started.
    Error,
}

/// Which pattern a channel is rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSource {
    Preset(Preset),
    /// The channel's own custom slot
    Custom,
}

impl Default for PatternSource {
    fn default() -> Self {
        Self::Preset(Preset::SteadyOff)
    }
}

/// Per-channel execution state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternRuntime {
    source: PatternSource,
    status: PatternStatus,
    started_at: u32,
    exec_count: u32,
    step_index: u8,
    step_started_at: u32,
}

impl PatternRuntime {
    pub const fn source(&self) -> PatternSource {
        self.source
    }

    pub const fn status(&self) -> PatternStatus {
        self.status
    }

    /// Timebase reading when the pattern was started
    pub const fn started_at(&self) -> u32 {
        self.started_at
    }

    /// Completed passes over the step sequence
    pub const fn exec_count(&self) -> u32 {
        self.exec_count
    }

    pub const fn step_index(&self) -> u8 {
        self.step_index
    }

    /// Timebase reading when the current step began
    pub const fn step_started_at(&self) -> u32 {
        self.step_started_at
    }

    fn reset(&mut self, source: PatternSource) {
        *self = Self {
            source,
            ..Self::default()
        };
    }
}

struct ChannelSlot<D> {
    display: Display<D>,
    runtime: PatternRuntime,
    custom: Pattern,
}

impl<D: DisplayOps> ChannelSlot<D> {
    fn new(display: Display<D>) -> Self {
        Self {
            display,
            runtime: PatternRuntime::default(),
            custom: *Preset::SteadyOff.pattern(),
        }
    }

    fn pattern(&self) -> &Pattern {
        match self.runtime.source {
            PatternSource::Preset(preset) => preset.pattern(),
            PatternSource::Custom => &self.custom,
        }
    }

    fn apply(&mut self, intent: PatternIntent) {
        let source = match intent {
            PatternIntent::SetPreset(preset) => PatternSource::Preset(preset),
            PatternIntent::SetCustom(pattern) => {
                self.custom = pattern;
                PatternSource::Custom
            }
        };
        self.runtime.reset(source);
    }

    fn start(&mut self, now: u32) -> Result<()> {
        if self.pattern().validate().is_err() {
            self.runtime.status = PatternStatus::Error;
            return Err(Error::Resource);
        }
        let runtime = &mut self.runtime;
        runtime.started_at = now;
        runtime.step_started_at = now;
        runtime.step_index = 0;
        runtime.exec_count = 0;
        runtime.status = PatternStatus::Running;
        Ok(())
    }

    /// Advance the step state machine by one tick.
    fn advance(&mut self, now: u32) {
        if self.runtime.status != PatternStatus::Running {
            return;
        }
        let pattern = *self.pattern();
        let runtime = &mut self.runtime;

        // Corrupted index: restart from the first step.
        if runtime.step_index >= pattern.len() {
            runtime.step_index = 0;
            runtime.step_started_at = now;
        }

        let Some(step) = pattern.step(runtime.step_index) else {
            runtime.status = PatternStatus::Error;
            return;
        };

        let mut level = step.level;
        if let StepDuration::Millis(duration) = step.duration
            && elapsed_ms(now, runtime.step_started_at) >= duration
        {
            let next = runtime.step_index + 1;
            if next < pattern.len() {
                runtime.step_index = next;
            } else {
                match pattern.repeat() {
                    Repeat::Times(times) => {
                        runtime.exec_count = runtime.exec_count.saturating_add(1);
                        if runtime.exec_count >= times {
                            runtime.status = PatternStatus::Finished;
                        } else {
                            runtime.step_index = pattern.loop_start();
                        }
                    }
                    Repeat::Infinite => {
                        runtime.exec_count = runtime.exec_count.wrapping_add(1);
                        runtime.step_index = pattern.loop_start();
                    }
                }
            }
            runtime.step_started_at = now;
            if let Some(step) = pattern.step(runtime.step_index) {
                level = step.level;
            }
        }

        // A faulty output must not stall the other channels.
        let _ = self.display.set(level);
    }
}

/// Multi-channel pattern renderer
///
/// Owns one [`Display`] per channel and advances every channel's step state
/// machine once per [`tick`](Self::tick). Pattern changes arrive through a
/// shared [`PatternMailbox`] and are applied at the start of the next tick,
/// in submission order.
///
/// # Usage
///
/// ```ignore
/// static MAILBOX: PatternMailbox = PatternMailbox::new();
///
/// let mut engine = PatternEngine::new(&MAILBOX, EmbassyTimebase, PatternEngineConfig::default());
/// engine.init([blue, green, red])?;
///
/// MAILBOX.set_preset(LedId::Led0, Preset::Heartbeat)?;
/// engine.run().await;
/// ```
pub struct PatternEngine<'a, D, T, const QUEUE_SIZE: usize = INTENT_QUEUE_SIZE> {
    // External dependencies and configuration
    mailbox: &'a PatternMailbox<QUEUE_SIZE>,
    timebase: T,
    config: PatternEngineConfig,

    // Internal state
    channels: Vec<ChannelSlot<D>, MAX_CHANNELS>,
}

impl<'a, D, T, const QUEUE_SIZE: usize> PatternEngine<'a, D, T, QUEUE_SIZE>
where
    D: DisplayOps,
    T: Timebase,
{
    /// Create an uninitialized engine bound to `mailbox`.
    pub const fn new(
        mailbox: &'a PatternMailbox<QUEUE_SIZE>,
        timebase: T,
        config: PatternEngineConfig,
    ) -> Self {
        Self {
            mailbox,
            timebase,
            config,
            channels: Vec::new(),
        }
    }

    /// Take ownership of one display per channel and open the mailbox.
    ///
    /// Channel `n` is driven by the `n`-th display. Every channel starts on
    /// [`Preset::SteadyOff`] in [`PatternStatus::NotStarted`].
    ///
    /// Fails with [`Error::InputParam`] for zero or more than
    /// [`MAX_CHANNELS`] displays, with [`Error::InitStatus`] if already
    /// initialized, and with [`Error::Resource`] if a display cannot be
    /// initialized. On failure every display initialized so far is released.
    pub fn init(&mut self, displays: impl IntoIterator<Item = D>) -> Result<()> {
        let mut pending: Vec<D, MAX_CHANNELS> = Vec::new();
        for ops in displays {
            pending.push(ops).map_err(|_| Error::InputParam)?;
        }
        if pending.is_empty() {
            return Err(Error::InputParam);
        }
        if self.is_initialized() {
            return Err(Error::InitStatus);
        }

        let mut slots: Vec<ChannelSlot<D>, MAX_CHANNELS> = Vec::new();
        for ops in pending {
            let mut display = Display::new();
            let initialized = display.init(ops);
            if initialized.is_err() || slots.push(ChannelSlot::new(display)).is_err() {
                log!("[pattern] display {} init failed", slots.len());
                while let Some(mut slot) = slots.pop() {
                    let _ = slot.display.deinit();
                }
                return Err(Error::Resource);
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let count = slots.len() as u8;
        self.channels = slots;
        self.mailbox.open(count);
        log!("[pattern] engine initialized with {} channels", count);
        Ok(())
    }

    /// Close the mailbox, turn every output off and release the displays.
    ///
    /// Queued intents are dropped. Calling this on an uninitialized engine
    /// is a successful no-op.
    pub fn deinit(&mut self) {
        if !self.is_initialized() {
            return;
        }
        self.mailbox.close();
        while let Some(mut slot) = self.channels.pop() {
            let _ = slot.display.deinit();
        }
        log!("[pattern] engine deinitialized");
    }

    pub fn is_initialized(&self) -> bool {
        !self.channels.is_empty()
    }

    /// Apply queued intents, then advance every running channel.
    ///
    /// Reads the timebase once, so every channel sees the same instant.
    pub fn tick(&mut self) -> Result<()> {
        if !self.is_initialized() {
            return Err(Error::InitStatus);
        }
        let now = self.timebase.now_ms();

        self.process_intents(now);

        for slot in &mut self.channels {
            slot.advance(now);
        }
        Ok(())
    }

    /// Tick forever at the configured interval.
    pub async fn run(&mut self) -> ! {
        loop {
            if let Err(err) = self.tick() {
                log!("[pattern] tick skipped: {}", err);
            }
            Timer::after(self.config.tick_interval).await;
        }
    }

    /// Number of channels driven since [`init`](Self::init).
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn status(&self, channel: LedId) -> Result<PatternStatus> {
        self.runtime(channel).map(|runtime| runtime.status)
    }

    /// Read-only view of a channel's execution state.
    pub fn runtime(&self, channel: LedId) -> Result<PatternRuntime> {
        self.slot(channel).map(|slot| slot.runtime)
    }

    /// Read the level a channel's output currently shows.
    pub fn display_status(&mut self, channel: LedId) -> Result<Level> {
        self.slot_mut(channel)?.display.status()
    }

    pub const fn config(&self) -> &PatternEngineConfig {
        &self.config
    }

    /// Apply the intents queued on entry, starting each changed channel at
    /// `now`. Later submissions wait for the next tick.
    fn process_intents(&mut self, now: u32) {
        let mailbox = self.mailbox;
        for PatternEvent { channel, intent } in mailbox.drain_queued() {
            let Some(slot) = self.channels.get_mut(channel.index()) else {
                log!("[pattern] dropped intent for {:?}", channel);
                continue;
            };
            slot.apply(intent);
            if let Err(err) = slot.start(now) {
                log!("[pattern] {:?} failed to start: {}", channel, err);
            }
        }
    }

    fn slot(&self, channel: LedId) -> Result<&ChannelSlot<D>> {
        if !self.is_initialized() {
            return Err(Error::InitStatus);
        }
        self.channels.get(channel.index()).ok_or(Error::InputParam)
    }

    fn slot_mut(&mut self, channel: LedId) -> Result<&mut ChannelSlot<D>> {
        if !self.is_initialized() {
            return Err(Error::InitStatus);
        }
        self.channels.get_mut(channel.index()).ok_or(Error::InputParam)
    }
}
