//! Declarative on/off step sequences.
//!
//! A [`Pattern`] is a fixed-capacity list of [`Step`]s plus a repetition
//! policy. Patterns are plain `Copy` data so they can travel through the
//! intent queue and be stored per channel without allocation.

use crate::config::MAX_PATTERN_STEPS;
use crate::error::{Error, Result};

/// Output level of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Off,
    On,
}

impl Level {
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// The opposite level.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

/// How long a step is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDuration {
    /// Hold for this many milliseconds. Zero is invalid.
    Millis(u32),
    /// Hold forever. Used by the steady presets.
    Infinite,
}

/// One step of a display pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub level: Level,
    pub duration: StepDuration,
}

impl Step {
    pub const fn on(ms: u32) -> Self {
        Self {
            level: Level::On,
            duration: StepDuration::Millis(ms),
        }
    }

    pub const fn off(ms: u32) -> Self {
        Self {
            level: Level::Off,
            duration: StepDuration::Millis(ms),
        }
    }

    pub const fn on_forever() -> Self {
        Self {
            level: Level::On,
            duration: StepDuration::Infinite,
        }
    }

    pub const fn off_forever() -> Self {
        Self {
            level: Level::Off,
            duration: StepDuration::Infinite,
        }
    }

    /// A finite step must last at least one millisecond.
    pub const fn is_valid(&self) -> bool {
        !matches!(self.duration, StepDuration::Millis(0))
    }
}

/// How many times the step sequence is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Run the sequence this many times, then hold the last step.
    ///
    /// `Times(0)` never produces output and is rejected.
    Times(u32),
    /// Run forever, wrapping to the loop-restart index.
    Infinite,
}

/// An ordered, bounded sequence of steps with a repetition policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    steps: [Step; MAX_PATTERN_STEPS],
    len: u8,
    repeat: Repeat,
    loop_start: u8,
}

impl Pattern {
    /// Build a pattern, checking every invariant.
    ///
    /// Fails with [`Error::InputParam`] if `steps` is empty or longer than
    /// [`MAX_PATTERN_STEPS`], a finite step has zero duration, `repeat` is
    /// `Times(0)`, or `loop_start` is not a valid step index.
    pub fn new(steps: &[Step], repeat: Repeat, loop_start: u8) -> Result<Self> {
        if steps.is_empty() || steps.len() > MAX_PATTERN_STEPS {
            return Err(Error::InputParam);
        }
        let mut storage = [Step::off_forever(); MAX_PATTERN_STEPS];
        storage[..steps.len()].copy_from_slice(steps);

        #[allow(clippy::cast_possible_truncation)]
        let pattern = Self {
            steps: storage,
            len: steps.len() as u8,
            repeat,
            loop_start,
        };
        pattern.validate()?;
        Ok(pattern)
    }

    /// Run `steps` once and hold the last one.
    pub fn once(steps: &[Step]) -> Result<Self> {
        Self::new(steps, Repeat::Times(1), 0)
    }

    /// Run `steps` `times` times and hold the last one.
    pub fn times(times: u32, steps: &[Step]) -> Result<Self> {
        Self::new(steps, Repeat::Times(times), 0)
    }

    /// Loop over `steps` forever.
    pub fn infinite(steps: &[Step]) -> Result<Self> {
        Self::new(steps, Repeat::Infinite, 0)
    }

    /// Run every step once, then loop forever from `loop_start`.
    pub fn infinite_from(loop_start: u8, steps: &[Step]) -> Result<Self> {
        Self::new(steps, Repeat::Infinite, loop_start)
    }

    /// Compile-time constructor for the built-in presets.
    ///
    /// Does not validate; presets are covered by tests instead.
    pub(crate) const fn from_parts(steps: &[Step], repeat: Repeat, loop_start: u8) -> Self {
        let mut storage = [Step::off_forever(); MAX_PATTERN_STEPS];
        let mut i = 0;
        while i < steps.len() {
            storage[i] = steps[i];
            i += 1;
        }

        #[allow(clippy::cast_possible_truncation)]
        Self {
            steps: storage,
            len: steps.len() as u8,
            repeat,
            loop_start,
        }
    }

    /// Check every pattern invariant.
    pub fn validate(&self) -> Result<()> {
        let len = usize::from(self.len);
        if len == 0 || len > MAX_PATTERN_STEPS {
            return Err(Error::InputParam);
        }
        if !self.steps().iter().all(Step::is_valid) {
            return Err(Error::InputParam);
        }
        if self.repeat == Repeat::Times(0) {
            return Err(Error::InputParam);
        }
        if self.loop_start >= self.len {
            return Err(Error::InputParam);
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// The active steps.
    pub fn steps(&self) -> &[Step] {
        self.steps.get(..usize::from(self.len)).unwrap_or(&[])
    }

    /// Step at `index`, if it is within the active steps.
    pub fn step(&self, index: u8) -> Option<&Step> {
        self.steps().get(usize::from(index))
    }

    pub const fn len(&self) -> u8 {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn repeat(&self) -> Repeat {
        self.repeat
    }

    /// Index execution wraps to after the last step.
    pub const fn loop_start(&self) -> u8 {
        self.loop_start
    }
}
