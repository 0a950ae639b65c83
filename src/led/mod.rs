//! LED pattern engine
//!
//! Callers submit [`PatternIntent`]s to a [`PatternMailbox`] from any
//! context; a single [`PatternEngine`] worker drains the mailbox and renders
//! every channel's [`Pattern`] onto its [`Display`].

pub mod board;
mod display;
mod engine;
mod intent;
mod pattern;
mod preset;

pub use board::{ActiveLevel, BOARD_LEDS, BoardLed, LedConfig, PinDisplay};
pub use display::{Display, DisplayOps};
pub use engine::{PatternEngine, PatternRuntime, PatternSource, PatternStatus};
pub use intent::{LedId, PatternEvent, PatternIntent, PatternMailbox};
pub use pattern::{Level, Pattern, Repeat, Step, StepDuration};
pub use preset::Preset;
