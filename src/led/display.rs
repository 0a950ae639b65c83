//! Single-channel display actuator.
//!
//! [`Display`] wraps one output's on/off/toggle/status capability behind an
//! init-gated contract. It owns no timing logic.

use super::pattern::Level;
use crate::error::{Error, Result};

/// Hardware operations for one display output
///
/// Implement this trait to support different hardware platforms.
/// See [`PinDisplay`](crate::led::board::PinDisplay) for a GPIO implementation.
pub trait DisplayOps {
    type Error: core::fmt::Debug;

    /// Turn the output on
    fn on(&mut self) -> core::result::Result<(), Self::Error>;

    /// Turn the output off
    fn off(&mut self) -> core::result::Result<(), Self::Error>;

    /// Invert the output
    fn toggle(&mut self) -> core::result::Result<(), Self::Error>;

    /// Read back the current output level
    fn status(&mut self) -> core::result::Result<Level, Self::Error>;

    /// Bring the hardware into a known state before first use
    fn prepare(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// Init-gated wrapper around a [`DisplayOps`] implementation
#[derive(Debug)]
pub struct Display<D> {
    ops: Option<D>,
}

impl<D: DisplayOps> Display<D> {
    /// Create an uninitialized display.
    pub const fn new() -> Self {
        Self { ops: None }
    }

    /// Take ownership of the hardware operations.
    ///
    /// Fails with [`Error::InitStatus`] if already initialized and with
    /// [`Error::Resource`] if the hardware cannot be prepared. In both cases
    /// the display is left as it was.
    pub fn init(&mut self, mut ops: D) -> Result<()> {
        if self.ops.is_some() {
            return Err(Error::InitStatus);
        }
        ops.prepare().map_err(|_| Error::Resource)?;
        self.ops = Some(ops);
        Ok(())
    }

    /// Turn the output off (best effort) and release the hardware.
    ///
    /// Deinitializing an uninitialized display is a no-op.
    pub fn deinit(&mut self) -> Option<D> {
        let mut ops = self.ops.take()?;
        let _ = ops.off();
        Some(ops)
    }

    pub const fn is_initialized(&self) -> bool {
        self.ops.is_some()
    }

    pub fn on(&mut self) -> Result<()> {
        self.ops()?.on().map_err(|_| Error::Resource)
    }

    pub fn off(&mut self) -> Result<()> {
        self.ops()?.off().map_err(|_| Error::Resource)
    }

    pub fn toggle(&mut self) -> Result<()> {
        self.ops()?.toggle().map_err(|_| Error::Resource)
    }

    pub fn status(&mut self) -> Result<Level> {
        self.ops()?.status().map_err(|_| Error::Resource)
    }

    /// Drive the output to `level`.
    pub fn set(&mut self, level: Level) -> Result<()> {
        match level {
            Level::On => self.on(),
            Level::Off => self.off(),
        }
    }

    fn ops(&mut self) -> Result<&mut D> {
        self.ops.as_mut().ok_or(Error::InitStatus)
    }
}

impl<D: DisplayOps> Default for Display<D> {
    fn default() -> Self {
        Self::new()
    }
}
