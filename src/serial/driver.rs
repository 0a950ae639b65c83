//! DMA transport driver.
//!
//! Status-gated wrapper over the hardware DMA start and idle-line receive
//! primitives. At most one transmission is in flight at a time.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

use crate::error::{Error, Result};

/// Hardware transport operations
///
/// Both calls must return without waiting for the transfer to finish.
/// Completion is reported back through
/// [`TransportDriver::on_transmit_complete`].
pub trait SerialHardware {
    type Error: core::fmt::Debug;

    /// Start a DMA transfer of `data`.
    ///
    /// The driver keeps `data` untouched until the transfer completes.
    fn dma_transmit_start(&mut self, data: &[u8]) -> core::result::Result<(), Self::Error>;

    /// Arm idle-line DMA reception.
    fn dma_receive_idle_enable(&mut self) -> core::result::Result<(), Self::Error>;
}

/// Sink for "a transfer finished" events
pub trait Notify {
    fn notify(&self);
}

impl<M: RawMutex> Notify for Signal<M, ()> {
    fn notify(&self) {
        self.signal(());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxStatus {
    #[default]
    None,
    Ready,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RxStatus {
    #[default]
    None,
    Ready,
    /// Idle-line reception is armed
    Busy,
}

struct DriverState<H> {
    hw: Option<H>,
    tx: TxStatus,
    rx: RxStatus,
}

/// Interrupt-safe DMA driver
pub struct TransportDriver<H> {
    state: Mutex<RefCell<DriverState<H>>>,
}

impl<H: SerialHardware> TransportDriver<H> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(DriverState {
                hw: None,
                tx: TxStatus::None,
                rx: RxStatus::None,
            })),
        }
    }

    /// Take ownership of the hardware and mark both directions ready.
    pub fn init(&self, hw: H) -> Result<()> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            if state.hw.is_some() {
                return Err(Error::InitStatus);
            }
            state.hw = Some(hw);
            state.tx = TxStatus::Ready;
            state.rx = RxStatus::Ready;
            Ok(())
        })
    }

    /// Release the hardware and reset both statuses.
    pub fn deinit(&self) -> Option<H> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            state.tx = TxStatus::None;
            state.rx = RxStatus::None;
            state.hw.take()
        })
    }

    pub fn is_initialized(&self) -> bool {
        critical_section::with(|cs| self.state.borrow(cs).borrow().hw.is_some())
    }

    /// Hand `data` to the DMA engine.
    ///
    /// Fails with [`Error::TxBusy`] while the previous transfer is in
    /// flight. An empty transfer is rejected: it would never raise a
    /// completion interrupt.
    pub fn transmit_start(&self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InputParam);
        }
        critical_section::with(|cs| {
            let mut guard = self.state.borrow(cs).borrow_mut();
            let state = &mut *guard;
            let Some(hw) = state.hw.as_mut() else {
                return Err(Error::InitStatus);
            };
            match state.tx {
                TxStatus::Ready => {}
                TxStatus::Busy => return Err(Error::TxBusy),
                TxStatus::None => return Err(Error::Resource),
            }
            hw.dma_transmit_start(data).map_err(|_| Error::Resource)?;
            state.tx = TxStatus::Busy;
            Ok(())
        })
    }

    /// Transfer-complete interrupt hook.
    ///
    /// Marks the driver ready, then fires `notify`, so whoever `notify` wakes
    /// can start the next transfer straight away.
    pub fn on_transmit_complete<N: Notify + ?Sized>(&self, notify: &N) -> Result<()> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            if state.hw.is_none() {
                return Err(Error::InitStatus);
            }
            state.tx = TxStatus::Ready;
            Ok(())
        })?;
        notify.notify();
        Ok(())
    }

    /// Arm idle-line reception.
    pub fn receive_idle_enable(&self) -> Result<()> {
        critical_section::with(|cs| {
            let mut guard = self.state.borrow(cs).borrow_mut();
            let state = &mut *guard;
            let Some(hw) = state.hw.as_mut() else {
                return Err(Error::InitStatus);
            };
            hw.dma_receive_idle_enable().map_err(|_| Error::Resource)?;
            state.rx = RxStatus::Busy;
            Ok(())
        })
    }

    pub fn tx_status(&self) -> TxStatus {
        critical_section::with(|cs| self.state.borrow(cs).borrow().tx)
    }

    pub fn rx_status(&self) -> RxStatus {
        critical_section::with(|cs| self.state.borrow(cs).borrow().rx)
    }
}

impl<H: SerialHardware> Default for TransportDriver<H> {
    fn default() -> Self {
        Self::new()
    }
}
