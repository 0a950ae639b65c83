use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use super::driver::{RxStatus, SerialHardware, TransportDriver, TxStatus};
use super::ring_buffer::RingBuffer;
use crate::config::TX_CHUNK_SIZE;
use crate::error::{Error, Result};
use crate::log::log;

/// Binary semaphore: signals coalesce until the waiter wakes.
type Semaphore = Signal<CriticalSectionRawMutex, ()>;

struct TxState<const SIZE: usize> {
    ring: RingBuffer<SIZE>,
    /// Source of the in-flight DMA transfer. Only rewritten once the driver
    /// is ready again.
    scratch: [u8; TX_CHUNK_SIZE],
}

/// Buffered duplex byte pump over a DMA UART
///
/// `TX` and `RX` are the ring storage sizes; each ring holds one byte less.
///
/// - Producers call [`transmit`](Self::transmit) from any thread; bytes are
///   buffered and a worker running [`run`](Self::run) moves them to the DMA
///   engine in chunks of at most [`TX_CHUNK_SIZE`].
/// - The hardware layer reports through [`on_transmit_complete`],
///   [`on_hw_receive_process`] and [`on_hw_receive_complete`]. These never
///   block.
/// - One consumer reads with [`receive`](Self::receive). Concurrent
///   `receive` callers are not supported.
///
/// All methods take `&self` so the transport can live in a `static`.
///
/// [`on_transmit_complete`]: Self::on_transmit_complete
/// [`on_hw_receive_process`]: Self::on_hw_receive_process
/// [`on_hw_receive_complete`]: Self::on_hw_receive_complete
pub struct SerialTransport<H, const TX: usize, const RX: usize> {
    initialized: AtomicBool,
    driver: TransportDriver<H>,
    tx: Mutex<RefCell<TxState<TX>>>,
    rx: Mutex<RefCell<RingBuffer<RX>>>,
    /// Something may be transmittable: new bytes or a finished transfer.
    tx_pending: Semaphore,
    /// The RX ring may hold unread bytes.
    rx_pending: Semaphore,
}

impl<H: SerialHardware, const TX: usize, const RX: usize> SerialTransport<H, TX, RX> {
    pub const fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            driver: TransportDriver::new(),
            tx: Mutex::new(RefCell::new(TxState {
                ring: RingBuffer::new(),
                scratch: [0; TX_CHUNK_SIZE],
            })),
            rx: Mutex::new(RefCell::new(RingBuffer::new())),
            tx_pending: Signal::new(),
            rx_pending: Signal::new(),
        }
    }

    /// Take ownership of the hardware and arm reception.
    ///
    /// Fails with [`Error::InitStatus`] if already initialized and with
    /// [`Error::Resource`] if reception cannot be armed; the driver is
    /// released again in that case.
    pub fn init(&self, hw: H) -> Result<()> {
        if self.is_initialized() {
            return Err(Error::InitStatus);
        }
        self.reset_buffers();

        self.driver.init(hw)?;
        if let Err(err) = self.driver.receive_idle_enable() {
            log!("[serial] arming reception failed: {}", err);
            let _ = self.driver.deinit();
            self.reset_buffers();
            return Err(Error::Resource);
        }

        self.initialized.store(true, Ordering::Release);
        log!("[serial] transport initialized");
        Ok(())
    }

    /// Drop buffered bytes and release the hardware.
    ///
    /// Returns the hardware on the first call. On an uninitialized
    /// transport this is a successful no-op and returns `None`.
    ///
    /// A worker parked in [`run`](Self::run) or a reader parked in
    /// [`receive`](Self::receive) stays parked and resumes after the next
    /// [`init`](Self::init).
    pub fn deinit(&self) -> Option<H> {
        if !self.is_initialized() {
            return None;
        }
        self.initialized.store(false, Ordering::Release);
        let hw = self.driver.deinit();
        self.reset_buffers();
        log!("[serial] transport deinitialized");
        hw
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Queue `data` for transmission and wake the worker.
    ///
    /// Either all of `data` is buffered or none of it. Fails with
    /// [`Error::TxSizeExceeded`] if `data` can never fit the ring and with
    /// [`Error::TxOverflow`] if it does not fit right now.
    pub fn transmit(&self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InputParam);
        }
        if !self.is_initialized() {
            return Err(Error::InitStatus);
        }

        critical_section::with(|cs| {
            let mut tx = self.tx.borrow(cs).borrow_mut();
            let ring = &mut tx.ring;
            if data.len() > ring.capacity() {
                return Err(Error::TxSizeExceeded);
            }
            if data.len() > ring.free() {
                return Err(Error::TxOverflow);
            }
            if ring.write(data) != data.len() {
                return Err(Error::Resource);
            }
            Ok(())
        })?;

        self.tx_pending.signal(());
        Ok(())
    }

    /// Start DMA transfers while bytes are queued and the driver is ready.
    ///
    /// Returns the number of bytes handed to the hardware. Bytes are only
    /// consumed once their transfer has started, so on error they stay
    /// queued for the next attempt.
    pub fn drain(&self) -> Result<usize> {
        if !self.is_initialized() {
            return Err(Error::InitStatus);
        }

        let mut started = 0;
        loop {
            let chunk = critical_section::with(|cs| -> Result<usize> {
                let mut guard = self.tx.borrow(cs).borrow_mut();
                let TxState { ring, scratch } = &mut *guard;
                if ring.is_empty() || self.driver.tx_status() != TxStatus::Ready {
                    return Ok(0);
                }
                let count = ring.peek(scratch);
                self.driver.transmit_start(&scratch[..count])?;
                ring.skip(count);
                Ok(count)
            })?;

            if chunk == 0 {
                return Ok(started);
            }
            started += chunk;
        }
    }

    /// Transmit worker: drain on every wake, forever.
    pub async fn run(&self) -> ! {
        loop {
            self.tx_pending.wait().await;
            if let Err(err) = self.drain() {
                log!("[serial] drain failed: {}", err);
            }
        }
    }

    /// Transfer-complete interrupt hook.
    pub fn on_transmit_complete(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(Error::InitStatus);
        }
        self.driver.on_transmit_complete(&self.tx_pending)
    }

    /// Copy a received burst into the RX ring.
    ///
    /// The burst is stored whole or dropped whole; a burst that does not fit
    /// fails with [`Error::Resource`].
    pub fn on_hw_receive_process(&self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InputParam);
        }
        if !self.is_initialized() {
            return Err(Error::InitStatus);
        }

        let written = critical_section::with(|cs| self.rx.borrow(cs).borrow_mut().write(data));
        if written != data.len() {
            return Err(Error::Resource);
        }
        Ok(())
    }

    /// Receive-complete interrupt hook: wake the consumer.
    pub fn on_hw_receive_complete(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(Error::InitStatus);
        }
        self.rx_pending.signal(());
        Ok(())
    }

    /// Wait for received bytes and read up to `buf.len()` of them.
    ///
    /// Returns the number of bytes read, which may be 0 if the wake-up
    /// carried no data.
    pub async fn receive(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Err(Error::InputParam);
        }
        if !self.is_initialized() {
            return Err(Error::InitStatus);
        }

        self.rx_pending.wait().await;

        let (count, remaining) = critical_section::with(|cs| {
            let mut ring = self.rx.borrow(cs).borrow_mut();
            let count = ring.read(buf);
            (count, ring.used())
        });
        // Leftover bytes must not wait for the next interrupt.
        if remaining > 0 {
            self.rx_pending.signal(());
        }
        Ok(count)
    }

    /// Bytes waiting for transmission.
    pub fn tx_used(&self) -> usize {
        critical_section::with(|cs| self.tx.borrow(cs).borrow().ring.used())
    }

    pub fn tx_free(&self) -> usize {
        critical_section::with(|cs| self.tx.borrow(cs).borrow().ring.free())
    }

    pub const fn tx_capacity(&self) -> usize {
        TX.saturating_sub(1)
    }

    /// Bytes received but not yet read.
    pub fn rx_used(&self) -> usize {
        critical_section::with(|cs| self.rx.borrow(cs).borrow().used())
    }

    pub fn tx_status(&self) -> TxStatus {
        self.driver.tx_status()
    }

    pub fn rx_status(&self) -> RxStatus {
        self.driver.rx_status()
    }

    fn reset_buffers(&self) {
        critical_section::with(|cs| {
            self.tx.borrow(cs).borrow_mut().ring.clear();
            self.rx.borrow(cs).borrow_mut().clear();
        });
        // Only a pending signal is dropped; a parked worker or reader keeps
        // its waker and sees the next signal.
        let _ = self.tx_pending.try_take();
        let _ = self.rx_pending.try_take();
    }
}

impl<H: SerialHardware, const TX: usize, const RX: usize> Default for SerialTransport<H, TX, RX> {
    fn default() -> Self {
        Self::new()
    }
}
