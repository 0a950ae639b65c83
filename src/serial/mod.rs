//! Serial transport engine
//!
//! A [`SerialTransport`] buffers outgoing bytes in a TX ring drained by a
//! worker into DMA transfers, and collects interrupt-delivered bytes in an
//! RX ring read by one consumer.

mod driver;
mod handler;
mod ring_buffer;

pub use driver::{Notify, RxStatus, SerialHardware, TransportDriver, TxStatus};
pub use handler::SerialTransport;
pub use ring_buffer::RingBuffer;
