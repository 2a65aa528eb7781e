//! Transport trait for HART communication.
//!
//! The [`Transport`] trait abstracts over the physical link to a slave
//! instrument. Implementations exist for serial ports (RS-232/RS-485
//! adapters wired to the HART modem) and for mock transports used in tests.
//!
//! The protocol layers (`hartbus-protocol`, `hartbus-sla`) operate on a
//! `Transport` rather than directly on a serial port, enabling both real
//! hardware control and deterministic unit testing with `MockTransport`
//! from the `hartbus-test-harness` crate.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level duplex connection to a HART device.
///
/// Implementations handle buffering and error recovery at the physical
/// layer. Framing, checksums, and addressing are handled by the protocol
/// layers that consume this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the device.
    ///
    /// Implementations should not return until all bytes have been handed
    /// to the underlying transport (serial TX buffer, etc.).
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the device into the provided buffer.
    ///
    /// Returns the number of bytes actually read. Waits up to `timeout`
    /// for data to arrive; returns [`Error::NoResponse`](crate::error::Error::NoResponse)
    /// if nothing is received within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
