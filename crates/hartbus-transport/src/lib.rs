//! Transport implementations for hartbus.
//!
//! This crate provides the concrete [`Transport`](hartbus_core::Transport)
//! implementation for serial links:
//!
//! - [`SerialTransport`]: USB virtual COM ports and RS-232/RS-485 adapters
//!   wired to a HART modem or to an instrument's RS-485 service port
//!
//! # Example
//!
//! ```no_run
//! use hartbus_transport::SerialTransport;
//! use hartbus_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> hartbus_core::Result<()> {
//! // HART over RS-485: 19200 baud, 8 data bits, odd parity, 1 stop bit.
//! let mut transport = SerialTransport::open("/dev/ttyUSB0", 19200).await?;
//!
//! transport.send(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02, 0x80, 0x00, 0x00, 0x82]).await?;
//!
//! let mut buf = [0u8; 256];
//! let n = transport.receive(&mut buf, Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{FlowControl, Parity, SerialConfig, SerialTransport, StopBits};
