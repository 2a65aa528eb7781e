//! SlaBuilder -- fluent builder for constructing [`BrooksSla`] sessions.
//!
//! Separates configuration from construction so that callers can set up
//! serial parameters, preamble length, and the response timeout before
//! the transport is opened.
//!
//! # Example
//!
//! ```no_run
//! use hartbus_sla::builder::SlaBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> hartbus_core::Result<()> {
//! let sla = SlaBuilder::new("MFC-01")
//!     .serial_port("/dev/ttyUSB0")
//!     .baud_rate(19_200)
//!     .response_timeout(Duration::from_secs(1))
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use hartbus_core::error::{Error, Result};
use hartbus_core::transport::Transport;
use hartbus_transport::{SerialConfig, SerialTransport};

use crate::sla::BrooksSla;

/// Fluent builder for [`BrooksSla`].
///
/// All configuration has HART-appropriate defaults; only the tag (and,
/// for [`build`](Self::build), the serial port) is required.
pub struct SlaBuilder {
    tag: String,
    serial_port: Option<String>,
    baud_rate: u32,
    response_timeout: Duration,
    preamble_chars: usize,
}

impl SlaBuilder {
    /// Create a new builder for the device with the given tag.
    ///
    /// Tags longer than eight characters are matched on their final
    /// eight, which is all a HART tag field carries.
    pub fn new(tag: &str) -> Self {
        SlaBuilder {
            tag: tag.to_string(),
            serial_port: None,
            baud_rate: 19_200,
            response_timeout: Duration::from_secs(1),
            preamble_chars: 5,
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the default baud rate of 19200.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Set the timeout for waiting on a response to a single command,
    /// measured from the start of the read phase (default: 1s).
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Set the number of 0xFF preamble characters sent ahead of each
    /// request (default: 5; receivers require 2..=32).
    pub fn preamble_chars(mut self, chars: usize) -> Self {
        self.preamble_chars = chars;
        self
    }

    /// Build a [`BrooksSla`] with a caller-provided transport.
    ///
    /// This is the primary entry point for testing (pass a
    /// `MockTransport` from `hartbus-test-harness`) and for advanced use
    /// cases where the caller manages the transport lifecycle directly.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<BrooksSla> {
        if self.tag.is_empty() {
            return Err(Error::InvalidParameter("device tag is required".into()));
        }
        if !(2..=32).contains(&self.preamble_chars) {
            return Err(Error::InvalidParameter(format!(
                "preamble length {} outside 2..=32",
                self.preamble_chars
            )));
        }

        Ok(BrooksSla::new(
            transport,
            self.tag,
            self.response_timeout,
            self.preamble_chars,
        ))
    }

    /// Build a [`BrooksSla`] over a serial transport.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been
    /// called. The port is opened with HART settings: 8 data bits, odd
    /// parity, 1 stop bit.
    pub async fn build(self) -> Result<BrooksSla> {
        let port = self
            .serial_port
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;

        let config = SerialConfig {
            baud_rate: self.baud_rate,
            ..Default::default()
        };
        let transport = SerialTransport::open_with_config(port, config).await?;
        self.build_with_transport(Box::new(transport)).await
    }
}
