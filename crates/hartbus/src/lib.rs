//! # hartbus -- Async HART Field-Bus Master
//!
//! `hartbus` is an asynchronous Rust library for talking HART to field
//! instruments over a serial link, with a complete driver for Brooks
//! SLA-series thermal mass-flow controllers. It is designed for lab
//! automation and process tooling where a host acts as the HART master
//! on a point-to-point or multidrop segment.
//!
//! ## Quick Start
//!
//! Add `hartbus` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! hartbus = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Connect to a flow controller and read its flow:
//!
//! ```no_run
//! use hartbus::sla::{FlowRateUnit, SlaBuilder};
//!
//! #[tokio::main]
//! async fn main() -> hartbus::Result<()> {
//!     let sla = SlaBuilder::new("MFC-01")
//!         .serial_port("/dev/ttyUSB0")
//!         .build()
//!         .await?;
//!
//!     sla.resolve_address().await?;
//!     let flow = sla.read_flow().await?;
//!     println!("flow: {} {:?}", flow.reading, flow.units);
//!
//!     sla.set_flow(FlowRateUnit::LitersPerMin, 1.25).await?;
//!     sla.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                 | Purpose                                         |
//! |-----------------------|-------------------------------------------------|
//! | `hartbus-core`        | [`Transport`] trait, error types                |
//! | `hartbus-protocol`    | Frame codec, stream parser, status decoding     |
//! | `hartbus-transport`   | Serial transport implementation                 |
//! | `hartbus-sla`         | Brooks SLA session engine and command catalog   |
//! | **`hartbus`**         | This facade crate -- re-exports everything      |
//!
//! The protocol and session layers operate on the [`Transport`] trait, so
//! they run unchanged against real serial hardware or the mock transport
//! in `hartbus-test-harness`.

pub use hartbus_core::*;

/// HART wire-protocol layer: frame codec, stream parser, status decoding,
/// and packed ASCII.
pub mod protocol {
    pub use hartbus_protocol::*;
}

/// Transport implementations.
///
/// Provides [`SerialTransport`](transport::SerialTransport) for USB
/// virtual COM ports and RS-232/RS-485 adapters.
pub mod transport {
    pub use hartbus_transport::*;
}

/// Brooks SLA flow controller driver.
///
/// Provides [`BrooksSla`](sla::BrooksSla) and [`SlaBuilder`](sla::SlaBuilder)
/// for driving SLA-series thermal mass-flow controllers: address
/// resolution by tag, flow reads, setpoint writes, unit selection, and
/// range queries.
pub mod sla {
    pub use hartbus_sla::*;
}
