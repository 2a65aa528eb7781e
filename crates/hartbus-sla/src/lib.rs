//! Brooks SLA-series flow controller driver for hartbus.
//!
//! This crate implements a HART master session for Brooks SLA thermal
//! mass-flow controllers. It provides:
//!
//! - **Command catalog and codecs** ([`commands`]) -- universal and Brooks
//!   device-specific opcodes, with pure payload builders and parsers for
//!   the fixed binary layouts each command uses.
//! - **Unit catalogs** ([`units`]) -- the flow, temperature, pressure, and
//!   density unit code tables the SLA firmware accepts.
//! - **BrooksSla** ([`sla`]) -- the session engine: single-flight
//!   request/response exchanges over a [`Transport`](hartbus_core::Transport),
//!   tag-based address resolution, and typed helpers for the common flow
//!   operations.
//! - **SlaBuilder** ([`builder`]) -- fluent builder for constructing
//!   `BrooksSla` sessions with configurable serial, timeout, and preamble
//!   settings.
//!
//! # Example
//!
//! ```no_run
//! use hartbus_sla::{FlowRateUnit, SlaBuilder};
//!
//! # async fn example() -> hartbus_core::Result<()> {
//! let sla = SlaBuilder::new("MFC-01")
//!     .serial_port("/dev/ttyUSB0")
//!     .build()
//!     .await?;
//!
//! sla.resolve_address().await?;
//! let flow = sla.read_flow().await?;
//! println!("{} {:?}", flow.reading, flow.units);
//!
//! sla.set_flow(FlowRateUnit::LitersPerMin, 1.25).await?;
//! sla.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod commands;
pub mod sla;
pub mod units;

pub use builder::SlaBuilder;
pub use sla::{BrooksSla, FlowRange, FlowReading, FlowSetting, HartResponse};
pub use units::{DensityUnit, FlowRateUnit, FlowReference, PressureUnit, TemperatureUnit};
