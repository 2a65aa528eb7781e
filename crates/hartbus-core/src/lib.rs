//! hartbus-core: Core traits, types, and error definitions for hartbus.
//!
//! This crate defines the transport-agnostic abstractions that the protocol
//! and driver crates build on. Applications depend on these types without
//! pulling in any specific transport implementation.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level duplex channel to a HART device
//! - [`Error`] / [`Result`] -- error handling
//! - [`ProtocolViolation`] -- typed framing violations with diagnostics

pub mod error;
pub mod transport;

// Re-export key types at crate root for ergonomic `use hartbus_core::*`.
pub use error::{Error, ProtocolViolation, Result};
pub use transport::Transport;
