//! hartbus-test-harness: Test utilities and mock transports for hartbus.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! the protocol and session layers without real instrument hardware.

pub mod mock_serial;

pub use mock_serial::MockTransport;
