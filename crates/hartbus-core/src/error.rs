//! Error types for hartbus.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer, link-layer, and
//! application-layer failures are all captured here.

/// A HART link-layer framing violation detected by the stream parser.
///
/// Each variant carries enough context for diagnostics: the offending byte,
/// the configured limit that was exceeded, or the computed-versus-received
/// checksum pair. A violation is always fatal to the current parse attempt;
/// the caller must explicitly resynchronize (`StreamParser::advance`) before
/// parsing can continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    /// A non-`0xFF` byte arrived before the minimum preamble length was seen.
    #[error("insufficient preamble before delimiter: got {count}, need {min}")]
    InsufficientPreamble {
        /// Number of `0xFF` preamble bytes seen.
        count: usize,
        /// Configured minimum preamble length.
        min: usize,
    },

    /// More consecutive `0xFF` bytes than the configured maximum.
    #[error("preamble too long: exceeds {max} bytes")]
    PreambleTooLong {
        /// Configured maximum preamble length.
        max: usize,
    },

    /// The byte following the preamble is not one of the four defined
    /// frame-type (delimiter) codes.
    #[error("invalid delimiter: 0x{byte:02X}")]
    InvalidDelimiter {
        /// The offending byte.
        byte: u8,
    },

    /// The byte-count field exceeds the configured maximum payload size.
    #[error("byte count too large: {count} > {max}")]
    ByteCountTooLarge {
        /// The received byte-count value.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The received checksum does not match the longitudinal XOR of the
    /// frame body.
    #[error("invalid checksum: computed 0x{computed:02X}, got 0x{received:02X}")]
    ChecksumMismatch {
        /// Checksum computed over the received frame body.
        computed: u8,
        /// Checksum byte received on the wire.
        received: u8,
    },
}

/// The error type for all hartbus operations.
///
/// Variants cover the full range of failure modes encountered when talking
/// to a HART slave instrument: physical transport failures, framing
/// violations, response timeouts, and invalid caller parameters.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open/configure failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// A HART framing violation from the stream parser.
    #[error("protocol violation: {0}")]
    Violation(#[from] ProtocolViolation),

    /// A malformed or unexpectedly short response payload.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// No response frame was received within the deadline.
    ///
    /// This typically indicates the device is powered off, the polling
    /// address is wrong, or the line settings (baud rate, odd parity) do
    /// not match the instrument.
    #[error("no response from device")]
    NoResponse,

    /// An invalid parameter was passed to a command helper.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection to the device has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the device was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
