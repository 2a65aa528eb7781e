//! HART wire-protocol layer for hartbus.
//!
//! This crate implements the HART frame format used by field instruments
//! on a serial link. It provides:
//!
//! - **Frame codec** ([`frame`]) -- frame and address types with validating
//!   constructors, the XOR longitudinal checksum, and deterministic
//!   encoding to wire bytes.
//! - **Stream parser** ([`parser`]) -- a resumable state machine that turns
//!   an arbitrarily-chunked byte stream into validated frames, with
//!   explicit "need more bytes" and "resync" signals kept distinct from
//!   protocol violations.
//! - **Status decoder** ([`status`]) -- pure bit-field decode of the two
//!   status bytes every response carries.
//! - **Packed ASCII** ([`ascii`]) -- the 6-bit character coding HART uses
//!   for tags.
//!
//! # Example
//!
//! ```
//! use hartbus_protocol::frame::{Address, FrameType, HartFrame, ShortAddress};
//! use hartbus_protocol::parser::StreamParser;
//!
//! // Frame command 1 to slave 0 and push it through the parser.
//! let addr = Address::from(ShortAddress::new(true, 0).unwrap());
//! let frame = HartFrame::new(FrameType::ShortStx, &addr, 1, vec![]).unwrap();
//! let wire = frame.encode(5).unwrap();
//!
//! let mut parser = StreamParser::new();
//! let parsed = parser.feed(&wire).unwrap().expect("complete frame");
//! assert_eq!(parsed, frame);
//! ```

pub mod ascii;
pub mod frame;
pub mod parser;
pub mod status;

pub use frame::{Address, FrameType, HartFrame, LongAddress, ShortAddress};
pub use parser::StreamParser;
pub use status::{CommandErrorId, CommandStatus, CommunicationStatus, DeviceStatus};
