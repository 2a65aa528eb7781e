//! Resumable HART stream parser.
//!
//! A receiver on a HART link sees an arbitrarily-chunked byte stream: a
//! frame may arrive one byte at a time or several frames may land in a
//! single read. [`StreamParser`] is a resumable state machine that consumes
//! whatever bytes are available, emits at most one fully-validated frame
//! per call, and reports how many more bytes it needs so the caller can
//! size its next transport read.
//!
//! Three outcomes are kept strictly distinct:
//!
//! - `Ok(Some(frame))` — a complete, checksum-valid frame
//! - `Ok(None)` — insufficient data; not an error, read more bytes
//! - `Err(..)` — a protocol violation; the parser never auto-resyncs, the
//!   caller must call [`StreamParser::advance`] before parsing can continue

use hartbus_core::{ProtocolViolation, Result};

use crate::frame::{FrameType, HartFrame, PREAMBLE};

/// Default minimum preamble length accepted on receive.
pub const DEFAULT_MIN_PREAMBLE: usize = 2;

/// Default maximum preamble length accepted on receive.
pub const DEFAULT_MAX_PREAMBLE: usize = 32;

/// Parse position within a frame.
///
/// States progress in wire order and return to `Preamble` on success or on
/// explicit reset. Each state carries exactly the header fields decoded so
/// far; the variable-length address and data fields accumulate in the
/// parser's own buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Preamble,
    FrameType,
    Address {
        frame_type: FrameType,
    },
    Command {
        frame_type: FrameType,
    },
    ByteCount {
        frame_type: FrameType,
        command: u8,
    },
    Data {
        frame_type: FrameType,
        command: u8,
        byte_count: usize,
    },
    Checksum {
        frame_type: FrameType,
        command: u8,
        byte_count: usize,
    },
}

/// Incremental parser for one logical HART connection.
///
/// Create one per connection and feed it raw receive bytes. The parser
/// keeps an internal buffer with a logical cursor; consumed bytes are only
/// physically dropped by [`compact`](StreamParser::compact), which is pure
/// memory hygiene and never changes observable behavior.
///
/// Methods must not be invoked concurrently on the same parser; there is
/// no interior synchronization.
///
/// # Example
///
/// ```
/// use hartbus_protocol::parser::StreamParser;
///
/// let mut parser = StreamParser::new();
/// // A short ACK to slave 4 carrying no data.
/// let frame = parser
///     .feed(&[0xFF, 0xFF, 0x06, 0x84, 0x01, 0x00, 0x83])
///     .unwrap()
///     .expect("complete frame");
/// assert_eq!(frame.command(), 0x01);
/// ```
#[derive(Debug, Clone)]
pub struct StreamParser {
    buf: Vec<u8>,
    /// Logical cursor into `buf`; bytes before it are consumed.
    off: usize,
    min_preamble: usize,
    max_preamble: usize,
    max_byte_count: usize,
    state: State,
    preamble_count: usize,
    address: Vec<u8>,
    data: Vec<u8>,
}

impl StreamParser {
    /// Create a parser with the default limits (preamble 2..=32, byte
    /// count up to 255).
    pub fn new() -> StreamParser {
        StreamParser::with_limits(DEFAULT_MIN_PREAMBLE, DEFAULT_MAX_PREAMBLE, 255)
    }

    /// Create a parser with explicit preamble bounds and maximum payload
    /// length.
    pub fn with_limits(
        min_preamble: usize,
        max_preamble: usize,
        max_byte_count: usize,
    ) -> StreamParser {
        StreamParser {
            buf: Vec::new(),
            off: 0,
            min_preamble,
            max_preamble,
            max_byte_count,
            state: State::Preamble,
            preamble_count: 0,
            address: Vec::new(),
            data: Vec::new(),
        }
    }

    // ---------------- buffer primitives ----------------

    fn available(&self) -> usize {
        self.buf.len() - self.off
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.off).copied()
    }

    fn take1(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.off += 1;
        Some(b)
    }

    fn take(&mut self, n: usize) -> Option<Vec<u8>> {
        if self.available() < n {
            return None;
        }
        let out = self.buf[self.off..self.off + n].to_vec();
        self.off += n;
        Some(out)
    }

    fn reset_state(&mut self) {
        self.state = State::Preamble;
        self.preamble_count = 0;
        self.address.clear();
        self.data.clear();
    }

    // ---------------- public API ----------------

    /// Append bytes and attempt to parse one frame.
    ///
    /// Returns `Ok(Some(frame))` when a complete checksum-valid frame was
    /// extracted, `Ok(None)` when more bytes are needed, and a
    /// [`ProtocolViolation`] error on a framing violation. If several
    /// frames are buffered, each call returns one; drain the rest with
    /// [`next_frame`](StreamParser::next_frame).
    pub fn feed(&mut self, data: &[u8]) -> Result<Option<HartFrame>> {
        self.buf.extend_from_slice(data);
        self.next_frame()
    }

    /// Attempt to parse one frame from already-buffered bytes, without
    /// requiring new input.
    pub fn next_frame(&mut self) -> Result<Option<HartFrame>> {
        loop {
            match self.state {
                State::Preamble => {
                    while self.peek() == Some(PREAMBLE) {
                        self.off += 1;
                        self.preamble_count += 1;
                        if self.preamble_count > self.max_preamble {
                            return Err(ProtocolViolation::PreambleTooLong {
                                max: self.max_preamble,
                            }
                            .into());
                        }
                    }
                    if self.available() == 0 {
                        return Ok(None);
                    }
                    // A non-0xFF byte is buffered: the preamble has ended.
                    if self.preamble_count < self.min_preamble {
                        return Err(ProtocolViolation::InsufficientPreamble {
                            count: self.preamble_count,
                            min: self.min_preamble,
                        }
                        .into());
                    }
                    self.state = State::FrameType;
                }
                State::FrameType => {
                    let Some(byte) = self.take1() else {
                        return Ok(None);
                    };
                    let Some(frame_type) = FrameType::from_byte(byte) else {
                        return Err(ProtocolViolation::InvalidDelimiter { byte }.into());
                    };
                    self.state = State::Address { frame_type };
                }
                State::Address { frame_type } => {
                    let Some(addr) = self.take(frame_type.address_len()) else {
                        return Ok(None);
                    };
                    self.address = addr;
                    self.state = State::Command { frame_type };
                }
                State::Command { frame_type } => {
                    let Some(command) = self.take1() else {
                        return Ok(None);
                    };
                    self.state = State::ByteCount {
                        frame_type,
                        command,
                    };
                }
                State::ByteCount {
                    frame_type,
                    command,
                } => {
                    let Some(count) = self.take1() else {
                        return Ok(None);
                    };
                    let byte_count = usize::from(count);
                    if byte_count > self.max_byte_count {
                        return Err(ProtocolViolation::ByteCountTooLarge {
                            count: byte_count,
                            max: self.max_byte_count,
                        }
                        .into());
                    }
                    self.state = State::Data {
                        frame_type,
                        command,
                        byte_count,
                    };
                }
                State::Data {
                    frame_type,
                    command,
                    byte_count,
                } => {
                    let Some(data) = self.take(byte_count) else {
                        return Ok(None);
                    };
                    self.data = data;
                    self.state = State::Checksum {
                        frame_type,
                        command,
                        byte_count,
                    };
                }
                State::Checksum {
                    frame_type,
                    command,
                    byte_count,
                } => {
                    let Some(received) = self.take1() else {
                        return Ok(None);
                    };
                    let computed = self.body_checksum(frame_type, command, byte_count);
                    if computed != received {
                        return Err(ProtocolViolation::ChecksumMismatch { computed, received }.into());
                    }
                    let frame = HartFrame::from_wire(
                        frame_type,
                        std::mem::take(&mut self.address),
                        command,
                        std::mem::take(&mut self.data),
                    );
                    self.reset_state();
                    return Ok(Some(frame));
                }
            }
        }
    }

    /// Read hint: the minimum number of additional bytes the caller should
    /// fetch from the transport.
    ///
    /// Returns 0 **only** when a complete, checksum-valid frame is already
    /// buffered and [`next_frame`](StreamParser::next_frame) would return
    /// it without any further read. The check is an idempotent look-ahead
    /// parse that re-validates the checksum of the buffered frame.
    /// Otherwise returns at least 1, so a caller driving its reads off this
    /// value never busy-polls.
    pub fn wants(&self) -> usize {
        if self.frame_ready() {
            return 0;
        }
        self.needed().max(1)
    }

    /// Caller-controlled resynchronization: discard `n` bytes from the
    /// front of the logical cursor and reset to the preamble state.
    ///
    /// This is the sole recovery mechanism after a violation; the parser
    /// never skips bytes on its own. `advance(0)` is a no-op.
    pub fn advance(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.off = (self.off + n).min(self.buf.len());
        self.reset_state();
    }

    /// Physically drop already-consumed prefix bytes.
    ///
    /// Optional maintenance; never required for correctness.
    pub fn compact(&mut self) {
        if self.off > 0 {
            self.buf.drain(..self.off);
            self.off = 0;
        }
    }

    // ---------------- internals ----------------

    /// True only if a full, valid frame could be returned right now
    /// without reading more bytes. Probes a clone so the real cursor and
    /// state are untouched.
    fn frame_ready(&self) -> bool {
        let mut probe = self.clone();
        matches!(probe.next_frame(), Ok(Some(_)))
    }

    /// Minimum additional bytes to make further progress from the current
    /// state. May be 0 when buffered bytes already allow a transition;
    /// `wants()` clamps to at least 1 unless a frame is ready.
    fn needed(&self) -> usize {
        let avail = self.available();
        match self.state {
            State::Preamble => {
                if avail == 0 {
                    (self.min_preamble.saturating_sub(self.preamble_count)).max(1)
                } else {
                    0
                }
            }
            State::FrameType
            | State::Command { .. }
            | State::ByteCount { .. }
            | State::Checksum { .. } => 1usize.saturating_sub(avail),
            State::Address { frame_type } => frame_type.address_len().saturating_sub(avail),
            State::Data { byte_count, .. } => byte_count.saturating_sub(avail),
        }
    }

    fn body_checksum(&self, frame_type: FrameType, command: u8, byte_count: usize) -> u8 {
        let mut lrc = frame_type as u8;
        for &b in &self.address {
            lrc ^= b;
        }
        lrc ^= command;
        lrc ^= byte_count as u8;
        for &b in &self.data {
            lrc ^= b;
        }
        lrc
    }
}

impl Default for StreamParser {
    fn default() -> Self {
        StreamParser::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{checksum, Address, ShortAddress};
    use hartbus_core::Error;

    /// Assemble a raw packet with an arbitrary preamble length and raw
    /// address bytes.
    fn build_packet(
        preamble_len: usize,
        frame_type: FrameType,
        address: &[u8],
        command: u8,
        data: &[u8],
    ) -> Vec<u8> {
        let mut body = vec![frame_type as u8];
        body.extend_from_slice(address);
        body.push(command);
        body.push(data.len() as u8);
        body.extend_from_slice(data);
        let mut pkt = vec![PREAMBLE; preamble_len];
        pkt.extend_from_slice(&body);
        pkt.push(checksum(&body));
        pkt
    }

    fn violation(err: Error) -> ProtocolViolation {
        match err {
            Error::Violation(v) => v,
            other => panic!("expected a violation, got {other:?}"),
        }
    }

    // ---------------------------------------------------------------
    // wants() and preamble bounds
    // ---------------------------------------------------------------

    #[test]
    fn wants_preamble_minimums() {
        let mut parser = StreamParser::new();
        assert_eq!(parser.wants(), 2);

        assert!(parser.feed(&[0xFF]).unwrap().is_none());
        assert_eq!(parser.wants(), 1);

        assert!(parser.feed(&[0xFF]).unwrap().is_none());
        // Still needs the delimiter.
        assert_eq!(parser.wants(), 1);
    }

    #[test]
    fn preamble_too_long() {
        let mut parser = StreamParser::new();
        let err = parser.feed(&[0xFF; 33]).unwrap_err();
        assert_eq!(violation(err), ProtocolViolation::PreambleTooLong { max: 32 });
    }

    #[test]
    fn preamble_too_long_detected_incrementally() {
        // The bound is enforced while counting, not only once a delimiter
        // arrives.
        let mut parser = StreamParser::new();
        for _ in 0..32 {
            assert!(parser.feed(&[0xFF]).unwrap().is_none());
        }
        let err = parser.feed(&[0xFF]).unwrap_err();
        assert_eq!(violation(err), ProtocolViolation::PreambleTooLong { max: 32 });
    }

    #[test]
    fn insufficient_preamble() {
        let mut parser = StreamParser::new();
        let err = parser.feed(&[0xFF, 0x06]).unwrap_err();
        assert_eq!(
            violation(err),
            ProtocolViolation::InsufficientPreamble { count: 1, min: 2 }
        );

        let mut parser = StreamParser::new();
        let err = parser.feed(&[0x02]).unwrap_err();
        assert_eq!(
            violation(err),
            ProtocolViolation::InsufficientPreamble { count: 0, min: 2 }
        );
    }

    #[test]
    fn minimum_preamble_parses() {
        let pkt = build_packet(2, FrameType::ShortAck, &[0x80], 0x01, &[0xAA]);
        let mut parser = StreamParser::new();
        let frame = parser.feed(&pkt).unwrap().expect("frame");
        assert_eq!(frame.command(), 0x01);
    }

    #[test]
    fn maximum_preamble_parses() {
        let pkt = build_packet(32, FrameType::ShortAck, &[0x80], 0x01, &[]);
        let mut parser = StreamParser::new();
        assert!(parser.feed(&pkt).unwrap().is_some());
    }

    #[test]
    fn custom_preamble_limits() {
        let mut parser = StreamParser::with_limits(3, 8, 255);
        let err = parser.feed(&[0xFF, 0xFF, 0x06]).unwrap_err();
        assert_eq!(
            violation(err),
            ProtocolViolation::InsufficientPreamble { count: 2, min: 3 }
        );

        let mut parser = StreamParser::with_limits(3, 8, 255);
        let err = parser.feed(&[0xFF; 9]).unwrap_err();
        assert_eq!(violation(err), ProtocolViolation::PreambleTooLong { max: 8 });
    }

    // ---------------------------------------------------------------
    // Delimiter and address width
    // ---------------------------------------------------------------

    #[test]
    fn delimiter_selects_address_width_for_wants() {
        let mut parser = StreamParser::new();
        assert!(parser
            .feed(&[0xFF, 0xFF, FrameType::ShortAck as u8])
            .unwrap()
            .is_none());
        assert_eq!(parser.wants(), 1);

        let mut parser = StreamParser::new();
        assert!(parser
            .feed(&[0xFF, 0xFF, FrameType::LongAck as u8])
            .unwrap()
            .is_none());
        assert_eq!(parser.wants(), 5);

        let mut parser = StreamParser::new();
        assert!(parser
            .feed(&[0xFF, 0xFF, FrameType::LongStx as u8])
            .unwrap()
            .is_none());
        assert_eq!(parser.wants(), 5);
    }

    #[test]
    fn invalid_delimiter() {
        let mut parser = StreamParser::new();
        let err = parser.feed(&[0xFF, 0xFF, 0x01]).unwrap_err();
        assert_eq!(violation(err), ProtocolViolation::InvalidDelimiter { byte: 0x01 });
    }

    // ---------------------------------------------------------------
    // Incremental parsing
    // ---------------------------------------------------------------

    #[test]
    fn byte_at_a_time_matches_whole_packet() {
        let pkt = build_packet(2, FrameType::ShortAck, &[0x80], 0x01, &[0xAA, 0xBB]);

        let mut whole = StreamParser::new();
        let expected = whole.feed(&pkt).unwrap().expect("frame");

        let mut parser = StreamParser::new();
        let mut out = None;
        for (i, &b) in pkt.iter().enumerate() {
            out = parser.feed(&[b]).unwrap();
            if i < pkt.len() - 1 {
                assert!(out.is_none(), "premature frame at byte {i}");
            }
        }
        let frame = out.expect("frame on final byte");
        assert_eq!(frame, expected);
        assert_eq!(frame.frame_type(), FrameType::ShortAck);
        assert_eq!(frame.address(), &[0x80]);
        assert_eq!(frame.command(), 0x01);
        assert_eq!(frame.byte_count(), 2);
        assert_eq!(frame.data(), &[0xAA, 0xBB]);
    }

    #[test]
    fn long_address_frame_parse() {
        let addr = [0xC1, 0x10, 0x01, 0x02, 0x03];
        let pkt = build_packet(3, FrameType::LongAck, &addr, 0x09, &[]);
        let mut parser = StreamParser::new();
        let frame = parser.feed(&pkt).unwrap().expect("frame");
        assert_eq!(frame.frame_type(), FrameType::LongAck);
        assert_eq!(frame.address(), &addr);
        assert_eq!(frame.command(), 0x09);
        assert_eq!(frame.byte_count(), 0);
        assert!(frame.data().is_empty());
    }

    #[test]
    fn round_trip_encode_then_parse() {
        let addr = Address::from(ShortAddress::new(true, 4).unwrap());
        let frame =
            HartFrame::new(FrameType::ShortStx, &addr, 0x96, vec![0x01, 0x02, 0x03]).unwrap();
        let mut parser = StreamParser::new();
        let parsed = parser
            .feed(&frame.encode(5).unwrap())
            .unwrap()
            .expect("frame");
        assert_eq!(parsed, frame);
    }

    #[test]
    fn wants_driven_reads_complete_a_frame() {
        // A caller that always reads exactly wants() bytes must terminate
        // with the frame and never stall.
        let pkt = build_packet(5, FrameType::LongAck, &[0x8A, 0x64, 0, 0, 1], 0x01, &[9, 8, 7]);
        let mut parser = StreamParser::new();
        let mut cursor = 0;
        let frame = loop {
            let n = parser.wants();
            assert!(n >= 1, "wants() may not be 0 before the frame is complete");
            let chunk = &pkt[cursor..(cursor + n).min(pkt.len())];
            cursor += chunk.len();
            if let Some(frame) = parser.feed(chunk).unwrap() {
                break frame;
            }
            assert!(cursor < pkt.len(), "ran out of input without a frame");
        };
        assert_eq!(cursor, pkt.len());
        assert_eq!(frame.data(), &[9, 8, 7]);
    }

    // ---------------------------------------------------------------
    // Checksum violations and resynchronization
    // ---------------------------------------------------------------

    #[test]
    fn corrupted_checksum_byte_raises() {
        let mut pkt = build_packet(2, FrameType::ShortAck, &[0x80], 0x01, &[0xAA, 0xBB]);
        let expected = *pkt.last().unwrap();
        *pkt.last_mut().unwrap() ^= 0xFF;

        let mut parser = StreamParser::new();
        let err = parser.feed(&pkt).unwrap_err();
        assert_eq!(
            violation(err),
            ProtocolViolation::ChecksumMismatch {
                computed: expected,
                received: expected ^ 0xFF,
            }
        );
    }

    #[test]
    fn corrupted_body_byte_raises_checksum_violation() {
        let mut pkt = build_packet(2, FrameType::ShortAck, &[0x80], 0x01, &[0xAA, 0xBB]);
        let len = pkt.len();
        pkt[len - 3] ^= 0x10; // flip a payload bit

        let mut parser = StreamParser::new();
        let err = parser.feed(&pkt).unwrap_err();
        assert!(matches!(
            violation(err),
            ProtocolViolation::ChecksumMismatch { .. }
        ));
    }

    #[test]
    fn advance_resyncs_after_checksum_violation() {
        let mut bad = build_packet(2, FrameType::ShortAck, &[0x80], 0x01, &[0xAA]);
        *bad.last_mut().unwrap() ^= 0xFF;

        let mut parser = StreamParser::new();
        assert!(parser.feed(&bad).is_err());

        // Skip a byte and reset; a fresh, distinct frame then parses.
        parser.advance(1);
        let good = build_packet(2, FrameType::ShortAck, &[0x81], 0x02, &[0x02, 0x03]);
        let frame = parser.feed(&good).unwrap().expect("frame after resync");
        assert_eq!(frame.command(), 0x02);
        assert_eq!(frame.data(), &[0x02, 0x03]);
    }

    #[test]
    fn advance_resets_mid_frame_state() {
        let mut parser = StreamParser::new();
        assert!(parser
            .feed(&[0xFF, 0xFF, FrameType::LongAck as u8, 0x01])
            .unwrap()
            .is_none());
        parser.advance(1);

        let pkt = build_packet(2, FrameType::ShortAck, &[0x80], 0x07, &[]);
        let frame = parser.feed(&pkt).unwrap().expect("frame");
        assert_eq!(frame.command(), 0x07);
    }

    // ---------------------------------------------------------------
    // Multiple buffered frames
    // ---------------------------------------------------------------

    #[test]
    fn two_frames_in_one_buffer() {
        let pkt1 = build_packet(2, FrameType::ShortAck, &[0x80], 0x01, &[0x01]);
        let pkt2 = build_packet(2, FrameType::ShortAck, &[0x81], 0x02, &[0x02, 0x03]);
        let mut both = pkt1.clone();
        both.extend_from_slice(&pkt2);

        let mut parser = StreamParser::new();
        let f1 = parser.feed(&both).unwrap().expect("first frame");
        assert_eq!(f1.command(), 0x01);
        assert_eq!(f1.data(), &[0x01]);

        // The second frame is fully buffered and valid: no read needed.
        assert_eq!(parser.wants(), 0);

        let f2 = parser.next_frame().unwrap().expect("second frame");
        assert_eq!(f2.command(), 0x02);
        assert_eq!(f2.data(), &[0x02, 0x03]);

        assert!(parser.next_frame().unwrap().is_none());
        assert!(parser.wants() >= 1);
    }

    #[test]
    fn compact_does_not_change_behavior() {
        let pkt1 = build_packet(2, FrameType::ShortAck, &[0x80], 0x01, &[]);
        let pkt2 = build_packet(2, FrameType::ShortAck, &[0x80], 0x02, &[]);
        let mut both = pkt1.clone();
        both.extend_from_slice(&pkt2);

        let mut parser = StreamParser::new();
        let f1 = parser.feed(&both).unwrap().expect("first frame");
        assert_eq!(f1.command(), 0x01);

        parser.compact();
        assert_eq!(parser.wants(), 0);
        let f2 = parser.next_frame().unwrap().expect("second frame");
        assert_eq!(f2.command(), 0x02);
    }

    // ---------------------------------------------------------------
    // Byte-count bound
    // ---------------------------------------------------------------

    #[test]
    fn byte_count_over_configured_maximum() {
        let pkt = build_packet(2, FrameType::ShortAck, &[0x80], 0x01, &[0; 5]);
        let mut parser = StreamParser::with_limits(2, 32, 4);
        let err = parser.feed(&pkt).unwrap_err();
        assert_eq!(
            violation(err),
            ProtocolViolation::ByteCountTooLarge { count: 5, max: 4 }
        );
    }

    #[test]
    fn full_length_payload_parses() {
        let data = vec![0x55; 255];
        let pkt = build_packet(2, FrameType::ShortAck, &[0x80], 0x01, &data);
        let mut parser = StreamParser::new();
        let frame = parser.feed(&pkt).unwrap().expect("frame");
        assert_eq!(frame.byte_count(), 255);
        assert_eq!(frame.data(), data.as_slice());
    }
}
