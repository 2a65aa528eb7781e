//! HART frame encoder and address types.
//!
//! HART is a master/slave field-instrument protocol using length-prefixed,
//! checksum-protected binary frames on a point-to-point serial link. This
//! module handles the pure byte-level representation: address encoding,
//! frame assembly, and the longitudinal XOR checksum.
//!
//! # Frame format
//!
//! ```text
//! 0xFF... <frame_type> <address> <command> <byte_count> [<data>...] <checksum>
//! ```
//!
//! - Preamble: at least two `0xFF` bytes (five suggested)
//! - `frame_type`: delimiter byte; the high bit selects the address width
//! - `address`: 1 byte (short) or 5 bytes (long)
//! - `command`: command byte
//! - `byte_count`: length of the data that follows
//! - `checksum`: XOR of every byte from `frame_type` through the end of data

use bytes::{BufMut, BytesMut};
use hartbus_core::{Error, Result};

/// Preamble byte repeated at the start of every HART frame.
pub const PREAMBLE: u8 = 0xFF;

/// Minimum number of preamble bytes a frame may carry.
pub const MIN_PREAMBLE: usize = 2;

/// Suggested number of preamble bytes for outbound requests.
pub const DEFAULT_PREAMBLE: usize = 5;

/// Maximum payload length representable by the one-byte count field.
pub const MAX_BYTE_COUNT: usize = 255;

/// Compute the HART longitudinal redundancy check: an XOR fold of all
/// input bytes.
///
/// For protocol purposes the covered range is always `frame_type` through
/// the end of the data field, with the preamble and the checksum byte
/// itself excluded.
///
/// # Example
///
/// ```
/// use hartbus_protocol::frame::checksum;
///
/// assert_eq!(checksum(&[0x02, 0x84, 0x01, 0x00]), 0x87);
/// assert_eq!(checksum(&[]), 0x00);
/// ```
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |lrc, b| lrc ^ b)
}

/// The frame-type (delimiter) byte.
///
/// The high bit (`0x80`) selects the address width: set means a 5-byte
/// long address follows, clear means a single-byte short address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameType {
    /// Master-to-slave request with a short address.
    ShortStx = 0x02,
    /// Slave-to-master acknowledgment with a short address.
    ShortAck = 0x06,
    /// Master-to-slave request with a long address.
    LongStx = 0x82,
    /// Slave-to-master acknowledgment with a long address.
    LongAck = 0x86,
}

impl FrameType {
    /// Decode a delimiter byte. Returns `None` for anything other than the
    /// four defined codes.
    pub fn from_byte(byte: u8) -> Option<FrameType> {
        match byte {
            0x02 => Some(FrameType::ShortStx),
            0x06 => Some(FrameType::ShortAck),
            0x82 => Some(FrameType::LongStx),
            0x86 => Some(FrameType::LongAck),
            _ => None,
        }
    }

    /// Returns `true` for the long-address frame types.
    pub fn is_long(self) -> bool {
        (self as u8) & 0x80 != 0
    }

    /// Number of address bytes that follow this delimiter on the wire.
    pub fn address_len(self) -> usize {
        if self.is_long() { 5 } else { 1 }
    }

    /// Returns `true` for the acknowledgment frame types.
    pub fn is_ack(self) -> bool {
        matches!(self, FrameType::ShortAck | FrameType::LongAck)
    }
}

/// A 1-byte short (polling) address.
///
/// Bit 7 is the master flag; the low 6 bits are the slave's polling
/// address (0..=63).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortAddress {
    primary_master: bool,
    slave: u8,
}

impl ShortAddress {
    /// Create a short address. Fails if `slave` exceeds 63.
    pub fn new(primary_master: bool, slave: u8) -> Result<ShortAddress> {
        if slave > 0x3F {
            return Err(Error::InvalidParameter(format!(
                "short address slave id {slave} exceeds 63"
            )));
        }
        Ok(ShortAddress {
            primary_master,
            slave,
        })
    }

    /// The wire byte: master flag in bit 7, slave id in the low 6 bits.
    pub fn to_byte(self) -> u8 {
        let mut value = self.slave;
        if self.primary_master {
            value |= 1 << 7;
        }
        value
    }

    /// The slave polling address (0..=63).
    pub fn slave(self) -> u8 {
        self.slave
    }
}

/// A 5-byte long (unique) address.
///
/// Byte 0 carries the master flag (bit 7), the burst flag (bit 6), and the
/// manufacturer id (low 6 bits). Byte 1 is the device-type code, and bytes
/// 2..=4 hold the 24-bit identification number big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongAddress {
    primary_master: bool,
    slave_burst: bool,
    mfg_id: u8,
    device_type: u8,
    identification_number: u32,
    broadcast: bool,
}

impl LongAddress {
    /// Create a long address. Fails if `mfg_id` exceeds 63 or the
    /// identification number does not fit in 24 bits.
    pub fn new(mfg_id: u8, device_type: u8, identification_number: u32) -> Result<LongAddress> {
        if mfg_id > 0x3F {
            return Err(Error::InvalidParameter(format!(
                "manufacturer id {mfg_id} exceeds 63"
            )));
        }
        if identification_number > 0xFF_FFFF {
            return Err(Error::InvalidParameter(format!(
                "identification number 0x{identification_number:X} exceeds 24 bits"
            )));
        }
        Ok(LongAddress {
            primary_master: true,
            slave_burst: false,
            mfg_id,
            device_type,
            identification_number,
            broadcast: false,
        })
    }

    /// Create a broadcast long address.
    ///
    /// Broadcast zeroes the three identification bytes on the wire but
    /// still emits the device-type byte. Callers that want the device-type
    /// slot zeroed as well should pass `device_type: 0` explicitly.
    pub fn broadcast(mfg_id: u8, device_type: u8) -> Result<LongAddress> {
        let mut addr = LongAddress::new(mfg_id, device_type, 0)?;
        addr.broadcast = true;
        Ok(addr)
    }

    /// Set the master flag (default: primary master).
    pub fn primary_master(mut self, on: bool) -> LongAddress {
        self.primary_master = on;
        self
    }

    /// Set the slave-in-burst-mode flag (default: off).
    pub fn slave_burst(mut self, on: bool) -> LongAddress {
        self.slave_burst = on;
        self
    }

    /// The 24-bit identification number.
    pub fn identification_number(self) -> u32 {
        self.identification_number
    }

    /// The device-type code.
    pub fn device_type(self) -> u8 {
        self.device_type
    }

    /// The manufacturer id (0..=63).
    pub fn mfg_id(self) -> u8 {
        self.mfg_id
    }

    /// The five wire bytes.
    pub fn to_bytes(self) -> [u8; 5] {
        let mut byte0 = self.mfg_id;
        if self.primary_master {
            byte0 |= 1 << 7;
        }
        if self.slave_burst {
            byte0 |= 1 << 6;
        }
        if self.broadcast {
            [byte0, self.device_type, 0, 0, 0]
        } else {
            let id = self.identification_number.to_be_bytes();
            [byte0, self.device_type, id[1], id[2], id[3]]
        }
    }
}

/// A slave address, polymorphic over the two wire widths.
///
/// The chosen variant determines the required frame-type class: a short
/// address demands a short frame type, a long address a long one. A
/// mismatch is a construction error in [`HartFrame::new`], never silently
/// coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    /// 1-byte polling address.
    Short(ShortAddress),
    /// 5-byte unique address.
    Long(LongAddress),
}

impl Address {
    /// The wire bytes for this address (1 or 5 bytes).
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Address::Short(a) => vec![a.to_byte()],
            Address::Long(a) => a.to_bytes().to_vec(),
        }
    }

    /// Returns `true` for the 5-byte variant.
    pub fn is_long(&self) -> bool {
        matches!(self, Address::Long(_))
    }
}

impl From<ShortAddress> for Address {
    fn from(a: ShortAddress) -> Address {
        Address::Short(a)
    }
}

impl From<LongAddress> for Address {
    fn from(a: LongAddress) -> Address {
        Address::Long(a)
    }
}

/// A single HART frame, either a fully-specified outbound request or a
/// fully-validated inbound response.
///
/// Immutable once built. The address is held as its raw wire bytes so that
/// a decoded frame compares bit-exactly against the frame that produced it;
/// interpreting the sub-fields per the short/long layouts is a caller
/// concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HartFrame {
    frame_type: FrameType,
    address: Vec<u8>,
    command: u8,
    data: Vec<u8>,
}

impl HartFrame {
    /// Build a frame, validating that the address width matches the
    /// frame-type class and that the payload fits the one-byte count field.
    pub fn new(
        frame_type: FrameType,
        address: &Address,
        command: u8,
        data: Vec<u8>,
    ) -> Result<HartFrame> {
        if address.is_long() != frame_type.is_long() {
            return Err(Error::InvalidParameter(format!(
                "address width does not match frame type {frame_type:?}"
            )));
        }
        if data.len() > MAX_BYTE_COUNT {
            return Err(Error::InvalidParameter(format!(
                "payload of {} bytes exceeds the one-byte count field",
                data.len()
            )));
        }
        Ok(HartFrame {
            frame_type,
            address: address.to_bytes(),
            command,
            data,
        })
    }

    /// Assemble a frame from already-validated wire fields.
    ///
    /// Used by the stream parser, which has verified the address length
    /// against the delimiter and the payload length against the count field.
    pub(crate) fn from_wire(
        frame_type: FrameType,
        address: Vec<u8>,
        command: u8,
        data: Vec<u8>,
    ) -> HartFrame {
        debug_assert_eq!(address.len(), frame_type.address_len());
        HartFrame {
            frame_type,
            address,
            command,
            data,
        }
    }

    /// The frame-type (delimiter) of this frame.
    pub fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    /// The raw address bytes (1 or 5 bytes per the frame type).
    pub fn address(&self) -> &[u8] {
        &self.address
    }

    /// The command byte.
    pub fn command(&self) -> u8 {
        self.command
    }

    /// The payload bytes (may be empty).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The byte-count field value, i.e. the payload length.
    pub fn byte_count(&self) -> u8 {
        self.data.len() as u8
    }

    /// The checksum-covered body: `frame_type` through the end of data.
    pub fn body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(3 + self.address.len() + self.data.len());
        body.push(self.frame_type as u8);
        body.extend_from_slice(&self.address);
        body.push(self.command);
        body.push(self.byte_count());
        body.extend_from_slice(&self.data);
        body
    }

    /// The checksum byte for this frame.
    pub fn checksum(&self) -> u8 {
        checksum(&self.body())
    }

    /// Encode the frame into raw bytes ready for transmission.
    ///
    /// Produces the full wire format: `preamble_chars` preamble bytes, the
    /// body, and the trailing checksum. Fails atomically (before emitting
    /// anything) if `preamble_chars` is below the protocol minimum of 2.
    ///
    /// # Example
    ///
    /// ```
    /// use hartbus_protocol::frame::{Address, FrameType, HartFrame, ShortAddress};
    ///
    /// let addr = Address::from(ShortAddress::new(true, 4).unwrap());
    /// let frame = HartFrame::new(FrameType::ShortStx, &addr, 0x01, vec![]).unwrap();
    /// let bytes = frame.encode(2).unwrap();
    /// assert_eq!(bytes, vec![0xFF, 0xFF, 0x02, 0x84, 0x01, 0x00, 0x87]);
    /// ```
    pub fn encode(&self, preamble_chars: usize) -> Result<Vec<u8>> {
        if preamble_chars < MIN_PREAMBLE {
            return Err(Error::InvalidParameter(format!(
                "preamble of {preamble_chars} bytes is below the minimum of {MIN_PREAMBLE}"
            )));
        }
        let body = self.body();
        let mut buf = BytesMut::with_capacity(preamble_chars + body.len() + 1);
        buf.put_bytes(PREAMBLE, preamble_chars);
        buf.put_slice(&body);
        buf.put_u8(checksum(&body));
        Ok(buf.to_vec())
    }
}
