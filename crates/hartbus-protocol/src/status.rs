//! Decoding of the two status bytes trailing every HART response.
//!
//! Every ACK payload starts with two status bytes: a link-layer
//! communication status and a command status. Both are pure functions of
//! their raw byte, decoded fresh on every response and never cached.

/// Link-layer communication status, first status byte of a response.
///
/// Eight independent flags, bit 7 down to bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommunicationStatus {
    pub raw: u8,
    pub communication_error: bool,
    pub parity_error: bool,
    pub overrun_error: bool,
    pub framing_error: bool,
    pub checksum_error: bool,
    pub reserved: bool,
    pub rx_buffer_overflow: bool,
    pub undefined: bool,
}

impl CommunicationStatus {
    pub fn from_byte(raw: u8) -> CommunicationStatus {
        CommunicationStatus {
            raw,
            communication_error: raw & 0x80 != 0,
            parity_error: raw & 0x40 != 0,
            overrun_error: raw & 0x20 != 0,
            framing_error: raw & 0x10 != 0,
            checksum_error: raw & 0x08 != 0,
            reserved: raw & 0x04 != 0,
            rx_buffer_overflow: raw & 0x02 != 0,
            undefined: raw & 0x01 != 0,
        }
    }

    /// True if any error flag is raised.
    pub fn has_error(&self) -> bool {
        self.raw != 0
    }
}

/// Command status, second status byte of a response.
///
/// Bit 7 flags a device malfunction; the low seven bits carry a response
/// code. Codes 0 through 6 have fixed meanings exposed as the named flags
/// below; any other code is preserved in `error_code` with every named
/// flag false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    pub raw: u8,
    pub device_malfunction: bool,
    /// Low 7 bits of the raw byte.
    pub error_code: u8,
    pub configuration_changed: bool,
    pub cold_start: bool,
    pub more_status_available: bool,
    pub primary_var_fixed: bool,
    pub primary_var_saturated: bool,
    pub non_primary_out_of_range: bool,
    pub primary_var_out_of_range: bool,
}

impl CommandStatus {
    pub fn from_byte(raw: u8) -> CommandStatus {
        let error_code = raw & 0x7F;
        CommandStatus {
            raw,
            device_malfunction: raw & 0x80 != 0,
            error_code,
            configuration_changed: error_code == 6,
            cold_start: error_code == 5,
            more_status_available: error_code == 4,
            primary_var_fixed: error_code == 3,
            primary_var_saturated: error_code == 2,
            non_primary_out_of_range: error_code == 1,
            primary_var_out_of_range: error_code == 0,
        }
    }
}

/// Named meanings for the command-response error codes a master can act
/// on. Codes without an allocated meaning decode to [`Unallocated`]
/// rather than being mapped onto a neighbor.
///
/// [`Unallocated`]: CommandErrorId::Unallocated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorId {
    NoError,
    Undefined,
    InvalidSelection,
    ParameterTooLarge,
    ParameterTooSmall,
    IncorrectByteCount,
    TransmitterSpecific,
    WriteProtectMode,
    AccessRestricted,
    DeviceBusy,
    CommandNotImplemented,
    Unallocated(u8),
}

impl CommandErrorId {
    pub fn from_code(code: u8) -> CommandErrorId {
        match code {
            0 => CommandErrorId::NoError,
            1 => CommandErrorId::Undefined,
            2 => CommandErrorId::InvalidSelection,
            3 => CommandErrorId::ParameterTooLarge,
            4 => CommandErrorId::ParameterTooSmall,
            5 => CommandErrorId::IncorrectByteCount,
            6 => CommandErrorId::TransmitterSpecific,
            7 => CommandErrorId::WriteProtectMode,
            16 => CommandErrorId::AccessRestricted,
            32 => CommandErrorId::DeviceBusy,
            64 => CommandErrorId::CommandNotImplemented,
            other => CommandErrorId::Unallocated(other),
        }
    }
}

/// Both status bytes of a response, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    pub comms: CommunicationStatus,
    pub command: CommandStatus,
}

impl DeviceStatus {
    /// Decode from the first two bytes of an ACK payload.
    pub fn from_bytes(first: u8, second: u8) -> DeviceStatus {
        DeviceStatus {
            comms: CommunicationStatus::from_byte(first),
            command: CommandStatus::from_byte(second),
        }
    }

    /// Named meaning of the command error code.
    pub fn command_error(&self) -> CommandErrorId {
        CommandErrorId::from_code(self.command.error_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn communication_error_bit() {
        let s = CommunicationStatus::from_byte(0x80);
        assert!(s.communication_error);
        assert!(!s.parity_error);
        assert!(!s.overrun_error);
        assert!(!s.framing_error);
        assert!(!s.checksum_error);
        assert!(!s.reserved);
        assert!(!s.rx_buffer_overflow);
        assert!(!s.undefined);
        assert!(s.has_error());
    }

    #[test]
    fn each_communication_flag_maps_to_its_bit() {
        assert!(CommunicationStatus::from_byte(0x40).parity_error);
        assert!(CommunicationStatus::from_byte(0x20).overrun_error);
        assert!(CommunicationStatus::from_byte(0x10).framing_error);
        assert!(CommunicationStatus::from_byte(0x08).checksum_error);
        assert!(CommunicationStatus::from_byte(0x04).reserved);
        assert!(CommunicationStatus::from_byte(0x02).rx_buffer_overflow);
        assert!(CommunicationStatus::from_byte(0x01).undefined);
        assert!(!CommunicationStatus::from_byte(0x00).has_error());
    }

    #[test]
    fn command_status_configuration_changed() {
        let s = CommandStatus::from_byte(0x06);
        assert!(!s.device_malfunction);
        assert_eq!(s.error_code, 6);
        assert!(s.configuration_changed);
        assert!(!s.cold_start);
        assert!(!s.more_status_available);
        assert!(!s.primary_var_fixed);
        assert!(!s.primary_var_saturated);
        assert!(!s.non_primary_out_of_range);
        assert!(!s.primary_var_out_of_range);
    }

    #[test]
    fn command_status_malfunction_and_code_split() {
        let s = CommandStatus::from_byte(0x85);
        assert!(s.device_malfunction);
        assert_eq!(s.error_code, 5);
        assert!(s.cold_start);
    }

    #[test]
    fn unallocated_codes_keep_all_named_flags_false() {
        let s = CommandStatus::from_byte(0x0B);
        assert_eq!(s.error_code, 11);
        assert!(!s.configuration_changed);
        assert!(!s.cold_start);
        assert!(!s.more_status_available);
        assert!(!s.primary_var_fixed);
        assert!(!s.primary_var_saturated);
        assert!(!s.non_primary_out_of_range);
        assert!(!s.primary_var_out_of_range);
        assert_eq!(CommandErrorId::from_code(11), CommandErrorId::Unallocated(11));
    }

    #[test]
    fn command_error_ids() {
        assert_eq!(CommandErrorId::from_code(0), CommandErrorId::NoError);
        assert_eq!(CommandErrorId::from_code(2), CommandErrorId::InvalidSelection);
        assert_eq!(CommandErrorId::from_code(7), CommandErrorId::WriteProtectMode);
        assert_eq!(CommandErrorId::from_code(16), CommandErrorId::AccessRestricted);
        assert_eq!(CommandErrorId::from_code(32), CommandErrorId::DeviceBusy);
        assert_eq!(
            CommandErrorId::from_code(64),
            CommandErrorId::CommandNotImplemented
        );
    }

    #[test]
    fn device_status_from_bytes() {
        let status = DeviceStatus::from_bytes(0x00, 0x06);
        assert!(!status.comms.has_error());
        assert!(status.command.configuration_changed);
        assert_eq!(status.command_error(), CommandErrorId::TransmitterSpecific);
    }
}
