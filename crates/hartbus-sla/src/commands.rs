//! HART command opcodes and payload codecs for SLA-series instruments.
//!
//! Payload builders and parsers here are pure functions over byte slices:
//! the session layer frames them, runs the exchange, and hands the reply
//! data (status bytes already stripped) back to the parsers. All multi-byte
//! values are big-endian per HART.

use hartbus_core::{Error, Result};
use hartbus_protocol::ascii::pack_ascii;

use crate::units::{FlowRateUnit, FlowReference};

/// Command opcodes: the HART universal set plus the Brooks
/// device-specific set (S-protocol manual, commands 128 and up).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    ReadUniqueIdentifier = 0,
    ReadPrimaryVariable = 1,
    ReadPrimaryVariableCurrentAndPercentRange = 2,
    ReadAllDynamicVariablesAndCurrent = 3,
    WritePollingAddress = 6,
    ManualRs485Communications = 9,
    ReadUniqueIdentifierAssociatedWithTag = 11,
    ReadMessage = 12,
    ReadTagDescriptorDate = 13,
    ReadPrimaryVariableSensorInformation = 14,
    ReadOutputInformation = 15,
    ReadFinalAssemblyNumber = 16,
    WriteMessage = 17,
    WriteTagDescriptorDate = 18,
    WriteFinalAssemblyNumber = 19,
    SetPrimaryVariableLowerRangeValue = 37,
    ResetConfigurationChangedFlag = 38,
    EepromControl = 39,
    PerformMasterReset = 42,
    ReadAdditionalTransmitterStatus = 48,
    ReadDynamicVariableAssignments = 50,
    WriteNumberOfResponsePreambles = 59,
    WriteAnalogOutputAdditionalDamping = 64,
    WriteDeviceUniqueId = 122,
    SelectBaudrate = 123,
    EnterExitWriteProtectMode = 128,
    WriteManufacturerDeviceTypeCode = 130,
    ReadSerialNumber = 131,
    ReadModelNumber = 132,
    ReadFirmwareRevision = 134,
    ReadGasName = 150,
    ReadGasDensityFlowRefAndFlowRange = 151,
    ReadFullScaleFlowRange = 152,
    ReadFullScalePressureRange = 159,
    ReadCalibratedPressureRange = 179,
    ReadStandardTemperatureAndPressure = 190,
    WriteStandardTemperatureAndPressure = 191,
    ReadOperationalSettingsPressure = 192,
    ReadOperationalSettingsFlow = 193,
    SelectPressureApplicationNumber = 194,
    SelectGasCalibrationFlowNumber = 195,
    SelectFlowUnit = 196,
    SelectTemperatureUnit = 197,
    SelectPressureUnit = 198,
    SelectPressureFlowControl = 199,
    ReadSetpointSettings = 215,
    SelectSetpointSource = 216,
    SelectSoftstart = 218,
    WriteLinearSoftstartRampValue = 219,
    ReadPidControllerValues = 220,
    WritePidControllerValues = 221,
    ReadValveRangeAndOffset = 222,
    WriteValveRangeAndOffset = 223,
    GetValveOverrideStatus = 230,
    SetValveOverrideStatus = 231,
    ReadSetpointPercentAndSelectedUnits = 235,
    WriteSetpointPercentOrSelectedUnits = 236,
    ReadValveControlValue = 237,
    ReadTotalizerStatus = 240,
    SetTotalizerControl = 241,
    ReadTotalizerValueAndUnit = 242,
    ReadHighLowPressureAlarm = 243,
    WriteHighLowPressureAlarm = 244,
    ReadAlarmEnableSetting = 245,
    WriteAlarmEnableSetting = 246,
    ReadHighLowFlowAlarm = 247,
    WriteHighLowFlowAlarm = 248,
    ChangeUserPassword = 250,
}

impl Command {
    /// The wire opcode for this command.
    pub fn opcode(self) -> u8 {
        self as u8
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command.opcode()
    }
}

/// Parsed reply to a setpoint write (command 236): the instrument echoes
/// both the percent-of-range and selected-unit views of the new setpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetpointReply {
    pub percent: f32,
    pub unit_code: u8,
    pub value: f32,
}

/// Payload for command 11: the tag, 6-bit packed.
pub fn tag_payload(tag: &str) -> Vec<u8> {
    pack_ascii(tag)
}

/// Payload for setpoint and range commands: unit code followed by a
/// big-endian f32.
pub fn unit_value_payload(unit_code: u8, value: f32) -> Vec<u8> {
    let mut out = Vec::with_capacity(5);
    out.push(unit_code);
    out.extend_from_slice(&value.to_be_bytes());
    out
}

/// Payload for command 196: flow reference followed by the unit code.
pub fn select_units_payload(reference: FlowReference, units: FlowRateUnit) -> Vec<u8> {
    vec![reference.code(), units.code()]
}

fn read_f32(data: &[u8], offset: usize) -> Result<f32> {
    let bytes: [u8; 4] = data
        .get(offset..offset + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            Error::Protocol(format!(
                "reply truncated: wanted f32 at offset {offset}, have {} bytes",
                data.len()
            ))
        })?;
    Ok(f32::from_be_bytes(bytes))
}

fn read_u8(data: &[u8], offset: usize) -> Result<u8> {
    data.get(offset).copied().ok_or_else(|| {
        Error::Protocol(format!(
            "reply truncated: wanted byte at offset {offset}, have {} bytes",
            data.len()
        ))
    })
}

/// Parse a `unit code, f32` reply (commands 1 and 152).
pub fn parse_unit_value(data: &[u8]) -> Result<(u8, f32)> {
    Ok((read_u8(data, 0)?, read_f32(data, 1)?))
}

/// Parse a command 236 reply: `percent-unit code, percent f32, unit code,
/// value f32`. The leading percent-unit code is fixed and discarded.
pub fn parse_setpoint_reply(data: &[u8]) -> Result<SetpointReply> {
    Ok(SetpointReply {
        percent: read_f32(data, 1)?,
        unit_code: read_u8(data, 5)?,
        value: read_f32(data, 6)?,
    })
}

/// Parse a command 196 reply: `flow reference, unit code`.
pub fn parse_select_units_reply(data: &[u8]) -> Result<(u8, u8)> {
    Ok((read_u8(data, 0)?, read_u8(data, 1)?))
}

/// Parse a command 11 reply into `(mfg_id, device_type, device_id)`.
///
/// The reply opens with an expansion byte, manufacturer and device-type
/// bytes; the 3-byte device identifier sits at offset 9.
pub fn parse_unique_identifier_reply(data: &[u8]) -> Result<(u8, u8, u32)> {
    let mfg_id = read_u8(data, 1)? & 0x3F;
    let device_type = read_u8(data, 2)?;
    let id = u32::from(read_u8(data, 9)?) << 16
        | u32::from(read_u8(data, 10)?) << 8
        | u32::from(read_u8(data, 11)?);
    Ok((mfg_id, device_type, id))
}
