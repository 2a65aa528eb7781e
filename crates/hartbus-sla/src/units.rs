//! Engineering-unit code catalogs for SLA-series instruments.
//!
//! HART transfers measurements as a one-byte unit code followed by the
//! value. These enums mirror the unit tables the SLA firmware accepts;
//! codes outside a table are reported as a protocol error rather than
//! being coerced to a neighbor.

use hartbus_core::{Error, Result};

/// Flow-rate unit codes (HART unit table subset supported by the SLA).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FlowRateUnit {
    CubicFeetPerMin = 15,
    GallonsPerMin = 16,
    LitersPerMin = 17,
    ImpGallonsPerMin = 18,
    CubicMetersPerHour = 19,
    GallonsPerSec = 22,
    LitersPerSec = 24,
    CubicFeetPerSec = 26,
    CubicFeetPerDay = 27,
    CubicMetersPerSec = 28,
    CubicMetersPerDay = 29,
    ImpGallonsPerHour = 30,
    ImpGallonsPerDay = 31,
    Percent = 57,
    GramsPerSec = 70,
    GramsPerMin = 71,
    GramsPerHour = 72,
    KgPerSec = 73,
    KgPerMin = 74,
    KgPerHour = 75,
    KgPerDay = 76,
    LbsPerSec = 80,
    LbsPerMin = 81,
    LbsPerHour = 82,
    LbsPerDay = 83,
    CubicFeetPerHour = 130,
    CubicMetersPerMin = 131,
    BarrelsPerSec = 132,
    BarrelsPerMin = 133,
    BarrelsPerHour = 134,
    BarrelsPerDay = 135,
    GallonsPerHour = 136,
    ImpGallonsPerSec = 137,
    LitersPerHour = 138,
    MlPerSec = 170,
    MlPerMin = 171,
    MlPerHour = 172,
    MlPerDay = 173,
    LitersPerDay = 174,
    CubicInchesPerSec = 200,
    CubicInchesPerMin = 201,
    CubicInchesPerHour = 202,
    CubicInchesPerDay = 203,
    GallonsPerDay = 235,
    CcPerMin = 240,
    CcPerSec = 241,
    CcPerHour = 242,
    GramsPerDay = 243,
    OuncesPerSec = 244,
    OuncesPerMin = 245,
    OuncesPerHour = 246,
    OuncesPerDay = 247,
    CcPerDay = 248,
    NotUsed = 250,
}

impl FlowRateUnit {
    /// The wire code for this unit.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a wire code, failing on codes outside the SLA's table.
    pub fn from_code(code: u8) -> Result<FlowRateUnit> {
        let unit = match code {
            15 => FlowRateUnit::CubicFeetPerMin,
            16 => FlowRateUnit::GallonsPerMin,
            17 => FlowRateUnit::LitersPerMin,
            18 => FlowRateUnit::ImpGallonsPerMin,
            19 => FlowRateUnit::CubicMetersPerHour,
            22 => FlowRateUnit::GallonsPerSec,
            24 => FlowRateUnit::LitersPerSec,
            26 => FlowRateUnit::CubicFeetPerSec,
            27 => FlowRateUnit::CubicFeetPerDay,
            28 => FlowRateUnit::CubicMetersPerSec,
            29 => FlowRateUnit::CubicMetersPerDay,
            30 => FlowRateUnit::ImpGallonsPerHour,
            31 => FlowRateUnit::ImpGallonsPerDay,
            57 => FlowRateUnit::Percent,
            70 => FlowRateUnit::GramsPerSec,
            71 => FlowRateUnit::GramsPerMin,
            72 => FlowRateUnit::GramsPerHour,
            73 => FlowRateUnit::KgPerSec,
            74 => FlowRateUnit::KgPerMin,
            75 => FlowRateUnit::KgPerHour,
            76 => FlowRateUnit::KgPerDay,
            80 => FlowRateUnit::LbsPerSec,
            81 => FlowRateUnit::LbsPerMin,
            82 => FlowRateUnit::LbsPerHour,
            83 => FlowRateUnit::LbsPerDay,
            130 => FlowRateUnit::CubicFeetPerHour,
            131 => FlowRateUnit::CubicMetersPerMin,
            132 => FlowRateUnit::BarrelsPerSec,
            133 => FlowRateUnit::BarrelsPerMin,
            134 => FlowRateUnit::BarrelsPerHour,
            135 => FlowRateUnit::BarrelsPerDay,
            136 => FlowRateUnit::GallonsPerHour,
            137 => FlowRateUnit::ImpGallonsPerSec,
            138 => FlowRateUnit::LitersPerHour,
            170 => FlowRateUnit::MlPerSec,
            171 => FlowRateUnit::MlPerMin,
            172 => FlowRateUnit::MlPerHour,
            173 => FlowRateUnit::MlPerDay,
            174 => FlowRateUnit::LitersPerDay,
            200 => FlowRateUnit::CubicInchesPerSec,
            201 => FlowRateUnit::CubicInchesPerMin,
            202 => FlowRateUnit::CubicInchesPerHour,
            203 => FlowRateUnit::CubicInchesPerDay,
            235 => FlowRateUnit::GallonsPerDay,
            240 => FlowRateUnit::CcPerMin,
            241 => FlowRateUnit::CcPerSec,
            242 => FlowRateUnit::CcPerHour,
            243 => FlowRateUnit::GramsPerDay,
            244 => FlowRateUnit::OuncesPerSec,
            245 => FlowRateUnit::OuncesPerMin,
            246 => FlowRateUnit::OuncesPerHour,
            247 => FlowRateUnit::OuncesPerDay,
            248 => FlowRateUnit::CcPerDay,
            250 => FlowRateUnit::NotUsed,
            other => {
                return Err(Error::Protocol(format!(
                    "unknown flow rate unit code {other}"
                )))
            }
        };
        Ok(unit)
    }
}

/// Reference condition a flow unit is expressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FlowReference {
    Normal = 0,
    Standard = 1,
    Calibration = 2,
}

impl FlowReference {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<FlowReference> {
        match code {
            0 => Ok(FlowReference::Normal),
            1 => Ok(FlowReference::Standard),
            2 => Ok(FlowReference::Calibration),
            other => Err(Error::Protocol(format!(
                "unknown flow reference code {other}"
            ))),
        }
    }
}

/// Temperature unit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TemperatureUnit {
    Celsius = 32,
    Fahrenheit = 33,
    Kelvin = 35,
}

impl TemperatureUnit {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<TemperatureUnit> {
        match code {
            32 => Ok(TemperatureUnit::Celsius),
            33 => Ok(TemperatureUnit::Fahrenheit),
            35 => Ok(TemperatureUnit::Kelvin),
            other => Err(Error::Protocol(format!(
                "unknown temperature unit code {other}"
            ))),
        }
    }
}

/// Pressure unit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PressureUnit {
    InH2o = 1,
    InHg = 2,
    FtH2o = 3,
    PsiA = 5,
    PsiB = 6,
    Bar = 7,
    Millibar = 8,
    Pascal = 11,
    Kilopascal = 12,
    Torr = 13,
    StandardAtmosphere = 14,
    CmH2o = 227,
    GrPerCm2 = 228,
    MmHg = 229,
    Millitorr = 230,
    KgPerCm2A = 231,
    Atm = 232,
    FtH2oAlt = 233,
    InH2oAlt = 234,
    InHgAlt = 235,
    TorrAlt = 236,
    MbarAlt = 237,
    BarAlt = 238,
    PascalAlt = 239,
    KpaAlt = 240,
    Counts = 241,
    Percent = 242,
    KgPerCm2B = 243,
    MillitorrAlt = 244,
    MmHgAlt = 245,
    GrPerCm2Alt = 246,
}

impl PressureUnit {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<PressureUnit> {
        let unit = match code {
            1 => PressureUnit::InH2o,
            2 => PressureUnit::InHg,
            3 => PressureUnit::FtH2o,
            5 => PressureUnit::PsiA,
            6 => PressureUnit::PsiB,
            7 => PressureUnit::Bar,
            8 => PressureUnit::Millibar,
            11 => PressureUnit::Pascal,
            12 => PressureUnit::Kilopascal,
            13 => PressureUnit::Torr,
            14 => PressureUnit::StandardAtmosphere,
            227 => PressureUnit::CmH2o,
            228 => PressureUnit::GrPerCm2,
            229 => PressureUnit::MmHg,
            230 => PressureUnit::Millitorr,
            231 => PressureUnit::KgPerCm2A,
            232 => PressureUnit::Atm,
            233 => PressureUnit::FtH2oAlt,
            234 => PressureUnit::InH2oAlt,
            235 => PressureUnit::InHgAlt,
            236 => PressureUnit::TorrAlt,
            237 => PressureUnit::MbarAlt,
            238 => PressureUnit::BarAlt,
            239 => PressureUnit::PascalAlt,
            240 => PressureUnit::KpaAlt,
            241 => PressureUnit::Counts,
            242 => PressureUnit::Percent,
            243 => PressureUnit::KgPerCm2B,
            244 => PressureUnit::MillitorrAlt,
            245 => PressureUnit::MmHgAlt,
            246 => PressureUnit::GrPerCm2Alt,
            other => {
                return Err(Error::Protocol(format!(
                    "unknown pressure unit code {other}"
                )))
            }
        };
        Ok(unit)
    }
}

/// Density unit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DensityUnit {
    GramsPerCm3 = 91,
    KgPerM3 = 92,
    LbsPerGal = 93,
    LbsPerFt3 = 94,
    GramsPerMl = 95,
    KgPerL = 96,
    GramsPerL = 97,
    LbsPerIn3 = 98,
}

impl DensityUnit {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<DensityUnit> {
        let unit = match code {
            91 => DensityUnit::GramsPerCm3,
            92 => DensityUnit::KgPerM3,
            93 => DensityUnit::LbsPerGal,
            94 => DensityUnit::LbsPerFt3,
            95 => DensityUnit::GramsPerMl,
            96 => DensityUnit::KgPerL,
            97 => DensityUnit::GramsPerL,
            98 => DensityUnit::LbsPerIn3,
            other => {
                return Err(Error::Protocol(format!(
                    "unknown density unit code {other}"
                )))
            }
        };
        Ok(unit)
    }
}
