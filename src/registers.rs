//! Register map for the BMP085
//!
//! Plain addresses, command codes and [`BitField`] descriptors. All multi-byte
//! values are big-endian: the register at the lower address holds the most
//! significant byte.
//!
//! ## Layout
//! - `0xAA..=0xBF`: factory calibration EEPROM, eleven 16-bit words
//! - `0xD0`: chip id
//! - `0xF4`: measurement control
//! - `0xF6..=0xF8`: conversion result (MSB, LSB, XLSB)

use crate::bus::BitField;

// ==================== CALIBRATION EEPROM ====================

/// AC1 calibration word (signed)
pub const CAL_AC1: u8 = 0xAA;
/// AC2 calibration word (signed)
pub const CAL_AC2: u8 = 0xAC;
/// AC3 calibration word (signed)
pub const CAL_AC3: u8 = 0xAE;
/// AC4 calibration word (unsigned)
pub const CAL_AC4: u8 = 0xB0;
/// AC5 calibration word (unsigned)
pub const CAL_AC5: u8 = 0xB2;
/// AC6 calibration word (unsigned)
pub const CAL_AC6: u8 = 0xB4;
/// B1 calibration word (signed)
pub const CAL_B1: u8 = 0xB6;
/// B2 calibration word (signed)
pub const CAL_B2: u8 = 0xB8;
/// MB calibration word (signed)
pub const CAL_MB: u8 = 0xBA;
/// MC calibration word (signed)
pub const CAL_MC: u8 = 0xBC;
/// MD calibration word (signed)
pub const CAL_MD: u8 = 0xBE;

/// Calibration word addresses in datasheet order (AC1 .. MD)
pub const CALIBRATION_WORDS: [u8; 11] = [
    CAL_AC1, CAL_AC2, CAL_AC3, CAL_AC4, CAL_AC5, CAL_AC6, CAL_B1, CAL_B2, CAL_MB, CAL_MC, CAL_MD,
];

// ==================== IDENTIFICATION ====================

/// Chip id register
pub const CHIP_ID: u8 = 0xD0;

/// Value of [`CHIP_ID`] on a BMP085
pub const CHIP_ID_VALUE: u8 = 0x55;

// ==================== MEASUREMENT CONTROL ====================

/// Measurement control register
pub const CONTROL: u8 = 0xF4;

/// Conversion result, most significant byte
pub const OUT_MSB: u8 = 0xF6;
/// Conversion result, least significant byte
pub const OUT_LSB: u8 = 0xF7;
/// Conversion result, extra bits of a pressure conversion
pub const OUT_XLSB: u8 = 0xF8;

/// Control value that starts a temperature conversion
pub const CMD_TEMPERATURE: u8 = 0x2E;

/// Control value that starts a pressure conversion (oversampling bits cleared)
pub const CMD_PRESSURE: u8 = 0x34;

/// Oversampling setting, control bits 7:6
pub const CONTROL_OSS: BitField = BitField::new(CONTROL, 7, 2);

/// Start-of-conversion flag, control bit 5 (set while a conversion runs)
pub const CONTROL_SCO: BitField = BitField::new(CONTROL, 5, 1);

/// Measurement selector, control bits 4:0
pub const CONTROL_MEASUREMENT: BitField = BitField::new(CONTROL, 4, 5);

/// Settling time of a temperature conversion in milliseconds
pub const TEMPERATURE_CONVERSION_MS: u32 = 5;
