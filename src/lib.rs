#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod bus;
pub mod compensation;
pub mod device;
pub mod interface;
pub mod oversampling;
pub mod registers;

// Re-export main types
pub use bus::{BitField, MAX_BLOCK_LEN, RegisterBus};
pub use compensation::{
    Calibration, CompensationError, STANDARD_SEA_LEVEL_PRESSURE, Temperature, altitude,
    sea_level_pressure,
};
pub use device::{Bmp085, Measurement};
pub use interface::I2cInterface;
pub use oversampling::Oversampling;

/// BMP085 I2C address (fixed by the chip)
pub const I2C_ADDRESS: u8 = 0x77;

/// Driver errors
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error on a register access
    Bus(E),
    /// A measurement could not complete because its trigger or raw read failed
    SensorUnavailable(E),
    /// A calibration word read back as `0x0000` or `0xFFFF` (contains its register address)
    InvalidCalibration(u8),
    /// Bit index or bitfield outside a single 8-bit register
    InvalidField,
    /// Fixed-point compensation hit a zero denominator
    Compensation(CompensationError),
}

impl<E> Error<E> {
    /// Reclassify a bus fault raised during a measurement
    pub(crate) fn unavailable(self) -> Self {
        match self {
            Self::Bus(error) => Self::SensorUnavailable(error),
            other => other,
        }
    }
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus error: {e:?}"),
            Self::SensorUnavailable(e) => write!(f, "sensor unavailable: {e:?}"),
            Self::InvalidCalibration(register) => {
                write!(f, "invalid calibration word at 0x{register:02X}")
            }
            Self::InvalidField => write!(f, "bitfield does not fit in one register"),
            Self::Compensation(CompensationError::TemperatureDivisor) => {
                write!(f, "temperature compensation divisor is zero")
            }
            Self::Compensation(CompensationError::PressureDivisor) => {
                write!(f, "pressure compensation divisor is zero")
            }
        }
    }
}
