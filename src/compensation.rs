//! Factory calibration and fixed-point compensation
//!
//! Implements the BMP085 datasheet algorithm (section 3.5, "Calculating
//! pressure and temperature") in integer arithmetic. The order of operations,
//! the arithmetic right shifts and the truncating divisions are part of the
//! result: an algebraically equivalent floating-point formula gives different
//! pascals.
//!
//! Intermediates are carried in `i64`, which holds every term exactly for
//! 16-bit inputs. `B4` keeps the datasheet's 32-bit unsigned product. `B7` is
//! signed: a raw value below `B3` gives a negative `B7`, which takes the
//! multiply-first branch like any other value below `0x8000_0000`.

use crate::oversampling::Oversampling;
use crate::registers::CALIBRATION_WORDS;

/// Mean sea-level pressure in pascals (ISA)
pub const STANDARD_SEA_LEVEL_PRESSURE: f32 = 101_325.0;

/// A compensation step hit a zero denominator
///
/// The datasheet formulas do not guard against these; they can only occur
/// with corrupted calibration data or raw values far outside the sensor range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompensationError {
    /// `X1 + MD` was zero in the temperature step
    TemperatureDivisor,
    /// `B4` was zero in the pressure step
    PressureDivisor,
}

/// Factory calibration coefficients, read once from EEPROM `0xAA..=0xBF`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub struct Calibration {
    pub ac1: i16,
    pub ac2: i16,
    pub ac3: i16,
    pub ac4: u16,
    pub ac5: u16,
    pub ac6: u16,
    pub b1: i16,
    pub b2: i16,
    pub mb: i16,
    pub mc: i16,
    pub md: i16,
}

impl Calibration {
    /// Decode the eleven EEPROM words in datasheet order (AC1 .. MD)
    #[must_use]
    pub const fn from_words(words: [u16; 11]) -> Self {
        Self {
            ac1: words[0] as i16,
            ac2: words[1] as i16,
            ac3: words[2] as i16,
            ac4: words[3],
            ac5: words[4],
            ac6: words[5],
            b1: words[6] as i16,
            b2: words[7] as i16,
            mb: words[8] as i16,
            mc: words[9] as i16,
            md: words[10] as i16,
        }
    }

    /// The raw EEPROM words in datasheet order (AC1 .. MD)
    #[must_use]
    pub const fn words(&self) -> [u16; 11] {
        [
            self.ac1 as u16,
            self.ac2 as u16,
            self.ac3 as u16,
            self.ac4,
            self.ac5,
            self.ac6,
            self.b1 as u16,
            self.b2 as u16,
            self.mb as u16,
            self.mc as u16,
            self.md as u16,
        ]
    }

    /// Register address of the first word that reads as `0x0000` or `0xFFFF`
    ///
    /// The datasheet guarantees no calibration word takes either value, so a
    /// hit means the EEPROM was not read correctly (absent device, stuck bus).
    #[must_use]
    pub fn first_invalid_word(&self) -> Option<u8> {
        self.words()
            .iter()
            .zip(CALIBRATION_WORDS)
            .find(|(word, _)| **word == 0x0000 || **word == 0xFFFF)
            .map(|(_, register)| register)
    }

    /// Compensate a raw temperature reading
    ///
    /// The returned [`Temperature`] carries the `B5` term that
    /// [`Calibration::compensate_pressure`] needs.
    ///
    /// # Errors
    ///
    /// Returns [`CompensationError::TemperatureDivisor`] if `X1 + MD` is zero.
    pub fn compensate_temperature(&self, ut: u16) -> Result<Temperature, CompensationError> {
        let x1 = ((i64::from(ut) - i64::from(self.ac6)) * i64::from(self.ac5)) >> 15;
        let divisor = x1 + i64::from(self.md);
        if divisor == 0 {
            return Err(CompensationError::TemperatureDivisor);
        }
        // Rust integer division truncates toward zero, as the datasheet requires.
        let x2 = (i64::from(self.mc) << 11) / divisor;
        let b5 = x1 + x2;
        let deci_celsius = (b5 + 8) >> 4;

        Ok(Temperature {
            b5: b5 as i32,
            deci_celsius: deci_celsius as i32,
        })
    }

    /// Compensate a raw pressure reading, in pascals
    ///
    /// `up` is the raw value after the oversampling shift, as returned by
    /// `Bmp085::read_raw_pressure`. `temperature` must come from the raw
    /// temperature read of the same measurement cycle.
    ///
    /// # Errors
    ///
    /// Returns [`CompensationError::PressureDivisor`] if `B4` is zero.
    pub fn compensate_pressure(
        &self,
        up: u32,
        temperature: &Temperature,
        oversampling: Oversampling,
    ) -> Result<i32, CompensationError> {
        let oss = oversampling.bits();

        let b6 = i64::from(temperature.b5) - 4000;
        let b6_squared = (b6 * b6) >> 12;

        let x1 = (i64::from(self.b2) * b6_squared) >> 11;
        let x2 = (i64::from(self.ac2) * b6) >> 11;
        let x3 = x1 + x2;
        let b3 = (((i64::from(self.ac1) * 4 + x3) << oss) + 2) / 4;

        let x1 = (i64::from(self.ac3) * b6) >> 13;
        let x2 = (i64::from(self.b1) * b6_squared) >> 16;
        let x3 = ((x1 + x2) + 2) >> 2;
        let b4 = u32::from(self.ac4).wrapping_mul((x3 + 32768) as u32) >> 15;
        if b4 == 0 {
            return Err(CompensationError::PressureDivisor);
        }

        let b4 = i64::from(b4);
        let b7 = (i64::from(up) - b3) * (50_000 >> oss);
        let p = if b7 < 0x8000_0000 {
            (b7 * 2) / b4
        } else {
            (b7 / b4) * 2
        };
        // p is a 32-bit long in the datasheet
        let p = i64::from(p as i32);

        let x1 = (p >> 8) * (p >> 8);
        let x1 = (x1 * 3038) >> 16;
        let x2 = (-7375 * p) >> 16;
        let pressure = p + ((x1 + x2 + 3791) >> 4);

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "Pressure compensation: B3={} B4={} B7={} p={}",
            b3,
            b4,
            b7,
            pressure
        );

        Ok(pressure as i32)
    }
}

/// Compensated temperature together with the shared `B5` term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature {
    b5: i32,
    deci_celsius: i32,
}

impl Temperature {
    /// Temperature in tenths of a degree Celsius
    #[must_use]
    pub const fn deci_celsius(self) -> i32 {
        self.deci_celsius
    }

    /// Temperature in degrees Celsius (0.1 °C resolution)
    #[must_use]
    pub fn celsius(self) -> f32 {
        self.deci_celsius as f32 / 10.0
    }

    /// Intermediate `B5` term consumed by the pressure compensation
    #[must_use]
    pub const fn b5(self) -> i32 {
        self.b5
    }
}

/// Altitude in metres for `pressure_pa`, given the sea-level reference pressure
///
/// International barometric formula as given in the datasheet.
#[must_use]
pub fn altitude(pressure_pa: f32, sea_level_pa: f32) -> f32 {
    44_330.0 * (1.0 - libm::powf(pressure_pa / sea_level_pa, 0.1903))
}

/// Sea-level equivalent of `pressure_pa` measured at `altitude_m`
#[must_use]
pub fn sea_level_pressure(pressure_pa: f32, altitude_m: f32) -> f32 {
    pressure_pa / libm::powf(1.0 - altitude_m / 44_330.0, 5.255)
}
