//! High-level driver API for the BMP085
//!
//! [`Bmp085`] loads the factory calibration when it is constructed, then runs
//! trigger → settle → read cycles on demand and compensates the raw values
//! locally. A `Bmp085` value only exists once the calibration has been read
//! successfully; there is no uncalibrated state to guard against.
//!
//! Temperature and pressure share the datasheet's `B5` term. Every pressure
//! reading therefore starts with a fresh temperature conversion, and
//! [`Bmp085::read_measurement`] returns both values from that single
//! temperature read.

use crate::Error;
use crate::bus::RegisterBus;
use crate::compensation::{Calibration, CompensationError, Temperature, altitude};
use crate::oversampling::Oversampling;
use crate::registers::{
    CAL_AC1, CAL_AC2, CAL_AC3, CAL_AC4, CAL_AC5, CAL_AC6, CAL_B1, CAL_B2, CAL_MB, CAL_MC, CAL_MD,
    CHIP_ID, CMD_PRESSURE, CMD_TEMPERATURE, CONTROL, CONTROL_OSS, CONTROL_SCO, OUT_LSB, OUT_MSB,
    OUT_XLSB, TEMPERATURE_CONVERSION_MS,
};

#[cfg(not(feature = "async"))]
use device_driver::RegisterInterface;

/// Temperature and pressure compensated from one measurement cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Compensated temperature
    pub temperature: Temperature,
    /// Compensated pressure in pascals
    pub pressure_pa: i32,
}

impl Measurement {
    /// Temperature in degrees Celsius
    #[must_use]
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature.celsius()
    }

    /// Altitude in metres relative to `sea_level_pa`
    #[must_use]
    pub fn altitude_m(&self, sea_level_pa: f32) -> f32 {
        altitude(self.pressure_pa as f32, sea_level_pa)
    }
}

/// BMP085 barometric pressure and temperature sensor
pub struct Bmp085<I, D> {
    bus: RegisterBus<I>,
    delay: D,
    calibration: Calibration,
    oversampling: Oversampling,
}

impl<I, D> Bmp085<I, D> {
    /// Calibration coefficients read at construction
    pub const fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Oversampling mode used for pressure conversions
    pub const fn oversampling(&self) -> Oversampling {
        self.oversampling
    }

    /// Consume the driver and return the interface and delay provider
    pub fn release(self) -> (I, D) {
        (self.bus.release(), self.delay)
    }

    /// Control register value that starts a pressure conversion in the current mode
    fn pressure_command(&self) -> u8 {
        CONTROL_OSS.insert(CMD_PRESSURE, self.oversampling.bits())
    }

    fn check_calibration<E>(calibration: Calibration) -> Result<Calibration, Error<E>> {
        if let Some(register) = calibration.first_invalid_word() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Calibration word at 0x{:02X} is 0x0000 or 0xFFFF", register);

            return Err(Error::InvalidCalibration(register));
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("Calibration loaded: {}", calibration);

        Ok(calibration)
    }

    fn compensate(&self, ut: u16, up: u32) -> Result<Measurement, CompensationError> {
        let temperature = self.calibration.compensate_temperature(ut)?;
        let pressure_pa =
            self.calibration
                .compensate_pressure(up, &temperature, self.oversampling)?;

        Ok(Measurement {
            temperature,
            pressure_pa,
        })
    }
}

#[cfg(not(feature = "async"))]
impl<I, D> Bmp085<I, D>
where
    I: RegisterInterface<AddressType = u8>,
    D: embedded_hal::delay::DelayNs,
{
    /// Create a driver and load the factory calibration
    ///
    /// Performs the eleven calibration word reads; no conversion is started.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A calibration read fails ([`Error::Bus`])
    /// - A calibration word reads as `0x0000` or `0xFFFF` ([`Error::InvalidCalibration`])
    pub fn new(
        interface: I,
        delay: D,
        oversampling: Oversampling,
    ) -> Result<Self, Error<I::Error>> {
        let mut bus = RegisterBus::new(interface);
        let calibration = Self::read_calibration(&mut bus)?;

        Self::check_calibration(calibration).map(|calibration| Self {
            bus,
            delay,
            calibration,
            oversampling,
        })
    }

    /// Create a driver from a numeric mode (0..=3)
    ///
    /// Out-of-range modes select [`Oversampling::Standard`]; see
    /// [`Oversampling::from_mode`].
    ///
    /// # Errors
    ///
    /// Same as [`Bmp085::new`].
    pub fn with_mode(interface: I, delay: D, mode: i32) -> Result<Self, Error<I::Error>> {
        Self::new(interface, delay, Oversampling::from_mode(mode))
    }

    fn read_calibration(bus: &mut RegisterBus<I>) -> Result<Calibration, Error<I::Error>> {
        Ok(Calibration {
            ac1: bus.read_i16(CAL_AC1)?,
            ac2: bus.read_i16(CAL_AC2)?,
            ac3: bus.read_i16(CAL_AC3)?,
            ac4: bus.read_u16(CAL_AC4)?,
            ac5: bus.read_u16(CAL_AC5)?,
            ac6: bus.read_u16(CAL_AC6)?,
            b1: bus.read_i16(CAL_B1)?,
            b2: bus.read_i16(CAL_B2)?,
            mb: bus.read_i16(CAL_MB)?,
            mc: bus.read_i16(CAL_MC)?,
            md: bus.read_i16(CAL_MD)?,
        })
    }

    /// Read the chip id register (0x55 on a BMP085)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the read fails.
    pub fn read_chip_id(&mut self) -> Result<u8, Error<I::Error>> {
        self.bus.read_u8(CHIP_ID)
    }

    /// Whether a conversion is still running (start-of-conversion bit)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the read fails.
    pub fn is_converting(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.bus.read_field(CONTROL_SCO)? != 0)
    }

    /// Run a temperature conversion and return the raw value (UT)
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorUnavailable`] if the trigger or the read fails.
    pub fn read_raw_temperature(&mut self) -> Result<u16, Error<I::Error>> {
        self.bus
            .write_u8(CONTROL, CMD_TEMPERATURE)
            .map_err(Error::unavailable)?;
        self.delay.delay_ms(TEMPERATURE_CONVERSION_MS);
        let raw = self.bus.read_u16(OUT_MSB).map_err(Error::unavailable)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("UT={}", raw);

        Ok(raw)
    }

    /// Run a pressure conversion and return the raw value (UP)
    ///
    /// The 24-bit result is shifted right by `8 - oss`, leaving 16 to 19
    /// significant bits depending on the oversampling mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorUnavailable`] if the trigger or a read fails.
    pub fn read_raw_pressure(&mut self) -> Result<u32, Error<I::Error>> {
        let command = self.pressure_command();
        self.bus
            .write_u8(CONTROL, command)
            .map_err(Error::unavailable)?;
        self.delay.delay_ms(self.oversampling.conversion_time_ms());

        let msb = self.bus.read_u8(OUT_MSB).map_err(Error::unavailable)?;
        let lsb = self.bus.read_u8(OUT_LSB).map_err(Error::unavailable)?;
        let xlsb = self.bus.read_u8(OUT_XLSB).map_err(Error::unavailable)?;
        let raw = ((u32::from(msb) << 16) | (u32::from(lsb) << 8) | u32::from(xlsb))
            >> self.oversampling.raw_shift();

        #[cfg(feature = "defmt")]
        defmt::trace!("UP={} (oss={})", raw, self.oversampling.bits());

        Ok(raw)
    }

    /// Read the compensated temperature in degrees Celsius
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorUnavailable`] if the conversion fails, or
    /// [`Error::Compensation`] on a zero denominator.
    pub fn read_temperature(&mut self) -> Result<f32, Error<I::Error>> {
        let ut = self.read_raw_temperature()?;
        self.calibration
            .compensate_temperature(ut)
            .map(Temperature::celsius)
            .map_err(Error::Compensation)
    }

    /// Read temperature and pressure from one measurement cycle
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorUnavailable`] if a conversion fails, or
    /// [`Error::Compensation`] on a zero denominator.
    pub fn read_measurement(&mut self) -> Result<Measurement, Error<I::Error>> {
        let ut = self.read_raw_temperature()?;
        let up = self.read_raw_pressure()?;
        self.compensate(ut, up).map_err(Error::Compensation)
    }

    /// Read the compensated pressure in pascals
    ///
    /// # Errors
    ///
    /// Same as [`Bmp085::read_measurement`].
    pub fn read_pressure(&mut self) -> Result<i32, Error<I::Error>> {
        Ok(self.read_measurement()?.pressure_pa)
    }

    /// Read the altitude in metres relative to `sea_level_pa`
    ///
    /// Use [`crate::STANDARD_SEA_LEVEL_PRESSURE`] when no local reference is known.
    ///
    /// # Errors
    ///
    /// Same as [`Bmp085::read_measurement`].
    pub fn read_altitude(&mut self, sea_level_pa: f32) -> Result<f32, Error<I::Error>> {
        Ok(self.read_measurement()?.altitude_m(sea_level_pa))
    }
}

#[cfg(feature = "async")]
impl<I, D> Bmp085<I, D>
where
    I: device_driver::AsyncRegisterInterface<AddressType = u8>,
    D: embedded_hal_async::delay::DelayNs,
{
    /// Create a driver and load the factory calibration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A calibration read fails ([`Error::Bus`])
    /// - A calibration word reads as `0x0000` or `0xFFFF` ([`Error::InvalidCalibration`])
    pub async fn new(
        interface: I,
        delay: D,
        oversampling: Oversampling,
    ) -> Result<Self, Error<I::Error>> {
        let mut bus = RegisterBus::new(interface);
        let calibration = Self::read_calibration(&mut bus).await?;

        Self::check_calibration(calibration).map(|calibration| Self {
            bus,
            delay,
            calibration,
            oversampling,
        })
    }

    /// Create a driver from a numeric mode (0..=3), clamping out-of-range values
    ///
    /// # Errors
    ///
    /// Same as [`Bmp085::new`].
    pub async fn with_mode(interface: I, delay: D, mode: i32) -> Result<Self, Error<I::Error>> {
        Self::new(interface, delay, Oversampling::from_mode(mode)).await
    }

    async fn read_calibration(bus: &mut RegisterBus<I>) -> Result<Calibration, Error<I::Error>> {
        Ok(Calibration {
            ac1: bus.read_i16(CAL_AC1).await?,
            ac2: bus.read_i16(CAL_AC2).await?,
            ac3: bus.read_i16(CAL_AC3).await?,
            ac4: bus.read_u16(CAL_AC4).await?,
            ac5: bus.read_u16(CAL_AC5).await?,
            ac6: bus.read_u16(CAL_AC6).await?,
            b1: bus.read_i16(CAL_B1).await?,
            b2: bus.read_i16(CAL_B2).await?,
            mb: bus.read_i16(CAL_MB).await?,
            mc: bus.read_i16(CAL_MC).await?,
            md: bus.read_i16(CAL_MD).await?,
        })
    }

    /// Read the chip id register (0x55 on a BMP085)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the read fails.
    pub async fn read_chip_id(&mut self) -> Result<u8, Error<I::Error>> {
        self.bus.read_u8(CHIP_ID).await
    }

    /// Whether a conversion is still running (start-of-conversion bit)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the read fails.
    pub async fn is_converting(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.bus.read_field(CONTROL_SCO).await? != 0)
    }

    /// Run a temperature conversion and return the raw value (UT)
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorUnavailable`] if the trigger or the read fails.
    pub async fn read_raw_temperature(&mut self) -> Result<u16, Error<I::Error>> {
        self.bus
            .write_u8(CONTROL, CMD_TEMPERATURE)
            .await
            .map_err(Error::unavailable)?;
        self.delay.delay_ms(TEMPERATURE_CONVERSION_MS).await;
        self.bus
            .read_u16(OUT_MSB)
            .await
            .map_err(Error::unavailable)
    }

    /// Run a pressure conversion and return the raw value (UP)
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorUnavailable`] if the trigger or a read fails.
    pub async fn read_raw_pressure(&mut self) -> Result<u32, Error<I::Error>> {
        let command = self.pressure_command();
        self.bus
            .write_u8(CONTROL, command)
            .await
            .map_err(Error::unavailable)?;
        self.delay
            .delay_ms(self.oversampling.conversion_time_ms())
            .await;

        let msb = self.bus.read_u8(OUT_MSB).await.map_err(Error::unavailable)?;
        let lsb = self.bus.read_u8(OUT_LSB).await.map_err(Error::unavailable)?;
        let xlsb = self.bus.read_u8(OUT_XLSB).await.map_err(Error::unavailable)?;

        Ok(
            ((u32::from(msb) << 16) | (u32::from(lsb) << 8) | u32::from(xlsb))
                >> self.oversampling.raw_shift(),
        )
    }

    /// Read the compensated temperature in degrees Celsius
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorUnavailable`] if the conversion fails, or
    /// [`Error::Compensation`] on a zero denominator.
    pub async fn read_temperature(&mut self) -> Result<f32, Error<I::Error>> {
        let ut = self.read_raw_temperature().await?;
        self.calibration
            .compensate_temperature(ut)
            .map(Temperature::celsius)
            .map_err(Error::Compensation)
    }

    /// Read temperature and pressure from one measurement cycle
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorUnavailable`] if a conversion fails, or
    /// [`Error::Compensation`] on a zero denominator.
    pub async fn read_measurement(&mut self) -> Result<Measurement, Error<I::Error>> {
        let ut = self.read_raw_temperature().await?;
        let up = self.read_raw_pressure().await?;
        self.compensate(ut, up).map_err(Error::Compensation)
    }

    /// Read the compensated pressure in pascals
    ///
    /// # Errors
    ///
    /// Same as [`Bmp085::read_measurement`].
    pub async fn read_pressure(&mut self) -> Result<i32, Error<I::Error>> {
        Ok(self.read_measurement().await?.pressure_pa)
    }

    /// Read the altitude in metres relative to `sea_level_pa`
    ///
    /// # Errors
    ///
    /// Same as [`Bmp085::read_measurement`].
    pub async fn read_altitude(&mut self, sea_level_pa: f32) -> Result<f32, Error<I::Error>> {
        Ok(self.read_measurement().await?.altitude_m(sea_level_pa))
    }
}
