//! Bus interface implementation for the BMP085
//!
//! Adapts an `embedded-hal` I2C peripheral to the `device-driver` register
//! traits that [`crate::RegisterBus`] is built on. The device address is fixed
//! per interface, so every device on a shared bus gets its own
//! `I2cInterface` (usually over a bus-sharing wrapper from `embedded-hal-bus`).

use crate::I2C_ADDRESS;
use crate::bus::MAX_BLOCK_LEN;

#[cfg(not(feature = "async"))]
use device_driver::RegisterInterface;

/// I2C interface for the BMP085
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Create a new I2C interface at the BMP085 address (0x77)
    ///
    /// # Example
    /// ```ignore
    /// let interface = I2cInterface::default(i2c);
    /// let mut sensor = Bmp085::new(interface, delay, Oversampling::Standard)?;
    /// ```
    pub const fn default(i2c: I2C) -> Self {
        Self {
            i2c,
            address: I2C_ADDRESS,
        }
    }

    /// Create a new I2C interface with a custom device address
    ///
    /// For pin-compatible parts or address translators.
    ///
    /// # Arguments
    /// * `i2c` - The I2C peripheral
    /// * `address` - 7-bit device address
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// 7-bit device address this interface talks to
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Consume the interface and return the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

/// Register pointer followed by the payload, as one I2C write
///
/// Returns the frame length. `write_data` is at most `MAX_BLOCK_LEN` bytes.
fn write_frame(buffer: &mut [u8; MAX_BLOCK_LEN + 1], address: u8, write_data: &[u8]) -> usize {
    buffer[0] = address;
    buffer[1..=write_data.len()].copy_from_slice(write_data);
    write_data.len() + 1
}

/// Split a payload into chunks of at most `MAX_BLOCK_LEN` bytes, each paired
/// with the register it starts at
fn frames(address: u8, write_data: &[u8]) -> impl Iterator<Item = (u8, &[u8])> {
    write_data
        .chunks(MAX_BLOCK_LEN)
        .enumerate()
        .map(move |(index, chunk)| {
            let offset = (index * MAX_BLOCK_LEN) as u8;
            (address.wrapping_add(offset), chunk)
        })
}

#[cfg(not(feature = "async"))]
impl<I2C, E> RegisterInterface for I2cInterface<I2C>
where
    I2C: embedded_hal::i2c::I2c<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[address], read_data)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        if write_data.is_empty() {
            return self.i2c.write(self.address, &[address]);
        }

        // Longer payloads go out as consecutive frames
        let mut buffer = [0u8; MAX_BLOCK_LEN + 1];
        for (register, chunk) in frames(address, write_data) {
            let len = write_frame(&mut buffer, register, chunk);
            self.i2c.write(self.address, &buffer[..len])?;
        }
        Ok(())
    }
}

#[cfg(feature = "async")]
impl<I2C, E> device_driver::AsyncRegisterInterface for I2cInterface<I2C>
where
    I2C: embedded_hal_async::i2c::I2c<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    async fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c
            .write_read(self.address, &[address], read_data)
            .await
    }

    async fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        if write_data.is_empty() {
            return self.i2c.write(self.address, &[address]).await;
        }

        let mut buffer = [0u8; MAX_BLOCK_LEN + 1];
        for (register, chunk) in frames(address, write_data) {
            let len = write_frame(&mut buffer, register, chunk);
            self.i2c.write(self.address, &buffer[..len]).await?;
        }
        Ok(())
    }
}
