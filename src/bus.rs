//! Bit-addressable register access over a byte-oriented transport
//!
//! [`RegisterBus`] turns a [`device_driver::RegisterInterface`] into the
//! byte, word, signed and bitfield accessors the compensation layer needs.
//! Every access is built from single-byte register transactions, except
//! [`RegisterBus::write_block`], which uses one multi-byte write when the
//! payload fits the interface.
//!
//! ## Read-modify-write
//!
//! [`RegisterBus::write_bit`] and [`RegisterBus::write_field`] read the register,
//! patch it locally and write it back in a second transaction. The pair is not
//! atomic: another master, or another handle to the same chip, that writes the
//! register between the two transactions has its update overwritten. Within one
//! `RegisterBus` the `&mut self` receivers already serialize access. Devices that
//! share a physical bus must be wrapped in a bus-sharing adapter (for example
//! `embedded_hal_bus::i2c::RefCellDevice`) before they reach the interface.

use crate::Error;

#[cfg(not(feature = "async"))]
use device_driver::RegisterInterface;

/// Largest payload [`RegisterBus::write_block`] sends in a single transaction
///
/// Matches the 32-byte data buffer of [`crate::I2cInterface`].
pub const MAX_BLOCK_LEN: usize = 32;

/// A contiguous run of bits inside one 8-bit register
///
/// Fields are addressed by the position of their most significant bit and
/// their width, the convention used by the device datasheets:
///
/// ```text
/// 76543210  bit numbers
///    xxx    msb = 4, width = 3  ->  mask 0b0001_1100, shift 2
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitField {
    register: u8,
    msb: u8,
    width: u8,
}

impl BitField {
    /// Describe a field of `width` bits whose highest bit is `msb`
    ///
    /// # Panics
    ///
    /// Panics if `msb > 7` or `width` is not in `1..=msb + 1`. In a `const`
    /// item this is a compile-time error.
    #[must_use]
    pub const fn new(register: u8, msb: u8, width: u8) -> Self {
        match Self::try_new(register, msb, width) {
            Some(field) => field,
            None => panic!("bitfield must fit within a single byte"),
        }
    }

    /// Fallible variant of [`BitField::new`] for descriptors built at run time
    #[must_use]
    pub const fn try_new(register: u8, msb: u8, width: u8) -> Option<Self> {
        if msb > 7 || width == 0 || width > msb + 1 {
            return None;
        }
        Some(Self {
            register,
            msb,
            width,
        })
    }

    /// Single-bit field at `bit`
    #[must_use]
    pub const fn bit(register: u8, bit: u8) -> Option<Self> {
        Self::try_new(register, bit, 1)
    }

    /// Register address holding the field
    #[must_use]
    pub const fn register(self) -> u8 {
        self.register
    }

    /// Index of the field's most significant bit
    #[must_use]
    pub const fn msb(self) -> u8 {
        self.msb
    }

    /// Field width in bits
    #[must_use]
    pub const fn width(self) -> u8 {
        self.width
    }

    /// Position of the field's least significant bit
    #[must_use]
    pub const fn shift(self) -> u8 {
        self.msb + 1 - self.width
    }

    /// Register mask covering the field
    #[must_use]
    pub const fn mask(self) -> u8 {
        // Computed in u16 so an 8-bit wide field does not overflow the shift.
        ((((1u16 << self.width) - 1) << self.shift()) & 0xFF) as u8
    }

    /// Largest value the field can hold
    #[must_use]
    pub const fn max_value(self) -> u8 {
        self.mask() >> self.shift()
    }

    /// Extract the field from a register value
    #[must_use]
    pub const fn extract(self, register_value: u8) -> u8 {
        (register_value & self.mask()) >> self.shift()
    }

    /// Return `register_value` with the field replaced by `value`
    ///
    /// Bits of `value` that do not fit the field are discarded; bits of
    /// `register_value` outside the field are preserved.
    #[must_use]
    pub const fn insert(self, register_value: u8, value: u8) -> u8 {
        let mask = self.mask();
        let shifted = ((value as u16) << self.shift()) as u8 & mask;
        (register_value & !mask) | shifted
    }
}

/// Compose a big-endian word from two register bytes
pub(crate) const fn compose_u16(high: u8, low: u8) -> u16 {
    ((high as u16) << 8) | low as u16
}

/// Compose a signed big-endian word, sign-extending the high byte first
pub(crate) const fn compose_i16(high: u8, low: u8) -> i16 {
    let high = high as i8 as i16;
    (high << 8) | low as i16
}

/// Register access layer for one device on a byte-oriented bus
pub struct RegisterBus<I> {
    interface: I,
}

impl<I> RegisterBus<I> {
    /// Wrap a register interface
    pub const fn new(interface: I) -> Self {
        Self { interface }
    }

    /// Mutable access to the underlying interface
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Consume the bus and return the interface
    pub fn release(self) -> I {
        self.interface
    }
}

#[cfg(not(feature = "async"))]
impl<I> RegisterBus<I>
where
    I: RegisterInterface<AddressType = u8>,
{
    /// Read one register as an unsigned byte
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the transport fails.
    pub fn read_u8(&mut self, register: u8) -> Result<u8, Error<I::Error>> {
        let mut buffer = [0u8; 1];
        self.interface.read_register(register, 8, &mut buffer)?;
        Ok(buffer[0])
    }

    /// Read one register as a two's-complement signed byte
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the transport fails.
    pub fn read_i8(&mut self, register: u8) -> Result<i8, Error<I::Error>> {
        Ok(self.read_u8(register)? as i8)
    }

    /// Read `register` (high byte) and `register + 1` (low byte) as an unsigned word
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if either transaction fails.
    pub fn read_u16(&mut self, register: u8) -> Result<u16, Error<I::Error>> {
        let high = self.read_u8(register)?;
        let low = self.read_u8(register.wrapping_add(1))?;
        Ok(compose_u16(high, low))
    }

    /// Read `register` (high byte) and `register + 1` (low byte) as a signed word
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if either transaction fails.
    pub fn read_i16(&mut self, register: u8) -> Result<i16, Error<I::Error>> {
        let high = self.read_u8(register)?;
        let low = self.read_u8(register.wrapping_add(1))?;
        Ok(compose_i16(high, low))
    }

    /// Write one register
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the transport fails.
    pub fn write_u8(&mut self, register: u8, value: u8) -> Result<(), Error<I::Error>> {
        self.interface.write_register(register, 8, &[value])?;
        Ok(())
    }

    /// Read a single bit
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`] if `bit > 7`, or [`Error::Bus`] if the
    /// transport fails.
    pub fn read_bit(&mut self, register: u8, bit: u8) -> Result<bool, Error<I::Error>> {
        let field = BitField::bit(register, bit).ok_or(Error::InvalidField)?;
        Ok(self.read_field(field)? != 0)
    }

    /// Set or clear a single bit (read-modify-write, not atomic)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`] if `bit > 7`, or [`Error::Bus`] if
    /// either transaction fails. A failed read leaves the register untouched.
    pub fn write_bit(&mut self, register: u8, bit: u8, value: bool) -> Result<(), Error<I::Error>> {
        let field = BitField::bit(register, bit).ok_or(Error::InvalidField)?;
        self.write_field(field, u8::from(value))
    }

    /// Read a bitfield, right-aligned
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the transport fails.
    pub fn read_field(&mut self, field: BitField) -> Result<u8, Error<I::Error>> {
        let current = self.read_u8(field.register())?;
        Ok(field.extract(current))
    }

    /// Replace a bitfield, preserving the other bits of the register
    /// (read-modify-write, not atomic)
    ///
    /// Bits of `value` above the field width are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if either transaction fails. A failed read
    /// leaves the register untouched.
    pub fn write_field(&mut self, field: BitField, value: u8) -> Result<(), Error<I::Error>> {
        let current = self.read_u8(field.register())?;
        let updated = field.insert(current, value);

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "RMW reg=0x{:02X} mask=0x{:02X}: 0x{:02X} -> 0x{:02X}",
            field.register(),
            field.mask(),
            current,
            updated
        );

        self.write_u8(field.register(), updated)
    }

    /// Read `N` consecutive registers starting at `start` as signed bytes
    ///
    /// Used for vectors packed as interleaved signed bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] on the first failed transaction.
    pub fn read_sequential_i8<const N: usize>(
        &mut self,
        start: u8,
    ) -> Result<[i8; N], Error<I::Error>> {
        let mut values = [0i8; N];
        for (offset, value) in values.iter_mut().enumerate() {
            *value = self.read_i8(start.wrapping_add(offset as u8))?;
        }
        Ok(values)
    }

    /// Read `N` consecutive registers starting at `start` as unsigned bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] on the first failed transaction.
    pub fn read_sequential_u8<const N: usize>(
        &mut self,
        start: u8,
    ) -> Result<[u8; N], Error<I::Error>> {
        let mut values = [0u8; N];
        for (offset, value) in values.iter_mut().enumerate() {
            *value = self.read_u8(start.wrapping_add(offset as u8))?;
        }
        Ok(values)
    }

    /// Fill `buffer` by reading the same register repeatedly (FIFO data ports)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] on the first failed transaction.
    pub fn read_repeated_u8(
        &mut self,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Error<I::Error>> {
        for value in buffer.iter_mut() {
            *value = self.read_u8(register)?;
        }
        Ok(())
    }

    /// Write `bytes` to consecutive registers starting at `register`
    ///
    /// Payloads up to [`MAX_BLOCK_LEN`] go out as one transaction; longer
    /// payloads fall back to one single-byte write per register.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] on the first failed transaction. Registers
    /// written before the failure keep their new values.
    pub fn write_block(&mut self, register: u8, bytes: &[u8]) -> Result<(), Error<I::Error>> {
        if bytes.is_empty() {
            return Ok(());
        }

        if bytes.len() <= MAX_BLOCK_LEN {
            self.interface
                .write_register(register, (bytes.len() * 8) as u32, bytes)?;
            return Ok(());
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Block write of {} bytes at 0x{:02X} split into single-byte writes",
            bytes.len(),
            register
        );

        for (offset, &byte) in bytes.iter().enumerate() {
            self.write_u8(register.wrapping_add(offset as u8), byte)?;
        }
        Ok(())
    }
}

#[cfg(feature = "async")]
impl<I> RegisterBus<I>
where
    I: device_driver::AsyncRegisterInterface<AddressType = u8>,
{
    /// Read one register as an unsigned byte
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the transport fails.
    pub async fn read_u8(&mut self, register: u8) -> Result<u8, Error<I::Error>> {
        let mut buffer = [0u8; 1];
        self.interface
            .read_register(register, 8, &mut buffer)
            .await?;
        Ok(buffer[0])
    }

    /// Read one register as a two's-complement signed byte
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the transport fails.
    pub async fn read_i8(&mut self, register: u8) -> Result<i8, Error<I::Error>> {
        Ok(self.read_u8(register).await? as i8)
    }

    /// Read `register` (high byte) and `register + 1` (low byte) as an unsigned word
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if either transaction fails.
    pub async fn read_u16(&mut self, register: u8) -> Result<u16, Error<I::Error>> {
        let high = self.read_u8(register).await?;
        let low = self.read_u8(register.wrapping_add(1)).await?;
        Ok(compose_u16(high, low))
    }

    /// Read `register` (high byte) and `register + 1` (low byte) as a signed word
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if either transaction fails.
    pub async fn read_i16(&mut self, register: u8) -> Result<i16, Error<I::Error>> {
        let high = self.read_u8(register).await?;
        let low = self.read_u8(register.wrapping_add(1)).await?;
        Ok(compose_i16(high, low))
    }

    /// Write one register
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the transport fails.
    pub async fn write_u8(&mut self, register: u8, value: u8) -> Result<(), Error<I::Error>> {
        self.interface.write_register(register, 8, &[value]).await?;
        Ok(())
    }

    /// Read a single bit
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`] if `bit > 7`, or [`Error::Bus`] if the
    /// transport fails.
    pub async fn read_bit(&mut self, register: u8, bit: u8) -> Result<bool, Error<I::Error>> {
        let field = BitField::bit(register, bit).ok_or(Error::InvalidField)?;
        Ok(self.read_field(field).await? != 0)
    }

    /// Set or clear a single bit (read-modify-write, not atomic)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`] if `bit > 7`, or [`Error::Bus`] if
    /// either transaction fails.
    pub async fn write_bit(
        &mut self,
        register: u8,
        bit: u8,
        value: bool,
    ) -> Result<(), Error<I::Error>> {
        let field = BitField::bit(register, bit).ok_or(Error::InvalidField)?;
        self.write_field(field, u8::from(value)).await
    }

    /// Read a bitfield, right-aligned
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the transport fails.
    pub async fn read_field(&mut self, field: BitField) -> Result<u8, Error<I::Error>> {
        let current = self.read_u8(field.register()).await?;
        Ok(field.extract(current))
    }

    /// Replace a bitfield, preserving the other bits of the register
    /// (read-modify-write, not atomic)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if either transaction fails.
    pub async fn write_field(&mut self, field: BitField, value: u8) -> Result<(), Error<I::Error>> {
        let current = self.read_u8(field.register()).await?;
        let updated = field.insert(current, value);

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "RMW reg=0x{:02X} mask=0x{:02X}: 0x{:02X} -> 0x{:02X}",
            field.register(),
            field.mask(),
            current,
            updated
        );

        self.write_u8(field.register(), updated).await
    }

    /// Read `N` consecutive registers starting at `start` as signed bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] on the first failed transaction.
    pub async fn read_sequential_i8<const N: usize>(
        &mut self,
        start: u8,
    ) -> Result<[i8; N], Error<I::Error>> {
        let mut values = [0i8; N];
        for (offset, value) in values.iter_mut().enumerate() {
            *value = self.read_i8(start.wrapping_add(offset as u8)).await?;
        }
        Ok(values)
    }

    /// Read `N` consecutive registers starting at `start` as unsigned bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] on the first failed transaction.
    pub async fn read_sequential_u8<const N: usize>(
        &mut self,
        start: u8,
    ) -> Result<[u8; N], Error<I::Error>> {
        let mut values = [0u8; N];
        for (offset, value) in values.iter_mut().enumerate() {
            *value = self.read_u8(start.wrapping_add(offset as u8)).await?;
        }
        Ok(values)
    }

    /// Fill `buffer` by reading the same register repeatedly
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] on the first failed transaction.
    pub async fn read_repeated_u8(
        &mut self,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Error<I::Error>> {
        for value in buffer.iter_mut() {
            *value = self.read_u8(register).await?;
        }
        Ok(())
    }

    /// Write `bytes` to consecutive registers starting at `register`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] on the first failed transaction.
    pub async fn write_block(&mut self, register: u8, bytes: &[u8]) -> Result<(), Error<I::Error>> {
        if bytes.is_empty() {
            return Ok(());
        }

        if bytes.len() <= MAX_BLOCK_LEN {
            self.interface
                .write_register(register, (bytes.len() * 8) as u32, bytes)
                .await?;
            return Ok(());
        }

        for (offset, &byte) in bytes.iter().enumerate() {
            self.write_u8(register.wrapping_add(offset as u8), byte).await?;
        }
        Ok(())
    }
}
