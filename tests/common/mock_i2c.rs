//! Mock I2C bus with simulated BMP085 devices attached
//!
//! Drives [`bmp085::I2cInterface`] end to end and backs the shared-bus tests
//! through `embedded_hal_bus::i2c::RefCellDevice`.

#![allow(dead_code)]

use super::sensor_model::SimulatedBmp085;
use embedded_hal::i2c::{self, ErrorKind, ErrorType, NoAcknowledgeSource};
use std::collections::BTreeMap;

#[derive(Debug)]
struct Target {
    sensor: SimulatedBmp085,
    pointer: u8,
}

/// I2C bus mock; devices are keyed by 7-bit address
#[derive(Debug, Default)]
pub struct MockI2c {
    targets: BTreeMap<u8, Target>,
    /// Device address of every transaction, in order
    transactions: Vec<u8>,
    fail_next: bool,
}

impl MockI2c {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a device at `address`
    pub fn with_device(mut self, address: u8, sensor: SimulatedBmp085) -> Self {
        self.targets.insert(address, Target { sensor, pointer: 0 });
        self
    }

    pub fn sensor(&self, address: u8) -> Option<&SimulatedBmp085> {
        self.targets.get(&address).map(|target| &target.sensor)
    }

    pub fn sensor_mut(&mut self, address: u8) -> Option<&mut SimulatedBmp085> {
        self.targets.get_mut(&address).map(|target| &mut target.sensor)
    }

    pub fn transactions(&self) -> &[u8] {
        &self.transactions
    }

    pub fn transactions_for(&self, address: u8) -> usize {
        self.transactions.iter().filter(|&&a| a == address).count()
    }

    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl i2c::I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail_next {
            self.fail_next = false;
            return Err(ErrorKind::ArbitrationLoss);
        }

        let target = self
            .targets
            .get_mut(&address)
            .ok_or(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))?;
        self.transactions.push(address);

        for operation in operations.iter_mut() {
            match operation {
                i2c::Operation::Write(bytes) => {
                    // First byte sets the register pointer, the rest auto-increment
                    if let Some((&register, data)) = bytes.split_first() {
                        target.pointer = register;
                        for &value in data {
                            target.sensor.write(target.pointer, value);
                            target.pointer = target.pointer.wrapping_add(1);
                        }
                    }
                }
                i2c::Operation::Read(buffer) => {
                    for byte in buffer.iter_mut() {
                        *byte = target.sensor.read(target.pointer);
                        target.pointer = target.pointer.wrapping_add(1);
                    }
                }
            }
        }

        Ok(())
    }
}
