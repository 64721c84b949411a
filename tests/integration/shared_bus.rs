//! Integration tests over I2C, including two sensors on one shared bus

use crate::common::{MockDelay, MockI2c, SimulatedBmp085};
use bmp085::registers::CONTROL;
use bmp085::{
    BitField, Bmp085, Error, I2C_ADDRESS, I2cInterface, MAX_BLOCK_LEN, Oversampling, RegisterBus,
};
use device_driver::RegisterInterface;
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use embedded_hal_bus::i2c::RefCellDevice;
use std::cell::RefCell;

const SECOND_ADDRESS: u8 = 0x76;

#[test]
fn test_measurement_over_i2c() {
    let i2c = MockI2c::new().with_device(I2C_ADDRESS, SimulatedBmp085::new());
    let mut sensor = Bmp085::new(
        I2cInterface::default(i2c),
        MockDelay::default(),
        Oversampling::UltraLowPower,
    )
    .unwrap();

    let measurement = sensor.read_measurement().unwrap();
    assert_eq!(measurement.temperature.deci_celsius(), 150);
    assert_eq!(measurement.pressure_pa, 69963);

    let (interface, _delay) = sensor.release();
    assert_eq!(interface.address(), I2C_ADDRESS);
    let i2c = interface.release();
    // 22 calibration byte reads, then 2 triggers and 5 output byte reads
    assert_eq!(i2c.transactions_for(I2C_ADDRESS), 29);
}

#[test]
fn test_missing_device_is_bus_error() {
    let i2c = MockI2c::new();
    let result = Bmp085::new(
        I2cInterface::default(i2c),
        MockDelay::default(),
        Oversampling::Standard,
    );

    assert!(matches!(
        result,
        Err(Error::Bus(ErrorKind::NoAcknowledge(
            NoAcknowledgeSource::Address
        )))
    ));
}

#[test]
fn test_arbitration_loss_during_measurement() {
    let bus = RefCell::new(MockI2c::new().with_device(I2C_ADDRESS, SimulatedBmp085::new()));
    let mut sensor = Bmp085::new(
        I2cInterface::default(RefCellDevice::new(&bus)),
        MockDelay::default(),
        Oversampling::Standard,
    )
    .unwrap();

    bus.borrow_mut().fail_next();
    assert!(matches!(
        sensor.read_temperature(),
        Err(Error::SensorUnavailable(ErrorKind::ArbitrationLoss))
    ));
    assert!(sensor.read_temperature().is_ok());
}

#[test]
fn test_two_sensors_share_one_bus() {
    let mut second = SimulatedBmp085::new();
    second.set_raw_temperature(30000);
    second.set_raw_pressure(25000);

    let bus = RefCell::new(
        MockI2c::new()
            .with_device(I2C_ADDRESS, SimulatedBmp085::new())
            .with_device(SECOND_ADDRESS, second),
    );

    let mut first = Bmp085::new(
        I2cInterface::default(RefCellDevice::new(&bus)),
        MockDelay::default(),
        Oversampling::UltraLowPower,
    )
    .unwrap();
    let mut second = Bmp085::new(
        I2cInterface::new(RefCellDevice::new(&bus), SECOND_ADDRESS),
        MockDelay::default(),
        Oversampling::UltraLowPower,
    )
    .unwrap();

    let a = first.read_measurement().unwrap();
    let b = second.read_measurement().unwrap();
    let a_again = first.read_measurement().unwrap();

    assert_eq!(a.pressure_pa, 69963);
    assert_eq!(a, a_again);
    assert_eq!(b.temperature.deci_celsius(), 313);
    assert!(b.pressure_pa > a.pressure_pa);

    let bus = bus.borrow();
    assert_eq!(bus.transactions_for(I2C_ADDRESS), 22 + 7 + 7);
    assert_eq!(bus.transactions_for(SECOND_ADDRESS), 22 + 7);
    assert_eq!(
        bus.sensor(I2C_ADDRESS).map(SimulatedBmp085::conversions),
        Some(&[0x2E, 0x34, 0x2E, 0x34][..])
    );
}

#[test]
fn test_register_bus_over_i2c() {
    let i2c = MockI2c::new().with_device(I2C_ADDRESS, SimulatedBmp085::blank());
    let mut bus = RegisterBus::new(I2cInterface::default(i2c));

    bus.write_u8(0x40, 0b1010_1111).unwrap();
    bus.write_field(BitField::new(0x40, 4, 3), 0b010).unwrap();
    assert_eq!(bus.read_u8(0x40).unwrap(), 0b1010_1011);

    bus.write_block(0x50, &[0x12, 0x34, 0x56]).unwrap();
    assert_eq!(bus.read_u16(0x50).unwrap(), 0x1234);
    assert_eq!(bus.read_sequential_u8::<3>(0x50).unwrap(), [0x12, 0x34, 0x56]);

    let i2c = bus.release().release();
    assert!(i2c.sensor(I2C_ADDRESS).unwrap().conversions().is_empty());
    // write, read-modify-write pair, read, block, word pair, three sequential reads
    assert_eq!(i2c.transactions().len(), 10);
}

#[test]
fn test_control_write_reaches_device() {
    let i2c = MockI2c::new().with_device(SECOND_ADDRESS, SimulatedBmp085::new());
    let mut bus = RegisterBus::new(I2cInterface::new(i2c, SECOND_ADDRESS));

    bus.write_u8(CONTROL, 0x2E).unwrap();
    assert_eq!(bus.read_u16(0xF6).unwrap(), 27898);
}

#[test]
fn test_interface_splits_long_writes_into_frames() {
    let i2c = MockI2c::new().with_device(I2C_ADDRESS, SimulatedBmp085::blank());
    let mut interface = I2cInterface::default(i2c);
    let payload: Vec<u8> = (1..=MAX_BLOCK_LEN as u8 + 8).collect();

    interface.write_register(0x10, 8, &payload).unwrap();

    let i2c = interface.release();
    assert_eq!(i2c.transactions_for(I2C_ADDRESS), 2);
    let sensor = i2c.sensor(I2C_ADDRESS).unwrap();
    for (offset, &value) in payload.iter().enumerate() {
        assert_eq!(sensor.read(0x10 + offset as u8), value, "offset {offset}");
    }
    assert_eq!(sensor.read(0x10 + payload.len() as u8), 0);
}
