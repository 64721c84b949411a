//! Tests for error mapping and recovery

use crate::common::{
    DATASHEET_CALIBRATION, MockDelay, MockError, MockInterface, create_mock_sensor,
};
use bmp085::registers::{CHIP_ID, CONTROL, OUT_LSB, OUT_XLSB};
use bmp085::{Bmp085, Calibration, CompensationError, Error, Oversampling};

#[test]
fn test_failed_temperature_trigger_is_sensor_unavailable() {
    let (mut sensor, interface, delay) = create_mock_sensor(Oversampling::Standard);

    interface.fail_next_write();
    let result = sensor.read_temperature();

    assert!(matches!(
        result,
        Err(Error::SensorUnavailable(MockError::Communication))
    ));
    // No settle wait and no read after a failed trigger
    assert!(delay.waits_ms().is_empty());
    assert!(interface.reads().is_empty());
}

#[test]
fn test_failed_temperature_read_is_sensor_unavailable() {
    let (mut sensor, interface, _delay) = create_mock_sensor(Oversampling::Standard);

    interface.fail_next_read();

    assert!(matches!(
        sensor.read_raw_temperature(),
        Err(Error::SensorUnavailable(MockError::Communication))
    ));
}

#[test]
fn test_failed_pressure_read_is_sensor_unavailable() {
    let (mut sensor, interface, _delay) = create_mock_sensor(Oversampling::HighResolution);

    interface.fail_reads_from(Some(OUT_XLSB));
    let result = sensor.read_pressure();

    assert!(matches!(
        result,
        Err(Error::SensorUnavailable(MockError::Communication))
    ));
    // Temperature conversion completed before the pressure read failed
    assert_eq!(interface.writes_to(CONTROL), vec![0x2E, 0xB4]);
}

#[test]
fn test_sensor_recovers_after_transient_failure() {
    let (mut sensor, interface, _delay) = create_mock_sensor(Oversampling::UltraLowPower);

    interface.fail_reads_from(Some(OUT_LSB));
    assert!(sensor.read_measurement().is_err());

    interface.fail_reads_from(None);
    let measurement = sensor.read_measurement().unwrap();
    assert_eq!(measurement.pressure_pa, 69963);
}

#[test]
fn test_chip_id_failure_is_bus_error() {
    let (mut sensor, interface, _delay) = create_mock_sensor(Oversampling::Standard);

    interface.fail_reads_from(Some(CHIP_ID));

    assert!(matches!(
        sensor.read_chip_id(),
        Err(Error::Bus(MockError::Communication))
    ));
}

#[test]
fn test_zero_temperature_divisor_is_reported() {
    let interface = MockInterface::new();
    let mut calibration = DATASHEET_CALIBRATION;
    // X1 is 4743 for the datasheet UT; MD = -4743 cancels it
    calibration.md = -4743;
    interface.set_calibration(&calibration);
    let mut sensor = Bmp085::new(interface, MockDelay::default(), Oversampling::Standard)
        .unwrap();

    assert!(matches!(
        sensor.read_temperature(),
        Err(Error::Compensation(CompensationError::TemperatureDivisor))
    ));
    assert!(matches!(
        sensor.read_measurement(),
        Err(Error::Compensation(CompensationError::TemperatureDivisor))
    ));
}

#[test]
fn test_calibration_is_not_reread() {
    let (mut sensor, interface, _delay) = create_mock_sensor(Oversampling::Standard);

    interface.set_calibration(&Calibration::from_words([0; 11]));

    assert_eq!(*sensor.calibration(), DATASHEET_CALIBRATION);
    assert_eq!(sensor.read_pressure().unwrap(), 69961);
}

#[test]
fn test_error_display() {
    let error: Error<MockError> = Error::InvalidCalibration(0xB2);
    assert_eq!(error.to_string(), "invalid calibration word at 0xB2");

    let error: Error<MockError> = Error::SensorUnavailable(MockError::Communication);
    assert_eq!(error.to_string(), "sensor unavailable: Communication");

    let error: Error<MockError> = MockError::Communication.into();
    assert!(matches!(error, Error::Bus(MockError::Communication)));
}
