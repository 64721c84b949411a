//! Tests for oversampling modes, mode clamping and pressure triggers

use crate::common::{MockDelay, MockInterface, create_mock_sensor};
use bmp085::registers::CONTROL;
use bmp085::{Bmp085, Oversampling};

const MODES: [Oversampling; 4] = [
    Oversampling::UltraLowPower,
    Oversampling::Standard,
    Oversampling::HighResolution,
    Oversampling::UltraHighResolution,
];

#[test]
fn test_pressure_trigger_encodes_mode() {
    let expected_commands = [0x34, 0x74, 0xB4, 0xF4];

    for (mode, command) in MODES.into_iter().zip(expected_commands) {
        let (mut sensor, interface, _delay) = create_mock_sensor(mode);

        sensor.read_raw_pressure().unwrap();

        assert_eq!(interface.writes_to(CONTROL), vec![command], "{mode:?}");
    }
}

#[test]
fn test_settle_time_per_mode() {
    let expected_waits = [5, 8, 14, 26];

    for (mode, wait) in MODES.into_iter().zip(expected_waits) {
        let (mut sensor, _interface, delay) = create_mock_sensor(mode);

        sensor.read_raw_pressure().unwrap();

        assert_eq!(delay.waits_ms(), vec![wait], "{mode:?}");
    }
}

#[test]
fn test_raw_pressure_shift_per_mode() {
    // Output registers hold 0x5D2300 in every mode
    let expected_raw = [23843, 47686, 95372, 190744];

    for (mode, raw) in MODES.into_iter().zip(expected_raw) {
        let (mut sensor, interface, _delay) = create_mock_sensor(mode);

        assert_eq!(sensor.read_raw_pressure().unwrap(), raw, "{mode:?}");
        assert_eq!(interface.get_register(0xF6), 0x5D);
        assert_eq!(interface.get_register(0xF7), 0x23);
        assert_eq!(interface.get_register(0xF8), 0x00);
    }
}

#[test]
fn test_valid_numeric_modes_are_kept() {
    for (number, mode) in (0..4).zip(MODES) {
        let sensor = Bmp085::with_mode(MockInterface::new(), MockDelay::default(), number)
            .unwrap();
        assert_eq!(sensor.oversampling(), mode);
        assert_eq!(sensor.oversampling().bits(), number as u8);
    }
}

#[test]
fn test_out_of_range_modes_behave_like_default() {
    let (mut reference, reference_interface, reference_delay) =
        create_mock_sensor(Oversampling::default());
    let expected = reference.read_measurement().unwrap();

    for number in [-1, 4, 99, i32::MIN, i32::MAX] {
        let interface = MockInterface::new();
        let delay = MockDelay::default();
        let mut sensor = Bmp085::with_mode(interface.clone(), delay.clone(), number)
            .unwrap();
        interface.clear_operations();

        assert_eq!(sensor.oversampling(), Oversampling::Standard);
        assert_eq!(sensor.read_measurement().unwrap(), expected, "mode {number}");
        assert_eq!(interface.operations(), reference_interface.operations());
        assert_eq!(delay.waits_ms(), reference_delay.waits_ms());
    }
}

#[test]
fn test_mode_accessors() {
    assert_eq!(Oversampling::default(), Oversampling::Standard);
    assert_eq!(Oversampling::from(3), Oversampling::UltraHighResolution);
    assert_eq!(MODES.map(Oversampling::samples), [1, 2, 4, 8]);
    assert_eq!(MODES.map(Oversampling::raw_shift), [8, 7, 6, 5]);
}
