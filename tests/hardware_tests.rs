// tests/hardware_tests.rs
use hidapi::HidApi;
use std::{thread, time::Duration};
use usb2gpio_hid::{
    GpioLevel, GpioMask, GpioPin, PulseDuration, Result, SessionConfig, Usb2Gpio,
};

// Pins used for loopback tests: wire TEST_OUT_PIN to TEST_IN_PIN. CHANGE THESE to match your board.
const TEST_OUT_PIN: u32 = 5;
const TEST_IN_PIN: u32 = 6;

// Helper to open the configured device, panics on failure for test simplicity
fn open_test_device() -> Usb2Gpio {
    let _ = env_logger::builder().is_test(true).try_init();
    let hid_api = HidApi::new().expect("Failed to create HID API");
    let config = SessionConfig::from_env().expect("Invalid USB2GPIO_* environment");
    Usb2Gpio::open(&hid_api, &config)
        .expect("Failed to open GPIO bridge. Is it connected and permissions set?")
}

#[test]
#[ignore] // Ignore by default, requires hardware
fn test_set_clear_pulse() -> Result<()> {
    let mut device = open_test_device();
    let pin = GpioPin::new(13)?;

    device.gpio_set_high(pin)?;
    device.gpio_set_low(pin)?;
    device.gpio_pulse(pin, PulseDuration::from_micros(500)?)?;
    device.close();
    Ok(())
}

#[test]
#[ignore] // Ignore by default, requires hardware and a loopback wire
fn test_loopback_readback() -> Result<()> {
    let mut device = open_test_device();
    let out_pin = GpioPin::new(TEST_OUT_PIN)?;
    let in_pin = GpioPin::new(TEST_IN_PIN)?;

    device.gpio_group_set(&[(out_pin, GpioLevel::High)])?;
    thread::sleep(Duration::from_millis(5)); // Allow state to settle
    assert_eq!(device.gpio_read(in_pin)?, GpioLevel::High, "Input should read HIGH");

    device.gpio_group_set(&[(out_pin, GpioLevel::Low)])?;
    thread::sleep(Duration::from_millis(5));
    assert_eq!(device.gpio_read(in_pin)?, GpioLevel::Low, "Input should read LOW");

    let combo = device.gpio_combo(
        GpioMask::from_pins(&[out_pin])?,
        GpioMask::from_pins(&[in_pin])?,
    )?;
    println!("Combo readback: {:?}", combo);
    Ok(())
}
