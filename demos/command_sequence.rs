//! Runs one of every command against the first configured device and prints
//! the typed results.
//!
//! Override the target with `USB2GPIO_VID`, `USB2GPIO_PID`, `USB2GPIO_SERIAL`
//! and friends; run with `RUST_LOG=debug` to see each exchange.

use hidapi::HidApi;
use usb2gpio_hid::{GpioLevel, GpioMask, GpioPin, PulseDuration, Result, SessionConfig, Usb2Gpio};

const LED_PIN: u32 = 13;

fn main() -> Result<()> {
    env_logger::init();
    let hid_api = HidApi::new()?;
    let config = SessionConfig::from_env()?;

    println!(
        "Opening GPIO bridge {:04X}:{:04X}...",
        config.vendor_id, config.product_id
    );
    let mut device = match Usb2Gpio::open(&hid_api, &config) {
        Ok(dev) => dev,
        Err(e) => {
            eprintln!("Error opening device: {}", e);
            eprintln!("Ensure device is connected and permissions are set (e.g., udev rules on Linux).");
            return Err(e);
        }
    };
    println!("Device opened: {:?}", device.get_device_info());

    let led = GpioPin::new(LED_PIN)?;
    device.gpio_set_high(led)?;
    println!("Set pin {} HIGH", led.number());
    device.gpio_set_low(led)?;
    println!("Set pin {} LOW", led.number());

    let pulse = PulseDuration::from_micros(500)?;
    device.gpio_pulse(led, pulse)?;
    println!("Pulsed pin {} for {} us", led.number(), pulse.as_micros());

    let (p5, p6) = (GpioPin::new(5)?, GpioPin::new(6)?);
    device.gpio_group_set(&[(p5, GpioLevel::High), (p6, GpioLevel::Low)])?;
    println!("Group set: pin 5 HIGH, pin 6 LOW");

    for state in device.gpio_read_pins(&[p5, p6, led])? {
        println!("Pin {} reads {:?}", state.pin.number(), state.level);
    }

    let combo = device.gpio_combo(GpioMask::from(0x20), GpioMask::from(0x30))?;
    for pin in combo.read_mask.pins() {
        println!("Combo: pin {} reads {:?}", pin.number(), combo.level(pin));
    }

    device.close();
    Ok(())
}
