use hidapi::HidApi;
use usb2gpio_hid::{find_devices, Result, SessionConfig, Usb2Gpio};

fn main() -> Result<()> {
    env_logger::init();
    let hid_api = HidApi::new()?;
    let config = SessionConfig::from_env()?;

    let devices = Usb2Gpio::device_enumerate(&hid_api, &config)?;
    if devices.is_empty() {
        println!(
            "No GPIO bridge found with VID={:04X}, PID={:04X}",
            config.vendor_id, config.product_id
        );
        let others = find_devices(&hid_api, config.vendor_id, None)?;
        if !others.is_empty() {
            println!("Devices with the same vendor ID:");
            for info in others {
                println!("  PID={:04X} path={}", info.product_id, info.path);
            }
        }
        return Ok(());
    }

    println!("Found {} device(s):", devices.len());
    for (index, info) in devices.iter().enumerate() {
        println!(
            "  [{}] path={} serial={} product={}",
            index,
            info.path,
            info.serial_number.as_deref().unwrap_or("N/A"),
            info.product_string.as_deref().unwrap_or("N/A")
        );
    }
    println!("Select one with USB2GPIO_SERIAL or USB2GPIO_PATH.");
    Ok(())
}
