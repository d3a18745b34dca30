//! # usb2gpio-hid
//!
//! A Rust crate for driving a USB HID GPIO bridge from the host: set and
//! clear single pins, pulse a pin for a firmware-timed duration, set groups
//! of pins in one report, read several pins at once, and combine a set and
//! a read in a single exchange.
//!
//! This crate uses the `hidapi` crate for cross-platform USB HID communication.
//!
//! ## Features
//!
//! *   Device discovery (`find_all`, `find_devices`, `Usb2Gpio::device_enumerate`).
//! *   Flexible device opening (`open`, `open_first`, `open_by_serial`, `open_by_path`, `open_by_index`).
//! *   Configuration in code or from `USB2GPIO_*` environment variables (`SessionConfig`).
//! *   GPIO commands:
//!     *   Single pin set/clear (`gpio_set_high`, `gpio_set_low`, `gpio_write`).
//!     *   Timed pulses in microseconds (`gpio_pulse`).
//!     *   Ordered group set (`gpio_group_set`).
//!     *   Multi-pin read (`gpio_read_pins`, `gpio_read`).
//!     *   Combined mask set and read (`gpio_combo`).
//! *   Strongly-typed, range-checked arguments (`GpioPin`, `PulseDuration`, `GpioMask`).
//! *   Pure wire codec usable without a device (`codec`).
//! *   In-memory backend for tests (`mock`).
//!
//! ## Protocol
//!
//! Every command is one output report: an opcode byte followed by the
//! payload. Multi-byte fields are little-endian.
//!
//! | Opcode | Command      | Payload                       |
//! |--------|--------------|-------------------------------|
//! | `0x10` | `SET_ONE`    | `[pin]`                       |
//! | `0x11` | `CLR_ONE`    | `[pin]`                       |
//! | `0x20` | `GROUP_SET`  | `[count]([pin][value])*count` |
//! | `0x21` | `READ_MULTI` | `[count][pin]*count`          |
//! | `0x22` | `COMBO`      | `[set_mask:4][read_mask:4]`   |
//! | `0x30` | `PULSE_ONE`  | `[pin][duration_us:4]`        |
//!
//! The device answers each command with exactly 64 bytes whose first byte is
//! the status marker `0xA1`. The protocol is half-duplex with no request IDs:
//! a command is never written before the previous reply was read.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use hidapi::HidApi;
//! use usb2gpio_hid::{GpioLevel, GpioMask, GpioPin, PulseDuration, Result, SessionConfig, Usb2Gpio};
//!
//! fn main() -> Result<()> {
//!     let hid_api = HidApi::new()?;
//!     let config = SessionConfig::from_env()?;
//!     let mut device = Usb2Gpio::open(&hid_api, &config)?;
//!
//!     let led = GpioPin::new(13)?;
//!     device.gpio_set_high(led)?;
//!     device.gpio_pulse(led, PulseDuration::from_micros(500)?)?;
//!     device.gpio_group_set(&[(GpioPin::new(5)?, GpioLevel::High), (GpioPin::new(6)?, GpioLevel::Low)])?;
//!
//!     for state in device.gpio_read_pins(&[GpioPin::new(5)?, GpioPin::new(6)?])? {
//!         println!("pin {} = {:?}", state.pin.number(), state.level);
//!     }
//!
//!     let combo = device.gpio_combo(GpioMask::from(0x20), GpioMask::from(0x30))?;
//!     println!("inputs: 0x{:08X}", combo.states.bits());
//!
//!     device.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Working with Multiple Devices / Custom IDs
//!
//! Without a serial number or path in the `SessionConfig`, `open` picks the
//! first matching device in enumeration order, which the OS decides. With
//! several identical boards attached, set `serial_number` (or
//! `USB2GPIO_SERIAL`), or list candidates with `Usb2Gpio::device_enumerate`
//! and open one with `open_by_path` / `open_by_index`.
//!
//! ## Hardware Setup Notes
//!
//! *   **Linux udev Rules:** Grant user permission to the HID device. Create `/etc/udev/rules.d/99-usb2gpio.rules`:
//!     ```udev
//!     SUBSYSTEM=="hidraw", ATTRS{idVendor}=="239a", ATTRS{idProduct}=="8029", MODE="0666", GROUP="plugdev"
//!     ```
//!     Reload: `sudo udevadm control --reload-rules && sudo udevadm trigger`
//! *   **Report IDs:** Some firmware declares numbered reports; set
//!     `SessionConfig::with_report_id` so the ID byte is prepended to each command
//!     and checked on each response.

mod commands;
mod consts;
mod device;
mod error;
pub mod codec;
pub mod gpio;
pub mod mock;
pub mod transport;

pub use codec::{Command, Response};
pub use commands::ComboResult;
pub use device::{find_all, find_devices, SessionConfig, Usb2Gpio};
pub use error::{Error, Result};
pub use gpio::{GpioLevel, GpioMask, GpioPin, PinState, PulseDuration};
pub use transport::{DeviceDescriptor, HidBackend, HidChannel, Transport, TransportConfig};
// Re-export only essential public constants
pub use consts::{DEFAULT_PID, DEFAULT_VID, MAX_OUTPUT_REPORT_SIZE, RESPONSE_SIZE, RESP_STATUS};
