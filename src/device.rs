//! Device discovery, session configuration, and handle lifetime.

use crate::consts;
use crate::error::{Error, Result};
use crate::transport::{DeviceDescriptor, HidBackend, HidChannel, Transport, TransportConfig};
use hidapi::HidDevice;
use log::{debug, trace};
use std::time::Duration;

/// Everything needed to locate and talk to one device.
///
/// The defaults target the stock firmware IDs; hobbyist boards vary, so
/// every field can be overridden in code or via [`SessionConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Only open a device with this serial number.
    pub serial_number: Option<String>,
    /// Only open the device at this platform path.
    pub path: Option<String>,
    pub transport: TransportConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            vendor_id: consts::DEFAULT_VID,
            product_id: consts::DEFAULT_PID,
            serial_number: None,
            path: None,
            transport: TransportConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = vendor_id;
        self.product_id = product_id;
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Numbered reports for firmware that declares them; see
    /// [`TransportConfig::with_report_id`].
    pub fn with_report_id(mut self, report_id: u8) -> Self {
        self.transport = self.transport.with_report_id(report_id);
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Defaults overridden by `USB2GPIO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `USB2GPIO_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = lookup(consts::env::VID) {
            config.vendor_id = parse_u16(consts::env::VID, &v)?;
        }
        if let Some(v) = lookup(consts::env::PID) {
            config.product_id = parse_u16(consts::env::PID, &v)?;
        }
        config.serial_number = lookup(consts::env::SERIAL).filter(|s| !s.is_empty());
        config.path = lookup(consts::env::PATH).filter(|s| !s.is_empty());
        if let Some(v) = lookup(consts::env::SETTLE_MS) {
            let ms = parse_number(consts::env::SETTLE_MS, &v)?;
            config.transport.settle_delay = Duration::from_millis(ms);
        }
        if let Some(v) = lookup(consts::env::TIMEOUT_MS) {
            let ms = parse_number(consts::env::TIMEOUT_MS, &v)?;
            config.transport = config
                .transport
                .with_read_timeout_ms(ms)
                .map_err(|_| invalid(consts::env::TIMEOUT_MS, &v))?;
        }
        trace!("Session config: {:?}", config);
        Ok(config)
    }

    fn matches(&self, info: &DeviceDescriptor) -> bool {
        info.vendor_id == self.vendor_id
            && info.product_id == self.product_id
            && self
                .serial_number
                .as_ref()
                .is_none_or(|s| info.serial_number.as_ref() == Some(s))
            && self.path.as_ref().is_none_or(|p| &info.path == p)
    }
}

fn invalid(key: &str, value: &str) -> Error {
    Error::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Accepts `0x`-prefixed hex or plain decimal.
fn parse_number(key: &str, value: &str) -> Result<u64> {
    let v = value.trim();
    let parsed = match v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => v.parse(),
    };
    parsed.map_err(|_| invalid(key, value))
}

fn parse_u16(key: &str, value: &str) -> Result<u16> {
    u16::try_from(parse_number(key, value)?).map_err(|_| invalid(key, value))
}

/// Find devices matching a specific VID and optional PID, in enumeration order.
pub fn find_devices<B: HidBackend>(
    backend: &B,
    vid: u16,
    pid: Option<u16>,
) -> Result<Vec<DeviceDescriptor>> {
    Ok(backend
        .enumerate()?
        .into_iter()
        .filter(|info| info.vendor_id == vid && pid.is_none_or(|p| info.product_id == p))
        .inspect(|info| {
            debug!(
                "Found matching device: VID={:04X}, PID={:04X}, Path={}, SN={:?}",
                info.vendor_id, info.product_id, info.path, info.serial_number
            )
        })
        .collect())
}

/// Find all devices with the default vendor/product IDs.
pub fn find_all<B: HidBackend>(backend: &B) -> Result<Vec<DeviceDescriptor>> {
    find_devices(backend, consts::DEFAULT_VID, Some(consts::DEFAULT_PID))
}

/// A handle to an opened GPIO bridge.
///
/// Owns the device channel exclusively; the channel is closed when the
/// handle is dropped or passed to [`Usb2Gpio::close`]. Every command takes
/// `&mut self`, so exchanges on one handle can never overlap. To share a
/// device between threads, put the handle behind a `Mutex`.
#[derive(Debug)]
pub struct Usb2Gpio<C: HidChannel = HidDevice> {
    pub(crate) transport: Transport<C>,
    info: DeviceDescriptor,
}

impl<C: HidChannel> Usb2Gpio<C> {
    // --- Constructors and Info ---

    /// Enumerate all devices matching the configured IDs.
    pub fn device_enumerate<B>(backend: &B, config: &SessionConfig) -> Result<Vec<DeviceDescriptor>>
    where
        B: HidBackend<Channel = C>,
    {
        find_devices(backend, config.vendor_id, Some(config.product_id))
    }

    /// Opens the first enumerated device matching `config`.
    ///
    /// **Warning:** If several identical devices are attached and neither a
    /// serial number nor a path is configured, the first one in the
    /// backend's enumeration order wins.
    pub fn open<B>(backend: &B, config: &SessionConfig) -> Result<Self>
    where
        B: HidBackend<Channel = C>,
    {
        let info = backend
            .enumerate()?
            .into_iter()
            .find(|info| config.matches(info))
            .ok_or_else(|| not_found(config))?;
        Self::open_descriptor(backend, &info, config)
    }

    /// Opens the first device with the default IDs and settings.
    pub fn open_first<B>(backend: &B) -> Result<Self>
    where
        B: HidBackend<Channel = C>,
    {
        Self::open(backend, &SessionConfig::default())
    }

    /// Opens the matching device with the given serial number.
    pub fn open_by_serial<B>(backend: &B, config: &SessionConfig, serial: &str) -> Result<Self>
    where
        B: HidBackend<Channel = C>,
    {
        let devices = Self::device_enumerate(backend, config)?;
        match devices
            .iter()
            .find(|d| d.serial_number.as_deref() == Some(serial))
        {
            Some(info) => Self::open_descriptor(backend, info, config),
            None => Err(Error::DeviceNotFoundBySerial {
                serial: serial.to_string(),
                message: "No GPIO bridge found with this serial number".to_string(),
            }),
        }
    }

    /// Opens the device at a platform-specific path, whatever its IDs.
    pub fn open_by_path<B>(backend: &B, config: &SessionConfig, path: &str) -> Result<Self>
    where
        B: HidBackend<Channel = C>,
    {
        let info = backend
            .enumerate()?
            .into_iter()
            .find(|d| d.path == path)
            .ok_or_else(|| Error::DeviceNotFoundByPath {
                path: path.to_string(),
                message: "No HID device enumerated at this path".to_string(),
            })?;
        Self::open_descriptor(backend, &info, config)
    }

    /// Opens a device by its 0-based index in [`Usb2Gpio::device_enumerate`] order.
    pub fn open_by_index<B>(backend: &B, config: &SessionConfig, index: usize) -> Result<Self>
    where
        B: HidBackend<Channel = C>,
    {
        let devices = Self::device_enumerate(backend, config)?;
        match devices.get(index) {
            Some(info) => Self::open_descriptor(backend, info, config),
            None => Err(Error::DeviceNotFoundByIndex {
                index,
                message: format!("Index out of range (found {} devices)", devices.len()),
            }),
        }
    }

    fn open_descriptor<B>(backend: &B, info: &DeviceDescriptor, config: &SessionConfig) -> Result<Self>
    where
        B: HidBackend<Channel = C>,
    {
        let channel = backend.open(info)?;
        debug!(
            "Opened GPIO bridge: VID={:04X}, PID={:04X}, Path={}",
            info.vendor_id, info.product_id, info.path
        );
        Ok(Self::from_channel(channel, info.clone(), config))
    }

    /// Wraps an already opened channel. This is the core method the other
    /// constructors use.
    pub fn from_channel(channel: C, info: DeviceDescriptor, config: &SessionConfig) -> Self {
        Self {
            transport: Transport::new(channel, config.transport.clone()),
            info,
        }
    }

    /// Gets the enumeration info of the opened device.
    pub fn get_device_info(&self) -> &DeviceDescriptor {
        &self.info
    }

    pub fn transport_config(&self) -> &TransportConfig {
        self.transport.config()
    }

    pub fn set_transport_config(&mut self, config: TransportConfig) {
        self.transport.set_config(config);
    }

    /// Releases the device. Dropping the handle has the same effect.
    pub fn close(self) {
        debug!("Closing GPIO bridge at {}", self.info.path);
    }
}

fn not_found(config: &SessionConfig) -> Error {
    match (&config.serial_number, &config.path) {
        (Some(serial), _) => Error::DeviceNotFoundBySerial {
            serial: serial.clone(),
            message: format!(
                "No device with VID={:04X}, PID={:04X} has this serial number",
                config.vendor_id, config.product_id
            ),
        },
        (None, Some(path)) => Error::DeviceNotFoundByPath {
            path: path.clone(),
            message: format!(
                "No device with VID={:04X}, PID={:04X} at this path",
                config.vendor_id, config.product_id
            ),
        },
        (None, None) => Error::DeviceNotFound {
            vid: config.vendor_id,
            pid: config.product_id,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.vendor_id, 0x239A);
        assert_eq!(config.product_id, 0x8029);
        assert!(config.serial_number.is_none());
        assert!(config.transport.report_id().is_none());
        assert_eq!(
            SessionConfig::default()
                .with_report_id(5)
                .transport
                .report_id(),
            Some(5)
        );
    }

    #[test]
    fn test_config_from_lookup() {
        let config = SessionConfig::from_lookup(lookup(&[
            ("USB2GPIO_VID", "0x1234"),
            ("USB2GPIO_PID", "22136"),
            ("USB2GPIO_SERIAL", "ABC"),
            ("USB2GPIO_SETTLE_MS", "0"),
            ("USB2GPIO_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.vendor_id, 0x1234);
        assert_eq!(config.product_id, 0x5678);
        assert_eq!(config.serial_number.as_deref(), Some("ABC"));
        assert!(config.path.is_none());
        assert_eq!(config.transport.settle_delay, Duration::ZERO);
        assert_eq!(config.transport.read_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        for (key, value) in [
            ("USB2GPIO_VID", "0x10000"),
            ("USB2GPIO_PID", "zzz"),
            ("USB2GPIO_TIMEOUT_MS", "99999999999"),
            ("USB2GPIO_TIMEOUT_MS", "0"),
            ("USB2GPIO_TIMEOUT_MS", "-1"),
        ] {
            match SessionConfig::from_lookup(lookup(&[(key, value)])) {
                Err(Error::InvalidConfig { key: k, value: v }) => {
                    assert_eq!(k, key);
                    assert_eq!(v, value);
                }
                other => panic!("Expected InvalidConfig for {}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_config_matching() {
        let info = DeviceDescriptor {
            vendor_id: 0x239A,
            product_id: 0x8029,
            path: "/dev/hidraw3".to_string(),
            serial_number: Some("S1".to_string()),
            product_string: None,
            interface_number: 0,
        };
        assert!(SessionConfig::default().matches(&info));
        assert!(SessionConfig::default().with_serial("S1").matches(&info));
        assert!(!SessionConfig::default().with_serial("S2").matches(&info));
        assert!(SessionConfig::default()
            .with_path("/dev/hidraw3")
            .matches(&info));
        assert!(!SessionConfig::default().with_ids(0x239A, 1).matches(&info));
    }
}
