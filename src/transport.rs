//! HID collaborator traits and the request/response exchange.
//!
//! [`HidBackend`] and [`HidChannel`] are the only things the protocol layer
//! needs from the host's HID subsystem. They are implemented for `hidapi`
//! here and for an in-memory device in [`crate::mock`].

use crate::codec::{self, Response};
use crate::consts;
use crate::error::{Error, Result};
use hidapi::{HidApi, HidDevice};
use log::{debug, trace, warn};
use std::ffi::CString;
use std::thread;
use std::time::Duration;

/// A HID device as reported by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub vendor_id: u16,
    pub product_id: u16,
    /// The unique, platform-specific path to the HID device. Use this for reliable opening.
    pub path: String,
    pub serial_number: Option<String>,
    pub product_string: Option<String>,
    pub interface_number: i32,
}

/// Device discovery and opening, as provided by the host HID subsystem.
pub trait HidBackend {
    type Channel: HidChannel;

    /// Lists every HID device currently known to the backend, in enumeration order.
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>>;

    /// Opens the device described by `descriptor`. Closing is done by dropping the channel.
    fn open(&self, descriptor: &DeviceDescriptor) -> Result<Self::Channel>;
}

/// An open channel to one HID device.
pub trait HidChannel {
    /// Writes one output report, returning the number of bytes accepted.
    fn write(&mut self, report: &[u8]) -> Result<usize>;

    /// Reads one input report into `buf`, waiting at most `timeout_ms`
    /// (0 = poll, -1 = block). Returns 0 if nothing arrived in time.
    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize>;
}

impl HidBackend for HidApi {
    type Channel = HidDevice;

    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>> {
        // hid_api.refresh_devices() needs &mut; callers refresh before enumerating if needed
        Ok(self
            .device_list()
            .map(|info| DeviceDescriptor {
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                path: info.path().to_string_lossy().into_owned(),
                serial_number: info.serial_number().map(String::from),
                product_string: info.product_string().map(String::from),
                interface_number: info.interface_number(),
            })
            .collect())
    }

    fn open(&self, descriptor: &DeviceDescriptor) -> Result<HidDevice> {
        let path =
            CString::new(descriptor.path.as_str()).map_err(|e| Error::DeviceNotFoundByPath {
                path: descriptor.path.clone(),
                message: format!("Invalid device path: {}", e),
            })?;
        Ok(self.open_path(&path)?)
    }
}

impl HidChannel for HidDevice {
    fn write(&mut self, report: &[u8]) -> Result<usize> {
        Ok(HidDevice::write(self, report)?)
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize> {
        Ok(HidDevice::read_timeout(self, buf, timeout_ms)?)
    }
}

/// Timing and framing applied to every exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Pause between the write and the read, giving the firmware time to act.
    pub settle_delay: Duration,
    // Always at least 1 ms and at most i32::MAX ms; see `with_read_timeout`.
    read_timeout: Duration,
    report_id: Option<u8>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(consts::DEFAULT_SETTLE_DELAY_MS),
            read_timeout: Duration::from_millis(consts::DEFAULT_READ_TIMEOUT_MS),
            report_id: None,
        }
    }
}

impl TransportConfig {
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the upper bound on waiting for a response. The read must stay
    /// bounded, so anything below 1 ms or above `i32::MAX` ms is rejected.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Result<Self> {
        let ms = timeout.as_millis();
        if ms == 0 || ms > i32::MAX as u128 {
            return Err(Error::ArgumentOutOfRange(format!(
                "Read timeout {:?} out of range (1-{} ms)",
                timeout,
                i32::MAX
            )));
        }
        self.read_timeout = timeout;
        Ok(self)
    }

    pub fn with_read_timeout_ms(self, timeout_ms: u64) -> Result<Self> {
        self.with_read_timeout(Duration::from_millis(timeout_ms))
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Timeout in the form `HidChannel::read_timeout` takes.
    pub fn read_timeout_ms(&self) -> i32 {
        i32::try_from(self.read_timeout.as_millis()).unwrap_or(i32::MAX)
    }

    /// Uses numbered reports: `report_id` leads every output report and is
    /// expected in front of every input report. ID 0 means "unnumbered";
    /// it is sent but hidapi strips it, so replies carry no prefix.
    pub fn with_report_id(mut self, report_id: u8) -> Self {
        self.report_id = Some(report_id);
        self
    }

    pub fn report_id(&self) -> Option<u8> {
        self.report_id
    }

    // Report ID byte that prefixes input reports, if any.
    fn input_report_id(&self) -> Option<u8> {
        self.report_id.filter(|&id| id != 0)
    }
}

/// Performs strictly half-duplex request/response exchanges on one channel.
///
/// The device has no request IDs, so a reply that arrives after its read
/// timed out would otherwise be taken as the answer to the next command.
/// After any exchange whose write succeeded but whose read did not, pending
/// input is drained before the next write.
#[derive(Debug)]
pub struct Transport<C> {
    channel: C,
    config: TransportConfig,
    reply_pending: bool,
}

impl<C: HidChannel> Transport<C> {
    pub fn new(channel: C, config: TransportConfig) -> Self {
        Self {
            channel,
            config,
            reply_pending: false,
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TransportConfig) {
        self.config = config;
    }

    /// True if the last exchange left a reply unaccounted for.
    pub fn reply_pending(&self) -> bool {
        self.reply_pending
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Writes `report`, waits the settle delay, and reads exactly one response.
    /// With a non-zero report ID configured, the reply must start with that
    /// ID and the 64 bytes after it are decoded. Does not retry.
    pub fn exchange(&mut self, report: &[u8]) -> Result<Response> {
        if self.reply_pending {
            self.drain_stale()?;
        }

        trace!("HID OUT ({} bytes): {:02X?}", report.len(), report);
        match self.channel.write(report) {
            Ok(written) if written >= report.len() => {}
            Ok(written) => {
                warn!(
                    "hidapi write returned unexpected length: {} (expected {})",
                    written,
                    report.len()
                );
                return Err(Error::DeviceWriteError {
                    written,
                    expected: report.len(),
                    message: "Incomplete HID write".to_string(),
                });
            }
            Err(e) => {
                return Err(Error::DeviceWriteError {
                    written: 0,
                    expected: report.len(),
                    message: e.to_string(),
                });
            }
        }
        // The device has the command now; its reply is owed until read.
        self.reply_pending = true;

        if !self.config.settle_delay.is_zero() {
            thread::sleep(self.config.settle_delay);
        }

        let report_id = self.config.input_report_id();
        let expected = usize::from(report_id.is_some()) + consts::RESPONSE_SIZE;
        let mut in_buf = [0u8; consts::RESPONSE_SIZE + 1];
        let timeout_ms = self.config.read_timeout_ms();
        let bytes_read = self
            .channel
            .read_timeout(&mut in_buf[..expected], timeout_ms)
            .map_err(|e| Error::DeviceReadError {
                received: 0,
                expected,
                message: e.to_string(),
            })?;
        if bytes_read == 0 {
            return Err(Error::Timeout { timeout_ms });
        }
        self.reply_pending = false;
        trace!(
            "HID IN ({} bytes): {:02X?}",
            bytes_read,
            &in_buf[..bytes_read]
        );
        if bytes_read < expected {
            warn!("Received short HID IN report ({} bytes)", bytes_read);
            return Err(Error::DeviceReadError {
                received: bytes_read,
                expected,
                message: "Short read".to_string(),
            });
        }
        match report_id {
            Some(id) if in_buf[0] != id => Err(Error::UnexpectedReportId {
                expected: id,
                actual: in_buf[0],
            }),
            Some(_) => codec::decode_response(&in_buf[1..expected]),
            None => codec::decode_response(&in_buf[..expected]),
        }
    }

    /// Discards input reports left over from an earlier exchange. The
    /// pending flag is only cleared once a poll comes back empty.
    fn drain_stale(&mut self) -> Result<()> {
        let mut buf = [0u8; consts::RESPONSE_SIZE + 1];
        for _ in 0..consts::MAX_STALE_DRAIN {
            let n = self
                .channel
                .read_timeout(&mut buf, 0)
                .map_err(|e| Error::DeviceReadError {
                    received: 0,
                    expected: consts::RESPONSE_SIZE,
                    message: e.to_string(),
                })?;
            if n == 0 {
                debug!("Transport resynchronised");
                self.reply_pending = false;
                return Ok(());
            }
            warn!("Discarding stale HID IN report: {:02X?}", &buf[..n]);
        }
        Err(Error::DeviceReadError {
            received: 0,
            expected: consts::RESPONSE_SIZE,
            message: format!(
                "Input still pending after discarding {} stale reports",
                consts::MAX_STALE_DRAIN
            ),
        })
    }
}
