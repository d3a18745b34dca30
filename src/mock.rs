//! In-memory HID backend for exercising the protocol layer without hardware.
//!
//! A [`MockDevice`] models the device side of the half-duplex protocol:
//! replies queued with [`MockDevice::queue_reply`] only become readable once
//! a command has been written, and every write/read is recorded in order.

use crate::consts;
use crate::error::{Error, Result};
use crate::transport::{DeviceDescriptor, HidBackend, HidChannel};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// One call observed on a mock channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Write(Vec<u8>),
    Read { timeout_ms: i32 },
}

#[derive(Debug)]
enum MockReply {
    Report(Vec<u8>),
    Silence,
}

#[derive(Debug, Default)]
struct MockState {
    replies: VecDeque<MockReply>,
    input: VecDeque<Vec<u8>>,
    calls: Vec<MockCall>,
    disconnected: bool,
    write_limit: Option<usize>,
    opened: usize,
    closed: usize,
}

fn disconnected() -> Error {
    Error::Hid(hidapi::HidError::HidApiError {
        message: "device disconnected".to_string(),
    })
}

/// A simulated GPIO bridge. Clones share the same state.
#[derive(Debug, Clone)]
pub struct MockDevice {
    descriptor: DeviceDescriptor,
    state: Arc<Mutex<MockState>>,
}

impl MockDevice {
    pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
        Self {
            descriptor: DeviceDescriptor {
                vendor_id,
                product_id,
                path: path.into(),
                serial_number: None,
                product_string: Some("Mock GPIO bridge".to_string()),
                interface_number: 0,
            },
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.descriptor.serial_number = Some(serial.into());
        self
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// A full 64-byte response carrying the success status and `payload`.
    pub fn ok_response(payload: &[u8]) -> Vec<u8> {
        let mut raw = vec![0u8; consts::RESPONSE_SIZE];
        raw[0] = consts::RESP_STATUS;
        raw[1..1 + payload.len()].copy_from_slice(payload);
        raw
    }

    /// Queues the raw bytes the device will send after the next unanswered write.
    pub fn queue_reply(&self, report: Vec<u8>) {
        self.state().replies.push_back(MockReply::Report(report));
    }

    /// Queues a success response carrying `payload`.
    pub fn queue_ok(&self, payload: &[u8]) {
        self.queue_reply(Self::ok_response(payload));
    }

    /// The next write gets no answer.
    pub fn queue_silence(&self) {
        self.state().replies.push_back(MockReply::Silence);
    }

    /// Makes `report` readable immediately, as if it arrived late.
    pub fn inject_input(&self, report: Vec<u8>) {
        self.state().input.push_back(report);
    }

    /// Caps the number of bytes a write reports as accepted.
    pub fn set_write_limit(&self, limit: Option<usize>) {
        self.state().write_limit = limit;
    }

    /// Every subsequent write/read fails as if the device was unplugged.
    pub fn disconnect(&self) {
        self.state().disconnected = true;
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Write(data) => Some(data.clone()),
                MockCall::Read { .. } => None,
            })
            .collect()
    }

    pub fn open_count(&self) -> usize {
        self.state().opened
    }

    pub fn close_count(&self) -> usize {
        self.state().closed
    }

    /// True while a channel obtained from this device is still alive.
    pub fn is_open(&self) -> bool {
        let state = self.state();
        state.opened > state.closed
    }

    /// Opens a channel to this device directly, bypassing a backend.
    pub fn channel(&self) -> MockChannel {
        self.state().opened += 1;
        MockChannel {
            state: Arc::clone(&self.state),
        }
    }
}

/// Channel handed out by [`MockBackend::open`] or [`MockDevice::channel`].
#[derive(Debug)]
pub struct MockChannel {
    state: Arc<Mutex<MockState>>,
}

impl MockChannel {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HidChannel for MockChannel {
    fn write(&mut self, report: &[u8]) -> Result<usize> {
        let mut state = self.state();
        if state.disconnected {
            return Err(disconnected());
        }
        state.calls.push(MockCall::Write(report.to_vec()));
        if let Some(limit) = state.write_limit {
            return Ok(limit.min(report.len()));
        }
        if let Some(MockReply::Report(reply)) = state.replies.pop_front() {
            state.input.push_back(reply);
        }
        Ok(report.len())
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize> {
        let mut state = self.state();
        if state.disconnected {
            return Err(disconnected());
        }
        state.calls.push(MockCall::Read { timeout_ms });
        match state.input.pop_front() {
            Some(report) => {
                let n = report.len().min(buf.len());
                buf[..n].copy_from_slice(&report[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }
}

impl Drop for MockChannel {
    fn drop(&mut self) {
        self.state().closed += 1;
    }
}

/// A set of mock devices presented through the [`HidBackend`] interface.
#[derive(Debug, Default)]
pub struct MockBackend {
    devices: Vec<MockDevice>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&mut self, device: MockDevice) {
        self.devices.push(device);
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

impl HidBackend for MockBackend {
    type Channel = MockChannel;

    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>> {
        Ok(self.devices.iter().map(|d| d.descriptor.clone()).collect())
    }

    fn open(&self, descriptor: &DeviceDescriptor) -> Result<MockChannel> {
        self.devices
            .iter()
            .find(|d| d.descriptor.path == descriptor.path)
            .map(MockDevice::channel)
            .ok_or_else(|| Error::DeviceNotFoundByPath {
                path: descriptor.path.clone(),
                message: "No mock device at this path".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_only_after_write() {
        let device = MockDevice::new(1, 2, "p");
        device.queue_ok(&[]);
        let mut channel = device.channel();
        let mut buf = [0u8; 64];
        assert_eq!(channel.read_timeout(&mut buf, 0).unwrap(), 0);
        channel.write(&[0x10, 0]).unwrap();
        assert_eq!(channel.read_timeout(&mut buf, 0).unwrap(), 64);
        assert_eq!(buf[0], 0xA1);
    }

    #[test]
    fn test_open_close_counting() {
        let device = MockDevice::new(1, 2, "p");
        let mut backend = MockBackend::new();
        backend.add_device(device.clone());
        assert_eq!(backend.device_count(), 1);

        let channel = backend.open(device.descriptor()).unwrap();
        assert!(device.is_open());
        drop(channel);
        assert!(!device.is_open());
        assert_eq!(device.open_count(), 1);
        assert_eq!(device.close_count(), 1);
    }
}
