use thiserror::Error;

/// Errors that can occur when talking to a USB GPIO bridge.
///
/// Every failure of the protocol layer surfaces here as a distinct variant;
/// nothing is logged and swallowed. Range errors are raised before any I/O.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from the underlying HID API layer.
    #[error("HID API error: {0}")]
    Hid(#[from] hidapi::HidError),
    /// No enumerated device matches the configured vendor/product ID.
    #[error("Device not found with VID={vid:04X}, PID={pid:04X}")]
    DeviceNotFound {
        /// Vendor ID that was searched for.
        vid: u16,
        /// Product ID that was searched for.
        pid: u16,
    },
    /// No matching device carries the requested serial number.
    #[error("Device not found with serial number '{serial}': {message}")]
    DeviceNotFoundBySerial {
        /// The serial number that was searched for.
        serial: String,
        /// Additional error details.
        message: String,
    },
    /// No device could be opened at the requested path.
    #[error("Device not found at path '{path}': {message}")]
    DeviceNotFoundByPath {
        /// The device path that was searched for.
        path: String,
        /// Additional error details.
        message: String,
    },
    /// No device exists at the requested enumeration index.
    #[error("Device not found at index {index}: {message}")]
    DeviceNotFoundByIndex {
        /// The index that was requested.
        index: usize,
        /// Additional error details.
        message: String,
    },
    /// Writing the output report failed or was incomplete.
    #[error("Device write failed ({written} of {expected} bytes): {message}")]
    DeviceWriteError {
        /// Bytes the HID layer reported as written.
        written: usize,
        /// Size of the report that was submitted.
        expected: usize,
        /// Underlying cause.
        message: String,
    },
    /// Reading the response failed, was short, or the device went away.
    #[error("Device read failed ({received} of {expected} bytes): {message}")]
    DeviceReadError {
        /// Bytes actually received.
        received: usize,
        /// Size of the expected response.
        expected: usize,
        /// Underlying cause.
        message: String,
    },
    /// No response arrived within the read timeout.
    #[error("Timeout waiting for device response after {timeout_ms} ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: i32,
    },
    /// The response did not have the fixed response length or could not hold
    /// the data the command asked for.
    #[error("Malformed response: expected {expected} bytes, got {actual}")]
    MalformedResponse {
        /// Number of bytes required.
        expected: usize,
        /// Number of bytes available.
        actual: usize,
    },
    /// Byte 0 of the response was not the status marker.
    #[error("Unexpected response status 0x{actual:02X} (expected 0x{expected:02X})")]
    UnexpectedStatus {
        /// Status marker the protocol defines.
        expected: u8,
        /// Status byte the device sent.
        actual: u8,
    },
    /// A numbered input report carried a different report ID.
    #[error("Unexpected input report ID 0x{actual:02X} (expected 0x{expected:02X})")]
    UnexpectedReportId {
        /// Report ID configured for the session.
        expected: u8,
        /// Report ID the device sent.
        actual: u8,
    },
    /// Function argument is outside its encodable range.
    #[error("Argument out of range: {0}")]
    ArgumentOutOfRange(String),
    /// GPIO pin number does not fit the field it is encoded into.
    #[error("GPIO pin {pin} out of range (0-{max}): {message}")]
    PinArgumentOutOfRange {
        /// The invalid pin number that was specified.
        pin: u32,
        /// Largest pin number accepted in this context.
        max: u32,
        /// Detailed error message explaining the constraint.
        message: String,
    },
    /// The framed report exceeds the device's maximum output report size.
    #[error("Report too large (max {max} bytes, got {actual})")]
    ReportTooLarge {
        /// Maximum output report size.
        max: usize,
        /// Size of the report that was built.
        actual: usize,
    },
    /// A configuration value could not be parsed.
    #[error("Invalid configuration value for {key}: '{value}'")]
    InvalidConfig {
        /// Name of the setting (environment variable).
        key: String,
        /// The rejected raw value.
        value: String,
    },
}

impl Error {
    /// Transport-level failures a caller may recover from by retrying or
    /// reopening the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. }
                | Error::DeviceWriteError { .. }
                | Error::DeviceReadError { .. }
                | Error::Hid(_)
        )
    }

    /// The device answered, but not in the shape the protocol defines.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedResponse { .. }
                | Error::UnexpectedStatus { .. }
                | Error::UnexpectedReportId { .. }
        )
    }

    /// An argument was rejected before any I/O took place.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            Error::ArgumentOutOfRange(_)
                | Error::PinArgumentOutOfRange { .. }
                | Error::ReportTooLarge { .. }
        )
    }

    /// Any flavour of "no such device".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::DeviceNotFound { .. }
                | Error::DeviceNotFoundBySerial { .. }
                | Error::DeviceNotFoundByPath { .. }
                | Error::DeviceNotFoundByIndex { .. }
        )
    }
}

/// Result type alias for GPIO bridge operations.
pub type Result<T> = std::result::Result<T, Error>;
