//! Internal constants: default IDs, opcodes, and report geometry.

// Default Vendor/Product IDs
/// Default USB vendor ID of the GPIO bridge (Adafruit).
pub const DEFAULT_VID: u16 = 0x239A;
/// Default USB product ID of the GPIO bridge.
pub const DEFAULT_PID: u16 = 0x8029;

// --- Report geometry ---
/// Largest output report the device accepts, including any report-ID prefix.
pub const MAX_OUTPUT_REPORT_SIZE: usize = 64;
/// Every response is exactly this many bytes.
pub const RESPONSE_SIZE: usize = 64;
/// Status marker expected in byte 0 of every response.
pub const RESP_STATUS: u8 = 0xA1;

// --- Timing ---
/// Delay between writing a command and reading its response (milliseconds).
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 10;
/// Upper bound on the blocking read of a response (milliseconds).
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;
/// Safety cap on the number of stale reports discarded before a new command.
pub const MAX_STALE_DRAIN: usize = 16;

// --- Command opcodes ---
pub mod opcode {
    pub const SET_ONE: u8 = 0x10;
    pub const CLR_ONE: u8 = 0x11;
    pub const GROUP_SET: u8 = 0x20;
    pub const READ_MULTI: u8 = 0x21;
    pub const COMBO: u8 = 0x22;
    pub const PULSE_ONE: u8 = 0x30;
}

// --- Configuration environment variables ---
pub mod env {
    pub const VID: &str = "USB2GPIO_VID";
    pub const PID: &str = "USB2GPIO_PID";
    pub const SERIAL: &str = "USB2GPIO_SERIAL";
    pub const PATH: &str = "USB2GPIO_PATH";
    pub const SETTLE_MS: &str = "USB2GPIO_SETTLE_MS";
    pub const TIMEOUT_MS: &str = "USB2GPIO_TIMEOUT_MS";
}
