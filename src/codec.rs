//! Wire codec: pure translation between typed command arguments and report
//! bytes, and between raw response buffers and typed results.
//!
//! Nothing in here performs I/O, so every byte layout can be checked without
//! a device attached. All multi-byte fields are little-endian.

use crate::consts::{self, opcode};
use crate::error::{Error, Result};
use crate::gpio::{GpioLevel, GpioMask, GpioPin, PinState, PulseDuration};
use log::trace;

/// The fixed set of commands understood by the device firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Drive one pin HIGH (0x10).
    SetOne,
    /// Drive one pin LOW (0x11).
    ClearOne,
    /// Drive several pins to individual levels in one report (0x20).
    GroupSet,
    /// Read the levels of a list of pins (0x21).
    ReadMulti,
    /// Apply a set mask, then read the pins in a read mask (0x22).
    Combo,
    /// Drive one pin HIGH for a number of microseconds, then LOW (0x30).
    PulseOne,
}

impl Command {
    /// Opcode byte that leads every report of this command.
    pub fn opcode(self) -> u8 {
        match self {
            Command::SetOne => opcode::SET_ONE,
            Command::ClearOne => opcode::CLR_ONE,
            Command::GroupSet => opcode::GROUP_SET,
            Command::ReadMulti => opcode::READ_MULTI,
            Command::Combo => opcode::COMBO,
            Command::PulseOne => opcode::PULSE_ONE,
        }
    }

    pub fn from_opcode(byte: u8) -> Option<Self> {
        match byte {
            opcode::SET_ONE => Some(Command::SetOne),
            opcode::CLR_ONE => Some(Command::ClearOne),
            opcode::GROUP_SET => Some(Command::GroupSet),
            opcode::READ_MULTI => Some(Command::ReadMulti),
            opcode::COMBO => Some(Command::Combo),
            opcode::PULSE_ONE => Some(Command::PulseOne),
            _ => None,
        }
    }
}

// --- Payload encoders ---

/// SET_ONE / CLR_ONE payload: `[pin]`.
pub fn encode_set_clear(pin: GpioPin) -> Vec<u8> {
    vec![pin.number()]
}

/// PULSE_ONE payload: `[pin][duration_us:4]`.
pub fn encode_pulse(pin: GpioPin, duration: PulseDuration) -> Vec<u8> {
    let mut buf = Vec::with_capacity(5);
    buf.push(pin.number());
    buf.extend_from_slice(&duration.as_micros().to_le_bytes());
    buf
}

/// GROUP_SET payload: `[count]([pin][value])*count`, in the caller's order.
pub fn encode_group_set(pairs: &[(GpioPin, GpioLevel)]) -> Result<Vec<u8>> {
    let count = count_byte(pairs.len(), "GROUP_SET pair")?;
    let mut buf = Vec::with_capacity(1 + 2 * pairs.len());
    buf.push(count);
    for (pin, level) in pairs {
        buf.push(pin.number());
        buf.push(level.to_wire());
    }
    Ok(buf)
}

/// READ_MULTI payload: `[count][pin]*count`, in the caller's order.
pub fn encode_read_multi(pins: &[GpioPin]) -> Result<Vec<u8>> {
    let count = count_byte(pins.len(), "READ_MULTI pin")?;
    let mut buf = Vec::with_capacity(1 + pins.len());
    buf.push(count);
    buf.extend(pins.iter().map(GpioPin::number));
    Ok(buf)
}

/// COMBO payload: `[set_mask:4][read_mask:4]`.
pub fn encode_combo(set_mask: GpioMask, read_mask: GpioMask) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8);
    buf.extend_from_slice(&set_mask.bits().to_le_bytes());
    buf.extend_from_slice(&read_mask.bits().to_le_bytes());
    buf
}

fn count_byte(len: usize, what: &str) -> Result<u8> {
    u8::try_from(len).map_err(|_| {
        Error::ArgumentOutOfRange(format!(
            "{} count {} exceeds the one-byte limit (255)",
            what, len
        ))
    })
}

/// Frames a payload into a complete output report: optional report ID, the
/// command opcode, then the payload. Fails if the result would not fit in a
/// single output report.
pub fn build_report(command: Command, payload: &[u8], report_id: Option<u8>) -> Result<Vec<u8>> {
    let len = usize::from(report_id.is_some()) + 1 + payload.len();
    if len > consts::MAX_OUTPUT_REPORT_SIZE {
        return Err(Error::ReportTooLarge {
            max: consts::MAX_OUTPUT_REPORT_SIZE,
            actual: len,
        });
    }
    let mut report = Vec::with_capacity(len);
    report.extend(report_id);
    report.push(command.opcode());
    report.extend_from_slice(payload);
    trace!("Built {:?} report: {:02X?}", command, report);
    Ok(report)
}

// --- Response decoding ---

/// A complete 64-byte response from the device.
///
/// Byte 0 is the status marker; the remaining bytes are command-specific and
/// interpreted by the decoders below.
#[derive(Clone, PartialEq, Eq)]
pub struct Response {
    raw: [u8; consts::RESPONSE_SIZE],
}

impl Response {
    #[inline]
    pub fn status(&self) -> u8 {
        self.raw[0]
    }

    /// Bytes following the status byte.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.raw[1..]
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Fails with `UnexpectedStatus` unless byte 0 equals `expected`.
    pub fn expect_status(&self, expected: u8) -> Result<()> {
        if self.status() == expected {
            Ok(())
        } else {
            Err(Error::UnexpectedStatus {
                expected,
                actual: self.status(),
            })
        }
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &format_args!("0x{:02X}", self.status()))
            .field("payload", &format_args!("{:02X?}", self.payload()))
            .finish()
    }
}

/// Validates that `raw` is exactly one response long and wraps it.
pub fn decode_response(raw: &[u8]) -> Result<Response> {
    let raw: [u8; consts::RESPONSE_SIZE] =
        raw.try_into().map_err(|_| Error::MalformedResponse {
            expected: consts::RESPONSE_SIZE,
            actual: raw.len(),
        })?;
    Ok(Response { raw })
}

/// READ_MULTI reply: payload byte i holds the level of `pins[i]`.
pub fn decode_pin_levels(response: &Response, pins: &[GpioPin]) -> Result<Vec<PinState>> {
    let payload = response.payload();
    if pins.len() > payload.len() {
        return Err(Error::MalformedResponse {
            expected: 1 + pins.len(),
            actual: consts::RESPONSE_SIZE,
        });
    }
    Ok(pins
        .iter()
        .zip(payload)
        .map(|(&pin, &byte)| PinState {
            pin,
            level: GpioLevel::from_wire(byte),
        })
        .collect())
}

/// COMBO reply: payload bytes 0..4 carry the input state mask; only bits
/// requested in `read_mask` are kept.
pub fn decode_combo(response: &Response, read_mask: GpioMask) -> GpioMask {
    let p = response.payload();
    let states = u32::from_le_bytes([p[0], p[1], p[2], p[3]]);
    GpioMask::from(states) & read_mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(status: u8, payload: &[u8]) -> Response {
        let mut raw = [0u8; consts::RESPONSE_SIZE];
        raw[0] = status;
        raw[1..1 + payload.len()].copy_from_slice(payload);
        decode_response(&raw).unwrap()
    }

    #[test]
    fn test_opcodes() {
        for cmd in [
            Command::SetOne,
            Command::ClearOne,
            Command::GroupSet,
            Command::ReadMulti,
            Command::Combo,
            Command::PulseOne,
        ] {
            assert_eq!(Command::from_opcode(cmd.opcode()), Some(cmd));
        }
        assert_eq!(Command::SetOne.opcode(), 0x10);
        assert_eq!(Command::PulseOne.opcode(), 0x30);
        assert_eq!(Command::from_opcode(0xA1), None);
    }

    #[test]
    fn test_encode_pulse_known_value() {
        let payload = encode_pulse(GpioPin::from(13), PulseDuration::from(500));
        assert_eq!(payload, vec![13, 0xF4, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_encode_combo_known_value() {
        let payload = encode_combo(GpioMask::from(0x20), GpioMask::from(0x30));
        assert_eq!(payload, vec![0x20, 0, 0, 0, 0x30, 0, 0, 0]);
    }

    #[test]
    fn test_encode_group_set_order() {
        let pairs = [
            (GpioPin::from(6), GpioLevel::Low),
            (GpioPin::from(5), GpioLevel::High),
        ];
        assert_eq!(encode_group_set(&pairs).unwrap(), vec![2, 6, 0, 5, 1]);
        assert_eq!(encode_group_set(&[]).unwrap(), vec![0]);
    }

    #[test]
    fn test_encode_count_overflow() {
        let pins = vec![GpioPin::from(1); 256];
        assert!(encode_read_multi(&pins).unwrap_err().is_range_error());
        let pairs = vec![(GpioPin::from(1), GpioLevel::High); 256];
        assert!(encode_group_set(&pairs).unwrap_err().is_range_error());
    }

    #[test]
    fn test_build_report() {
        let report = build_report(Command::SetOne, &[13], None).unwrap();
        assert_eq!(report, vec![0x10, 13]);
        let report = build_report(Command::SetOne, &[13], Some(0)).unwrap();
        assert_eq!(report, vec![0x00, 0x10, 13]);

        assert!(build_report(Command::ReadMulti, &[0u8; 63], None).is_ok());
        match build_report(Command::ReadMulti, &[0u8; 63], Some(0)) {
            Err(Error::ReportTooLarge { max, actual }) => {
                assert_eq!(max, 64);
                assert_eq!(actual, 65);
            }
            other => panic!("Expected ReportTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_response_length() {
        assert!(decode_response(&[0xA1; 64]).is_ok());
        for len in [0usize, 1, 63, 65, 128] {
            match decode_response(&vec![0xA1; len]) {
                Err(Error::MalformedResponse { expected, actual }) => {
                    assert_eq!(expected, 64);
                    assert_eq!(actual, len);
                }
                other => panic!("Expected MalformedResponse for {}, got {:?}", len, other),
            }
        }
    }

    #[test]
    fn test_response_status() {
        let ok = response_with(0xA1, &[]);
        assert_eq!(ok.status(), 0xA1);
        assert_eq!(ok.payload().len(), 63);
        assert!(ok.expect_status(0xA1).is_ok());

        let bad = response_with(0x00, &[]);
        assert!(bad.expect_status(0xA1).unwrap_err().is_protocol_error());
    }

    #[test]
    fn test_decode_pin_levels() {
        let response = response_with(0xA1, &[1, 0, 1]);
        let pins = [GpioPin::from(5), GpioPin::from(6), GpioPin::from(13)];
        let states = decode_pin_levels(&response, &pins).unwrap();
        assert_eq!(states.len(), 3);
        assert_eq!(states[0].pin.number(), 5);
        assert!(states[0].is_high());
        assert_eq!(states[1].level, GpioLevel::Low);
        assert!(states[2].is_high());

        let too_many = vec![GpioPin::from(0); 64];
        assert!(decode_pin_levels(&response, &too_many)
            .unwrap_err()
            .is_protocol_error());
    }

    #[test]
    fn test_decode_combo_masks_unrequested_bits() {
        let response = response_with(0xA1, &[0xFF, 0x00, 0x00, 0x80]);
        let states = decode_combo(&response, GpioMask::from(0x30));
        assert_eq!(states.bits(), 0x30);
        let states = decode_combo(&response, GpioMask::from(0x8000_0100));
        assert_eq!(states.bits(), 0x8000_0000);
    }
}
