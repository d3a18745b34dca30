use crate::error::{Error, Result};
use std::time::Duration;

/// Logic level of a GPIO pin, as driven or as read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpioLevel {
    /// Pin at 0 V.
    Low,
    /// Pin at the supply voltage.
    High,
}

impl GpioLevel {
    /// Wire encoding: 1 for HIGH, 0 for LOW.
    #[inline]
    pub fn to_wire(self) -> u8 {
        match self {
            GpioLevel::Low => 0,
            GpioLevel::High => 1,
        }
    }

    /// Any non-zero byte reads as HIGH.
    #[inline]
    pub fn from_wire(byte: u8) -> Self {
        if byte == 0 {
            GpioLevel::Low
        } else {
            GpioLevel::High
        }
    }
}

impl From<bool> for GpioLevel {
    fn from(high: bool) -> Self {
        if high {
            GpioLevel::High
        } else {
            GpioLevel::Low
        }
    }
}

/// Represents a valid GPIO pin number (0-255).
/// The device firmware decides which of these actually exist.
/// Use `GpioPin::new(num)` to create from a wider integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpioPin(pub(crate) u8);

impl GpioPin {
    /// Largest pin number addressable by a single-byte pin field.
    pub const MAX: u32 = u8::MAX as u32;

    /// Creates a new GpioPin, returning an error if the number does not fit in one byte.
    pub fn new(pin_num: u32) -> Result<Self> {
        u8::try_from(pin_num)
            .map(GpioPin)
            .map_err(|_| Error::PinArgumentOutOfRange {
                pin: pin_num,
                max: Self::MAX,
                message: "Pin number must fit in one byte".to_string(),
            })
    }

    /// Returns the underlying pin number.
    #[inline]
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Returns the bit mask (1 << pin) used by mask-based commands,
    /// or `None` for pins beyond bit 31.
    #[inline]
    pub fn mask(&self) -> Option<u32> {
        1u32.checked_shl(u32::from(self.0))
    }
}

impl From<u8> for GpioPin {
    fn from(pin_num: u8) -> Self {
        GpioPin(pin_num)
    }
}

/// A pin paired with the level it was read at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinState {
    pub pin: GpioPin,
    pub level: GpioLevel,
}

impl PinState {
    #[inline]
    pub fn is_high(&self) -> bool {
        self.level == GpioLevel::High
    }
}

/// Pulse length in microseconds, limited to the 32-bit wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PulseDuration(u32);

impl PulseDuration {
    /// Creates a pulse duration, failing if it exceeds `u32::MAX` microseconds.
    pub fn from_micros(micros: u64) -> Result<Self> {
        u32::try_from(micros).map(PulseDuration).map_err(|_| {
            Error::ArgumentOutOfRange(format!(
                "Pulse duration {} us exceeds the 32-bit limit ({} us)",
                micros,
                u32::MAX
            ))
        })
    }

    /// Converts a `Duration`, truncating sub-microsecond precision.
    pub fn from_duration(duration: Duration) -> Result<Self> {
        let micros = u64::try_from(duration.as_micros()).map_err(|_| {
            Error::ArgumentOutOfRange(format!("Pulse duration {:?} is too large", duration))
        })?;
        Self::from_micros(micros)
    }

    #[inline]
    pub fn as_micros(&self) -> u32 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_micros(u64::from(self.0))
    }
}

impl From<u32> for PulseDuration {
    fn from(micros: u32) -> Self {
        PulseDuration(micros)
    }
}

/// 32-bit pin mask; bit i corresponds to pin i.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GpioMask(u32);

impl GpioMask {
    pub const EMPTY: GpioMask = GpioMask(0);

    /// Creates a mask from a wider integer, failing if any bit above 31 is set.
    pub fn new(bits: u64) -> Result<Self> {
        u32::try_from(bits).map(GpioMask).map_err(|_| {
            Error::ArgumentOutOfRange(format!("Mask 0x{:X} does not fit in 32 bits", bits))
        })
    }

    /// Builds a mask with one bit set per pin. Pins above 31 cannot be
    /// expressed in a mask and are rejected.
    pub fn from_pins(pins: &[GpioPin]) -> Result<Self> {
        pins.iter().try_fold(GpioMask::EMPTY, |acc, pin| {
            let bit = pin.mask().ok_or_else(|| Error::PinArgumentOutOfRange {
                pin: u32::from(pin.number()),
                max: 31,
                message: "Mask-based commands address pins 0-31 only".to_string(),
            })?;
            Ok(GpioMask(acc.0 | bit))
        })
    }

    #[inline]
    pub fn bits(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn contains(&self, pin: GpioPin) -> bool {
        pin.mask().is_some_and(|bit| self.0 & bit != 0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Pins whose bit is set, lowest first.
    pub fn pins(&self) -> impl Iterator<Item = GpioPin> + '_ {
        (0u8..32).filter(move |i| self.0 & (1 << i) != 0).map(GpioPin)
    }
}

impl From<u32> for GpioMask {
    fn from(bits: u32) -> Self {
        GpioMask(bits)
    }
}

impl std::ops::BitOr for GpioMask {
    type Output = GpioMask;

    fn bitor(self, rhs: GpioMask) -> GpioMask {
        GpioMask(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for GpioMask {
    type Output = GpioMask;

    fn bitand(self, rhs: GpioMask) -> GpioMask {
        GpioMask(self.0 & rhs.0)
    }
}
