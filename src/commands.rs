//! GPIO command set: one method per protocol command.

use crate::codec::{self, Command, Response};
use crate::consts;
use crate::device::Usb2Gpio;
use crate::error::Result;
use crate::gpio::{GpioLevel, GpioMask, GpioPin, PinState, PulseDuration};
use crate::transport::HidChannel;
use log::debug;

/// Outcome of a combined set-and-read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboResult {
    /// Target output states that were applied (bit i = pin i).
    pub set_mask: GpioMask,
    /// Pins that were sampled.
    pub read_mask: GpioMask,
    /// Sampled input states, limited to `read_mask`.
    pub states: GpioMask,
}

impl ComboResult {
    /// Level of `pin`, or `None` if it was not part of the read mask.
    pub fn level(&self, pin: GpioPin) -> Option<GpioLevel> {
        self.read_mask
            .contains(pin)
            .then(|| GpioLevel::from(self.states.contains(pin)))
    }
}

impl<C: HidChannel> Usb2Gpio<C> {
    // Frames, exchanges and status-checks one command.
    fn execute(&mut self, command: Command, payload: &[u8]) -> Result<Response> {
        let report = codec::build_report(command, payload, self.transport.config().report_id())?;
        let response = self.transport.exchange(&report)?;
        response.expect_status(consts::RESP_STATUS)?;
        Ok(response)
    }

    /// Drives `pin` HIGH.
    pub fn gpio_set_high(&mut self, pin: GpioPin) -> Result<()> {
        debug!("Setting pin {} HIGH", pin.number());
        self.execute(Command::SetOne, &codec::encode_set_clear(pin))?;
        Ok(())
    }

    /// Drives `pin` LOW.
    pub fn gpio_set_low(&mut self, pin: GpioPin) -> Result<()> {
        debug!("Setting pin {} LOW", pin.number());
        self.execute(Command::ClearOne, &codec::encode_set_clear(pin))?;
        Ok(())
    }

    pub fn gpio_write(&mut self, pin: GpioPin, level: GpioLevel) -> Result<()> {
        match level {
            GpioLevel::High => self.gpio_set_high(pin),
            GpioLevel::Low => self.gpio_set_low(pin),
        }
    }

    /// Pulses `pin` for `duration`; timing is done by the firmware.
    pub fn gpio_pulse(&mut self, pin: GpioPin, duration: PulseDuration) -> Result<()> {
        debug!(
            "Pulsing pin {} for {} us",
            pin.number(),
            duration.as_micros()
        );
        self.execute(Command::PulseOne, &codec::encode_pulse(pin, duration))?;
        Ok(())
    }

    /// Sets several pins in one report. The device applies them in the
    /// given order.
    pub fn gpio_group_set(&mut self, pairs: &[(GpioPin, GpioLevel)]) -> Result<()> {
        let payload = codec::encode_group_set(pairs)?;
        debug!("Group set of {} pins", pairs.len());
        self.execute(Command::GroupSet, &payload)?;
        Ok(())
    }

    /// Reads the levels of `pins`, returned in the same order.
    pub fn gpio_read_pins(&mut self, pins: &[GpioPin]) -> Result<Vec<PinState>> {
        let payload = codec::encode_read_multi(pins)?;
        let response = self.execute(Command::ReadMulti, &payload)?;
        let states = codec::decode_pin_levels(&response, pins)?;
        debug!("Read pins: {:?}", states);
        Ok(states)
    }

    /// Reads a single pin.
    pub fn gpio_read(&mut self, pin: GpioPin) -> Result<GpioLevel> {
        let states = self.gpio_read_pins(&[pin])?;
        Ok(states[0].level)
    }

    /// Applies `set_mask` as target output states and samples the pins in
    /// `read_mask` in a single exchange.
    pub fn gpio_combo(&mut self, set_mask: GpioMask, read_mask: GpioMask) -> Result<ComboResult> {
        let response = self.execute(Command::Combo, &codec::encode_combo(set_mask, read_mask))?;
        let states = codec::decode_combo(&response, read_mask);
        debug!(
            "Combo set=0x{:08X} read=0x{:08X} -> 0x{:08X}",
            set_mask.bits(),
            read_mask.bits(),
            states.bits()
        );
        Ok(ComboResult {
            set_mask,
            read_mask,
            states,
        })
    }
}
