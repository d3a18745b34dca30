//! Property tests for the wire codec.
//!
//! These check the byte layouts for arbitrary inputs without a device.

use proptest::prelude::*;
use usb2gpio_hid::codec::{
    decode_response, encode_combo, encode_group_set, encode_pulse, encode_read_multi,
};
use usb2gpio_hid::{Error, GpioLevel, GpioMask, GpioPin, PulseDuration};

fn level() -> impl Strategy<Value = GpioLevel> {
    any::<bool>().prop_map(GpioLevel::from)
}

proptest! {
    #[test]
    fn pulse_duration_is_little_endian(pin in any::<u8>(), micros in any::<u32>()) {
        let payload = encode_pulse(GpioPin::from(pin), PulseDuration::from(micros));
        prop_assert_eq!(payload.len(), 5);
        prop_assert_eq!(payload[0], pin);
        let decoded = u32::from_le_bytes([payload[1], payload[2], payload[3], payload[4]]);
        prop_assert_eq!(decoded, micros);
    }

    #[test]
    fn combo_masks_are_little_endian(set in any::<u32>(), read in any::<u32>()) {
        let payload = encode_combo(GpioMask::from(set), GpioMask::from(read));
        prop_assert_eq!(payload.len(), 8);
        prop_assert_eq!(u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]), set);
        prop_assert_eq!(u32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]), read);
    }

    #[test]
    fn read_multi_is_count_then_pins(pins in proptest::collection::vec(any::<u8>(), 0..=255)) {
        let pins: Vec<GpioPin> = pins.into_iter().map(GpioPin::from).collect();
        let payload = encode_read_multi(&pins).unwrap();
        prop_assert_eq!(payload.len(), 1 + pins.len());
        prop_assert_eq!(usize::from(payload[0]), pins.len());
        for (byte, pin) in payload[1..].iter().zip(&pins) {
            prop_assert_eq!(*byte, pin.number());
        }
    }

    #[test]
    fn group_set_preserves_order(
        pairs in proptest::collection::vec((any::<u8>(), level()), 0..=255)
    ) {
        let pairs: Vec<(GpioPin, GpioLevel)> =
            pairs.into_iter().map(|(p, l)| (GpioPin::from(p), l)).collect();
        let payload = encode_group_set(&pairs).unwrap();
        prop_assert_eq!(payload.len(), 1 + 2 * pairs.len());
        prop_assert_eq!(usize::from(payload[0]), pairs.len());
        for (chunk, (pin, level)) in payload[1..].chunks(2).zip(&pairs) {
            prop_assert_eq!(chunk[0], pin.number());
            prop_assert_eq!(chunk[1], level.to_wire());
        }
    }

    #[test]
    fn decode_response_requires_exactly_64_bytes(len in 0usize..256) {
        let raw = vec![0xA1u8; len];
        match decode_response(&raw) {
            Ok(response) => {
                prop_assert_eq!(len, 64);
                prop_assert_eq!(response.status(), 0xA1);
            }
            Err(Error::MalformedResponse { expected, actual }) => {
                prop_assert_ne!(len, 64);
                prop_assert_eq!(expected, 64);
                prop_assert_eq!(actual, len);
            }
            Err(e) => prop_assert!(false, "unexpected error {:?}", e),
        }
    }

    #[test]
    fn pin_constructor_rejects_wide_values(n in any::<u32>()) {
        let result = GpioPin::new(n);
        prop_assert_eq!(result.is_ok(), n <= 255);
    }
}
