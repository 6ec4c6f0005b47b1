//! Property-based tests for UID packing.
//!
//! Run with: cargo test --package wiegate-core --test property_tests

use proptest::prelude::*;
use wiegate_core::constants::MAX_FRAME_BITS;
use wiegate_core::{Bit, Uid};

fn frame_strategy() -> impl Strategy<Value = Vec<Bit>> {
    prop::collection::vec(any::<bool>().prop_map(Bit::from), 1..=MAX_FRAME_BITS)
}

/// Read bit `i` back out of the packed bytes (MSB-first).
fn bit_at(bytes: &[u8], i: usize) -> Bit {
    Bit::from(bytes[i / 8] & (0x80 >> (i % 8)) != 0)
}

proptest! {
    #[test]
    fn packing_produces_ceil_n_over_8_bytes(frame in frame_strategy()) {
        let uid = Uid::from_bits(&frame).unwrap();
        prop_assert_eq!(uid.len(), frame.len().div_ceil(8));
        prop_assert_eq!(uid.bit_count(), frame.len());
    }

    #[test]
    fn packing_is_msb_first_and_left_aligned(frame in frame_strategy()) {
        let uid = Uid::from_bits(&frame).unwrap();
        let bytes = uid.as_bytes();

        for (i, bit) in frame.iter().enumerate() {
            prop_assert_eq!(bit_at(bytes, i), *bit);
        }
        // Padding bits in the trailing partial byte are zero
        for i in frame.len()..bytes.len() * 8 {
            prop_assert_eq!(bit_at(bytes, i), Bit::Zero);
        }
    }

    #[test]
    fn packing_is_deterministic(frame in frame_strategy()) {
        let first = Uid::from_bits(&frame).unwrap();
        let second = Uid::from_bits(&frame).unwrap();
        prop_assert_eq!(first.as_bytes(), second.as_bytes());
        prop_assert_eq!(first.to_hex(), second.to_hex());
    }

    #[test]
    fn hex_form_parses_back_to_same_uid(frame in frame_strategy()) {
        let uid = Uid::from_bits(&frame).unwrap();
        let parsed: Uid = uid.to_hex().parse().unwrap();
        prop_assert_eq!(parsed, uid);
    }
}
