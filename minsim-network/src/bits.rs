// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Bit manipulation used to compute wire and switch indices.
//!
//! Bit positions are counted from the least significant bit.

#[must_use]
pub fn invert_lowest_bit(value: usize) -> usize {
    value ^ 1
}

#[must_use]
pub fn bit_is_set(value: usize, position: usize) -> bool {
    (value >> position) & 1 == 1
}

#[must_use]
pub fn invert_bit(value: usize, position: usize) -> usize {
    value ^ (1 << position)
}

/// Returns a mask with the lowest `num_bits` bits set.
#[must_use]
pub fn low_bits_mask(num_bits: usize) -> usize {
    if num_bits >= usize::BITS as usize {
        usize::MAX
    } else {
        (1 << num_bits) - 1
    }
}

/// Rotate the lowest `bits_used` bits of `value` right by one position.
///
/// Only valid when `value` has no bits set above `bits_used`.
#[must_use]
pub fn circular_right_shift(value: usize, bits_used: usize) -> usize {
    if bits_used == 0 {
        return value;
    }
    let shifted_right = value >> 1;
    let wrapped = (value << (bits_used - 1)) & low_bits_mask(bits_used);
    wrapped | shifted_right
}

/// Rotate the lowest `num_lower_bits` of `value` right by one position,
/// leaving all higher bits untouched.
#[must_use]
pub fn circular_right_shift_preserving_high_bits(value: usize, num_lower_bits: usize) -> usize {
    let mask = low_bits_mask(num_lower_bits);
    let upper_bits = value & !mask;
    let lower_bits = circular_right_shift(value & mask, num_lower_bits);
    upper_bits | lower_bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bits() {
        assert_eq!(invert_lowest_bit(6), 7);
        assert_eq!(invert_lowest_bit(7), 6);
        assert!(bit_is_set(0b100, 2));
        assert!(!bit_is_set(0b100, 1));
        assert_eq!(invert_bit(0b101, 1), 0b111);
        assert_eq!(invert_bit(0b101, 2), 0b001);
    }

    #[test]
    fn masks() {
        assert_eq!(low_bits_mask(0), 0);
        assert_eq!(low_bits_mask(3), 0b111);
        assert_eq!(low_bits_mask(usize::BITS as usize), usize::MAX);
    }

    #[test]
    fn rotate_right() {
        assert_eq!(circular_right_shift(0b001, 3), 0b100);
        assert_eq!(circular_right_shift(0b110, 3), 0b011);
        assert_eq!(circular_right_shift(0b1, 1), 0b1);
        assert_eq!(circular_right_shift(0b101, 0), 0b101);
    }

    #[test]
    fn rotate_keeps_high_bits() {
        assert_eq!(circular_right_shift_preserving_high_bits(0b1_01, 2), 0b1_10);
        assert_eq!(circular_right_shift_preserving_high_bits(0b11_0, 1), 0b11_0);
        assert_eq!(circular_right_shift_preserving_high_bits(0b1001, 4), 0b1100);
    }

    #[test]
    fn rotating_all_bits_is_a_cycle() {
        let bits = 5;
        for value in 0..(1 << bits) {
            let mut rotated = value;
            for _ in 0..bits {
                rotated = circular_right_shift(rotated, bits);
            }
            assert_eq!(rotated, value);
        }
    }
}
