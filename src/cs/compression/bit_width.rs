//! Bit-width helpers used to report compression ratios.
//!
//! A text is costed as if stored in a fixed-width code: every symbol takes
//! `bits_for_alphabet(k)` bits, where `k` is the number of distinct symbols in the text.

use std::collections::HashSet;

/// Number of bits in the binary representation of `n`.
///
/// Zero still needs one bit.
///
/// # Examples
///
/// ```
/// use textcodecs::cs::compression::bit_width::bits_for_magnitude;
///
/// assert_eq!(bits_for_magnitude(0), 1);
/// assert_eq!(bits_for_magnitude(1), 1);
/// assert_eq!(bits_for_magnitude(2), 2);
/// assert_eq!(bits_for_magnitude(255), 8);
/// assert_eq!(bits_for_magnitude(256), 9);
/// ```
pub fn bits_for_magnitude(n: u64) -> u32 {
    (u64::BITS - n.leading_zeros()).max(1)
}

/// Width of a fixed-length code able to tell `count` symbols apart: `⌈log2 count⌉`.
///
/// Alphabets of zero or one symbol are charged one bit per symbol so that a ratio
/// computed from this width never divides by zero.
pub fn bits_for_alphabet(count: usize) -> u32 {
    if count <= 2 {
        1
    } else {
        bits_for_magnitude(count as u64 - 1)
    }
}

/// Bits needed to store `text` in a fixed-width code over its own alphabet.
pub fn fixed_width_bits(text: &str) -> u64 {
    let mut alphabet = HashSet::new();
    let mut len = 0u64;
    for ch in text.chars() {
        alphabet.insert(ch);
        len += 1;
    }
    len * u64::from(bits_for_alphabet(alphabet.len()))
}

/// Ratio of the fixed-width size of `source` to the fixed-width size of `encoded`.
///
/// Returns `0.0` when `encoded` is empty, which no codec in this crate produces.
pub fn compression_ratio(source: &str, encoded: &str) -> f64 {
    let encoded_bits = fixed_width_bits(encoded);
    if encoded_bits == 0 {
        return 0.0;
    }
    fixed_width_bits(source) as f64 / encoded_bits as f64
}
