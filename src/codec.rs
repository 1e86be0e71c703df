//! Positional base conversion over the packer's 64-symbol alphabet.
//!
//! SnapInsta's packed payloads encode one character per segment as a
//! base-N numeral; decoding needs a digit-string conversion that never
//! fails, whatever bytes the resolver sends back.

/// Digit alphabet shared by every base in `[2, 64]`: a base selects a
/// prefix of this sequence.
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+/";

fn digit_value(c: char, base: usize) -> Option<u32> {
    ALPHABET[..base]
        .iter()
        .position(|&b| b as char == c)
        .map(|i| i as u32)
}

/// Re-express `input` (a big-endian numeral in `source_base`) as a
/// numeral in `target_base`.
///
/// Characters outside the `source_base` prefix of the alphabet are
/// skipped. The conversion works on a digit vector rather than a native
/// integer, so arbitrarily long input cannot overflow. A zero value
/// (including empty input) yields `"0"`.
pub fn convert_base(input: &str, source_base: u32, target_base: u32) -> String {
    let source_base = source_base.clamp(2, 64);
    let target_base = target_base.clamp(2, 64) as u64;

    // Little-endian digits of the running value, in target base.
    let mut digits: Vec<u64> = Vec::new();

    for c in input.chars() {
        let d = match digit_value(c, source_base as usize) {
            Some(d) => d as u64,
            None => continue,
        };

        // digits = digits * source_base + d
        let mut carry = d;
        for slot in digits.iter_mut() {
            let v = *slot * source_base as u64 + carry;
            *slot = v % target_base;
            carry = v / target_base;
        }
        while carry > 0 {
            digits.push(carry % target_base);
            carry /= target_base;
        }
    }

    if digits.is_empty() {
        return (ALPHABET[0] as char).to_string();
    }

    digits
        .iter()
        .rev()
        .map(|&d| ALPHABET[d as usize] as char)
        .collect()
}
