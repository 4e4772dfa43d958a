//! Phone number canonicalization.
//!
//! The country-code rule below only knows the `91` prefix. It is a narrow
//! heuristic kept for compatibility with existing exports, not a general
//! E.164 normalizer.

/// Country prefix stripped from numbers longer than [`NATIONAL_LEN`] digits.
const COUNTRY_PREFIX: &str = "91";

/// Length of a national number once the country prefix is gone.
const NATIONAL_LEN: usize = 10;

/// Reduces a raw phone number to the digits-only key used to match
/// counterparties.
///
/// 1. Drop every character that is not an ASCII digit.
/// 2. If more than 10 digits remain and they start with `91`, drop that prefix.
/// 3. Drop a single leading `0`.
///
/// Steps 2 and 3 repeat until neither applies, so normalizing a key
/// returns it unchanged. Total over all inputs; empty input gives an
/// empty key.
pub fn normalize_number(raw: &str) -> String {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    // Repeats until stable rather than running once. A single pass leaves
    // "00987" as "0987" and "0091 98765 43210" as "0919876543210", neither
    // of which is a fixed point.
    loop {
        let before = digits.len();

        if digits.len() > NATIONAL_LEN && digits.starts_with(COUNTRY_PREFIX) {
            digits.drain(..COUNTRY_PREFIX.len());
        }

        if digits.starts_with('0') {
            digits.remove(0);
        }

        if digits.len() == before {
            return digits;
        }
    }
}
