//! Serial number keys.
//!
//! Serial numbers arrive as free text that may be decimal or hexadecimal and
//! are stored in decimal. Decimal is always tried first, so a string that is
//! valid in both bases (`"10"`, `"00"`) is read as decimal.

use num_bigint::BigInt;

use crate::error::DataError;

/// Parse `text` as a decimal integer, falling back to hexadecimal, and return
/// the canonical decimal form.
pub fn normalize(text: &str) -> Result<String, DataError> {
    parse_radix(text, 10)
        .or_else(|| parse_radix(text, 16))
        .map(|n| n.to_str_radix(10))
        .ok_or_else(|| DataError::invalid_argument(format!("invalid serial number: {text:?}")))
}

fn parse_radix(text: &str, radix: u32) -> Option<BigInt> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    BigInt::parse_bytes(text.as_bytes(), radix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_decimal_is_canonicalized() {
        assert_eq!(normalize("12345").unwrap(), "12345");
        assert_eq!(normalize("007").unwrap(), "7");
        assert_eq!(normalize("-42").unwrap(), "-42");
    }

    #[test]
    fn test_hex_fallback() {
        assert_eq!(normalize("1a3f").unwrap(), "6719");
        assert_eq!(normalize("DEADBEEF").unwrap(), "3735928559");
    }

    #[test]
    fn test_ambiguous_text_is_decimal() {
        assert_eq!(normalize("00").unwrap(), "0");
        assert_eq!(normalize("10").unwrap(), "10");
    }

    #[test]
    fn test_arbitrary_precision() {
        // 20-byte serial, well past u128.
        let hex = "7f3a9c0b1d2e4f5061728394a5b6c7d8e9f0a1b2";
        let expected = BigInt::parse_bytes(hex.as_bytes(), 16).unwrap().to_string();
        assert_eq!(normalize(hex).unwrap(), expected);

        let dec = "340282366920938463463374607431768211457";
        assert_eq!(normalize(dec).unwrap(), dec);
    }

    #[test]
    fn test_invalid_serials() {
        for text in ["", "-", "xyz", "0x1f", "1_000", " 12", "12 ", "1g"] {
            let err = normalize(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{text:?}");
        }
    }
}
