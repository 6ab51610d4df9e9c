//! Two-digit modular checksum carried after the hex payload
//!
//! The checksum is computed over the lowercase hex text of the payload:
//! `98 - (sum of the hex digit byte values mod 97)`, rendered as two decimal
//! digits. A valid checksum lies in `01..=98`; `00` is reserved as the
//! sentinel a sender emits when it could not compute one.

use core::fmt;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// A checksum as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checksum {
    /// A computed checksum in `1..=98`
    Valid(u8),
    /// The `00` sentinel: integrity unavailable or failed
    Unavailable,
}

impl Checksum {
    /// Wire form of the sentinel
    pub const SENTINEL: [u8; 2] = *b"00";

    /// Numeric value, 0 for the sentinel
    pub fn value(&self) -> u8 {
        match self {
            Checksum::Valid(value) => *value,
            Checksum::Unavailable => 0,
        }
    }

    /// Render as two zero-padded decimal digits
    pub fn to_digits(&self) -> [u8; 2] {
        let value = self.value();
        [b'0' + value / 10, b'0' + value % 10]
    }

    /// Parse two decimal digits
    ///
    /// Returns `None` for anything but two ASCII digits or for values above 98.
    pub fn from_digits(digits: &[u8]) -> Option<Self> {
        let [tens, units] = digits else {
            return None;
        };
        if !tens.is_ascii_digit() || !units.is_ascii_digit() {
            return None;
        }
        match (tens - b'0') * 10 + (units - b'0') {
            0 => Some(Checksum::Unavailable),
            value @ 1..=98 => Some(Checksum::Valid(value)),
            _ => None,
        }
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.value())
    }
}

/// Checksum over a plaintext payload, as it will be hex encoded on the wire
pub fn compute(payload: &[u8]) -> Checksum {
    let sum: u32 = payload
        .iter()
        .map(|&byte| {
            u32::from(HEX_DIGITS[usize::from(byte >> 4)])
                + u32::from(HEX_DIGITS[usize::from(byte & 0x0F)])
        })
        .sum();
    from_sum(sum)
}

/// Recompute over `payload` and compare with `claimed`
///
/// A claimed sentinel always fails: the sender already flagged the payload.
pub fn verify(payload: &[u8], claimed: Checksum) -> bool {
    match claimed {
        Checksum::Unavailable => false,
        Checksum::Valid(_) => compute(payload) == claimed,
    }
}

fn from_sum(sum: u32) -> Checksum {
    let value = 98 - (sum % 97);
    if !(1..=98).contains(&value) {
        log::warn!("checksum out of range: {}", value);
        return Checksum::Unavailable;
    }
    Checksum::Valid(value as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_value() {
        // "A" -> hex "41" -> 0x34 + 0x31 = 101 -> 98 - (101 % 97) = 94
        assert_eq!(compute(b"A"), Checksum::Valid(94));
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(compute(b""), Checksum::Valid(98));
    }

    #[test]
    fn test_compute_matches_hex_form() {
        let payload = b"PA:test 000";
        let mut hex_buf = [0u8; 22];
        hex::encode_to_slice(payload, &mut hex_buf).unwrap();

        let sum: u32 = hex_buf.iter().map(|&byte| u32::from(byte)).sum();
        assert_eq!(compute(payload), Checksum::Valid((98 - sum % 97) as u8));
    }

    #[test]
    fn test_verify_accepts_own_checksum() {
        for text in ["", "x", "PD:test 0", "{\"id\":\"000\",\"bat\":\"5.66\"}", "~~~~"] {
            let checksum = compute(text.as_bytes());
            assert!(verify(text.as_bytes(), checksum), "failed for {:?}", text);
        }
    }

    #[test]
    fn test_compute_never_sentinel() {
        for byte in 0u8..=255 {
            let payload = [byte, byte.wrapping_mul(7), b' '];
            assert_ne!(compute(&payload), Checksum::Unavailable);
        }
    }

    #[test]
    fn test_verify_rejects_sentinel() {
        assert!(!verify(b"anything", Checksum::Unavailable));
    }

    #[test]
    fn test_verify_rejects_mismatch() {
        let checksum = compute(b"hello");
        assert!(!verify(b"hellp", checksum));
    }

    #[test]
    fn test_digits() {
        assert_eq!(Checksum::Valid(7).to_digits(), *b"07");
        assert_eq!(Checksum::Valid(98).to_digits(), *b"98");
        assert_eq!(Checksum::Unavailable.to_digits(), Checksum::SENTINEL);

        assert_eq!(Checksum::from_digits(b"07"), Some(Checksum::Valid(7)));
        assert_eq!(Checksum::from_digits(b"00"), Some(Checksum::Unavailable));
        assert_eq!(Checksum::from_digits(b"99"), None);
        assert_eq!(Checksum::from_digits(b"4a"), None);
        assert_eq!(Checksum::from_digits(b"4"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Checksum::Valid(5).to_string(), "05");
        assert_eq!(Checksum::Unavailable.to_string(), "00");
    }
}
