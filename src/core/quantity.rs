//! Byte quantities as written in resource requests ("2 GB", "500MiB").

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing a byte quantity.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantityError {
    #[error("empty byte quantity")]
    Empty,

    #[error("invalid number in byte quantity `{0}`")]
    InvalidNumber(String),

    #[error("unknown unit `{unit}` in byte quantity `{input}`")]
    UnknownUnit { input: String, unit: String },

    #[error("byte quantity `{0}` must not be negative")]
    Negative(String),

    #[error("byte quantity `{0}` does not fit in 64 bits")]
    TooLarge(String),
}

/// A number of bytes, remembering the text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteSize {
    bytes: u64,
    text: String,
}

impl ByteSize {
    /// Parse a human-readable quantity.
    ///
    /// Decimal units (`kB`, `MB`, `GB`, ...) are powers of 1000, binary units
    /// (`KiB`, `MiB`, `GiB`, ...) powers of 1024. A bare number is bytes.
    pub fn parse(input: &str) -> Result<Self, QuantityError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(QuantityError::Empty);
        }

        let (number, unit) = trimmed.split_at(number_len(trimmed));
        let number = number.trim();
        let unit = unit.trim();

        if number.is_empty() {
            return Err(QuantityError::InvalidNumber(input.to_string()));
        }

        let value: f64 = number
            .parse()
            .map_err(|_| QuantityError::InvalidNumber(input.to_string()))?;
        if !value.is_finite() {
            return Err(QuantityError::InvalidNumber(input.to_string()));
        }
        if value < 0.0 {
            return Err(QuantityError::Negative(input.to_string()));
        }

        let multiplier = unit_multiplier(unit).ok_or_else(|| QuantityError::UnknownUnit {
            input: input.to_string(),
            unit: unit.to_string(),
        })?;

        // 2^64 is the first f64 past u64::MAX
        let bytes = value * multiplier as f64;
        if bytes >= u64::MAX as f64 {
            return Err(QuantityError::TooLarge(input.to_string()));
        }

        Ok(ByteSize {
            bytes: bytes as u64,
            text: trimmed.to_string(),
        })
    }

    /// Construct from an exact byte count.
    pub fn from_bytes(bytes: u64) -> Self {
        ByteSize {
            bytes,
            text: bytes.to_string(),
        }
    }

    /// Number of bytes.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Whole mebibytes, rounded down (HTCondor `request_memory` unit).
    pub fn as_mebibytes_floor(&self) -> u64 {
        self.bytes / (1 << 20)
    }

    /// Whole kibibytes, rounded down (HTCondor `request_disk` unit).
    pub fn as_kibibytes_floor(&self) -> u64 {
        self.bytes / 1024
    }
}

/// Length of the leading number: sign, digits, fraction, and an exponent
/// only when digits follow the `e`.
fn number_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    end = digits_from(end);
    if bytes.get(end) == Some(&b'.') {
        end = digits_from(end + 1);
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            end = digits_from(exp);
        }
    }
    end
}

fn unit_multiplier(unit: &str) -> Option<u64> {
    let multiplier = match unit.to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" => 1_000,
        "m" | "mb" => 1_000_000,
        "g" | "gb" => 1_000_000_000,
        "t" | "tb" => 1_000_000_000_000,
        "p" | "pb" => 1_000_000_000_000_000,
        "ki" | "kib" => 1 << 10,
        "mi" | "mib" => 1 << 20,
        "gi" | "gib" => 1 << 30,
        "ti" | "tib" => 1 << 40,
        "pi" | "pib" => 1 << 50,
        _ => return None,
    };
    Some(multiplier)
}

impl FromStr for ByteSize {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ByteSize::parse(s)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_units() {
        assert_eq!(ByteSize::parse("2 GB").unwrap().bytes(), 2_000_000_000);
        assert_eq!(ByteSize::parse("500MB").unwrap().bytes(), 500_000_000);
        assert_eq!(ByteSize::parse("1.5 gb").unwrap().bytes(), 1_500_000_000);
        assert_eq!(ByteSize::parse("3k").unwrap().bytes(), 3_000);
    }

    #[test]
    fn test_parse_binary_units() {
        assert_eq!(ByteSize::parse("1 GiB").unwrap().bytes(), 1 << 30);
        assert_eq!(ByteSize::parse("512MiB").unwrap().bytes(), 512 << 20);
    }

    #[test]
    fn test_parse_bare_number_is_bytes() {
        assert_eq!(ByteSize::parse("1024").unwrap().bytes(), 1024);
        assert_eq!(ByteSize::parse(" 7 B ").unwrap().bytes(), 7);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(ByteSize::parse("  "), Err(QuantityError::Empty));
        assert!(matches!(
            ByteSize::parse("GB"),
            Err(QuantityError::InvalidNumber(_))
        ));
        assert!(matches!(
            ByteSize::parse("2 parsecs"),
            Err(QuantityError::UnknownUnit { .. })
        ));
        assert!(matches!(
            ByteSize::parse("-2 GB"),
            Err(QuantityError::Negative(_))
        ));
    }

    #[test]
    fn test_parse_exponents() {
        assert_eq!(ByteSize::parse("2e3").unwrap().bytes(), 2_000);
        assert_eq!(ByteSize::parse("2.5e-1 kB").unwrap().bytes(), 250);
        assert!(matches!(
            ByteSize::parse("2eb"),
            Err(QuantityError::UnknownUnit { ref unit, .. }) if unit == "eb"
        ));
        assert!(matches!(
            ByteSize::parse("2 EB"),
            Err(QuantityError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_parse_too_large() {
        assert!(matches!(
            ByteSize::parse("1e30 PB"),
            Err(QuantityError::TooLarge(_))
        ));
        assert!(matches!(
            ByteSize::parse("20000 PB"),
            Err(QuantityError::TooLarge(_))
        ));
        assert_eq!(ByteSize::parse("16 PiB").unwrap().bytes(), 16 << 50);
    }

    #[test]
    fn test_condor_units() {
        let memory = ByteSize::parse("2 GB").unwrap();
        assert_eq!(memory.as_mebibytes_floor(), 1907);

        let disk = ByteSize::parse("1 GB").unwrap();
        assert_eq!(disk.as_kibibytes_floor(), 976_562);
    }

    #[test]
    fn test_display_keeps_original_text() {
        let size: ByteSize = "2 GB".parse().unwrap();
        assert_eq!(size.to_string(), "2 GB");
        assert_eq!(ByteSize::from_bytes(42).to_string(), "42");
    }
}
