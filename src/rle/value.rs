// src/rle/value.rs
use std::fmt;

/// How integer data and strides are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    Hexadecimal,
}

/// Numeric types that can be run length encoded.
///
/// A run is `datum, datum + stride, datum + 2 * stride, ...` so implementors
/// only have to say how to take a difference and how to step forward. Both
/// operations return `None` when the result is not representable, which ends
/// the current run.
pub trait RleValue: Copy + PartialEq + fmt::Debug {
    const ZERO: Self;

    /// The stride that takes `self` to `next`.
    fn stride_to(self, next: Self) -> Option<Self>;

    /// `self + stride * steps`.
    fn advance(self, stride: Self, steps: u64) -> Option<Self>;

    /// Whether `self` and `other` are the same value, bit for bit for floats.
    fn same(self, other: Self) -> bool;

    /// Text form of a datum or stride.
    fn format(self, radix: Radix) -> String;

    /// Parse the text form, accepting both decimal and `0x` hexadecimal.
    fn parse(text: &str) -> Option<Self>;
}

impl RleValue for i64 {
    const ZERO: Self = 0;

    fn stride_to(self, next: Self) -> Option<Self> {
        next.checked_sub(self)
    }

    fn advance(self, stride: Self, steps: u64) -> Option<Self> {
        let steps = i64::try_from(steps).ok()?;
        stride.checked_mul(steps).and_then(|delta| self.checked_add(delta))
    }

    fn same(self, other: Self) -> bool {
        self == other
    }

    fn format(self, radix: Radix) -> String {
        match radix {
            Radix::Decimal => self.to_string(),
            Radix::Hexadecimal if self < 0 => format!("-0x{:x}", self.unsigned_abs()),
            Radix::Hexadecimal => format!("0x{:x}", self),
        }
    }

    fn parse(text: &str) -> Option<Self> {
        parse_integer(text)
    }
}

impl RleValue for f64 {
    const ZERO: Self = 0.0;

    fn stride_to(self, next: Self) -> Option<Self> {
        Some(next - self)
    }

    fn advance(self, stride: Self, steps: u64) -> Option<Self> {
        if steps == 0 {
            // -0.0 + 0.0 is 0.0
            return Some(self);
        }
        Some(self + stride * steps as f64)
    }

    // NaN never continues a run.
    fn same(self, other: Self) -> bool {
        !self.is_nan() && self.to_bits() == other.to_bits()
    }

    // Floats are always decimal, Debug gives the shortest text that round trips.
    fn format(self, _radix: Radix) -> String {
        format!("{:?}", self)
    }

    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        match text.parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) => parse_integer(text).map(|v| v as f64),
        }
    }
}

/// Parse a signed integer written either in decimal or as `0x` prefixed hex.
pub fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude: i128 = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i128::from_str_radix(hex, 16).ok()?,
        None => {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse::<i128>().ok()?
        }
    };
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_formatting() {
        assert_eq!(0x50i64.format(Radix::Hexadecimal), "0x50");
        assert_eq!((-16i64).format(Radix::Hexadecimal), "-0x10");
        assert_eq!(80i64.format(Radix::Decimal), "80");
        assert_eq!(i64::MIN.format(Radix::Hexadecimal), "-0x8000000000000000");
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("0xe048"), Some(0xe048));
        assert_eq!(parse_integer("0XE048"), Some(0xe048));
        assert_eq!(parse_integer("-0x10"), Some(-16));
        assert_eq!(parse_integer("123"), Some(123));
        assert_eq!(parse_integer("-9"), Some(-9));
        assert_eq!(parse_integer("-0x8000000000000000"), Some(i64::MIN));
        assert_eq!(parse_integer("1.5"), None);
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("0x"), None);
        assert_eq!(parse_integer("0x10000000000000000"), None);
    }

    #[test]
    fn test_float_text_round_trip() {
        for v in [0.0, 0.1, -2.5e-7, 154724.0, 1e20, f64::MAX] {
            let text = v.format(Radix::Decimal);
            assert_eq!(f64::parse(&text), Some(v), "{}", text);
        }
        assert_eq!(0.0f64.format(Radix::Hexadecimal), "0.0");
        assert_eq!(f64::parse("75197"), Some(75197.0));
        assert_eq!(f64::parse("0x10"), Some(16.0));
    }

    #[test]
    fn test_integer_advance_overflow() {
        assert_eq!(1i64.advance(2, 3), Some(7));
        assert_eq!(i64::MAX.advance(1, 1), None);
        assert_eq!(0i64.stride_to(i64::MIN), Some(i64::MIN));
        assert_eq!(1i64.stride_to(i64::MIN), None);
    }
}
