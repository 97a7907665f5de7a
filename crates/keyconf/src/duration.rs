//! Duration literals such as `5s`, `1h30m` or `1.5ms`
//!
//! A literal is an optional `+` sign followed by one or more
//! `<decimal><unit>` terms. Valid units are `ns`, `us` (or `µs`/`μs`), `ms`,
//! `s`, `m` and `h`. The bare literal `0` needs no unit.

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fraction digits past this cannot change the nanosecond count.
const MAX_FRACTION_DIGITS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("negative duration {0:?}")]
    Negative(String),

    #[error("duration {0:?} is out of range")]
    Overflow(String),
}

/// Parse a duration literal.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());

    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, whole_digits, after_whole) = leading_digits(rest);
        let (fraction, scale, fraction_digits, after_fraction) = match after_whole.strip_prefix('.')
        {
            Some(after_dot) => {
                let end = digits_end(after_dot);
                let (digits, remainder) = after_dot.split_at(end);
                let kept = &digits[..digits.len().min(MAX_FRACTION_DIGITS)];
                let fraction = kept
                    .bytes()
                    .fold(0u128, |acc, b| acc * 10 + u128::from(b - b'0'));
                (fraction, 10u128.pow(kept.len() as u32), digits.len(), remainder)
            }
            None => (0, 1, 0, after_whole),
        };

        if whole_digits == 0 && fraction_digits == 0 {
            return Err(invalid());
        }
        let whole = whole.ok_or_else(|| DurationError::Overflow(input.to_string()))?;

        let unit_len = after_fraction
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after_fraction.len());
        if unit_len == 0 {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let (unit, remainder) = after_fraction.split_at(unit_len);
        let unit_nanos = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        total = whole
            .checked_mul(unit_nanos)
            .and_then(|nanos| nanos.checked_add(fraction * unit_nanos / scale))
            .and_then(|nanos| total.checked_add(nanos))
            .filter(|nanos| *nanos <= u128::from(u64::MAX))
            .ok_or_else(|| DurationError::Overflow(input.to_string()))?;
        rest = remainder;
    }

    if negative && total > 0 {
        return Err(DurationError::Negative(input.to_string()));
    }

    Ok(Duration::new(
        (total / NANOS_PER_SEC) as u64,
        (total % NANOS_PER_SEC) as u32,
    ))
}

/// Split leading ASCII digits off `s`.
///
/// Returns the parsed value (`None` on overflow, `Some(0)` for no digits),
/// the digit count and the remainder.
fn leading_digits(s: &str) -> (Option<u128>, usize, &str) {
    let end = digits_end(s);
    let (digits, remainder) = s.split_at(end);
    let value = digits.bytes().try_fold(0u128, |acc, b| {
        acc.checked_mul(10)?.checked_add(u128::from(b - b'0'))
    });
    (value, end, remainder)
}

fn digits_end(s: &str) -> usize {
    s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len())
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3_600 * NANOS_PER_SEC),
        _ => None,
    }
}
