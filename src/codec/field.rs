//! Fixed-width field primitives
//!
//! Pure, stateless transforms with no knowledge of record semantics. Every
//! encoder returns exactly `width` characters or an error; nothing is ever
//! silently truncated except free text.

use crate::types::FieldError;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Width of a single payment amount field
pub const AMOUNT_WIDTH: usize = 15;

const DATE_FORMAT: &str = "%d%m%Y";
const TIME_FORMAT: &str = "%H%M%S";

/// Left-pad an unsigned integer with zeros
///
/// # Errors
///
/// Returns `FieldError::Overflow` if the decimal representation has more
/// than `width` digits.
pub fn pad_numeric(value: u64, width: usize) -> Result<String, FieldError> {
    let digits = value.to_string();
    if digits.len() > width {
        return Err(FieldError::Overflow {
            value: digits,
            width,
        });
    }
    Ok(format!("{:0>width$}", digits, width = width))
}

/// Left-pad a digit string with zeros
///
/// Formatting punctuation (`.`, `-`, `/` and spaces) is dropped first, so a
/// CNPJ may be supplied as `12.345.678/0001-90`. An empty value encodes as
/// all zeros.
pub fn pad_digits(value: &str, width: usize) -> Result<String, FieldError> {
    let digits: String = value
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | '/' | ' '))
        .collect();

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::InvalidDigits {
            value: value.to_string(),
        });
    }
    if digits.len() > width {
        return Err(FieldError::Overflow {
            value: digits,
            width,
        });
    }
    Ok(format!("{:0>width$}", digits, width = width))
}

/// Right-pad text with spaces, truncating to `width` characters
///
/// Control characters become spaces and characters outside Latin-1 become
/// `?`, so the result is always exactly `width` single-byte characters.
pub fn pad_text(value: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut count = 0;
    for c in value.chars().take(width) {
        out.push(wire_char(c));
        count += 1;
    }
    out.extend(std::iter::repeat(' ').take(width - count));
    out
}

fn wire_char(c: char) -> char {
    if c.is_control() {
        ' '
    } else if u32::from(c) > 0xFF {
        '?'
    } else {
        c
    }
}

/// Encode an amount as integer cents in a 15-digit field
pub fn encode_amount(amount: Decimal) -> Result<String, FieldError> {
    encode_amount_width(amount, AMOUNT_WIDTH)
}

/// Encode an amount as integer cents in a field of the given width
///
/// Amounts must already be at cent precision: `10.005` is rejected rather
/// than rounded.
pub fn encode_amount_width(amount: Decimal, width: usize) -> Result<String, FieldError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(FieldError::NegativeAmount {
            value: amount.to_string(),
        });
    }

    let overflow = || FieldError::Overflow {
        value: amount.to_string(),
        width,
    };
    let cents = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(overflow)?;
    if !cents.fract().is_zero() {
        return Err(FieldError::SubCentAmount {
            value: amount.to_string(),
        });
    }

    let cents = cents.trunc().to_u64().ok_or_else(overflow)?;
    pad_numeric(cents, width).map_err(|_| overflow())
}

pub fn encode_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn encode_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Parse a zero-padded numeric field; surrounding spaces are ignored
pub fn decode_numeric(field: &str) -> Result<u64, FieldError> {
    let trimmed = field.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::InvalidDigits {
            value: field.to_string(),
        });
    }
    trimmed.parse::<u64>().map_err(|_| FieldError::Overflow {
        value: trimmed.to_string(),
        width: field.len(),
    })
}

/// Parse an integer-cents field back into a two-decimal amount
pub fn decode_amount(field: &str) -> Result<Decimal, FieldError> {
    let cents = decode_numeric(field)?;
    let cents = i64::try_from(cents).map_err(|_| FieldError::Overflow {
        value: field.to_string(),
        width: field.len(),
    })?;
    Ok(Decimal::new(cents, 2))
}

/// Parse a `ddMMyyyy` field; an all-zero field means "no date"
pub fn decode_date(field: &str) -> Result<Option<NaiveDate>, FieldError> {
    if field.chars().all(|c| c == '0') {
        return Ok(None);
    }
    NaiveDate::parse_from_str(field, DATE_FORMAT)
        .map(Some)
        .map_err(|_| FieldError::InvalidDate {
            value: field.to_string(),
        })
}

/// Parse an `HHmmss` field
pub fn decode_time(field: &str) -> Result<NaiveTime, FieldError> {
    NaiveTime::parse_from_str(field, TIME_FORMAT).map_err(|_| FieldError::InvalidTime {
        value: field.to_string(),
    })
}

/// Free text without its padding
pub fn decode_text(field: &str) -> String {
    field.trim_end().to_string()
}
