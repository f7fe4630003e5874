//! Declarative record layouts
//!
//! Each record type is described once as a table of [`FieldSpec`]s. A single
//! packer turns named values into a 240-column line and a single reader pulls
//! named fields back out of raw bytes, so offsets and widths live in one
//! place per record and can be checked field by field.

use crate::codec::charset::from_latin1;
use crate::codec::field::{
    decode_amount, decode_date, decode_numeric, decode_text, decode_time, encode_amount_width,
    encode_date, encode_time, pad_digits, pad_numeric, pad_text,
};
use crate::types::{CnabError, RecordKind, LINE_WIDTH};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::ops::Range;

/// How a field is encoded on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Digits, zero left-padded; overflow is an error
    Numeric,
    /// Text, space right-padded; truncated when too long
    Alpha,
    /// Integer cents, zero left-padded
    Amount,
    /// `ddMMyyyy`
    Date,
    /// `HHmmss`
    Time,
    /// Fixed literal, space right-padded to the field width
    Constant(&'static str),
    /// Reserved, filled with spaces
    Blank,
    /// Reserved, filled with zeros
    Zeros,
}

/// One positional field: 1-based start column and width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub start: usize,
    pub width: usize,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, start: usize, width: usize, kind: FieldKind) -> Self {
        FieldSpec {
            name,
            start,
            width,
            kind,
        }
    }

    /// Last column covered, 1-based and inclusive
    pub const fn end(&self) -> usize {
        self.start + self.width - 1
    }

    /// Zero-based byte range of the field in a line
    pub fn range(&self) -> Range<usize> {
        self.start - 1..self.end()
    }
}

/// A value destined for a named field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Number(u64),
    Digits(&'a str),
    Text(&'a str),
    Amount(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
}

/// Field table of one record type
#[derive(Debug)]
pub struct RecordLayout {
    pub kind: RecordKind,
    pub fields: &'static [FieldSpec],
}

impl RecordLayout {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Total width covered by the table
    pub fn width(&self) -> usize {
        self.fields.iter().map(|spec| spec.width).sum()
    }

    /// Check that the fields tile columns 1..=240 without gaps or overlaps
    pub fn validate(&self) -> Result<(), String> {
        let mut next = 1;
        for spec in self.fields {
            if spec.width == 0 {
                return Err(format!("{}: field '{}' has zero width", self.kind, spec.name));
            }
            if spec.start != next {
                return Err(format!(
                    "{}: field '{}' starts at {}, expected {}",
                    self.kind, spec.name, spec.start, next
                ));
            }
            if let FieldKind::Constant(literal) = spec.kind {
                if literal.chars().count() > spec.width {
                    return Err(format!(
                        "{}: constant '{}' is wider than field '{}'",
                        self.kind, literal, spec.name
                    ));
                }
            }
            next = spec.end() + 1;
        }
        if next != LINE_WIDTH + 1 {
            return Err(format!("{}: fields end at column {}", self.kind, next - 1));
        }
        Ok(())
    }

    /// Assemble a line from named values
    ///
    /// Constant, blank and zero fields need no value. Every other field must
    /// be supplied.
    ///
    /// # Errors
    ///
    /// - `EncodingOverflow` / `InvalidField` when a value does not fit its field
    /// - `StructuralMismatch` when the result is not exactly 240 characters
    pub fn pack(&self, values: &[(&'static str, Value<'_>)]) -> Result<String, CnabError> {
        let mut line = String::with_capacity(LINE_WIDTH);

        for spec in self.fields {
            let encoded = match spec.kind {
                FieldKind::Constant(literal) => pad_text(literal, spec.width),
                FieldKind::Blank => " ".repeat(spec.width),
                FieldKind::Zeros => "0".repeat(spec.width),
                _ => {
                    let value = values
                        .iter()
                        .find(|(name, _)| *name == spec.name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| {
                            CnabError::invalid_field(spec.name, "", "no value supplied")
                        })?;
                    encode(spec, value)?
                }
            };
            line.push_str(&encoded);
        }

        let length = line.chars().count();
        if length != LINE_WIDTH {
            return Err(CnabError::StructuralMismatch {
                record: self.kind,
                length,
            });
        }
        Ok(line)
    }

    /// Raw bytes of a named field
    pub fn slice<'a>(&self, line: &'a [u8], name: &'static str) -> Result<&'a [u8], CnabError> {
        let spec = self
            .field(name)
            .ok_or_else(|| CnabError::invalid_field(name, "", "unknown field"))?;
        line.get(spec.range())
            .ok_or_else(|| CnabError::invalid_field(name, "", "line too short for field"))
    }

    /// Text field without padding
    pub fn text(&self, line: &[u8], name: &'static str) -> Result<String, CnabError> {
        Ok(decode_text(&from_latin1(self.slice(line, name)?)))
    }

    pub fn number(&self, line: &[u8], name: &'static str) -> Result<u64, CnabError> {
        decode_numeric(&from_latin1(self.slice(line, name)?))
            .map_err(|e| CnabError::field(name, e))
    }

    pub fn amount(&self, line: &[u8], name: &'static str) -> Result<Decimal, CnabError> {
        decode_amount(&from_latin1(self.slice(line, name)?)).map_err(|e| CnabError::field(name, e))
    }

    pub fn date(&self, line: &[u8], name: &'static str) -> Result<Option<NaiveDate>, CnabError> {
        decode_date(&from_latin1(self.slice(line, name)?)).map_err(|e| CnabError::field(name, e))
    }

    pub fn time(&self, line: &[u8], name: &'static str) -> Result<NaiveTime, CnabError> {
        decode_time(&from_latin1(self.slice(line, name)?)).map_err(|e| CnabError::field(name, e))
    }
}

fn encode(spec: &FieldSpec, value: Value<'_>) -> Result<String, CnabError> {
    let width = spec.width;
    let encoded = match (spec.kind, value) {
        (FieldKind::Numeric, Value::Number(n)) => pad_numeric(n, width),
        (FieldKind::Numeric, Value::Digits(s)) => pad_digits(s, width),
        (FieldKind::Alpha, Value::Text(s)) | (FieldKind::Alpha, Value::Digits(s)) => {
            Ok(pad_text(s, width))
        }
        (FieldKind::Amount, Value::Amount(amount)) => encode_amount_width(amount, width),
        (FieldKind::Date, Value::Date(date)) => Ok(encode_date(date)),
        (FieldKind::Time, Value::Time(time)) => Ok(encode_time(time)),
        (kind, value) => {
            return Err(CnabError::invalid_field(
                spec.name,
                &format!("{:?}", value),
                &format!("value does not match field kind {:?}", kind),
            ))
        }
    };
    encoded.map_err(|e| CnabError::field(spec.name, e))
}
