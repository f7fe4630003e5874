//! Fixed-width codec
//!
//! - `field`: pad/unpack primitives for numbers, text, amounts and dates
//! - `charset`: ISO-8859-1 conversion of whole files
//! - `layout`: declarative field tables with one packer and one reader

pub mod charset;
pub mod field;
pub mod layout;

pub use charset::{from_latin1, to_latin1};
pub use field::{
    decode_amount, decode_date, decode_numeric, decode_text, decode_time, encode_amount,
    encode_amount_width, encode_date, encode_time, pad_digits, pad_numeric, pad_text,
    AMOUNT_WIDTH,
};
pub use layout::{FieldKind, FieldSpec, RecordLayout, Value};
