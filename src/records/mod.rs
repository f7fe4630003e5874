//! CNAB 240 record builders
//!
//! One builder per record type. Each feeds typed values through its static
//! layout table, so every line produced here is exactly 240 columns wide or
//! the builder returns an error.

pub mod detail;
pub mod header;
pub mod trailer;

pub use detail::{
    read_segment_a, read_segment_b, segment_a, segment_b, SegmentAFields, SegmentBFields,
    SEGMENT_A, SEGMENT_B,
};
pub use header::{
    batch_header, file_header, read_file_header, FileHeaderFields, BATCH_HEADER, FILE_HEADER,
};
pub use trailer::{
    batch_line_count, batch_trailer, file_trailer, read_batch_trailer, read_file_trailer,
    BatchTotals, FileTotals, BATCH_TRAILER, FILE_TRAILER,
};

use crate::codec::RecordLayout;
use crate::types::{RecordKind, Segment};

/// Every layout the crate writes
pub static LAYOUTS: [&RecordLayout; 6] = [
    &FILE_HEADER,
    &BATCH_HEADER,
    &SEGMENT_A,
    &SEGMENT_B,
    &BATCH_TRAILER,
    &FILE_TRAILER,
];

/// Record type at column 008
pub fn record_type(line: &[u8]) -> Option<RecordKind> {
    line.get(7).copied().and_then(RecordKind::from_type_code)
}

/// Detail segment at column 014
pub fn segment_code(line: &[u8]) -> Option<Segment> {
    line.get(13).copied().and_then(Segment::from_code)
}

/// Keep only ASCII digits; `"S/N"` becomes empty and encodes as zeros
pub(crate) fn ascii_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_layout_covers_240_columns() {
        for layout in LAYOUTS {
            assert_eq!(layout.validate(), Ok(()), "{}", layout.kind);
        }
    }

    #[test]
    fn test_record_type_and_segment() {
        let line = b"0010001300001A";
        assert_eq!(record_type(line), Some(RecordKind::Detail));
        assert_eq!(segment_code(line), Some(Segment::A));
        assert_eq!(record_type(b"001"), None);
        assert_eq!(segment_code(b"0010001300001X"), None);
    }

    #[test]
    fn test_ascii_digits() {
        assert_eq!(ascii_digits("12A"), "12");
        assert_eq!(ascii_digits("S/N"), "");
    }
}
