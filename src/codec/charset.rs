//! ISO-8859-1 conversion
//!
//! Clearing systems expect single-byte Latin-1 files. Every Latin-1 byte maps
//! to the Unicode code point of the same value, so both directions are
//! lossless for text produced by [`pad_text`](super::field::pad_text).

/// Encode text as Latin-1; characters beyond U+00FF become `?`
pub fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Decode Latin-1 bytes; never fails
pub fn from_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accented_text_is_one_byte_per_char() {
        let bytes = to_latin1("JOÃO ÇÉ");
        assert_eq!(bytes, vec![b'J', b'O', 0xC3, b'O', b' ', 0xC7, 0xC9]);
        assert_eq!(from_latin1(&bytes), "JOÃO ÇÉ");
    }

    #[test]
    fn test_non_latin1_becomes_question_mark() {
        assert_eq!(to_latin1("A€"), vec![b'A', b'?']);
    }
}
