// this_file: crates/pureshape-unicode/src/decode.rs

//! Decoding of every supported input encoding into Unicode scalar values.

use pureshape_core::{Result, ShapeError, TextInput};

/// Decode `input` into codepoints.
///
/// Malformed input fails with [`ShapeError::Segmentation`] carrying the
/// offset, in code units of the input encoding, of the first bad unit.
pub fn decode(input: &TextInput<'_>) -> Result<Vec<char>> {
    match *input {
        TextInput::Utf8(text) => Ok(text.chars().collect()),
        TextInput::Utf8Bytes(bytes) => decode_utf8(bytes),
        TextInput::Utf16(units) => decode_utf16(units),
        TextInput::Utf32(units) => decode_utf32(units),
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<Vec<char>> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.chars().collect()),
        Err(err) => {
            let reason = match err.error_len() {
                Some(len) => format!("invalid UTF-8 sequence of {len} byte(s)"),
                None => "truncated UTF-8 sequence".to_string(),
            };
            Err(ShapeError::segmentation(err.valid_up_to(), reason))
        }
    }
}

fn decode_utf16(units: &[u16]) -> Result<Vec<char>> {
    let mut chars = Vec::with_capacity(units.len());
    let mut offset = 0usize;
    for decoded in char::decode_utf16(units.iter().copied()) {
        match decoded {
            Ok(ch) => {
                offset += ch.len_utf16();
                chars.push(ch);
            }
            Err(err) => {
                return Err(ShapeError::segmentation(
                    offset,
                    format!("unpaired surrogate 0x{:04X}", err.unpaired_surrogate()),
                ));
            }
        }
    }
    Ok(chars)
}

fn decode_utf32(units: &[u32]) -> Result<Vec<char>> {
    units
        .iter()
        .enumerate()
        .map(|(offset, &unit)| {
            char::from_u32(unit).ok_or_else(|| {
                let reason = if (0xD800..=0xDFFF).contains(&unit) {
                    format!("surrogate 0x{unit:04X} is not a scalar value")
                } else {
                    format!("0x{unit:X} is beyond U+10FFFF")
                };
                ShapeError::segmentation(offset, reason)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset_of(err: ShapeError) -> usize {
        match err {
            ShapeError::Segmentation { offset, .. } => offset,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_all_encodings() {
        let expected: Vec<char> = "aé😀".chars().collect();
        assert_eq!(decode(&TextInput::Utf8("aé😀")).unwrap(), expected);
        assert_eq!(
            decode(&TextInput::Utf8Bytes("aé😀".as_bytes())).unwrap(),
            expected
        );
        let utf16: Vec<u16> = "aé😀".encode_utf16().collect();
        assert_eq!(decode(&TextInput::Utf16(&utf16)).unwrap(), expected);
        let utf32: Vec<u32> = expected.iter().map(|&c| c as u32).collect();
        assert_eq!(decode(&TextInput::Utf32(&utf32)).unwrap(), expected);
    }

    #[test]
    fn test_invalid_utf8_offset() {
        let err = decode(&TextInput::Utf8Bytes(&[0x61, 0x62, 0xFF, 0x63])).unwrap_err();
        assert_eq!(offset_of(err), 2);
        let err = decode(&TextInput::Utf8Bytes(&[0x61, 0xE2, 0x82])).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_unpaired_surrogate_offset() {
        // U+1F600 takes two units, so the lone high surrogate sits at unit 3.
        let units = [0x0048, 0xD83D, 0xDE00, 0xD800, 0x0049];
        let err = decode(&TextInput::Utf16(&units)).unwrap_err();
        assert!(err.to_string().contains("0xD800"));
        assert_eq!(offset_of(err), 3);
    }

    #[test]
    fn test_invalid_utf32() {
        let err = decode(&TextInput::Utf32(&[0x41, 0xDC00])).unwrap_err();
        assert_eq!(offset_of(err), 1);
        let err = decode(&TextInput::Utf32(&[0x41, 0x42, 0x110000])).unwrap_err();
        assert_eq!(offset_of(err), 2);
    }
}
