// this_file: crates/pureshape-unicode/src/props.rs

//! Character properties and grapheme boundaries used during shaping.

use icu_properties::{maps, sets, GeneralCategory};
use icu_segmenter::GraphemeClusterSegmenter;

/// Default-ignorable codepoints render invisibly (ZWJ, variation selectors, tag characters, ...).
pub fn is_default_ignorable(ch: char) -> bool {
    sets::default_ignorable_code_point().contains(ch)
}

/// Non-spacing and enclosing combining marks.
pub fn is_combining_mark(ch: char) -> bool {
    matches!(
        maps::general_category().get(ch),
        GeneralCategory::NonspacingMark | GeneralCategory::EnclosingMark
    )
}

/// For every codepoint, the index of the first codepoint of its extended grapheme cluster.
pub fn grapheme_starts(chars: &[char]) -> Vec<usize> {
    if chars.is_empty() {
        return Vec::new();
    }
    let text: String = chars.iter().collect();
    let boundaries: Vec<usize> = GraphemeClusterSegmenter::new()
        .segment_str(&text)
        .collect();

    let mut starts = Vec::with_capacity(chars.len());
    let mut boundary = boundaries.iter().peekable();
    let mut current = 0usize;
    for (index, (byte, _)) in text.char_indices().enumerate() {
        while let Some(&&next) = boundary.peek() {
            if next > byte {
                break;
            }
            if next == byte {
                current = index;
            }
            boundary.next();
        }
        starts.push(current);
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ignorables() {
        assert!(is_default_ignorable('\u{200D}'));
        assert!(is_default_ignorable('\u{FE0F}'));
        assert!(is_default_ignorable('\u{E0061}'));
        assert!(!is_default_ignorable('a'));
        assert!(!is_default_ignorable(' '));
    }

    #[test]
    fn test_combining_marks() {
        assert!(is_combining_mark('\u{0301}'));
        assert!(is_combining_mark('\u{05B4}'));
        assert!(!is_combining_mark('e'));
    }

    #[test]
    fn test_grapheme_starts() {
        let chars: Vec<char> = "ae\u{0301}b".chars().collect();
        assert_eq!(grapheme_starts(&chars), vec![0, 1, 1, 3]);
        let chars: Vec<char> = "\r\nx".chars().collect();
        assert_eq!(grapheme_starts(&chars), vec![0, 0, 2]);
        assert!(grapheme_starts(&[]).is_empty());
    }
}
