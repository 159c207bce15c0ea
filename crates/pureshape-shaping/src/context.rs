// this_file: crates/pureshape-shaping/src/context.rs

//! Glyph skipping and chained-context matching shared by both engines.

use crate::buffer::GlyphBuffer;
use pureshape_font::{ChainRule, LookupFlags, SequenceLookup};

/// Deepest chain of nested contextual lookups that is followed.
pub const MAX_NESTING_DEPTH: usize = 8;

/// True if the lookup does not see the glyph at `index`.
pub fn is_skipped(buffer: &GlyphBuffer, index: usize, flags: LookupFlags) -> bool {
    let slot = buffer.slot(index);
    flags.ignores(slot.class) || slot.is_transparent()
}

/// First visible glyph after `index`.
pub fn next_unskipped(buffer: &GlyphBuffer, index: usize, flags: LookupFlags) -> Option<usize> {
    (index + 1..buffer.len()).find(|&i| !is_skipped(buffer, i, flags))
}

/// First visible glyph before `index`.
pub fn prev_unskipped(buffer: &GlyphBuffer, index: usize, flags: LookupFlags) -> Option<usize> {
    (0..index).rev().find(|&i| !is_skipped(buffer, i, flags))
}

/// Match `rule` with its first input glyph at `start`.
///
/// Returns the buffer indices of the matched input glyphs.
pub fn match_chain(
    buffer: &GlyphBuffer,
    start: usize,
    rule: &ChainRule,
    flags: LookupFlags,
) -> Option<Vec<usize>> {
    let (first, rest) = rule.input.split_first()?;
    if !first.contains(buffer.glyph(start)) {
        return None;
    }

    let mut positions = Vec::with_capacity(rule.input.len());
    positions.push(start);
    let mut cursor = start;
    for coverage in rest {
        cursor = next_unskipped(buffer, cursor, flags)?;
        if !coverage.contains(buffer.glyph(cursor)) {
            return None;
        }
        positions.push(cursor);
    }

    for coverage in &rule.lookahead {
        cursor = next_unskipped(buffer, cursor, flags)?;
        if !coverage.contains(buffer.glyph(cursor)) {
            return None;
        }
    }

    let mut cursor = start;
    for coverage in &rule.backtrack {
        cursor = prev_unskipped(buffer, cursor, flags)?;
        if !coverage.contains(buffer.glyph(cursor)) {
            return None;
        }
    }

    Some(positions)
}

/// Run a matched rule's nested lookups at their input positions.
///
/// `apply` receives the buffer, the position and the lookup index. Positions
/// after an edit shift with the buffer length. Returns the exclusive end of
/// the matched input once every action ran.
pub fn apply_actions(
    buffer: &mut GlyphBuffer,
    mut positions: Vec<usize>,
    actions: &[SequenceLookup],
    mut apply: impl FnMut(&mut GlyphBuffer, usize, u16),
) -> usize {
    let mut end = positions.last().map_or(0, |last| last + 1);
    for action in actions {
        let Some(&position) = positions.get(action.sequence_index as usize) else {
            continue;
        };
        if position >= buffer.len() {
            continue;
        }
        let before = buffer.len();
        apply(buffer, position, action.lookup_index);
        let after = buffer.len();
        if after == before {
            continue;
        }
        let shift = |index: usize| {
            if after > before {
                index + (after - before)
            } else {
                index.saturating_sub(before - after).max(position)
            }
        };
        for later in positions.iter_mut().filter(|index| **index > position) {
            *later = shift(*later);
        }
        end = shift(end);
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use pureshape_core::{ClusterLevel, Direction, Script, TextRun};
    use pureshape_font::{Coverage, FontProgram, FontProgramBuilder, GlyphClass, GlyphId};

    fn setup(text: &str) -> (FontProgram, GlyphBuffer) {
        let mut builder = FontProgramBuilder::new(1000);
        for ch in ['a', 'b', 'c', 'x'] {
            builder.add_char(ch, 500);
        }
        let mark = builder.add_char('\u{0301}', 0);
        for glyph in 1..=4 {
            builder.set_class(GlyphId(glyph), GlyphClass::Base);
        }
        builder.set_class(mark, GlyphClass::Mark);
        let font = builder.build().unwrap();
        let run = TextRun {
            codepoints: text.chars().collect(),
            start: 0,
            script: Script::LATIN,
            direction: Direction::LeftToRight,
            language: None,
        };
        let buffer = GlyphBuffer::from_run(&run, &font, ClusterLevel::Characters);
        (font, buffer)
    }

    fn cov(glyphs: &[u16]) -> Coverage {
        Coverage::new(glyphs.iter().map(|&g| GlyphId(g)))
    }

    #[test]
    fn test_skipping_marks() {
        let (_, buffer) = setup("a\u{0301}b");
        assert_eq!(next_unskipped(&buffer, 0, LookupFlags::IGNORE_MARKS), Some(2));
        assert_eq!(next_unskipped(&buffer, 0, LookupFlags::default()), Some(1));
        assert_eq!(prev_unskipped(&buffer, 2, LookupFlags::IGNORE_MARKS), Some(0));
        assert!(is_skipped(&buffer, 1, LookupFlags::IGNORE_MARKS));
    }

    #[test]
    fn test_match_chain_with_context() {
        // glyphs: a=1 b=2 c=3 x=4
        let (_, buffer) = setup("xabc");
        let rule = ChainRule {
            backtrack: vec![cov(&[4])],
            input: vec![cov(&[1]), cov(&[2])],
            lookahead: vec![cov(&[3])],
            actions: vec![],
        };
        assert_eq!(
            match_chain(&buffer, 1, &rule, LookupFlags::default()),
            Some(vec![1, 2])
        );
        let wrong_backtrack = ChainRule {
            backtrack: vec![cov(&[3])],
            ..rule.clone()
        };
        assert!(match_chain(&buffer, 1, &wrong_backtrack, LookupFlags::default()).is_none());
        let too_long = ChainRule {
            lookahead: vec![cov(&[3]), cov(&[3])],
            ..rule
        };
        assert!(match_chain(&buffer, 1, &too_long, LookupFlags::default()).is_none());
    }

    #[test]
    fn test_apply_actions_tracks_length_changes() {
        let (font, mut buffer) = setup("abc");
        let actions = [
            SequenceLookup {
                sequence_index: 0,
                lookup_index: 7,
            },
            SequenceLookup {
                sequence_index: 1,
                lookup_index: 9,
            },
        ];
        let mut seen = Vec::new();
        let end = apply_actions(&mut buffer, vec![0, 2], &actions, |buffer, position, lookup| {
            seen.push((position, lookup));
            if lookup == 7 {
                buffer.replace_with_sequence(position, &[GlyphId(1), GlyphId(1)], &font);
            }
        });
        assert_eq!(seen, vec![(0, 7), (3, 9)]);
        assert_eq!(end, 4);
        assert_eq!(buffer.len(), 4);
    }
}
