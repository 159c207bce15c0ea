// this_file: crates/pureshape-unicode/src/segmenter.rs

//! Script, direction and language itemization.

use crate::decode::decode;
use icu_properties::{
    maps::{self, CodePointMapDataBorrowed},
    names::PropertyEnumToValueNameLinearTiny4MapperBorrowed,
    Script as IcuScript,
};
use log::debug;
use pureshape_core::{
    Direction, Language, Result, Script, SegmentOptions, TextInput, TextRun, TextSegmenter,
};
use unicode_bidi::{BidiInfo, Level};

const LANGUAGE_TAG: u32 = 0xE0001;
const CANCEL_TAG: u32 = 0xE007F;
const TAG_CHARS: std::ops::RangeInclusive<u32> = 0xE0020..=0xE007E;

/// Splits text into runs of uniform script, direction and language.
pub struct Segmenter {
    script_map: CodePointMapDataBorrowed<'static, IcuScript>,
    script_name_mapper: PropertyEnumToValueNameLinearTiny4MapperBorrowed<'static, IcuScript>,
}

impl Segmenter {
    pub fn new() -> Self {
        Self {
            script_map: maps::script(),
            script_name_mapper: IcuScript::enum_to_short_name_mapper(),
        }
    }

    /// Script of a single codepoint; scripts without a short name are `Zzzz`.
    pub fn script_of(&self, ch: char) -> Script {
        self.script_name_mapper
            .get(self.script_map.get(ch))
            .and_then(|name| name.as_str().parse::<Script>().ok())
            .unwrap_or(Script::UNKNOWN)
    }

    /// Segment already-decoded codepoints.
    pub fn segment_chars(&self, chars: &[char], options: &SegmentOptions) -> Vec<TextRun> {
        if chars.is_empty() {
            return Vec::new();
        }

        let scripts = self.resolve_scripts(chars);
        let directions = resolve_directions(chars, &scripts, options);
        let languages = resolve_languages(chars, options.language.as_deref());

        let mut runs = Vec::new();
        let mut run_start = 0usize;
        for index in 1..=chars.len() {
            let boundary = index == chars.len()
                || scripts[index] != scripts[run_start]
                || directions[index] != directions[run_start]
                || languages[index] != languages[run_start];
            if boundary {
                runs.push(TextRun {
                    codepoints: chars[run_start..index].to_vec(),
                    start: run_start,
                    script: scripts[run_start],
                    direction: directions[run_start],
                    language: languages[run_start].clone(),
                });
                run_start = index;
            }
        }

        debug!(
            target: "pureshape::segment",
            "segmented {} codepoints into {} run(s)",
            chars.len(),
            runs.len()
        );
        runs
    }

    /// Common/Inherited take the preceding determined script; leading ones
    /// take the first determined script that follows.
    fn resolve_scripts(&self, chars: &[char]) -> Vec<Script> {
        let raw: Vec<Script> = chars.iter().map(|&ch| self.script_of(ch)).collect();
        let mut current = raw
            .iter()
            .copied()
            .find(|script| script.is_determined())
            .unwrap_or(Script::COMMON);
        raw.into_iter()
            .map(|script| {
                if script.is_determined() {
                    current = script;
                }
                current
            })
            .collect()
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSegmenter for Segmenter {
    fn segment(&self, text: &TextInput<'_>, options: &SegmentOptions) -> Result<Vec<TextRun>> {
        let chars = decode(text)?;
        Ok(self.segment_chars(&chars, options))
    }
}

fn resolve_directions(
    chars: &[char],
    scripts: &[Script],
    options: &SegmentOptions,
) -> Vec<Direction> {
    if !options.bidi_resolve {
        return match options.direction {
            Some(direction) => vec![direction; chars.len()],
            None => scripts.iter().map(|script| script.direction()).collect(),
        };
    }

    let text: String = chars.iter().collect();
    let paragraph_level = options.direction.map(|direction| match direction {
        Direction::LeftToRight => Level::ltr(),
        Direction::RightToLeft => Level::rtl(),
    });
    let bidi = BidiInfo::new(&text, paragraph_level);
    text.char_indices()
        .map(|(byte, _)| {
            if bidi.levels[byte].is_rtl() {
                Direction::RightToLeft
            } else {
                Direction::LeftToRight
            }
        })
        .collect()
}

/// Language per codepoint. A tag sequence (`U+E0001` + tag characters)
/// switches the language from its first codepoint on; `U+E007F` restores
/// the default.
fn resolve_languages(chars: &[char], default: Option<&str>) -> Vec<Option<Language>> {
    let default = default.map(Language::new);
    let mut current = default.clone();
    let mut languages = Vec::with_capacity(chars.len());
    let mut index = 0usize;
    while index < chars.len() {
        let cp = u32::from(chars[index]);
        if cp == LANGUAGE_TAG {
            let mut end = index + 1;
            let mut tag = String::new();
            while end < chars.len() && TAG_CHARS.contains(&u32::from(chars[end])) {
                tag.push(char::from((u32::from(chars[end]) - 0xE0000) as u8));
                end += 1;
            }
            current = if tag.is_empty() {
                default.clone()
            } else {
                Some(Language::new(&tag))
            };
            languages.extend(std::iter::repeat(current.clone()).take(end - index));
            index = end;
            continue;
        }
        if cp == CANCEL_TAG {
            current = default.clone();
        }
        languages.push(current.clone());
        index += 1;
    }
    languages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, options: &SegmentOptions) -> Vec<TextRun> {
        Segmenter::new()
            .segment(&TextInput::Utf8(text), options)
            .unwrap()
    }

    #[test]
    fn test_simple_segmentation() {
        let runs = segment("Hello world", &SegmentOptions::default());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].script, Script::LATIN);
        assert_eq!(runs[0].direction, Direction::LeftToRight);
        assert_eq!(runs[0].text(), "Hello world");
        assert!(runs[0].language.is_none());
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("", &SegmentOptions::default()).is_empty());
    }

    #[test]
    fn test_script_itemization_and_bidi() {
        let runs = segment("Hello שלום", &SegmentOptions::default());
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text(), "Hello ");
        assert_eq!(runs[0].script, Script::LATIN);
        assert_eq!(runs[1].script, Script::HEBREW);
        assert_eq!(runs[1].direction, Direction::RightToLeft);
        assert_eq!(runs[1].start, 6);
    }

    #[test]
    fn test_common_characters_inherit() {
        let runs = segment("(abc) 123", &SegmentOptions::default());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].script, Script::LATIN);

        let runs = segment("123 !", &SegmentOptions::default());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].script, Script::COMMON);
    }

    #[test]
    fn test_script_changes_split_runs() {
        let runs = segment("αβγабв漢字かな", &SegmentOptions::default());
        let scripts: Vec<Script> = runs.iter().map(|run| run.script).collect();
        assert_eq!(
            scripts,
            vec![Script::GREEK, Script::CYRILLIC, Script::HAN, Script::HIRAGANA]
        );
        let total: String = runs.iter().map(TextRun::text).collect();
        assert_eq!(total, "αβγабв漢字かな");
    }

    #[test]
    fn test_direction_override_without_bidi() {
        let options = SegmentOptions {
            bidi_resolve: false,
            direction: Some(Direction::RightToLeft),
            language: None,
        };
        let runs = segment("abc", &options);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].direction, Direction::RightToLeft);

        let natural = SegmentOptions {
            bidi_resolve: false,
            ..SegmentOptions::default()
        };
        let runs = segment("שלום", &natural);
        assert_eq!(runs[0].direction, Direction::RightToLeft);
    }

    #[test]
    fn test_language_tags_split_runs() {
        let options = SegmentOptions {
            language: Some("en".to_string()),
            ..SegmentOptions::default()
        };
        let text = "ab\u{E0001}\u{E0074}\u{E0072}cd\u{E007F}e";
        let runs = segment(text, &options);
        let languages: Vec<Option<&str>> = runs
            .iter()
            .map(|run| run.language.as_ref().map(Language::as_str))
            .collect();
        assert_eq!(languages, vec![Some("en"), Some("tr"), Some("en")]);
        assert_eq!(runs[1].start, 2);
        assert_eq!(runs[1].len(), 5);
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        let segmenter = Segmenter::new();
        let units = [0x61u16, 0xDC00];
        let err = segmenter
            .segment(&TextInput::Utf16(&units), &SegmentOptions::default())
            .unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_unknown_script_degrades() {
        let segmenter = Segmenter::new();
        assert_eq!(segmenter.script_of('a'), Script::LATIN);
        assert_eq!(segmenter.script_of('\u{0378}'), Script::UNKNOWN);
        assert!(Script::UNKNOWN.is_determined());
    }
}
