// this_file: backends/pureshape-core/src/types.rs

//! Core types used throughout the pureshape engine.

use crate::{Result, ShapeError};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;

/// Four-byte OpenType tag (`kern`, `latn`, `DFLT`, ...).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag([u8; 4]);

impl Tag {
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0
    }

    /// Same tag with the first character lowercased (`Latn` -> `latn`).
    pub fn with_lowercase_initial(self) -> Self {
        let mut bytes = self.0;
        bytes[0] = bytes[0].to_ascii_lowercase();
        Self(bytes)
    }
}

impl FromStr for Tag {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.is_empty() || bytes.len() > 4 || !bytes.iter().all(|b| (0x20..=0x7e).contains(b))
        {
            return Err(ShapeError::InvalidTag { tag: s.to_string() });
        }
        let mut tag = [b' '; 4];
        tag[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(tag))
    }
}

impl TryFrom<String> for Tag {
    type Error = ShapeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.to_string()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

/// Writing system, identified by its ISO 15924 code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script(Tag);

impl Script {
    pub const COMMON: Script = Script(Tag::new(b"Zyyy"));
    pub const INHERITED: Script = Script(Tag::new(b"Zinh"));
    /// Generic script for codepoints whose script is unknown or unsupported.
    pub const UNKNOWN: Script = Script(Tag::new(b"Zzzz"));

    pub const LATIN: Script = Script(Tag::new(b"Latn"));
    pub const GREEK: Script = Script(Tag::new(b"Grek"));
    pub const CYRILLIC: Script = Script(Tag::new(b"Cyrl"));
    pub const ARMENIAN: Script = Script(Tag::new(b"Armn"));
    pub const HEBREW: Script = Script(Tag::new(b"Hebr"));
    pub const ARABIC: Script = Script(Tag::new(b"Arab"));
    pub const SYRIAC: Script = Script(Tag::new(b"Syrc"));
    pub const THAANA: Script = Script(Tag::new(b"Thaa"));
    pub const NKO: Script = Script(Tag::new(b"Nkoo"));
    pub const SAMARITAN: Script = Script(Tag::new(b"Samr"));
    pub const MANDAIC: Script = Script(Tag::new(b"Mand"));
    pub const ADLAM: Script = Script(Tag::new(b"Adlm"));
    pub const DEVANAGARI: Script = Script(Tag::new(b"Deva"));
    pub const BENGALI: Script = Script(Tag::new(b"Beng"));
    pub const GURMUKHI: Script = Script(Tag::new(b"Guru"));
    pub const GUJARATI: Script = Script(Tag::new(b"Gujr"));
    pub const ORIYA: Script = Script(Tag::new(b"Orya"));
    pub const TAMIL: Script = Script(Tag::new(b"Taml"));
    pub const TELUGU: Script = Script(Tag::new(b"Telu"));
    pub const KANNADA: Script = Script(Tag::new(b"Knda"));
    pub const MALAYALAM: Script = Script(Tag::new(b"Mlym"));
    pub const SINHALA: Script = Script(Tag::new(b"Sinh"));
    pub const THAI: Script = Script(Tag::new(b"Thai"));
    pub const LAO: Script = Script(Tag::new(b"Laoo"));
    pub const TIBETAN: Script = Script(Tag::new(b"Tibt"));
    pub const MYANMAR: Script = Script(Tag::new(b"Mymr"));
    pub const GEORGIAN: Script = Script(Tag::new(b"Geor"));
    pub const HANGUL: Script = Script(Tag::new(b"Hang"));
    pub const ETHIOPIC: Script = Script(Tag::new(b"Ethi"));
    pub const CHEROKEE: Script = Script(Tag::new(b"Cher"));
    pub const KHMER: Script = Script(Tag::new(b"Khmr"));
    pub const MONGOLIAN: Script = Script(Tag::new(b"Mong"));
    pub const HIRAGANA: Script = Script(Tag::new(b"Hira"));
    pub const KATAKANA: Script = Script(Tag::new(b"Kana"));
    pub const BOPOMOFO: Script = Script(Tag::new(b"Bopo"));
    pub const HAN: Script = Script(Tag::new(b"Hani"));
    pub const YI: Script = Script(Tag::new(b"Yiii"));

    pub const fn from_tag(tag: Tag) -> Self {
        Self(tag)
    }

    pub const fn tag(self) -> Tag {
        self.0
    }

    /// Common and Inherited codepoints take the script of their neighbours.
    pub fn is_determined(self) -> bool {
        self != Self::COMMON && self != Self::INHERITED
    }

    /// Natural horizontal direction of the script.
    pub fn direction(self) -> Direction {
        match self {
            Self::ARABIC
            | Self::HEBREW
            | Self::SYRIAC
            | Self::THAANA
            | Self::NKO
            | Self::SAMARITAN
            | Self::MANDAIC
            | Self::ADLAM => Direction::RightToLeft,
            _ => Direction::LeftToRight,
        }
    }

    /// OpenType script tags to try for this script, most preferred first.
    ///
    /// Empty for Common/Inherited/Unknown, which only ever match `DFLT`.
    pub fn ot_tags(self) -> Vec<Tag> {
        match self {
            Self::COMMON | Self::INHERITED | Self::UNKNOWN => Vec::new(),
            Self::HIRAGANA | Self::KATAKANA => vec![Tag::new(b"kana")],
            Self::DEVANAGARI => vec![Tag::new(b"dev2"), Tag::new(b"deva")],
            Self::BENGALI => vec![Tag::new(b"bng2"), Tag::new(b"beng")],
            Self::GURMUKHI => vec![Tag::new(b"gur2"), Tag::new(b"guru")],
            Self::GUJARATI => vec![Tag::new(b"gjr2"), Tag::new(b"gujr")],
            Self::ORIYA => vec![Tag::new(b"ory2"), Tag::new(b"orya")],
            Self::TAMIL => vec![Tag::new(b"tml2"), Tag::new(b"taml")],
            Self::TELUGU => vec![Tag::new(b"tel2"), Tag::new(b"telu")],
            Self::KANNADA => vec![Tag::new(b"knd2"), Tag::new(b"knda")],
            Self::MALAYALAM => vec![Tag::new(b"mlm2"), Tag::new(b"mlym")],
            Self::MYANMAR => vec![Tag::new(b"mym2"), Tag::new(b"mymr")],
            Self::LAO => vec![Tag::new(b"lao ")],
            Self::NKO => vec![Tag::new(b"nko ")],
            Self::YI => vec![Tag::new(b"yi  ")],
            other => vec![other.0.with_lowercase_initial()],
        }
    }
}

impl FromStr for Script {
    type Err = ShapeError;

    /// Parses an ISO 15924 code; case of the input is normalized (`latn` -> `Latn`).
    fn from_str(s: &str) -> Result<Self> {
        if s.len() != 4 || !s.is_ascii() {
            return Err(ShapeError::InvalidTag { tag: s.to_string() });
        }
        let mut normalized = s.to_ascii_lowercase();
        normalized[..1].make_ascii_uppercase();
        Ok(Self(normalized.parse()?))
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Text direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "ltr")]
    LeftToRight,
    #[serde(rename = "rtl")]
    RightToLeft,
}

impl Direction {
    pub fn is_rtl(self) -> bool {
        self == Self::RightToLeft
    }
}

impl FromStr for Direction {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ltr" | "left-to-right" => Ok(Self::LeftToRight),
            "rtl" | "right-to-left" => Ok(Self::RightToLeft),
            _ => Err(ShapeError::InvalidTag { tag: s.to_string() }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LeftToRight => "ltr",
            Self::RightToLeft => "rtl",
        })
    }
}

/// BCP-47 language tag, normalized to lowercase with `-` separators.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Language(String);

impl Language {
    pub fn new(tag: &str) -> Self {
        Self(tag.trim().replace('_', "-").to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primary language subtag (`sr` for `sr-latn-rs`).
    pub fn primary(&self) -> &str {
        self.0.split('-').next().unwrap_or("")
    }

    /// OpenType language system tag, if the language has a known one.
    pub fn ot_tag(&self) -> Option<Tag> {
        let bytes: &[u8; 4] = match self.primary() {
            "en" => b"ENG ",
            "de" => b"DEU ",
            "fr" => b"FRA ",
            "es" => b"ESP ",
            "it" => b"ITA ",
            "nl" => b"NLD ",
            "pt" => b"PTG ",
            "ca" => b"CAT ",
            "ro" => b"ROM ",
            "pl" => b"PLK ",
            "cs" => b"CSY ",
            "sk" => b"SKY ",
            "hu" => b"HUN ",
            "fi" => b"FIN ",
            "sv" => b"SVE ",
            "da" => b"DAN ",
            "nb" | "no" | "nn" => b"NOR ",
            "is" => b"ISL ",
            "ga" => b"IRI ",
            "cy" => b"WEL ",
            "tr" => b"TRK ",
            "az" => b"AZE ",
            "el" => b"ELL ",
            "ru" => b"RUS ",
            "uk" => b"UKR ",
            "bg" => b"BGR ",
            "sr" => b"SRB ",
            "mk" => b"MKD ",
            "he" | "iw" => b"IWR ",
            "yi" => b"JII ",
            "ar" => b"ARA ",
            "fa" => b"FAR ",
            "ur" => b"URD ",
            "ps" => b"PAS ",
            "sd" => b"SND ",
            "ku" => b"KUR ",
            "hi" => b"HIN ",
            "mr" => b"MAR ",
            "ne" => b"NEP ",
            "sa" => b"SAN ",
            "bn" => b"BEN ",
            "ta" => b"TAM ",
            "th" => b"THA ",
            "vi" => b"VIT ",
            "ja" => b"JAN ",
            "ko" => b"KOR ",
            "zh" => {
                let rest = &self.0[2..];
                if rest.contains("hant") || rest.contains("-tw") {
                    b"ZHT "
                } else if rest.contains("-hk") || rest.contains("-mo") {
                    b"ZHH "
                } else {
                    b"ZHS "
                }
            }
            _ => return None,
        };
        Some(Tag::new(bytes))
    }
}

impl From<String> for Language {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// OpenType feature settings: tag -> value (0 = off, 1 = on, n = alternate index).
///
/// Tags the font does not know are ignored at plan time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Features {
    settings: BTreeMap<Tag, u32>,
}

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with common features enabled
    pub fn common() -> Self {
        Self::new()
            .with(Tag::new(b"kern"), 1)
            .with(Tag::new(b"liga"), 1)
    }

    /// Build from `tag -> on/off` pairs, the shape most bindings hand over.
    ///
    /// Tags that are not valid OpenType tags are skipped with a warning.
    pub fn from_flags<'a>(flags: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        let mut features = Self::new();
        for (tag, on) in flags {
            match tag.parse::<Tag>() {
                Ok(tag) => {
                    features.set(tag, u32::from(on));
                }
                Err(err) => warn!(target: "pureshape::features", "ignoring feature flag: {err}"),
            }
        }
        features
    }

    pub fn with(mut self, tag: Tag, value: u32) -> Self {
        self.set(tag, value);
        self
    }

    pub fn set(&mut self, tag: Tag, value: u32) -> &mut Self {
        self.settings.insert(tag, value);
        self
    }

    pub fn enable(&mut self, tag: Tag) -> &mut Self {
        self.set(tag, 1)
    }

    pub fn disable(&mut self, tag: Tag) -> &mut Self {
        self.set(tag, 0)
    }

    pub fn get(&self, tag: Tag) -> Option<u32> {
        self.settings.get(&tag).copied()
    }

    /// Effective value of `tag` given whether it is on by default.
    pub fn value_or_default(&self, tag: Tag, on_by_default: bool) -> u32 {
        self.get(tag).unwrap_or(u32::from(on_by_default))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tag, u32)> + '_ {
        self.settings.iter().map(|(tag, value)| (*tag, *value))
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    fn parse_setting(item: &str) -> Result<(Tag, u32)> {
        let invalid = || ShapeError::InvalidFeature {
            setting: item.to_string(),
        };
        let (body, default_value) = if let Some(rest) = item.strip_prefix('-') {
            (rest, 0)
        } else if let Some(rest) = item.strip_prefix('+') {
            (rest, 1)
        } else {
            (item, 1)
        };
        let (name, value) = match body.split_once('=') {
            Some((name, raw)) => {
                let value = match raw.trim() {
                    "on" | "true" => 1,
                    "off" | "false" => 0,
                    number => number.parse::<u32>().map_err(|_| invalid())?,
                };
                (name.trim(), value)
            }
            None => (body.trim(), default_value),
        };
        let tag = name.parse::<Tag>().map_err(|_| invalid())?;
        Ok((tag, value))
    }
}

impl FromStr for Features {
    type Err = ShapeError;

    /// HarfBuzz-style feature list: `kern,-liga,salt=2 +smcp`.
    fn from_str(s: &str) -> Result<Self> {
        let mut features = Self::new();
        for item in s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|item| !item.is_empty())
        {
            let (tag, value) = Self::parse_setting(item)?;
            features.set(tag, value);
        }
        Ok(features)
    }
}

impl FromIterator<(Tag, u32)> for Features {
    fn from_iter<I: IntoIterator<Item = (Tag, u32)>>(iter: I) -> Self {
        Self {
            settings: iter.into_iter().collect(),
        }
    }
}

/// How initial cluster values are assigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterLevel {
    /// Every codepoint starts in its own cluster.
    #[default]
    Characters,
    /// Codepoints of one extended grapheme cluster share the grapheme's first index.
    Graphemes,
}

/// Options for text segmentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentOptions {
    /// Run the Unicode bidirectional algorithm to resolve run directions
    pub bidi_resolve: bool,
    /// Paragraph direction (or, without bidi resolution, the direction of every run)
    pub direction: Option<Direction>,
    /// Default language (BCP-47 tag)
    pub language: Option<String>,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            bidi_resolve: true,
            direction: None,
            language: None,
        }
    }
}

/// Options for a shaping call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeOptions {
    /// OpenType feature overrides
    pub features: Features,
    /// Target size in pixels; `None` reports positions in font units
    pub size: Option<f32>,
    /// Initial cluster assignment
    pub cluster_level: ClusterLevel,
    /// Segmentation options
    pub segment: SegmentOptions,
}

impl ShapeOptions {
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_cluster_level(mut self, level: ClusterLevel) -> Self {
        self.cluster_level = level;
        self
    }
}

/// Text input in any of the supported encodings.
#[derive(Debug, Clone, Copy)]
pub enum TextInput<'a> {
    Utf8(&'a str),
    /// Unvalidated UTF-8 bytes
    Utf8Bytes(&'a [u8]),
    Utf16(&'a [u16]),
    Utf32(&'a [u32]),
}

impl TextInput<'_> {
    /// Number of code units (bytes, UTF-16 units or UTF-32 units).
    pub fn unit_len(&self) -> usize {
        match self {
            Self::Utf8(text) => text.len(),
            Self::Utf8Bytes(bytes) => bytes.len(),
            Self::Utf16(units) => units.len(),
            Self::Utf32(units) => units.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unit_len() == 0
    }
}

impl<'a> From<&'a str> for TextInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Utf8(text)
    }
}

impl<'a> From<&'a String> for TextInput<'a> {
    fn from(text: &'a String) -> Self {
        Self::Utf8(text.as_str())
    }
}

impl<'a> From<&'a [u16]> for TextInput<'a> {
    fn from(units: &'a [u16]) -> Self {
        Self::Utf16(units)
    }
}

impl<'a> From<&'a [u32]> for TextInput<'a> {
    fn from(units: &'a [u32]) -> Self {
        Self::Utf32(units)
    }
}

/// Text run - a contiguous segment of codepoints with uniform script, direction and language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    /// The codepoints of the run
    pub codepoints: Vec<char>,
    /// Codepoint index of the first codepoint in the segmented input
    pub start: usize,
    /// Resolved script
    pub script: Script,
    /// Text direction
    pub direction: Direction,
    /// Language, when known
    pub language: Option<Language>,
}

impl TextRun {
    pub fn len(&self) -> usize {
        self.codepoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codepoints.is_empty()
    }

    /// Codepoint range covered in the segmented input
    pub fn range(&self) -> (usize, usize) {
        (self.start, self.start + self.codepoints.len())
    }

    pub fn text(&self) -> String {
        self.codepoints.iter().collect()
    }
}

/// Signed fixed-point number with 10 fractional bits (1/1024 units).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Fixed(i32);

impl Fixed {
    pub const FRACTION_BITS: u32 = 10;
    pub const ONE: Fixed = Fixed(1 << Self::FRACTION_BITS);
    pub const ZERO: Fixed = Fixed(0);

    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub const fn to_bits(self) -> i32 {
        self.0
    }

    pub fn from_int(value: i32) -> Self {
        Self(value.saturating_mul(Self::ONE.0))
    }

    /// Nearest representable value.
    pub fn from_f64(value: f64) -> Self {
        Self((value * f64::from(Self::ONE.0)).round() as i32)
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / f64::from(Self::ONE.0)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<f64> for Fixed {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<Fixed> for f64 {
    fn from(value: Fixed) -> Self {
        value.to_f64()
    }
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Fixed) {
        *self = *self + rhs;
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    fn neg(self) -> Fixed {
        Fixed(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Fixed {
    fn sum<I: Iterator<Item = Fixed>>(iter: I) -> Fixed {
        iter.fold(Fixed::ZERO, Add::add)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

/// Positioned glyph, the engine's output unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlyphRecord {
    /// Glyph ID in the font
    pub glyph_id: u32,
    /// Index of the first source codepoint this glyph represents
    pub cluster: u32,
    /// Horizontal advance
    pub x_advance: Fixed,
    /// Vertical advance
    pub y_advance: Fixed,
    /// Horizontal offset from the pen position
    pub x_offset: Fixed,
    /// Vertical offset from the baseline
    pub y_offset: Fixed,
}

impl fmt::Display for GlyphRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gid{}={}@{},{}+{},{}",
            self.glyph_id,
            self.cluster,
            self.x_offset,
            self.y_offset,
            self.x_advance,
            self.y_advance
        )
    }
}

/// Per-run summary attached to a [`ShapingResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedRunInfo {
    /// Codepoint range of the run in the input
    pub range: (usize, usize),
    /// Range of the run's glyphs in [`ShapingResult::glyphs`]
    pub glyph_range: (usize, usize),
    pub script: Script,
    pub direction: Direction,
    pub language: Option<Language>,
    /// The run was shaped without layout tables (cmap + nominal advances only)
    pub fallback: bool,
}

/// Result of text shaping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapingResult {
    /// Positioned glyphs, runs concatenated in logical order
    pub glyphs: Vec<GlyphRecord>,
    /// One entry per shaped run
    pub runs: Vec<ShapedRunInfo>,
    /// Requested size, if positions were scaled
    pub size: Option<f32>,
    /// Units per em of the font that shaped the text
    pub units_per_em: u16,
}

impl ShapingResult {
    pub fn empty(units_per_em: u16, size: Option<f32>) -> Self {
        Self {
            glyphs: Vec::new(),
            runs: Vec::new(),
            size,
            units_per_em,
        }
    }

    /// Total horizontal advance
    pub fn advance(&self) -> Fixed {
        crate::utils::total_advance(&self.glyphs)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
