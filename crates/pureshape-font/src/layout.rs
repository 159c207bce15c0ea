// this_file: crates/pureshape-font/src/layout.rs

//! Script/feature/lookup structure shared by the substitution and positioning tables.

use crate::program::{GlyphClass, GlyphId};
use pureshape_core::Tag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sorted set of glyphs; a glyph's position in the set is its coverage index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GlyphId>", into = "Vec<GlyphId>")]
pub struct Coverage {
    glyphs: Vec<GlyphId>,
}

impl Coverage {
    /// Build from any glyph order; duplicates are dropped.
    pub fn new(glyphs: impl IntoIterator<Item = GlyphId>) -> Self {
        let mut glyphs: Vec<GlyphId> = glyphs.into_iter().collect();
        glyphs.sort_unstable();
        glyphs.dedup();
        Self { glyphs }
    }

    /// Get coverage index for a glyph ID
    pub fn get(&self, glyph: GlyphId) -> Option<usize> {
        self.glyphs.binary_search(&glyph).ok()
    }

    pub fn contains(&self, glyph: GlyphId) -> bool {
        self.get(glyph).is_some()
    }

    pub fn glyphs(&self) -> &[GlyphId] {
        &self.glyphs
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl TryFrom<Vec<GlyphId>> for Coverage {
    type Error = String;

    fn try_from(glyphs: Vec<GlyphId>) -> Result<Self, String> {
        if glyphs.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err("coverage glyphs must be strictly ascending".to_string());
        }
        Ok(Self { glyphs })
    }
}

impl From<Coverage> for Vec<GlyphId> {
    fn from(coverage: Coverage) -> Self {
        coverage.glyphs
    }
}

/// Glyph -> class mapping; unlisted glyphs are class 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassDef {
    classes: BTreeMap<GlyphId, u16>,
}

impl ClassDef {
    pub fn new(classes: impl IntoIterator<Item = (GlyphId, u16)>) -> Self {
        Self {
            classes: classes.into_iter().filter(|(_, class)| *class != 0).collect(),
        }
    }

    pub fn get(&self, glyph: GlyphId) -> u16 {
        self.classes.get(&glyph).copied().unwrap_or(0)
    }

    /// Number of classes including class 0
    pub fn class_count(&self) -> usize {
        self.classes.values().copied().max().map_or(1, |max| max as usize + 1)
    }
}

/// Which glyph classes a lookup skips over while matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupFlags {
    pub ignore_base_glyphs: bool,
    pub ignore_ligatures: bool,
    pub ignore_marks: bool,
}

impl LookupFlags {
    pub const IGNORE_MARKS: LookupFlags = LookupFlags {
        ignore_base_glyphs: false,
        ignore_ligatures: false,
        ignore_marks: true,
    };

    /// True if a glyph of `class` is invisible to the lookup.
    pub fn ignores(&self, class: GlyphClass) -> bool {
        match class {
            GlyphClass::Base => self.ignore_base_glyphs,
            GlyphClass::Ligature => self.ignore_ligatures,
            GlyphClass::Mark => self.ignore_marks,
            GlyphClass::Unclassified | GlyphClass::Component => false,
        }
    }
}

/// An ordered list of subtables applied as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup<T> {
    #[serde(default)]
    pub flags: LookupFlags,
    /// Values replace the glyph's accumulated adjustment instead of adding to it
    #[serde(default)]
    pub exclusive: bool,
    pub subtables: Vec<T>,
}

impl<T> Lookup<T> {
    pub fn new(subtables: Vec<T>) -> Self {
        Self {
            flags: LookupFlags::default(),
            exclusive: false,
            subtables,
        }
    }

    pub fn with_flags(mut self, flags: LookupFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }
}

/// Per-language list of features.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangSys {
    /// Feature applied regardless of the caller's settings
    #[serde(default)]
    pub required_feature: Option<u16>,
    #[serde(default)]
    pub feature_indices: Vec<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    #[serde(default)]
    pub default_language: Option<LangSys>,
    #[serde(default)]
    pub languages: BTreeMap<Tag, LangSys>,
}

impl ScriptRecord {
    /// LangSys for `language`, falling back to the script default.
    pub fn lang_sys(&self, language: Option<Tag>) -> Option<(Option<Tag>, &LangSys)> {
        if let Some(found) = language.and_then(|tag| self.languages.get(&tag).map(|ls| (tag, ls))) {
            return Some((Some(found.0), found.1));
        }
        self.default_language.as_ref().map(|ls| (None, ls))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub tag: Tag,
    pub lookup_indices: Vec<u16>,
}

/// A GSUB- or GPOS-style table: scripts -> language systems -> features -> lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutTable<T> {
    #[serde(default)]
    pub scripts: BTreeMap<Tag, ScriptRecord>,
    #[serde(default)]
    pub features: Vec<FeatureRecord>,
    #[serde(default = "Vec::new")]
    pub lookups: Vec<Lookup<T>>,
}

impl<T> Default for LayoutTable<T> {
    fn default() -> Self {
        Self {
            scripts: BTreeMap::new(),
            features: Vec::new(),
            lookups: Vec::new(),
        }
    }
}

impl<T> LayoutTable<T> {
    /// First script record among `tags`, in order.
    pub fn find_script(&self, tags: &[Tag]) -> Option<(Tag, &ScriptRecord)> {
        tags.iter()
            .find_map(|tag| self.scripts.get(tag).map(|record| (*tag, record)))
    }

    pub fn feature(&self, index: u16) -> Option<&FeatureRecord> {
        self.features.get(index as usize)
    }

    pub fn lookup(&self, index: u16) -> Option<&Lookup<T>> {
        self.lookups.get(index as usize)
    }

    /// Describe the first dangling feature or lookup reference, if any.
    pub fn check_references(&self) -> Option<String> {
        for (script, record) in &self.scripts {
            let systems = record.default_language.iter().chain(record.languages.values());
            for lang_sys in systems {
                let indices = lang_sys.feature_indices.iter().chain(&lang_sys.required_feature);
                for &index in indices {
                    if index as usize >= self.features.len() {
                        return Some(format!(
                            "script '{script}' references feature {index} of {}",
                            self.features.len()
                        ));
                    }
                }
            }
        }
        for feature in &self.features {
            for &index in &feature.lookup_indices {
                if index as usize >= self.lookups.len() {
                    return Some(format!(
                        "feature '{}' references lookup {index} of {}",
                        feature.tag,
                        self.lookups.len()
                    ));
                }
            }
        }
        None
    }
}

/// Nested lookup applied at one position of a matched input sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceLookup {
    pub sequence_index: u16,
    pub lookup_index: u16,
}

/// Chained contextual rule in coverage form.
///
/// `backtrack[0]` matches the glyph immediately before the input sequence,
/// `backtrack[1]` the one before that, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRule {
    #[serde(default)]
    pub backtrack: Vec<Coverage>,
    pub input: Vec<Coverage>,
    #[serde(default)]
    pub lookahead: Vec<Coverage>,
    #[serde(default)]
    pub actions: Vec<SequenceLookup>,
}
