// this_file: crates/pureshape-font/src/program.rs

//! The read-only font program consumed by the shaping engine.

use crate::gpos::PosSubtable;
use crate::gsub::SubstSubtable;
use crate::layout::LayoutTable;
use log::debug;
use pureshape_core::{Result, ShapeError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Glyph index within a font program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlyphId(pub u16);

impl GlyphId {
    pub const NOTDEF: GlyphId = GlyphId(0);

    pub fn to_u32(self) -> u32 {
        u32::from(self.0)
    }
}

impl fmt::Display for GlyphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// GDEF-style glyph class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphClass {
    #[default]
    Unclassified,
    Base,
    Ligature,
    Mark,
    Component,
}

/// Horizontal metrics in font units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphMetrics {
    pub advance_width: u16,
    #[serde(default)]
    pub left_side_bearing: i16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlyphInfo {
    #[serde(default)]
    pub name: Option<String>,
    pub metrics: GlyphMetrics,
    #[serde(default)]
    pub class: GlyphClass,
}

/// Process-unique identity of a built font program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontId(u64);

impl FontId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font#{}", self.0)
    }
}

/// Serializable contents of a font program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontData {
    pub units_per_em: u16,
    #[serde(default)]
    pub family_name: Option<String>,
    pub glyphs: Vec<GlyphInfo>,
    /// Unicode scalar value -> glyph
    #[serde(default)]
    pub cmap: BTreeMap<u32, GlyphId>,
    #[serde(default)]
    pub gsub: Option<LayoutTable<SubstSubtable>>,
    #[serde(default)]
    pub gpos: Option<LayoutTable<PosSubtable>>,
}

/// Immutable font program: metrics, cmap, glyph classes and layout tables.
///
/// Every program gets a fresh [`FontId`] when it is constructed or
/// deserialized; plan caches key on that id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "FontData", into = "FontData")]
pub struct FontProgram {
    id: FontId,
    data: FontData,
    names: HashMap<String, GlyphId>,
    has_glyph_classes: bool,
}

impl FontProgram {
    /// Validate `data` and wrap it in a program with a new identity.
    pub fn new(data: FontData) -> Result<Self> {
        validate(&data)?;
        let names = data
            .glyphs
            .iter()
            .enumerate()
            .filter_map(|(index, glyph)| {
                let name = glyph.name.clone()?;
                Some((name, GlyphId(index as u16)))
            })
            .collect();
        let has_glyph_classes = data
            .glyphs
            .iter()
            .any(|glyph| glyph.class != GlyphClass::Unclassified);
        let program = Self {
            id: FontId::next(),
            data,
            names,
            has_glyph_classes,
        };
        debug!(
            target: "pureshape::font",
            "built {} with {} glyphs, upem={}, gsub={}, gpos={}",
            program.id,
            program.num_glyphs(),
            program.units_per_em(),
            program.data.gsub.is_some(),
            program.data.gpos.is_some()
        );
        Ok(program)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.data)?)
    }

    pub fn id(&self) -> FontId {
        self.id
    }

    pub fn data(&self) -> &FontData {
        &self.data
    }

    pub fn units_per_em(&self) -> u16 {
        self.data.units_per_em
    }

    pub fn family_name(&self) -> Option<&str> {
        self.data.family_name.as_deref()
    }

    pub fn num_glyphs(&self) -> usize {
        self.data.glyphs.len()
    }

    /// Glyph mapped to `ch` by the cmap
    pub fn glyph_index(&self, ch: char) -> Option<GlyphId> {
        self.data.cmap.get(&u32::from(ch)).copied()
    }

    /// Glyph for `ch`, `.notdef` when unmapped
    pub fn nominal_glyph(&self, ch: char) -> GlyphId {
        self.glyph_index(ch).unwrap_or(GlyphId::NOTDEF)
    }

    pub fn glyph_metrics(&self, glyph: GlyphId) -> Option<GlyphMetrics> {
        self.data.glyphs.get(glyph.0 as usize).map(|g| g.metrics)
    }

    /// Advance width, 0 for glyphs outside the font
    pub fn advance_width(&self, glyph: GlyphId) -> u16 {
        self.glyph_metrics(glyph).map_or(0, |m| m.advance_width)
    }

    pub fn glyph_class(&self, glyph: GlyphId) -> GlyphClass {
        self.data
            .glyphs
            .get(glyph.0 as usize)
            .map_or(GlyphClass::Unclassified, |g| g.class)
    }

    /// Whether the font classifies any glyph at all
    pub fn has_glyph_classes(&self) -> bool {
        self.has_glyph_classes
    }

    pub fn glyph_name(&self, glyph: GlyphId) -> Option<&str> {
        self.data.glyphs.get(glyph.0 as usize)?.name.as_deref()
    }

    pub fn glyph_by_name(&self, name: &str) -> Option<GlyphId> {
        self.names.get(name).copied()
    }

    pub fn gsub(&self) -> Option<&LayoutTable<SubstSubtable>> {
        self.data.gsub.as_ref()
    }

    pub fn gpos(&self) -> Option<&LayoutTable<PosSubtable>> {
        self.data.gpos.as_ref()
    }

    /// Re-run the structural checks performed at construction.
    pub fn validate(&self) -> Result<()> {
        validate(&self.data)
    }
}

impl PartialEq for FontProgram {
    /// Content equality; identities are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl TryFrom<FontData> for FontProgram {
    type Error = ShapeError;

    fn try_from(data: FontData) -> Result<Self> {
        Self::new(data)
    }
}

impl From<FontProgram> for FontData {
    fn from(program: FontProgram) -> Self {
        program.data
    }
}

fn validate(data: &FontData) -> Result<()> {
    if !(16..=16384).contains(&data.units_per_em) {
        return Err(ShapeError::font_data(format!(
            "units per em {} outside 16..=16384",
            data.units_per_em
        )));
    }
    if data.glyphs.is_empty() {
        return Err(ShapeError::font_data("font has no glyphs"));
    }
    if data.glyphs.len() > usize::from(u16::MAX) + 1 {
        return Err(ShapeError::font_data(format!(
            "{} glyphs exceed the 65536 glyph limit",
            data.glyphs.len()
        )));
    }
    if let Some((cp, glyph)) = data
        .cmap
        .iter()
        .find(|(_, glyph)| glyph.0 as usize >= data.glyphs.len())
    {
        return Err(ShapeError::font_data(format!(
            "cmap maps U+{cp:04X} to glyph {glyph} of {}",
            data.glyphs.len()
        )));
    }
    if let Some(problem) = data.gsub.as_ref().and_then(|t| t.check_references()) {
        return Err(ShapeError::font_data(format!("GSUB: {problem}")));
    }
    if let Some(problem) = data.gpos.as_ref().and_then(|t| t.check_references()) {
        return Err(ShapeError::font_data(format!("GPOS: {problem}")));
    }
    Ok(())
}
