// this_file: crates/pureshape-font/src/builder.rs

//! Fluent construction of font programs, used by tests, tools and the JSON-less API.

use crate::gpos::PosSubtable;
use crate::gsub::SubstSubtable;
use crate::layout::{FeatureRecord, LayoutTable, Lookup, ScriptRecord};
use crate::program::{FontData, FontProgram, GlyphClass, GlyphId, GlyphInfo, GlyphMetrics};
use pureshape_core::{Result, ShapeError, Tag};

/// Builds a [`FontProgram`] glyph by glyph and feature by feature.
///
/// Glyph 0 is always `.notdef`, with an advance of half an em.
#[derive(Debug, Clone)]
pub struct FontProgramBuilder {
    data: FontData,
    gsub: LayoutTable<SubstSubtable>,
    gpos: LayoutTable<PosSubtable>,
    overflow: bool,
}

impl FontProgramBuilder {
    pub fn new(units_per_em: u16) -> Self {
        let mut builder = Self {
            data: FontData {
                units_per_em,
                ..FontData::default()
            },
            gsub: LayoutTable::default(),
            gpos: LayoutTable::default(),
            overflow: false,
        };
        builder.add_glyph(".notdef", units_per_em / 2);
        builder
    }

    pub fn family_name(&mut self, name: &str) -> &mut Self {
        self.data.family_name = Some(name.to_string());
        self
    }

    /// Append a glyph and return its id.
    pub fn add_glyph(&mut self, name: &str, advance_width: u16) -> GlyphId {
        let id = GlyphId(self.data.glyphs.len().min(usize::from(u16::MAX)) as u16);
        if self.data.glyphs.len() > usize::from(u16::MAX) {
            self.overflow = true;
        }
        self.data.glyphs.push(GlyphInfo {
            name: Some(name.to_string()),
            metrics: GlyphMetrics {
                advance_width,
                left_side_bearing: 0,
            },
            class: GlyphClass::Unclassified,
        });
        id
    }

    /// Append a glyph named after `ch` and map `ch` to it.
    pub fn add_char(&mut self, ch: char, advance_width: u16) -> GlyphId {
        let id = self.add_glyph(&ch.to_string(), advance_width);
        self.map_char(ch, id);
        id
    }

    pub fn map_char(&mut self, ch: char, glyph: GlyphId) -> &mut Self {
        self.data.cmap.insert(u32::from(ch), glyph);
        self
    }

    pub fn set_class(&mut self, glyph: GlyphId, class: GlyphClass) -> &mut Self {
        if let Some(info) = self.data.glyphs.get_mut(glyph.0 as usize) {
            info.class = class;
        }
        self
    }

    pub fn set_side_bearing(&mut self, glyph: GlyphId, left_side_bearing: i16) -> &mut Self {
        if let Some(info) = self.data.glyphs.get_mut(glyph.0 as usize) {
            info.metrics.left_side_bearing = left_side_bearing;
        }
        self
    }

    /// Register a substitution lookup and return its index.
    pub fn add_gsub_lookup(&mut self, lookup: Lookup<SubstSubtable>) -> u16 {
        push_lookup(&mut self.gsub, lookup)
    }

    /// Register a positioning lookup and return its index.
    pub fn add_gpos_lookup(&mut self, lookup: Lookup<PosSubtable>) -> u16 {
        push_lookup(&mut self.gpos, lookup)
    }

    /// Expose `lookups` as GSUB feature `feature` for `script` (and `language`,
    /// or the script's default language system when `None`).
    pub fn add_gsub_feature(
        &mut self,
        script: Tag,
        language: Option<Tag>,
        feature: Tag,
        lookups: &[u16],
    ) -> &mut Self {
        add_feature(&mut self.gsub, script, language, feature, lookups, false);
        self
    }

    pub fn add_gpos_feature(
        &mut self,
        script: Tag,
        language: Option<Tag>,
        feature: Tag,
        lookups: &[u16],
    ) -> &mut Self {
        add_feature(&mut self.gpos, script, language, feature, lookups, false);
        self
    }

    /// Like [`add_gsub_feature`](Self::add_gsub_feature) but as the language
    /// system's required feature.
    pub fn require_gsub_feature(
        &mut self,
        script: Tag,
        language: Option<Tag>,
        feature: Tag,
        lookups: &[u16],
    ) -> &mut Self {
        add_feature(&mut self.gsub, script, language, feature, lookups, true);
        self
    }

    /// Register a script in GSUB with an empty default language system.
    pub fn declare_gsub_script(&mut self, script: Tag) -> &mut Self {
        script_record(&mut self.gsub, script)
            .default_language
            .get_or_insert_with(Default::default);
        self
    }

    /// Register `lookup` and expose it as `feature` in the script's default language system.
    pub fn gsub_feature_with(
        &mut self,
        script: Tag,
        feature: Tag,
        lookup: Lookup<SubstSubtable>,
    ) -> u16 {
        let index = self.add_gsub_lookup(lookup);
        self.add_gsub_feature(script, None, feature, &[index]);
        index
    }

    pub fn gpos_feature_with(
        &mut self,
        script: Tag,
        feature: Tag,
        lookup: Lookup<PosSubtable>,
    ) -> u16 {
        let index = self.add_gpos_lookup(lookup);
        self.add_gpos_feature(script, None, feature, &[index]);
        index
    }

    /// Validate and produce the program.
    pub fn build(&self) -> Result<FontProgram> {
        if self.overflow {
            return Err(ShapeError::font_data("more than 65536 glyphs"));
        }
        let mut data = self.data.clone();
        data.gsub = non_empty(&self.gsub);
        data.gpos = non_empty(&self.gpos);
        FontProgram::new(data)
    }
}

fn non_empty<T: Clone>(table: &LayoutTable<T>) -> Option<LayoutTable<T>> {
    if table.scripts.is_empty() && table.lookups.is_empty() {
        None
    } else {
        Some(table.clone())
    }
}

fn push_lookup<T>(table: &mut LayoutTable<T>, lookup: Lookup<T>) -> u16 {
    table.lookups.push(lookup);
    (table.lookups.len() - 1) as u16
}

fn script_record<T>(table: &mut LayoutTable<T>, script: Tag) -> &mut ScriptRecord {
    table.scripts.entry(script).or_default()
}

fn add_feature<T>(
    table: &mut LayoutTable<T>,
    script: Tag,
    language: Option<Tag>,
    feature: Tag,
    lookups: &[u16],
    required: bool,
) {
    table.features.push(FeatureRecord {
        tag: feature,
        lookup_indices: lookups.to_vec(),
    });
    let feature_index = (table.features.len() - 1) as u16;
    let record = script_record(table, script);
    let lang_sys = match language {
        Some(tag) => record.languages.entry(tag).or_default(),
        None => record.default_language.get_or_insert_with(Default::default),
    };
    if required {
        lang_sys.required_feature = Some(feature_index);
    } else {
        lang_sys.feature_indices.push(feature_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpos::ValueRecord;

    const LATN: Tag = Tag::new(b"latn");

    #[test]
    fn test_builder_glyphs_and_cmap() {
        let mut builder = FontProgramBuilder::new(1000);
        let a = builder.add_char('A', 600);
        let font = builder.build().unwrap();
        assert_eq!(font.num_glyphs(), 2);
        assert_eq!(a, GlyphId(1));
        assert_eq!(font.glyph_index('A'), Some(a));
        assert_eq!(font.advance_width(GlyphId::NOTDEF), 500);
        assert!(font.gsub().is_none());
        assert!(font.gpos().is_none());
    }

    #[test]
    fn test_builder_registers_features() {
        let mut builder = FontProgramBuilder::new(1000);
        let f = builder.add_char('f', 300);
        let i = builder.add_char('i', 250);
        let fi = builder.add_glyph("f_i", 520);
        builder.gsub_feature_with(
            LATN,
            Tag::new(b"liga"),
            Lookup::new(vec![SubstSubtable::ligature([(vec![f, i], fi)])]),
        );
        builder.gpos_feature_with(
            LATN,
            Tag::new(b"kern"),
            Lookup::new(vec![PosSubtable::pair([(
                f,
                i,
                ValueRecord::advance(-10),
                ValueRecord::default(),
            )])]),
        );
        let font = builder.build().unwrap();
        let gsub = font.gsub().unwrap();
        let record = gsub.scripts.get(&LATN).unwrap();
        let lang_sys = record.default_language.as_ref().unwrap();
        assert_eq!(lang_sys.feature_indices, vec![0]);
        assert_eq!(gsub.features[0].tag, Tag::new(b"liga"));
        assert_eq!(font.gpos().unwrap().lookups.len(), 1);
    }

    #[test]
    fn test_builder_rejects_dangling_lookup() {
        let mut builder = FontProgramBuilder::new(1000);
        builder.add_gsub_feature(LATN, None, Tag::new(b"liga"), &[3]);
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("lookup 3"));
    }

    #[test]
    fn test_required_feature() {
        let mut builder = FontProgramBuilder::new(2048);
        let index = builder.add_gsub_lookup(Lookup::new(vec![]));
        builder.require_gsub_feature(LATN, Some(Tag::new(b"TRK ")), Tag::new(b"locl"), &[index]);
        let font = builder.build().unwrap();
        let record = &font.gsub().unwrap().scripts[&LATN];
        assert_eq!(record.languages[&Tag::new(b"TRK ")].required_feature, Some(0));
        assert!(record.default_language.is_none());
    }
}
