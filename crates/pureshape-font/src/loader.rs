// this_file: crates/pureshape-font/src/loader.rs

//! Font file import: memory-mapped TrueType/OpenType (via ttf-parser) or
//! JSON font programs, with an LRU cache of loaded programs.

use crate::gpos::{Anchor, MarkAttachPos, MarkRecord, PosSubtable, ValueRecord};
use crate::gsub::SubstSubtable;
use crate::layout::{
    ChainRule, ClassDef, Coverage, FeatureRecord, LangSys, LayoutTable, Lookup, LookupFlags,
    ScriptRecord, SequenceLookup,
};
use crate::program::{
    FontData, FontId, FontProgram, GlyphClass, GlyphId, GlyphInfo, GlyphMetrics,
};
use log::{debug, warn};
use lru::LruCache;
use memmap2::Mmap;
use parking_lot::Mutex;
use pureshape_core::{Result, ShapeError, Tag};
use std::collections::BTreeMap;
use std::fs::File;
use std::iter;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ttf_parser::opentype_layout::{ChainedContextLookup, ContextLookup};
use ttf_parser::{gdef, gpos, gsub, opentype_layout, Face};

/// Largest font file the loader will map.
pub const MAX_FONT_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Pair adjustment tables are expanded glyph by glyph; beyond this many
/// lookups a format 1 pair subtable is skipped.
const MAX_PAIR_LOOKUPS: usize = 50_000_000;

/// Load a font program from disk.
///
/// `.json` files are read as serialized font programs; everything else is
/// parsed as TrueType/OpenType.
pub fn load_font_file(path: &Path, face_index: u32) -> Result<FontProgram> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ShapeError::font_load(path.to_path_buf(), e))?;
        return FontProgram::from_json(&json)
            .map_err(|e| ShapeError::invalid_font(path.to_path_buf(), e.to_string()));
    }

    let file = File::open(path).map_err(|e| ShapeError::font_load(path.to_path_buf(), e))?;
    let meta = file
        .metadata()
        .map_err(|e| ShapeError::font_load(path.to_path_buf(), e))?;
    if meta.len() > MAX_FONT_FILE_SIZE {
        return Err(ShapeError::invalid_font(
            path.to_path_buf(),
            format!(
                "file is {} bytes, limit is {MAX_FONT_FILE_SIZE}",
                meta.len()
            ),
        ));
    }

    let mmap = unsafe { Mmap::map(&file).map_err(|e| ShapeError::font_load(path.to_path_buf(), e))? };
    font_from_bytes(&mmap, face_index)
        .map_err(|e| ShapeError::invalid_font(path.to_path_buf(), e.to_string()))
}

/// Convert an in-memory TrueType/OpenType face into a font program.
pub fn font_from_bytes(data: &[u8], face_index: u32) -> Result<FontProgram> {
    let face = Face::parse(data, face_index)
        .map_err(|e| ShapeError::font_data(format!("failed to parse face: {e}")))?;
    let num_glyphs = face.number_of_glyphs();
    let gdef = face.tables().gdef;

    let glyphs = (0..num_glyphs)
        .map(|g| {
            let gid = ttf_parser::GlyphId(g);
            GlyphInfo {
                name: face.glyph_name(gid).map(str::to_string),
                metrics: GlyphMetrics {
                    advance_width: face.glyph_hor_advance(gid).unwrap_or(0),
                    left_side_bearing: face.glyph_hor_side_bearing(gid).unwrap_or(0),
                },
                class: match gdef.and_then(|table| table.glyph_class(gid)) {
                    Some(gdef::GlyphClass::Base) => GlyphClass::Base,
                    Some(gdef::GlyphClass::Ligature) => GlyphClass::Ligature,
                    Some(gdef::GlyphClass::Mark) => GlyphClass::Mark,
                    Some(gdef::GlyphClass::Component) => GlyphClass::Component,
                    None => GlyphClass::Unclassified,
                },
            }
        })
        .collect();

    let family_name = face
        .names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::FAMILY)
        .find_map(|name| name.to_string());

    let tables = face.tables();
    let gsub = tables
        .gsub
        .map(|table| convert_table(&table, |lookup| convert_gsub_lookup(lookup, num_glyphs)));
    let gpos = tables
        .gpos
        .map(|table| convert_table(&table, |lookup| convert_gpos_lookup(lookup, num_glyphs)));

    let data = FontData {
        units_per_em: face.units_per_em(),
        family_name,
        glyphs,
        cmap: convert_cmap(&face, num_glyphs),
        gsub,
        gpos,
    };
    debug!(
        target: "pureshape::font",
        "imported face {face_index}: {} glyphs, {} cmap entries",
        data.glyphs.len(),
        data.cmap.len()
    );
    FontProgram::new(data)
}

fn tag(raw: ttf_parser::Tag) -> Tag {
    Tag::new(&raw.to_bytes())
}

fn convert_cmap(face: &Face<'_>, num_glyphs: u16) -> BTreeMap<u32, GlyphId> {
    let mut cmap = BTreeMap::new();
    let Some(table) = face.tables().cmap else {
        return cmap;
    };
    for index in 0..table.subtables.len() {
        let Some(subtable) = table.subtables.get(index) else {
            continue;
        };
        if !subtable.is_unicode() {
            continue;
        }
        subtable.codepoints(|cp| {
            if char::from_u32(cp).is_none() {
                return;
            }
            if let Some(gid) = subtable.glyph_index(cp) {
                if gid.0 < num_glyphs {
                    cmap.entry(cp).or_insert(GlyphId(gid.0));
                }
            }
        });
    }
    cmap
}

fn convert_table<T>(
    table: &opentype_layout::LayoutTable<'_>,
    mut convert_lookup: impl FnMut(&opentype_layout::Lookup<'_>) -> Lookup<T>,
) -> LayoutTable<T> {
    let lookups: Vec<Lookup<T>> = (0..table.lookups.len())
        .map(|index| match table.lookups.get(index) {
            Some(lookup) => convert_lookup(&lookup),
            None => Lookup::new(Vec::new()),
        })
        .collect();
    let lookup_count = lookups.len();
    let feature_count = table.features.len();

    let features = (0..feature_count)
        .filter_map(|index| table.features.get(index))
        .map(|feature| {
            let mut lookup_indices = Vec::new();
            for i in 0..feature.lookup_indices.len() {
                match feature.lookup_indices.get(i) {
                    Some(lookup) if (lookup as usize) < lookup_count => lookup_indices.push(lookup),
                    Some(lookup) => warn!(
                        target: "pureshape::font",
                        "feature '{}' references missing lookup {lookup}",
                        tag(feature.tag)
                    ),
                    None => {}
                }
            }
            FeatureRecord {
                tag: tag(feature.tag),
                lookup_indices,
            }
        })
        .collect::<Vec<_>>();
    let feature_count = features.len();

    let convert_lang_sys = |lang_sys: opentype_layout::LanguageSystem<'_>| {
        let mut feature_indices = Vec::new();
        for i in 0..lang_sys.feature_indices.len() {
            if let Some(feature) = lang_sys.feature_indices.get(i) {
                if (feature as usize) < feature_count {
                    feature_indices.push(feature);
                }
            }
        }
        LangSys {
            required_feature: lang_sys
                .required_feature
                .filter(|feature| (*feature as usize) < feature_count),
            feature_indices,
        }
    };

    let mut scripts = BTreeMap::new();
    for index in 0..table.scripts.len() {
        let Some(script) = table.scripts.get(index) else {
            continue;
        };
        let mut languages = BTreeMap::new();
        for i in 0..script.languages.len() {
            if let Some(lang_sys) = script.languages.get(i) {
                languages.insert(tag(lang_sys.tag), convert_lang_sys(lang_sys));
            }
        }
        scripts.insert(
            tag(script.tag),
            ScriptRecord {
                default_language: script.default_language.map(convert_lang_sys),
                languages,
            },
        );
    }

    LayoutTable {
        scripts,
        features,
        lookups,
    }
}

fn convert_flags(flags: opentype_layout::LookupFlags) -> LookupFlags {
    LookupFlags {
        ignore_base_glyphs: flags.ignore_base_glyphs(),
        ignore_ligatures: flags.ignore_ligatures(),
        ignore_marks: flags.ignore_marks(),
    }
}

/// Covered glyphs in glyph order, paired with their coverage index.
fn covered(coverage: opentype_layout::Coverage<'_>, num_glyphs: u16) -> Vec<(GlyphId, u16)> {
    (0..num_glyphs)
        .filter_map(|g| {
            coverage
                .get(ttf_parser::GlyphId(g))
                .map(|index| (GlyphId(g), index))
        })
        .collect()
}

fn glyphs(array: ttf_parser::LazyArray16<'_, ttf_parser::GlyphId>) -> Vec<GlyphId> {
    (0..array.len())
        .filter_map(|i| array.get(i))
        .map(|gid| GlyphId(gid.0))
        .collect()
}

fn convert_gsub_lookup(lookup: &opentype_layout::Lookup<'_>, num_glyphs: u16) -> Lookup<SubstSubtable> {
    let mut subtables = Vec::new();
    for index in 0..lookup.subtables.len() {
        let converted = match lookup.subtables.get::<gsub::SubstitutionSubtable>(index) {
            Some(gsub::SubstitutionSubtable::Single(single)) => Some(match single {
                gsub::SingleSubstitution::Format1 { coverage, delta } => SubstSubtable::single(
                    covered(coverage, num_glyphs)
                        .into_iter()
                        .map(|(g, _)| (g, GlyphId(g.0.wrapping_add(delta as u16)))),
                ),
                gsub::SingleSubstitution::Format2 {
                    coverage,
                    substitutes,
                } => SubstSubtable::single(covered(coverage, num_glyphs).into_iter().filter_map(
                    |(g, index)| substitutes.get(index).map(|sub| (g, GlyphId(sub.0))),
                )),
            }),
            Some(gsub::SubstitutionSubtable::Multiple(multiple)) => Some(SubstSubtable::multiple(
                covered(multiple.coverage, num_glyphs)
                    .into_iter()
                    .filter_map(|(g, index)| {
                        multiple
                            .sequences
                            .get(index)
                            .map(|sequence| (g, glyphs(sequence.substitutes)))
                    }),
            )),
            Some(gsub::SubstitutionSubtable::Alternate(alternate)) => {
                Some(SubstSubtable::alternate(
                    covered(alternate.coverage, num_glyphs)
                        .into_iter()
                        .filter_map(|(g, index)| {
                            alternate
                                .alternate_sets
                                .get(index)
                                .map(|set| (g, glyphs(set.alternates)))
                        }),
                ))
            }
            Some(gsub::SubstitutionSubtable::Ligature(ligature)) => {
                let mut rules = Vec::new();
                for (first, index) in covered(ligature.coverage, num_glyphs) {
                    let Some(set) = ligature.ligature_sets.get(index) else {
                        continue;
                    };
                    for i in 0..set.len() {
                        if let Some(lig) = set.get(i) {
                            let mut components = vec![first];
                            components.extend(glyphs(lig.components));
                            rules.push((components, GlyphId(lig.glyph.0)));
                        }
                    }
                }
                Some(SubstSubtable::ligature(rules))
            }
            Some(gsub::SubstitutionSubtable::Context(context)) => {
                subtables.extend(convert_context(context, num_glyphs).map(SubstSubtable::Context));
                continue;
            }
            Some(gsub::SubstitutionSubtable::ChainContext(context)) => {
                subtables.extend(
                    convert_chain_context(context, num_glyphs).map(SubstSubtable::Context),
                );
                continue;
            }
            Some(gsub::SubstitutionSubtable::ReverseChainSingle(_)) => {
                warn!(
                    target: "pureshape::font",
                    "reverse chaining substitution is not supported, subtable {index} skipped"
                );
                None
            }
            None => {
                warn!(target: "pureshape::font", "malformed substitution subtable {index} skipped");
                None
            }
        };
        if let Some(subtable) = converted {
            subtables.push(subtable);
        }
    }
    Lookup::new(subtables).with_flags(convert_flags(lookup.flags))
}

/// Glyphs of a font grouped by their class in one class definition.
struct ClassMembers(Vec<Vec<GlyphId>>);

impl ClassMembers {
    fn new(classes: opentype_layout::ClassDefinition<'_>, num_glyphs: u16) -> Self {
        let mut members: Vec<Vec<GlyphId>> = Vec::new();
        for g in 0..num_glyphs {
            let class = classes.get(ttf_parser::GlyphId(g)) as usize;
            if members.len() <= class {
                members.resize_with(class + 1, Vec::new);
            }
            members[class].push(GlyphId(g));
        }
        Self(members)
    }

    fn coverage(&self, class: u16) -> Coverage {
        Coverage::new(self.0.get(class as usize).into_iter().flatten().copied())
    }

    fn coverages(&self, classes: ttf_parser::LazyArray16<'_, u16>) -> Vec<Coverage> {
        classes.into_iter().map(|class| self.coverage(class)).collect()
    }
}

fn coverage_of(coverage: opentype_layout::Coverage<'_>, num_glyphs: u16) -> Coverage {
    Coverage::new(covered(coverage, num_glyphs).into_iter().map(|(g, _)| g))
}

/// The `count` coverages `get` yields; `None` when any of them is null or unreadable.
fn coverages_of<'a>(
    count: u16,
    get: impl Fn(u16) -> Option<opentype_layout::Coverage<'a>>,
    num_glyphs: u16,
) -> Option<Vec<Coverage>> {
    (0..count)
        .map(|i| get(i).map(|coverage| coverage_of(coverage, num_glyphs)))
        .collect()
}

fn single_glyphs(array: ttf_parser::LazyArray16<'_, u16>) -> Vec<Coverage> {
    array.into_iter().map(|g| Coverage::new([GlyphId(g)])).collect()
}

fn actions(
    records: ttf_parser::LazyArray16<'_, opentype_layout::SequenceLookupRecord>,
) -> Vec<SequenceLookup> {
    records
        .into_iter()
        .map(|record| SequenceLookup {
            sequence_index: record.sequence_index,
            lookup_index: record.lookup_list_index,
        })
        .collect()
}

/// First-glyph coverage of the rule set for `class`, restricted to the
/// subtable's coverage.
fn first_glyphs_in_class(
    firsts: &[(GlyphId, u16)],
    classes: opentype_layout::ClassDefinition<'_>,
    class: u16,
) -> Coverage {
    Coverage::new(
        firsts
            .iter()
            .map(|(g, _)| *g)
            .filter(|g| classes.get(ttf_parser::GlyphId(g.0)) == class),
    )
}

/// Expand a contextual subtable into coverage-form rules, in rule order.
fn convert_context(
    context: ContextLookup<'_>,
    num_glyphs: u16,
) -> impl Iterator<Item = ChainRule> {
    let mut rules = Vec::new();
    match context {
        ContextLookup::Format1 { coverage, sets } => {
            for (first, index) in covered(coverage, num_glyphs) {
                let Some(set) = sets.get(index) else {
                    continue;
                };
                for rule in set {
                    rules.push(ChainRule {
                        input: iter::once(Coverage::new([first]))
                            .chain(single_glyphs(rule.input))
                            .collect(),
                        actions: actions(rule.lookups),
                        ..ChainRule::default()
                    });
                }
            }
        }
        ContextLookup::Format2 {
            coverage,
            classes,
            sets,
        } => {
            let firsts = covered(coverage, num_glyphs);
            let members = ClassMembers::new(classes, num_glyphs);
            for class in 0..sets.len() {
                let Some(set) = sets.get(class) else {
                    continue;
                };
                let first = first_glyphs_in_class(&firsts, classes, class);
                if first.is_empty() {
                    continue;
                }
                for rule in set {
                    rules.push(ChainRule {
                        input: iter::once(first.clone())
                            .chain(members.coverages(rule.input))
                            .collect(),
                        actions: actions(rule.lookups),
                        ..ChainRule::default()
                    });
                }
            }
        }
        ContextLookup::Format3 {
            coverage,
            coverages,
            lookups,
        } => match coverages_of(coverages.len(), |i| coverages.get(i), num_glyphs) {
            Some(rest) => rules.push(ChainRule {
                input: iter::once(coverage_of(coverage, num_glyphs)).chain(rest).collect(),
                actions: actions(lookups),
                ..ChainRule::default()
            }),
            None => warn!(target: "pureshape::font", "contextual rule with a missing coverage skipped"),
        },
    }
    rules.into_iter()
}

/// Expand a chained contextual subtable into coverage-form rules, in rule order.
fn convert_chain_context(
    context: ChainedContextLookup<'_>,
    num_glyphs: u16,
) -> impl Iterator<Item = ChainRule> {
    let mut rules = Vec::new();
    match context {
        ChainedContextLookup::Format1 { coverage, sets } => {
            for (first, index) in covered(coverage, num_glyphs) {
                let Some(set) = sets.get(index) else {
                    continue;
                };
                for rule in set {
                    rules.push(ChainRule {
                        backtrack: single_glyphs(rule.backtrack),
                        input: iter::once(Coverage::new([first]))
                            .chain(single_glyphs(rule.input))
                            .collect(),
                        lookahead: single_glyphs(rule.lookahead),
                        actions: actions(rule.lookups),
                    });
                }
            }
        }
        ChainedContextLookup::Format2 {
            coverage,
            backtrack_classes,
            input_classes,
            lookahead_classes,
            sets,
        } => {
            let firsts = covered(coverage, num_glyphs);
            let backtrack = ClassMembers::new(backtrack_classes, num_glyphs);
            let input = ClassMembers::new(input_classes, num_glyphs);
            let lookahead = ClassMembers::new(lookahead_classes, num_glyphs);
            for class in 0..sets.len() {
                let Some(set) = sets.get(class) else {
                    continue;
                };
                let first = first_glyphs_in_class(&firsts, input_classes, class);
                if first.is_empty() {
                    continue;
                }
                for rule in set {
                    rules.push(ChainRule {
                        backtrack: backtrack.coverages(rule.backtrack),
                        input: iter::once(first.clone())
                            .chain(input.coverages(rule.input))
                            .collect(),
                        lookahead: lookahead.coverages(rule.lookahead),
                        actions: actions(rule.lookups),
                    });
                }
            }
        }
        ChainedContextLookup::Format3 {
            coverage,
            backtrack_coverages,
            input_coverages,
            lookahead_coverages,
            lookups,
        } => {
            let parts = (
                coverages_of(backtrack_coverages.len(), |i| backtrack_coverages.get(i), num_glyphs),
                coverages_of(input_coverages.len(), |i| input_coverages.get(i), num_glyphs),
                coverages_of(lookahead_coverages.len(), |i| lookahead_coverages.get(i), num_glyphs),
            );
            match parts {
                (Some(backtrack), Some(rest), Some(lookahead)) => rules.push(ChainRule {
                    backtrack,
                    input: iter::once(coverage_of(coverage, num_glyphs)).chain(rest).collect(),
                    lookahead,
                    actions: actions(lookups),
                }),
                _ => warn!(
                    target: "pureshape::font",
                    "chained contextual rule with a missing coverage skipped"
                ),
            }
        }
    }
    rules.into_iter()
}

fn value(record: gpos::ValueRecord<'_>) -> ValueRecord {
    ValueRecord {
        x_placement: record.x_placement,
        y_placement: record.y_placement,
        x_advance: record.x_advance,
        y_advance: record.y_advance,
    }
}

fn anchor(raw: gpos::Anchor<'_>) -> Anchor {
    Anchor::new(raw.x, raw.y)
}

fn convert_mark_attach(
    mark_coverage: opentype_layout::Coverage<'_>,
    base_coverage: opentype_layout::Coverage<'_>,
    marks: gpos::MarkArray<'_>,
    anchors: gpos::AnchorMatrix<'_>,
    num_glyphs: u16,
) -> MarkAttachPos {
    let mark_records: Vec<(GlyphId, MarkRecord)> = covered(mark_coverage, num_glyphs)
        .into_iter()
        .filter_map(|(g, index)| {
            marks.get(index).map(|(class, raw)| {
                (
                    g,
                    MarkRecord {
                        class,
                        anchor: anchor(raw),
                    },
                )
            })
        })
        .collect();
    let class_count = mark_records
        .iter()
        .map(|(_, record)| record.class + 1)
        .max()
        .unwrap_or(0);
    let bases = covered(base_coverage, num_glyphs)
        .into_iter()
        .map(|(g, row)| {
            let slots = (0..class_count)
                .map(|class| anchors.get(row, class).map(anchor))
                .collect();
            (g, slots)
        });
    MarkAttachPos::from_records(mark_records, bases)
}

fn convert_gpos_lookup(lookup: &opentype_layout::Lookup<'_>, num_glyphs: u16) -> Lookup<PosSubtable> {
    let mut subtables = Vec::new();
    for index in 0..lookup.subtables.len() {
        let converted = match lookup.subtables.get::<gpos::PositioningSubtable>(index) {
            Some(gpos::PositioningSubtable::Single(single)) => Some(match single {
                gpos::SingleAdjustment::Format1 { coverage, value: v } => {
                    let v = value(v);
                    PosSubtable::single(
                        covered(coverage, num_glyphs)
                            .into_iter()
                            .map(|(g, _)| (g, v)),
                    )
                }
                gpos::SingleAdjustment::Format2 { coverage, values } => PosSubtable::single(
                    covered(coverage, num_glyphs)
                        .into_iter()
                        .filter_map(|(g, index)| values.get(index).map(|v| (g, value(v)))),
                ),
            }),
            Some(gpos::PositioningSubtable::Pair(pair)) => convert_pair(pair, num_glyphs),
            Some(gpos::PositioningSubtable::MarkToBase(attach)) => {
                Some(PosSubtable::MarkToBase(convert_mark_attach(
                    attach.mark_coverage,
                    attach.base_coverage,
                    attach.marks,
                    attach.anchors,
                    num_glyphs,
                )))
            }
            Some(gpos::PositioningSubtable::MarkToMark(attach)) => {
                Some(PosSubtable::MarkToMark(convert_mark_attach(
                    attach.mark1_coverage,
                    attach.mark2_coverage,
                    attach.marks,
                    attach.mark2_matrix,
                    num_glyphs,
                )))
            }
            Some(gpos::PositioningSubtable::Context(context)) => {
                subtables.extend(convert_context(context, num_glyphs).map(PosSubtable::Context));
                continue;
            }
            Some(gpos::PositioningSubtable::ChainContext(context)) => {
                subtables.extend(
                    convert_chain_context(context, num_glyphs).map(PosSubtable::Context),
                );
                continue;
            }
            Some(gpos::PositioningSubtable::Cursive(_)) => {
                warn!(
                    target: "pureshape::font",
                    "cursive attachment is not supported, subtable {index} skipped"
                );
                None
            }
            Some(gpos::PositioningSubtable::MarkToLigature(_)) => {
                warn!(
                    target: "pureshape::font",
                    "mark-to-ligature attachment is not supported, subtable {index} skipped"
                );
                None
            }
            None => {
                warn!(target: "pureshape::font", "malformed positioning subtable {index} skipped");
                None
            }
        };
        if let Some(subtable) = converted {
            subtables.push(subtable);
        }
    }
    Lookup::new(subtables).with_flags(convert_flags(lookup.flags))
}

fn convert_pair(pair: gpos::PairAdjustment<'_>, num_glyphs: u16) -> Option<PosSubtable> {
    match pair {
        gpos::PairAdjustment::Format1 { coverage, sets } => {
            let firsts = covered(coverage, num_glyphs);
            if firsts.len().saturating_mul(num_glyphs as usize) > MAX_PAIR_LOOKUPS {
                warn!(
                    target: "pureshape::font",
                    "pair subtable with {} first glyphs is too large to import",
                    firsts.len()
                );
                return None;
            }
            let mut pairs = Vec::new();
            for (first, index) in firsts {
                let Some(set) = sets.get(index) else {
                    continue;
                };
                for second in 0..num_glyphs {
                    if let Some((v1, v2)) = set.get(ttf_parser::GlyphId(second)) {
                        pairs.push((first, GlyphId(second), value(v1), value(v2)));
                    }
                }
            }
            Some(PosSubtable::pair(pairs))
        }
        gpos::PairAdjustment::Format2 {
            coverage,
            classes,
            matrix,
        } => {
            let firsts = covered(coverage, num_glyphs);
            let class_def1 = ClassDef::new(
                firsts
                    .iter()
                    .map(|(g, _)| (*g, classes.0.get(ttf_parser::GlyphId(g.0)))),
            );
            let class_def2 = ClassDef::new(
                (0..num_glyphs).map(|g| (GlyphId(g), classes.1.get(ttf_parser::GlyphId(g)))),
            );
            let matrix = (0..class_def1.class_count() as u16)
                .map(|c1| {
                    (0..class_def2.class_count() as u16)
                        .map(|c2| {
                            matrix
                                .get((c1, c2))
                                .map(|(v1, v2)| (value(v1), value(v2)))
                                .unwrap_or_default()
                        })
                        .collect()
                })
                .collect();
            Some(PosSubtable::class_pair(
                Coverage::new(firsts.into_iter().map(|(g, _)| g)),
                class_def1,
                class_def2,
                matrix,
            ))
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct FontKey {
    path: PathBuf,
    face_index: u32,
}

/// Loader statistics for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderStats {
    /// Maximum number of cached programs.
    pub capacity: usize,
    /// Currently cached programs.
    pub entries: usize,
}

/// Loads font programs from disk and keeps the most recently used ones.
///
/// Programs that leave the cache are remembered by id until
/// [`take_evicted`](Self::take_evicted) so plan caches keyed by font can
/// drop their entries.
pub struct FontLoader {
    cache: Mutex<LruCache<FontKey, Arc<FontProgram>>>,
    evicted: Mutex<Vec<FontId>>,
}

impl FontLoader {
    /// Create a new font loader with specified cache size.
    pub fn new(cache_size: usize) -> Self {
        let cache_size = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cache_size)),
            evicted: Mutex::new(Vec::new()),
        }
    }

    /// Load a font program, returning the cached one if available.
    pub fn load(&self, path: &Path, face_index: u32) -> Result<Arc<FontProgram>> {
        let key = FontKey {
            path: path.to_path_buf(),
            face_index,
        };
        if let Some(program) = self.cache.lock().get(&key) {
            return Ok(Arc::clone(program));
        }

        // Parsing happens outside the lock; a concurrent load of the same file
        // may parse twice, and the later insert wins.
        let program = Arc::new(load_font_file(path, face_index)?);
        let displaced = self.cache.lock().push(key, Arc::clone(&program));
        if let Some((key, old)) = displaced {
            debug!(
                target: "pureshape::font",
                "evicted {} (face {}) as {}",
                key.path.display(),
                key.face_index,
                old.id()
            );
            self.evicted.lock().push(old.id());
        }
        Ok(program)
    }

    /// Ids of programs dropped from the cache since the last call.
    pub fn take_evicted(&self) -> Vec<FontId> {
        std::mem::take(&mut *self.evicted.lock())
    }

    /// Clear all cached programs.
    pub fn clear(&self) {
        let mut cache = self.cache.lock();
        self.evicted
            .lock()
            .extend(cache.iter().map(|(_, program)| program.id()));
        cache.clear();
    }

    /// Resize the cache to the requested capacity (drops old entries).
    pub fn set_capacity(&self, cache_size: usize) {
        let cap = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        let mut cache = self.cache.lock();
        if cache.cap() != cap {
            self.evicted
                .lock()
                .extend(cache.iter().map(|(_, program)| program.id()));
            *cache = LruCache::new(cap);
        }
    }

    pub fn stats(&self) -> LoaderStats {
        let cache = self.cache.lock();
        LoaderStats {
            capacity: cache.cap().get(),
            entries: cache.len(),
        }
    }
}

impl Default for FontLoader {
    fn default() -> Self {
        Self::new(512)
    }
}
