// this_file: crates/pureshape-font/tests/opentype_import.rs

//! Imports a small hand-assembled OpenType face and checks that glyph
//! classes and layout lookups come through.

use pureshape_core::Tag;
use pureshape_font::{
    font_from_bytes, load_font_file, ChainRule, Coverage, FontProgram, GlyphClass, GlyphId,
    PosSubtable, SequenceLookup, SubstSubtable, ValueRecord,
};
use std::io::Write;

const NOTDEF: u16 = 0;
const F: u16 = 1;
const I: u16 = 2;
const F_I: u16 = 3;
const A: u16 = 4;
const V: u16 = 5;
const ACUTE: u16 = 6;
const I_ALT: u16 = 7;
const NUM_GLYPHS: u16 = 8;

/// Placeholder for an offset to the next child in [`pack`].
const OFFSET: Option<u16> = None;

/// Writes `fields` as big-endian words followed by `children`; each `None`
/// field becomes the offset of the next child from the start of the record.
fn pack(fields: &[Option<u16>], children: Vec<Vec<u8>>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut next = fields.len() * 2;
    let mut pending = children.iter();
    for field in fields {
        let word = match field {
            Some(value) => *value,
            None => {
                let offset = next as u16;
                next += pending.next().map_or(0, Vec::len);
                offset
            }
        };
        out.extend_from_slice(&word.to_be_bytes());
    }
    for child in children {
        out.extend(child);
    }
    out
}

fn words(values: &[u16]) -> Vec<Option<u16>> {
    values.iter().copied().map(Some).collect()
}

fn tag_words(tag: &[u8; 4]) -> [Option<u16>; 2] {
    [
        Some(u16::from_be_bytes([tag[0], tag[1]])),
        Some(u16::from_be_bytes([tag[2], tag[3]])),
    ]
}

fn coverage(glyphs: &[u16]) -> Vec<u8> {
    let mut fields = words(&[1, glyphs.len() as u16]);
    fields.extend(words(glyphs));
    pack(&fields, vec![])
}

/// Class definition format 1 over `start..start + classes.len()`.
fn class_def(start: u16, classes: &[u16]) -> Vec<u8> {
    let mut fields = words(&[1, start, classes.len() as u16]);
    fields.extend(words(classes));
    pack(&fields, vec![])
}

fn lookup(kind: u16, subtable: Vec<u8>) -> Vec<u8> {
    pack(&[Some(kind), Some(0), Some(1), OFFSET], vec![subtable])
}

/// GSUB/GPOS table with one `latn` default language system using every feature.
fn layout_table(features: &[(&[u8; 4], Vec<u16>)], lookups: Vec<Vec<u8>>) -> Vec<u8> {
    let feature_count = features.len() as u16;
    let mut lang_sys = words(&[0, 0xFFFF, feature_count]);
    lang_sys.extend(words(&(0..feature_count).collect::<Vec<_>>()));
    let lang_sys = pack(&lang_sys, vec![]);
    let script = pack(&[OFFSET, Some(0)], vec![lang_sys]);
    let mut script_list = words(&[1]);
    script_list.extend(tag_words(b"latn"));
    script_list.push(OFFSET);
    let script_list = pack(&script_list, vec![script]);

    let mut feature_list = words(&[feature_count]);
    let mut feature_tables = Vec::new();
    for (tag, indices) in features {
        feature_list.extend(tag_words(tag));
        feature_list.push(OFFSET);
        let mut feature = words(&[0, indices.len() as u16]);
        feature.extend(words(indices));
        feature_tables.push(pack(&feature, vec![]));
    }
    let feature_list = pack(&feature_list, feature_tables);

    let mut lookup_list = words(&[lookups.len() as u16]);
    lookup_list.extend(lookups.iter().map(|_| OFFSET));
    let lookup_list = pack(&lookup_list, lookups);

    pack(
        &[Some(1), Some(0), OFFSET, OFFSET, OFFSET],
        vec![script_list, feature_list, lookup_list],
    )
}

fn gdef() -> Vec<u8> {
    // glyphs 1..=7: f i f_i A V acute i.alt
    let classes = class_def(F, &[1, 1, 2, 1, 1, 3, 1]);
    pack(&[Some(1), Some(0), OFFSET, Some(0), Some(0), Some(0)], vec![classes])
}

fn gsub() -> Vec<u8> {
    // lookup 0: f i -> f_i
    let ligature = pack(&words(&[F_I, 2, I]), vec![]);
    let ligature_set = pack(&[Some(1), OFFSET], vec![ligature]);
    let liga = pack(&[Some(1), OFFSET, Some(1), OFFSET], vec![coverage(&[F]), ligature_set]);

    // lookup 1: i -> i.alt after A, coverage based
    let after_a = pack(
        &[Some(3), Some(1), OFFSET, Some(1), OFFSET, Some(0), Some(1), Some(0), Some(2)],
        vec![coverage(&[A]), coverage(&[I])],
    );

    // lookup 2: i -> i.alt, reached only through contextual rules
    let alternate = pack(&[Some(2), OFFSET, Some(1), Some(I_ALT)], vec![coverage(&[I])]);

    // lookup 3: V after A, class based; class set 0 is empty
    let rule = pack(&words(&[1, 1, 1, 0, 1, 0, 2]), vec![]);
    let rule_set = pack(&[Some(1), OFFSET], vec![rule]);
    let by_class = pack(
        &[Some(2), OFFSET, OFFSET, OFFSET, Some(0), Some(2), Some(0), OFFSET],
        vec![
            coverage(&[V]),
            class_def(A, &[1]),
            class_def(V, &[1]),
            rule_set,
        ],
    );

    layout_table(
        &[(b"calt", vec![1, 3]), (b"liga", vec![0])],
        vec![
            lookup(4, liga),
            lookup(6, after_a),
            lookup(1, alternate),
            lookup(6, by_class),
        ],
    )
}

fn gpos() -> Vec<u8> {
    // A V: first glyph advance -80
    let pair_set = pack(&words(&[1, V, (-80i16) as u16]), vec![]);
    let kern = pack(
        &[Some(1), OFFSET, Some(0x0004), Some(0), Some(1), OFFSET],
        vec![coverage(&[A]), pair_set],
    );
    layout_table(&[(b"kern", vec![0])], vec![lookup(2, kern)])
}

fn cmap() -> Vec<u8> {
    let mut groups: Vec<(u32, u32)> = vec![
        ('A' as u32, u32::from(A)),
        ('V' as u32, u32::from(V)),
        ('f' as u32, u32::from(F)),
        ('i' as u32, u32::from(I)),
        (0x0301, u32::from(ACUTE)),
    ];
    groups.sort();
    let mut subtable = Vec::new();
    subtable.extend_from_slice(&12u16.to_be_bytes());
    subtable.extend_from_slice(&0u16.to_be_bytes());
    subtable.extend_from_slice(&(16 + 12 * groups.len() as u32).to_be_bytes());
    subtable.extend_from_slice(&0u32.to_be_bytes());
    subtable.extend_from_slice(&(groups.len() as u32).to_be_bytes());
    for (codepoint, glyph) in groups {
        subtable.extend_from_slice(&codepoint.to_be_bytes());
        subtable.extend_from_slice(&codepoint.to_be_bytes());
        subtable.extend_from_slice(&glyph.to_be_bytes());
    }

    let mut table = Vec::new();
    for word in [0u16, 1, 0, 4] {
        table.extend_from_slice(&word.to_be_bytes());
    }
    table.extend_from_slice(&12u32.to_be_bytes());
    table.extend(subtable);
    table
}

fn head() -> Vec<u8> {
    let mut table = Vec::new();
    table.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    table.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    table.extend_from_slice(&0u32.to_be_bytes());
    table.extend_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
    table.extend_from_slice(&0u16.to_be_bytes());
    table.extend_from_slice(&1000u16.to_be_bytes());
    table.extend_from_slice(&[0; 16]);
    for value in [0i16, -200, 1000, 800] {
        table.extend_from_slice(&value.to_be_bytes());
    }
    for word in [0u16, 8, 2, 0, 0] {
        table.extend_from_slice(&word.to_be_bytes());
    }
    table
}

fn hhea() -> Vec<u8> {
    let mut table = Vec::new();
    table.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    for value in [800i16, -200, 0] {
        table.extend_from_slice(&value.to_be_bytes());
    }
    table.extend_from_slice(&[0; 24]);
    table.extend_from_slice(&NUM_GLYPHS.to_be_bytes());
    table
}

fn maxp() -> Vec<u8> {
    let mut table = Vec::new();
    table.extend_from_slice(&0x0000_5000u32.to_be_bytes());
    table.extend_from_slice(&NUM_GLYPHS.to_be_bytes());
    table
}

fn hmtx() -> Vec<u8> {
    let advances: [u16; NUM_GLYPHS as usize] = [500, 300, 250, 520, 600, 600, 0, 250];
    let mut table = Vec::new();
    for advance in advances {
        table.extend_from_slice(&advance.to_be_bytes());
        table.extend_from_slice(&10i16.to_be_bytes());
    }
    table
}

/// sfnt wrapper with the table directory sorted by tag.
fn sfnt(mut tables: Vec<([u8; 4], Vec<u8>)>) -> Vec<u8> {
    tables.sort_by(|a, b| a.0.cmp(&b.0));
    let mut out = Vec::new();
    out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&[0; 6]);

    let mut offset = 12 + 16 * tables.len();
    for (tag, data) in &tables {
        out.extend_from_slice(tag);
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        offset += data.len().next_multiple_of(4);
    }
    for (_, data) in tables {
        out.extend(data);
        while out.len() % 4 != 0 {
            out.push(0);
        }
    }
    out
}

fn test_face() -> Vec<u8> {
    sfnt(vec![
        (*b"GDEF", gdef()),
        (*b"GPOS", gpos()),
        (*b"GSUB", gsub()),
        (*b"cmap", cmap()),
        (*b"head", head()),
        (*b"hhea", hhea()),
        (*b"hmtx", hmtx()),
        (*b"maxp", maxp()),
    ])
}

fn imported() -> FontProgram {
    font_from_bytes(&test_face(), 0).unwrap()
}

fn coverages(glyphs: &[&[u16]]) -> Vec<Coverage> {
    glyphs
        .iter()
        .map(|set| Coverage::new(set.iter().copied().map(GlyphId)))
        .collect()
}

#[test]
fn test_glyph_metrics_and_cmap() {
    let font = imported();
    assert_eq!(font.units_per_em(), 1000);
    assert_eq!(font.num_glyphs(), NUM_GLYPHS as usize);
    assert_eq!(font.glyph_index('f'), Some(GlyphId(F)));
    assert_eq!(font.glyph_index('\u{301}'), Some(GlyphId(ACUTE)));
    assert_eq!(font.glyph_index('z'), None);
    assert_eq!(font.advance_width(GlyphId(F_I)), 520);
    assert_eq!(font.glyph_metrics(GlyphId(NOTDEF)).map(|m| m.left_side_bearing), Some(10));
}

#[test]
fn test_gdef_classes_survive_import() {
    let font = imported();
    assert!(font.has_glyph_classes());
    assert_eq!(font.glyph_class(GlyphId(NOTDEF)), GlyphClass::Unclassified);
    assert_eq!(font.glyph_class(GlyphId(F)), GlyphClass::Base);
    assert_eq!(font.glyph_class(GlyphId(F_I)), GlyphClass::Ligature);
    assert_eq!(font.glyph_class(GlyphId(ACUTE)), GlyphClass::Mark);
}

#[test]
fn test_gsub_ligature_survives_import() {
    let font = imported();
    let gsub = font.gsub().unwrap();
    let tags: Vec<Tag> = gsub.features.iter().map(|feature| feature.tag).collect();
    assert_eq!(tags, vec![Tag::new(b"calt"), Tag::new(b"liga")]);
    assert_eq!(gsub.lookups.len(), 4);

    let Some(SubstSubtable::Ligature(liga)) = gsub.lookup(0).and_then(|l| l.subtables.first())
    else {
        panic!("lookup 0 is not a ligature lookup");
    };
    let set = liga.ligature_set(GlyphId(F)).unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].glyph, GlyphId(F_I));
    assert_eq!(set[0].components, vec![GlyphId(I)]);
}

#[test]
fn test_chained_context_coverage_format_becomes_rule() {
    let font = imported();
    let lookup = font.gsub().unwrap().lookup(1).unwrap();
    assert_eq!(
        lookup.subtables,
        vec![SubstSubtable::Context(ChainRule {
            backtrack: coverages(&[&[A]]),
            input: coverages(&[&[I]]),
            lookahead: Vec::new(),
            actions: vec![SequenceLookup {
                sequence_index: 0,
                lookup_index: 2,
            }],
        })]
    );
}

#[test]
fn test_chained_context_class_format_expands_classes() {
    let font = imported();
    let lookup = font.gsub().unwrap().lookup(3).unwrap();
    assert_eq!(
        lookup.subtables,
        vec![SubstSubtable::Context(ChainRule {
            backtrack: coverages(&[&[A]]),
            input: coverages(&[&[V]]),
            lookahead: Vec::new(),
            actions: vec![SequenceLookup {
                sequence_index: 0,
                lookup_index: 2,
            }],
        })]
    );
}

#[test]
fn test_gpos_kern_pair_survives_import() {
    let font = imported();
    let gpos = font.gpos().unwrap();
    assert_eq!(gpos.features[0].tag, Tag::new(b"kern"));
    let Some(PosSubtable::Pair(kern)) = gpos.lookup(0).and_then(|l| l.subtables.first()) else {
        panic!("lookup 0 is not a pair lookup");
    };
    assert_eq!(
        kern.get(GlyphId(A), GlyphId(V)),
        Some((ValueRecord::advance(-80), ValueRecord::default()))
    );
    assert_eq!(kern.get(GlyphId(V), GlyphId(A)), None);
}

#[test]
fn test_load_font_file_maps_binary_face() {
    let mut file = tempfile::Builder::new().suffix(".ttf").tempfile().unwrap();
    file.write_all(&test_face()).unwrap();
    let font = load_font_file(file.path(), 0).unwrap();
    assert_eq!(font.glyph_index('V'), Some(GlyphId(V)));
    assert!(font.gpos().is_some());
}
