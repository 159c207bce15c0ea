// this_file: tests/common/mod.rs

//! Font programs shared by the integration tests.

#![allow(dead_code)]

use pureshape::{FontProgram, FontProgramBuilder, GlyphClass, Tag};
use pureshape_font::{Anchor, Lookup, MarkRecord, PosSubtable, SubstSubtable, ValueRecord};

pub const UPEM: u16 = 1000;

/// Latin font: `f i A V` plus space, an `f_i` ligature and an `A V` kerning pair.
///
/// Glyph ids: .notdef 0, f 1, i 2, A 3, V 4, space 5, f_i 6.
pub fn latin_font() -> FontProgram {
    let mut builder = FontProgramBuilder::new(UPEM);
    builder.family_name("Property Sans");
    let f = builder.add_char('f', 300);
    let i = builder.add_char('i', 250);
    let a = builder.add_char('A', 600);
    let v = builder.add_char('V', 600);
    builder.add_char(' ', 250);
    let fi = builder.add_glyph("f_i", 550);
    builder.gsub_feature_with(
        Tag::new(b"latn"),
        Tag::new(b"liga"),
        Lookup::new(vec![SubstSubtable::ligature([(vec![f, i], fi)])]),
    );
    builder.gpos_feature_with(
        Tag::new(b"latn"),
        Tag::new(b"kern"),
        Lookup::new(vec![PosSubtable::pair([(
            a,
            v,
            ValueRecord::advance(-50),
            ValueRecord::default(),
        )])]),
    );
    builder.build().expect("latin test font")
}

/// Hebrew font with a mark-to-base lookup for qamats.
pub fn hebrew_font() -> FontProgram {
    let mut builder = FontProgramBuilder::new(UPEM);
    let alef = builder.add_char('\u{05D0}', 600);
    let bet = builder.add_char('\u{05D1}', 550);
    let shin = builder.add_char('\u{05E9}', 650);
    let qamats = builder.add_char('\u{05B8}', 0);
    builder.add_char(' ', 250);
    for base in [alef, bet, shin] {
        builder.set_class(base, GlyphClass::Base);
    }
    builder.set_class(qamats, GlyphClass::Mark);
    builder.gpos_feature_with(
        Tag::new(b"hebr"),
        Tag::new(b"mark"),
        Lookup::new(vec![PosSubtable::mark_to_base(
            [(
                qamats,
                MarkRecord {
                    class: 0,
                    anchor: Anchor::new(0, 0),
                },
            )],
            [
                (alef, vec![Some(Anchor::new(300, -20))]),
                (bet, vec![Some(Anchor::new(275, -20))]),
                (shin, vec![Some(Anchor::new(325, -20))]),
            ],
        )]),
    );
    builder.build().expect("hebrew test font")
}
