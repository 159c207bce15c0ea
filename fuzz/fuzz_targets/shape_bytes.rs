// this_file: fuzz/fuzz_targets/shape_bytes.rs

#![no_main]

use libfuzzer_sys::fuzz_target;
use pureshape::{
    utils::clusters_monotonic, FontProgram, FontProgramBuilder, GlyphClass,
    ShapeOptions, Tag, TextInput,
};
use pureshape_font::{Anchor, Lookup, MarkRecord, PosSubtable, SubstSubtable};
use std::sync::OnceLock;

fn font() -> &'static FontProgram {
    static FONT: OnceLock<FontProgram> = OnceLock::new();
    FONT.get_or_init(|| {
        let mut builder = FontProgramBuilder::new(1000);
        let f = builder.add_char('f', 300);
        let i = builder.add_char('i', 250);
        let alef = builder.add_char('\u{05D0}', 600);
        let mark = builder.add_char('\u{05B8}', 0);
        builder.add_char(' ', 250);
        let fi = builder.add_glyph("f_i", 550);
        builder.set_class(alef, GlyphClass::Base);
        builder.set_class(mark, GlyphClass::Mark);
        builder.gsub_feature_with(
            Tag::new(b"latn"),
            Tag::new(b"liga"),
            Lookup::new(vec![SubstSubtable::ligature([(vec![f, i], fi)])]),
        );
        builder.gpos_feature_with(
            Tag::new(b"hebr"),
            Tag::new(b"mark"),
            Lookup::new(vec![PosSubtable::mark_to_base(
                [(mark, MarkRecord { class: 0, anchor: Anchor::new(0, 0) })],
                [(alef, vec![Some(Anchor::new(300, -20))])],
            )]),
        );
        builder.build().expect("fuzz font")
    })
}

fuzz_target!(|data: &[u8]| {
    let options = ShapeOptions::default().with_size(16.0);
    if let Ok(result) = pureshape::shape(font(), TextInput::Utf8Bytes(data), &options) {
        for run in &result.runs {
            let (start, end) = run.glyph_range;
            assert!(clusters_monotonic(&result.glyphs[start..end], run.direction));
        }
    }
});
