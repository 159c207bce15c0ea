// this_file: crates/pureshape-shaping/src/position.rs

//! Positioning engine: advances, kerning and mark attachment in font units.

use crate::buffer::GlyphBuffer;
use crate::context::{
    apply_actions, is_skipped, match_chain, next_unskipped, prev_unskipped, MAX_NESTING_DEPTH,
};
use crate::plan::ShapingPlan;
use log::warn;
use pureshape_font::{
    Anchor, ChainRule, FontProgram, GlyphClass, LayoutTable, Lookup, LookupFlags, PosSubtable, ValueRecord,
};

/// Position every glyph of `buffer` according to the plan's GPOS lookups.
///
/// Runs even for pass-through plans: advances always start from the
/// font's nominal metrics and default-ignorables are always hidden.
pub fn apply_positioning(buffer: &mut GlyphBuffer, plan: &ShapingPlan, font: &FontProgram) {
    reset_to_nominal(buffer, font);

    let mut ran = false;
    if let Some(gpos) = font.gpos() {
        let engine = Positioner { gpos };
        for planned in &plan.gpos_lookups {
            if let Some(lookup) = gpos.lookup(planned.index) {
                engine.apply_lookup(buffer, lookup);
                ran = true;
            }
        }
    }

    if ran {
        zero_mark_advances(buffer);
    }
    propagate_attachments(buffer);
    hide_default_ignorables(buffer, font);
}

fn reset_to_nominal(buffer: &mut GlyphBuffer, font: &FontProgram) {
    for index in 0..buffer.len() {
        let advance = i32::from(font.advance_width(buffer.glyph(index)));
        let slot = buffer.slot_mut(index);
        slot.nominal_advance = advance;
        slot.x_advance = advance;
        slot.y_advance = 0;
        slot.x_offset = 0;
        slot.y_offset = 0;
        slot.attached_to = None;
    }
}

struct Positioner<'a> {
    gpos: &'a LayoutTable<PosSubtable>,
}

impl<'a> Positioner<'a> {
    fn apply_lookup(&self, buffer: &mut GlyphBuffer, lookup: &'a Lookup<PosSubtable>) {
        let mut index = 0;
        while index < buffer.len() {
            if is_skipped(buffer, index, lookup.flags) {
                index += 1;
                continue;
            }
            index = self.apply_at(buffer, lookup, index, 0).unwrap_or(index + 1);
        }
    }

    /// Applies the subtable matching the most input glyphs at `index`; on a
    /// tie the earlier subtable wins.
    fn apply_at(
        &self,
        buffer: &mut GlyphBuffer,
        lookup: &'a Lookup<PosSubtable>,
        index: usize,
        depth: usize,
    ) -> Option<usize> {
        let mut best: Option<Candidate<'a>> = None;
        for subtable in &lookup.subtables {
            let Some(found) = self.candidate(buffer, subtable, lookup.flags, index, depth) else {
                continue;
            };
            if best.as_ref().map_or(true, |current| found.input_len() > current.input_len()) {
                best = Some(found);
            }
        }
        Some(self.apply_candidate(buffer, best?, lookup.exclusive, index, depth))
    }

    fn candidate(
        &self,
        buffer: &GlyphBuffer,
        subtable: &'a PosSubtable,
        flags: LookupFlags,
        index: usize,
        depth: usize,
    ) -> Option<Candidate<'a>> {
        let glyph = buffer.glyph(index);
        match subtable {
            PosSubtable::Single(pos) => pos.value(glyph).map(Candidate::Single),
            PosSubtable::Pair(pos) => {
                let second = next_unskipped(buffer, index, flags)?;
                let (value1, value2) = pos.get(glyph, buffer.glyph(second))?;
                Some(Candidate::Pair { second, value1, value2 })
            }
            PosSubtable::ClassPair(pos) => {
                let second = next_unskipped(buffer, index, flags)?;
                let (value1, value2) = pos.get(glyph, buffer.glyph(second))?;
                Some(Candidate::Pair { second, value1, value2 })
            }
            PosSubtable::MarkToBase(pos) => {
                if !pos.covers_mark(glyph) {
                    return None;
                }
                let base = (0..index).rev().find(|&candidate| {
                    let slot = buffer.slot(candidate);
                    slot.class != GlyphClass::Mark && !slot.is_transparent()
                })?;
                let (mark_anchor, base_anchor) = pos.anchors(glyph, buffer.glyph(base))?;
                Some(Candidate::Attach { base, mark_anchor, base_anchor })
            }
            PosSubtable::MarkToMark(pos) => {
                if !pos.covers_mark(glyph) {
                    return None;
                }
                let base = prev_unskipped(buffer, index, flags)?;
                if buffer.slot(base).class != GlyphClass::Mark {
                    return None;
                }
                let (mark_anchor, base_anchor) = pos.anchors(glyph, buffer.glyph(base))?;
                Some(Candidate::Attach { base, mark_anchor, base_anchor })
            }
            PosSubtable::Context(rule) => {
                if depth >= MAX_NESTING_DEPTH {
                    warn!(
                        target: "pureshape::shape",
                        "GPOS contextual nesting deeper than {MAX_NESTING_DEPTH}, rule ignored"
                    );
                    return None;
                }
                let positions = match_chain(buffer, index, rule, flags)?;
                Some(Candidate::Context(rule, positions))
            }
        }
    }

    fn apply_candidate(
        &self,
        buffer: &mut GlyphBuffer,
        candidate: Candidate<'a>,
        exclusive: bool,
        index: usize,
        depth: usize,
    ) -> usize {
        match candidate {
            Candidate::Single(value) => {
                adjust(buffer, index, value, exclusive);
                index + 1
            }
            Candidate::Pair { second, value1, value2 } => {
                apply_pair(buffer, index, second, value1, value2, exclusive)
            }
            Candidate::Attach { base, mark_anchor, base_anchor } => {
                attach(buffer, index, base, mark_anchor, base_anchor);
                index + 1
            }
            Candidate::Context(rule, positions) => {
                apply_actions(buffer, positions, &rule.actions, |buffer, position, lookup| {
                    self.apply_nested(buffer, lookup, position, depth + 1);
                })
            }
        }
    }

    fn apply_nested(&self, buffer: &mut GlyphBuffer, lookup_index: u16, position: usize, depth: usize) {
        let Some(lookup) = self.gpos.lookup(lookup_index) else {
            warn!(
                target: "pureshape::shape",
                "GPOS contextual rule references missing lookup {lookup_index}"
            );
            return;
        };
        if !is_skipped(buffer, position, lookup.flags) {
            self.apply_at(buffer, lookup, position, depth);
        }
    }
}

/// A matched subtable, resolved before anything in the buffer changes.
enum Candidate<'a> {
    Single(ValueRecord),
    Pair {
        second: usize,
        value1: ValueRecord,
        value2: ValueRecord,
    },
    Attach {
        base: usize,
        mark_anchor: Anchor,
        base_anchor: Anchor,
    },
    Context(&'a ChainRule, Vec<usize>),
}

impl Candidate<'_> {
    fn input_len(&self) -> usize {
        match self {
            Candidate::Single(_) | Candidate::Attach { .. } => 1,
            Candidate::Pair { .. } => 2,
            Candidate::Context(_, positions) => positions.len(),
        }
    }
}

/// Returns where scanning resumes: on the second glyph unless it was adjusted.
fn apply_pair(
    buffer: &mut GlyphBuffer,
    first: usize,
    second: usize,
    value1: ValueRecord,
    value2: ValueRecord,
    exclusive: bool,
) -> usize {
    adjust(buffer, first, value1, exclusive);
    if value2.is_zero() {
        second
    } else {
        adjust(buffer, second, value2, exclusive);
        second + 1
    }
}

fn adjust(buffer: &mut GlyphBuffer, index: usize, value: ValueRecord, exclusive: bool) {
    let slot = buffer.slot_mut(index);
    if exclusive {
        slot.x_advance = slot.nominal_advance;
        slot.y_advance = 0;
        slot.x_offset = 0;
        slot.y_offset = 0;
    }
    slot.x_offset += i32::from(value.x_placement);
    slot.y_offset += i32::from(value.y_placement);
    slot.x_advance += i32::from(value.x_advance);
    slot.y_advance += i32::from(value.y_advance);
}

fn attach(buffer: &mut GlyphBuffer, mark: usize, base: usize, mark_anchor: Anchor, base_anchor: Anchor) {
    let slot = buffer.slot_mut(mark);
    slot.x_offset = i32::from(base_anchor.x) - i32::from(mark_anchor.x);
    slot.y_offset = i32::from(base_anchor.y) - i32::from(mark_anchor.y);
    slot.attached_to = Some(base);
}

fn zero_mark_advances(buffer: &mut GlyphBuffer) {
    for index in 0..buffer.len() {
        let slot = buffer.slot_mut(index);
        if slot.class == GlyphClass::Mark {
            slot.x_advance = 0;
            slot.y_advance = 0;
        }
    }
}

/// Turn anchor deltas into offsets from the mark's own pen position.
///
/// Attachments always point backwards in logical order, so ascending order
/// sees a base's final offset before its marks.
fn propagate_attachments(buffer: &mut GlyphBuffer) {
    let rtl = buffer.direction().is_rtl();
    for index in 0..buffer.len() {
        let Some(base) = buffer.slot(index).attached_to else {
            continue;
        };
        if base >= index {
            continue;
        }
        let between: i32 = if rtl {
            (base + 1..=index).map(|k| buffer.slot(k).x_advance).sum()
        } else {
            -(base..index).map(|k| buffer.slot(k).x_advance).sum::<i32>()
        };
        let (base_x, base_y) = {
            let base_slot = buffer.slot(base);
            (base_slot.x_offset, base_slot.y_offset)
        };
        let slot = buffer.slot_mut(index);
        slot.x_offset += base_x + between;
        slot.y_offset += base_y;
    }
}

fn hide_default_ignorables(buffer: &mut GlyphBuffer, font: &FontProgram) {
    let space = font.glyph_index(' ');
    for index in 0..buffer.len() {
        let slot = buffer.slot_mut(index);
        if !slot.ignorable {
            continue;
        }
        if let Some(space) = space {
            slot.glyph = space;
        }
        slot.x_advance = 0;
        slot.y_advance = 0;
        slot.x_offset = 0;
        slot.y_offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanBuilder;
    use crate::substitute::apply_substitutions;
    use pureshape_core::{ClusterLevel, Direction, Features, Script, Tag, TextRun};
    use pureshape_font::{ClassDef, Coverage, FontProgramBuilder, GlyphId, MarkRecord};

    const LATN: Tag = Tag::new(b"latn");
    const KERN: Tag = Tag::new(b"kern");
    const MARK: Tag = Tag::new(b"mark");

    fn position(font: &FontProgram, text: &str, direction: Direction, features: &Features) -> GlyphBuffer {
        let run = TextRun {
            codepoints: text.chars().collect(),
            start: 0,
            script: Script::LATIN,
            direction,
            language: None,
        };
        let mut buffer = GlyphBuffer::from_run(&run, font, ClusterLevel::Characters);
        let plan = PlanBuilder::new(font, Script::LATIN, None, direction, features).build();
        apply_substitutions(&mut buffer, &plan, font);
        apply_positioning(&mut buffer, &plan, font);
        buffer
    }

    fn advances(buffer: &GlyphBuffer) -> Vec<i32> {
        buffer.slots().iter().map(|slot| slot.x_advance).collect()
    }

    fn kerning_font() -> (FontProgram, GlyphId, GlyphId) {
        let mut builder = FontProgramBuilder::new(1000);
        let a = builder.add_char('A', 600);
        let v = builder.add_char('V', 600);
        builder.add_char(' ', 250);
        builder.gpos_feature_with(
            LATN,
            KERN,
            Lookup::new(vec![PosSubtable::pair([(
                a,
                v,
                ValueRecord::advance(-50),
                ValueRecord::default(),
            )])]),
        );
        (builder.build().unwrap(), a, v)
    }

    #[test]
    fn test_pair_kerning_adjusts_first_glyph() {
        let (font, _, _) = kerning_font();
        let buffer = position(&font, "AV", Direction::LeftToRight, &Features::new());
        assert_eq!(advances(&buffer), vec![550, 600]);
        assert!(buffer.slots().iter().all(|slot| slot.x_offset == 0 && slot.y_offset == 0));

        let buffer = position(&font, "AV", Direction::LeftToRight, &"-kern".parse().unwrap());
        assert_eq!(advances(&buffer), vec![600, 600]);
    }

    #[test]
    fn test_pair_scan_continues_on_second_glyph() {
        let (font, _, _) = kerning_font();
        let buffer = position(&font, "AVAV", Direction::LeftToRight, &Features::new());
        assert_eq!(advances(&buffer), vec![550, 600, 550, 600]);
    }

    #[test]
    fn test_class_pair_kerning() {
        let mut builder = FontProgramBuilder::new(1000);
        let t = builder.add_char('T', 600);
        let o = builder.add_char('o', 500);
        let e = builder.add_char('e', 500);
        let zero = (ValueRecord::default(), ValueRecord::default());
        builder.gpos_feature_with(
            LATN,
            KERN,
            Lookup::new(vec![PosSubtable::class_pair(
                Coverage::new([t]),
                ClassDef::new([(t, 1)]),
                ClassDef::new([(o, 1), (e, 1)]),
                vec![
                    vec![zero, zero],
                    vec![zero, (ValueRecord::advance(-80), ValueRecord::default())],
                ],
            )]),
        );
        let font = builder.build().unwrap();
        let buffer = position(&font, "ToTe", Direction::LeftToRight, &Features::new());
        assert_eq!(advances(&buffer), vec![520, 500, 520, 500]);
    }

    #[test]
    fn test_pair_beats_earlier_single_subtable() {
        let mut builder = FontProgramBuilder::new(1000);
        let a = builder.add_char('A', 600);
        let v = builder.add_char('V', 600);
        builder.gpos_feature_with(
            LATN,
            KERN,
            Lookup::new(vec![
                PosSubtable::single([(a, ValueRecord::advance(20))]),
                PosSubtable::pair([(a, v, ValueRecord::advance(-50), ValueRecord::default())]),
            ]),
        );
        let font = builder.build().unwrap();

        let buffer = position(&font, "AV", Direction::LeftToRight, &Features::new());
        assert_eq!(advances(&buffer), vec![550, 600]);
        let buffer = position(&font, "AA", Direction::LeftToRight, &Features::new());
        assert_eq!(advances(&buffer), vec![620, 620]);
    }

    #[test]
    fn test_exclusive_lookup_replaces_adjustment() {
        let mut builder = FontProgramBuilder::new(1000);
        let a = builder.add_char('a', 500);
        builder.gpos_feature_with(
            LATN,
            KERN,
            Lookup::new(vec![PosSubtable::single([(a, ValueRecord::advance(100))])]),
        );
        builder.gpos_feature_with(
            LATN,
            Tag::new(b"dist"),
            Lookup::new(vec![PosSubtable::single([(a, ValueRecord::advance(10))])]).exclusive(),
        );
        let font = builder.build().unwrap();
        let buffer = position(&font, "a", Direction::LeftToRight, &Features::new());
        assert_eq!(advances(&buffer), vec![510]);

        let buffer = position(&font, "a", Direction::LeftToRight, &"-dist".parse().unwrap());
        assert_eq!(advances(&buffer), vec![600]);
    }

    fn mark_font() -> FontProgram {
        let mut builder = FontProgramBuilder::new(1000);
        let a = builder.add_char('a', 500);
        let acute = builder.add_char('\u{0301}', 200);
        let dot = builder.add_char('\u{0307}', 200);
        builder.set_class(a, GlyphClass::Base);
        builder.set_class(acute, GlyphClass::Mark);
        builder.set_class(dot, GlyphClass::Mark);
        let marks = [
            (
                acute,
                MarkRecord {
                    class: 0,
                    anchor: Anchor::new(0, 500),
                },
            ),
            (
                dot,
                MarkRecord {
                    class: 0,
                    anchor: Anchor::new(10, 0),
                },
            ),
        ];
        builder.gpos_feature_with(
            LATN,
            MARK,
            Lookup::new(vec![PosSubtable::mark_to_base(
                marks,
                [(a, vec![Some(Anchor::new(250, 600))])],
            )]),
        );
        builder.gpos_feature_with(
            LATN,
            Tag::new(b"mkmk"),
            Lookup::new(vec![PosSubtable::mark_to_mark(
                [(
                    dot,
                    MarkRecord {
                        class: 0,
                        anchor: Anchor::new(10, 0),
                    },
                )],
                [(acute, vec![Some(Anchor::new(0, 800))])],
            )]),
        );
        builder.build().unwrap()
    }

    #[test]
    fn test_mark_to_base_ltr() {
        let font = mark_font();
        let buffer = position(&font, "a\u{0301}", Direction::LeftToRight, &Features::new());
        let mark = buffer.slot(1);
        assert_eq!(mark.x_advance, 0);
        assert_eq!(mark.attached_to, Some(0));
        assert_eq!((mark.x_offset, mark.y_offset), (250 - 500, 100));
        assert_eq!(buffer.slot(0).x_advance, 500);
    }

    #[test]
    fn test_mark_to_base_rtl() {
        let font = mark_font();
        let buffer = position(&font, "a\u{0301}", Direction::RightToLeft, &Features::new());
        let mark = buffer.slot(1);
        assert_eq!((mark.x_offset, mark.y_offset), (250, 100));
    }

    #[test]
    fn test_mark_to_mark_stacks() {
        let font = mark_font();
        let buffer = position(&font, "a\u{0301}\u{0307}", Direction::LeftToRight, &Features::new());
        let acute = buffer.slot(1);
        let dot = buffer.slot(2);
        assert_eq!(dot.attached_to, Some(1));
        // anchor delta (0-10, 800-0) plus the acute's own offset
        assert_eq!(dot.x_offset, -10 + acute.x_offset);
        assert_eq!(dot.y_offset, 800 + acute.y_offset);
    }

    #[test]
    fn test_marks_keep_advance_without_gpos() {
        let mut builder = FontProgramBuilder::new(1000);
        builder.add_char('a', 500);
        builder.add_char('\u{0301}', 200);
        let font = builder.build().unwrap();
        let buffer = position(&font, "a\u{0301}", Direction::LeftToRight, &Features::new());
        assert_eq!(advances(&buffer), vec![500, 200]);
    }

    #[test]
    fn test_default_ignorables_are_hidden() {
        let (font, a, _) = kerning_font();
        let space = font.glyph_index(' ').unwrap();
        let buffer = position(&font, "A\u{200B}A", Direction::LeftToRight, &Features::new());
        assert_eq!(advances(&buffer), vec![600, 0, 600]);
        assert_eq!(buffer.glyph(1), space);
        assert_eq!(buffer.glyph(0), a);
    }
}
