// this_file: crates/pureshape-shaping/src/buffer.rs

//! The glyph buffer a single run is shaped in.

use crate::scale::Scaler;
use pureshape_core::{ClusterLevel, Direction, GlyphRecord, TextRun};
use pureshape_font::{FontProgram, GlyphClass, GlyphId};
use pureshape_unicode::{grapheme_starts, is_combining_mark, is_default_ignorable};

const ZWNJ: char = '\u{200C}';
const ZWJ: char = '\u{200D}';

/// One glyph under construction. Positions are in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphSlot {
    pub glyph: GlyphId,
    /// Source codepoint (the first one, for glyphs formed from several)
    pub codepoint: char,
    pub cluster: u32,
    pub class: GlyphClass,
    /// The source codepoint is default-ignorable
    pub ignorable: bool,
    pub nominal_advance: i32,
    pub x_advance: i32,
    pub y_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    /// Index of the glyph this mark is attached to
    pub attached_to: Option<usize>,
}

impl GlyphSlot {
    /// Ignorables other than the joiners are transparent to matching.
    pub fn is_transparent(&self) -> bool {
        self.ignorable && self.codepoint != ZWJ && self.codepoint != ZWNJ
    }
}

/// Owned sequence of glyph slots in logical order until [`GlyphBuffer::into_visual_order`].
#[derive(Debug, Clone)]
pub struct GlyphBuffer {
    slots: Vec<GlyphSlot>,
    direction: Direction,
}

impl GlyphBuffer {
    /// One slot per codepoint, mapped through the cmap.
    ///
    /// Clusters are global codepoint indices, or the index of the grapheme
    /// start under [`ClusterLevel::Graphemes`].
    pub fn from_run(run: &TextRun, font: &FontProgram, level: ClusterLevel) -> Self {
        let graphemes = match level {
            ClusterLevel::Characters => None,
            ClusterLevel::Graphemes => Some(grapheme_starts(&run.codepoints)),
        };
        let slots = run
            .codepoints
            .iter()
            .enumerate()
            .map(|(index, &ch)| {
                let local = graphemes.as_ref().map_or(index, |starts| starts[index]);
                let glyph = font.nominal_glyph(ch);
                let synthesized = if is_combining_mark(ch) {
                    GlyphClass::Mark
                } else {
                    GlyphClass::Base
                };
                let advance = i32::from(font.advance_width(glyph));
                GlyphSlot {
                    glyph,
                    codepoint: ch,
                    cluster: (run.start + local) as u32,
                    class: class_for(font, glyph, synthesized),
                    ignorable: is_default_ignorable(ch),
                    nominal_advance: advance,
                    x_advance: advance,
                    y_advance: 0,
                    x_offset: 0,
                    y_offset: 0,
                    attached_to: None,
                }
            })
            .collect();
        Self {
            slots,
            direction: run.direction,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn slots(&self) -> &[GlyphSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> &GlyphSlot {
        &self.slots[index]
    }

    pub fn slot_mut(&mut self, index: usize) -> &mut GlyphSlot {
        &mut self.slots[index]
    }

    pub fn glyph(&self, index: usize) -> GlyphId {
        self.slots[index].glyph
    }

    /// Give every slot in `start..end` the span's minimum cluster, extending
    /// the span over neighbours that shared a boundary cluster.
    pub fn merge_clusters(&mut self, mut start: usize, mut end: usize) {
        if end.saturating_sub(start) < 2 {
            return;
        }
        let cluster = self.slots[start..end]
            .iter()
            .map(|slot| slot.cluster)
            .min()
            .unwrap_or(0);

        while end < self.slots.len() && self.slots[end - 1].cluster == self.slots[end].cluster {
            end += 1;
        }
        while start > 0 && self.slots[start - 1].cluster == self.slots[start].cluster {
            start -= 1;
        }
        for slot in &mut self.slots[start..end] {
            slot.cluster = cluster;
        }
    }

    /// One-for-one replacement; the cluster is kept.
    pub fn replace_glyph(&mut self, index: usize, glyph: GlyphId, font: &FontProgram) {
        let slot = &mut self.slots[index];
        let synthesized = slot.class;
        slot.glyph = glyph;
        slot.class = class_for(font, glyph, synthesized);
    }

    /// Replace the glyph at `index` with `glyphs`, all sharing its cluster.
    ///
    /// An empty sequence deletes the glyph and folds its cluster into a
    /// neighbour. Returns the number of slots now occupying the position.
    pub fn replace_with_sequence(
        &mut self,
        index: usize,
        glyphs: &[GlyphId],
        font: &FontProgram,
    ) -> usize {
        if glyphs.is_empty() {
            if index > 0 {
                self.merge_clusters(index - 1, index + 1);
            } else if index + 1 < self.slots.len() {
                self.merge_clusters(index, index + 2);
            }
            self.slots.remove(index);
            return 0;
        }

        let template = self.slots[index];
        let replacement: Vec<GlyphSlot> = glyphs
            .iter()
            .map(|&glyph| GlyphSlot {
                glyph,
                class: class_for(font, glyph, template.class),
                ..template
            })
            .collect();
        self.slots.splice(index..=index, replacement);
        glyphs.len()
    }

    /// Form a ligature from the glyphs at `components` (ascending indices).
    ///
    /// The ligature takes the first component's place; glyphs skipped
    /// between components stay, in order, right after it. Everything in the
    /// consumed span ends up in one cluster.
    pub fn ligate(&mut self, components: &[usize], ligature: GlyphId, font: &FontProgram) {
        let (Some(&first), Some(&last)) = (components.first(), components.last()) else {
            return;
        };
        self.merge_clusters(first, last + 1);

        let mut lig = self.slots[first];
        lig.glyph = ligature;
        lig.class = class_for(font, ligature, GlyphClass::Ligature);
        let mut replacement = vec![lig];
        replacement.extend(
            (first + 1..=last)
                .filter(|index| !components.contains(index))
                .map(|index| self.slots[index]),
        );
        self.slots.splice(first..=last, replacement);
    }

    /// Reverse RTL runs so the buffer reads in visual order.
    pub fn into_visual_order(mut self) -> Self {
        if self.direction.is_rtl() {
            self.slots.reverse();
        }
        self
    }

    /// Convert to output records through the final scaling step.
    pub fn to_records(&self, scaler: &Scaler) -> Vec<GlyphRecord> {
        self.slots
            .iter()
            .map(|slot| GlyphRecord {
                glyph_id: slot.glyph.to_u32(),
                cluster: slot.cluster,
                x_advance: scaler.scale(slot.x_advance),
                y_advance: scaler.scale(slot.y_advance),
                x_offset: scaler.scale(slot.x_offset),
                y_offset: scaler.scale(slot.y_offset),
            })
            .collect()
    }
}

/// Font class when the font classifies glyphs, otherwise the synthesized one.
fn class_for(font: &FontProgram, glyph: GlyphId, synthesized: GlyphClass) -> GlyphClass {
    if font.has_glyph_classes() {
        font.glyph_class(glyph)
    } else {
        synthesized
    }
}
