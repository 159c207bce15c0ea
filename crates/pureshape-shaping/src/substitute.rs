// this_file: crates/pureshape-shaping/src/substitute.rs

//! Substitution engine: runs a plan's GSUB lookups over a glyph buffer.

use crate::buffer::GlyphBuffer;
use crate::context::{
    apply_actions, is_skipped, match_chain, next_unskipped, MAX_NESTING_DEPTH,
};
use crate::plan::ShapingPlan;
use log::warn;
use pureshape_font::{
    ChainRule, FontProgram, GlyphId, LayoutTable, Ligature, Lookup, LookupFlags, SubstSubtable,
};

/// Apply every planned substitution lookup, in plan order.
pub fn apply_substitutions(buffer: &mut GlyphBuffer, plan: &ShapingPlan, font: &FontProgram) {
    let Some(gsub) = font.gsub() else {
        return;
    };
    let engine = Substituter { gsub, font };
    for planned in &plan.gsub_lookups {
        if let Some(lookup) = gsub.lookup(planned.index) {
            engine.apply_lookup(buffer, lookup, planned.value);
        }
    }
}

struct Substituter<'a> {
    gsub: &'a LayoutTable<SubstSubtable>,
    font: &'a FontProgram,
}

impl<'a> Substituter<'a> {
    fn apply_lookup(&self, buffer: &mut GlyphBuffer, lookup: &'a Lookup<SubstSubtable>, value: u32) {
        let mut index = 0;
        while index < buffer.len() {
            if is_skipped(buffer, index, lookup.flags) {
                index += 1;
                continue;
            }
            index = self
                .apply_at(buffer, lookup, index, value, 0)
                .unwrap_or(index + 1);
        }
    }

    /// Among the subtables matching at `index`, the one covering the most
    /// input glyphs is applied; ties go to the earlier subtable. Returns
    /// where scanning resumes.
    fn apply_at(
        &self,
        buffer: &mut GlyphBuffer,
        lookup: &'a Lookup<SubstSubtable>,
        index: usize,
        value: u32,
        depth: usize,
    ) -> Option<usize> {
        let mut best: Option<Candidate<'a>> = None;
        for subtable in &lookup.subtables {
            let Some(candidate) = self.candidate(buffer, subtable, lookup.flags, index, value, depth)
            else {
                continue;
            };
            if best
                .as_ref()
                .map_or(true, |found| candidate.input_len() > found.input_len())
            {
                best = Some(candidate);
            }
        }
        Some(self.apply_candidate(buffer, best?, index, depth))
    }

    /// What `subtable` would do at `index`, without touching the buffer.
    fn candidate(
        &self,
        buffer: &GlyphBuffer,
        subtable: &'a SubstSubtable,
        flags: LookupFlags,
        index: usize,
        value: u32,
        depth: usize,
    ) -> Option<Candidate<'a>> {
        let glyph = buffer.glyph(index);
        match subtable {
            SubstSubtable::Single(subst) => subst.apply(glyph).map(Candidate::Replace),
            SubstSubtable::Multiple(subst) => subst.sequence(glyph).map(Candidate::Sequence),
            SubstSubtable::Alternate(subst) => subst.alternate(glyph, value).map(Candidate::Replace),
            SubstSubtable::Ligature(subst) => {
                let (ligature, components) =
                    longest_ligature(buffer, index, subst.ligature_set(glyph)?, flags)?;
                Some(Candidate::Ligature(ligature, components))
            }
            SubstSubtable::Context(rule) => {
                if depth >= MAX_NESTING_DEPTH {
                    warn!(
                        target: "pureshape::shape",
                        "GSUB contextual nesting deeper than {MAX_NESTING_DEPTH}, rule ignored"
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
        index: usize,
        depth: usize,
    ) -> usize {
        match candidate {
            Candidate::Replace(replacement) => {
                buffer.replace_glyph(index, replacement, self.font);
                index + 1
            }
            Candidate::Sequence(sequence) => {
                index + buffer.replace_with_sequence(index, sequence, self.font)
            }
            Candidate::Ligature(ligature, components) => {
                buffer.ligate(&components, ligature, self.font);
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
        let Some(lookup) = self.gsub.lookup(lookup_index) else {
            warn!(
                target: "pureshape::shape",
                "GSUB contextual rule references missing lookup {lookup_index}"
            );
            return;
        };
        if !is_skipped(buffer, position, lookup.flags) {
            self.apply_at(buffer, lookup, position, 1, depth);
        }
    }
}

/// A subtable's match at one position.
enum Candidate<'a> {
    Replace(GlyphId),
    Sequence(&'a [GlyphId]),
    Ligature(GlyphId, Vec<usize>),
    Context(&'a ChainRule, Vec<usize>),
}

impl Candidate<'_> {
    /// Input glyphs the match covers.
    fn input_len(&self) -> usize {
        match self {
            Self::Replace(_) | Self::Sequence(_) => 1,
            Self::Ligature(_, components) => components.len(),
            Self::Context(_, positions) => positions.len(),
        }
    }
}

/// Longest ligature in `set` whose components follow `start`; ties go to the earlier entry.
fn longest_ligature(
    buffer: &GlyphBuffer,
    start: usize,
    set: &[Ligature],
    flags: LookupFlags,
) -> Option<(GlyphId, Vec<usize>)> {
    let mut best: Option<(GlyphId, Vec<usize>)> = None;
    for ligature in set {
        let Some(components) = match_components(buffer, start, &ligature.components, flags) else {
            continue;
        };
        if best
            .as_ref()
            .map_or(true, |(_, found)| components.len() > found.len())
        {
            best = Some((ligature.glyph, components));
        }
    }
    best
}

fn match_components(
    buffer: &GlyphBuffer,
    start: usize,
    components: &[GlyphId],
    flags: LookupFlags,
) -> Option<Vec<usize>> {
    let mut positions = Vec::with_capacity(components.len() + 1);
    positions.push(start);
    let mut cursor = start;
    for &component in components {
        cursor = next_unskipped(buffer, cursor, flags)?;
        if buffer.glyph(cursor) != component {
            return None;
        }
        positions.push(cursor);
    }
    Some(positions)
}
