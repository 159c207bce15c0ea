// this_file: crates/pureshape-font/src/gsub.rs

//! Glyph substitution subtables.

use crate::layout::{ChainRule, Coverage};
use crate::program::GlyphId;
use serde::{Deserialize, Serialize};

/// One substitution rule set; the variant decides the matching behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubstSubtable {
    /// One glyph to one glyph
    Single(SingleSubst),
    /// One glyph to a sequence (an empty sequence deletes the glyph)
    Multiple(MultipleSubst),
    /// One glyph to one of several alternates, chosen by the feature value
    Alternate(AlternateSubst),
    /// Several glyphs to one
    Ligature(LigatureSubst),
    /// Chained context with nested lookups
    Context(ChainRule),
}

impl SubstSubtable {
    pub fn single(pairs: impl IntoIterator<Item = (GlyphId, GlyphId)>) -> Self {
        Self::Single(SingleSubst::from_pairs(pairs))
    }

    pub fn multiple(rules: impl IntoIterator<Item = (GlyphId, Vec<GlyphId>)>) -> Self {
        let (coverage, sequences) = sorted_by_glyph(rules);
        Self::Multiple(MultipleSubst {
            coverage,
            sequences,
        })
    }

    pub fn alternate(rules: impl IntoIterator<Item = (GlyphId, Vec<GlyphId>)>) -> Self {
        let (coverage, alternates) = sorted_by_glyph(rules);
        Self::Alternate(AlternateSubst {
            coverage,
            alternates,
        })
    }

    /// `rules` are `(components, ligature)` with the first component included.
    pub fn ligature(rules: impl IntoIterator<Item = (Vec<GlyphId>, GlyphId)>) -> Self {
        Self::Ligature(LigatureSubst::from_rules(rules))
    }

    /// First glyphs this subtable can start a match on.
    pub fn coverage(&self) -> Option<&Coverage> {
        match self {
            Self::Single(subst) => Some(&subst.coverage),
            Self::Multiple(subst) => Some(&subst.coverage),
            Self::Alternate(subst) => Some(&subst.coverage),
            Self::Ligature(subst) => Some(&subst.coverage),
            Self::Context(rule) => rule.input.first(),
        }
    }
}

/// Group per-glyph payloads by first glyph, in coverage order; last rule wins.
fn sorted_by_glyph<T>(rules: impl IntoIterator<Item = (GlyphId, T)>) -> (Coverage, Vec<T>) {
    let mut rules: Vec<(GlyphId, T)> = rules.into_iter().collect();
    rules.sort_by_key(|(glyph, _)| *glyph);
    let mut glyphs = Vec::with_capacity(rules.len());
    let mut payloads: Vec<T> = Vec::with_capacity(rules.len());
    for (glyph, payload) in rules {
        if glyphs.last() == Some(&glyph) {
            if let Some(last) = payloads.last_mut() {
                *last = payload;
            }
            continue;
        }
        glyphs.push(glyph);
        payloads.push(payload);
    }
    (Coverage::new(glyphs), payloads)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleSubst {
    pub coverage: Coverage,
    /// One substitute per covered glyph
    pub substitutes: Vec<GlyphId>,
}

impl SingleSubst {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (GlyphId, GlyphId)>) -> Self {
        let (coverage, substitutes) = sorted_by_glyph(pairs);
        Self {
            coverage,
            substitutes,
        }
    }

    pub fn apply(&self, glyph: GlyphId) -> Option<GlyphId> {
        self.coverage
            .get(glyph)
            .and_then(|index| self.substitutes.get(index).copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleSubst {
    pub coverage: Coverage,
    pub sequences: Vec<Vec<GlyphId>>,
}

impl MultipleSubst {
    pub fn sequence(&self, glyph: GlyphId) -> Option<&[GlyphId]> {
        self.coverage
            .get(glyph)
            .and_then(|index| self.sequences.get(index))
            .map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateSubst {
    pub coverage: Coverage,
    pub alternates: Vec<Vec<GlyphId>>,
}

impl AlternateSubst {
    /// Alternate selected by a feature value (1 picks the first alternate).
    pub fn alternate(&self, glyph: GlyphId, feature_value: u32) -> Option<GlyphId> {
        let index = feature_value.checked_sub(1)? as usize;
        self.coverage
            .get(glyph)
            .and_then(|cov| self.alternates.get(cov))
            .and_then(|set| set.get(index).copied())
    }
}

/// Ligature glyph plus the components that follow the first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ligature {
    pub glyph: GlyphId,
    pub components: Vec<GlyphId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LigatureSubst {
    pub coverage: Coverage,
    pub ligature_sets: Vec<Vec<Ligature>>,
}

impl LigatureSubst {
    pub fn from_rules(rules: impl IntoIterator<Item = (Vec<GlyphId>, GlyphId)>) -> Self {
        let mut grouped: Vec<(GlyphId, Ligature)> = Vec::new();
        for (components, glyph) in rules {
            if let Some((first, rest)) = components.split_first() {
                grouped.push((
                    *first,
                    Ligature {
                        glyph,
                        components: rest.to_vec(),
                    },
                ));
            }
        }
        grouped.sort_by_key(|(first, _)| *first);

        let mut glyphs: Vec<GlyphId> = Vec::new();
        let mut ligature_sets: Vec<Vec<Ligature>> = Vec::new();
        for (first, ligature) in grouped {
            if glyphs.last() == Some(&first) {
                if let Some(set) = ligature_sets.last_mut() {
                    set.push(ligature);
                    continue;
                }
            }
            glyphs.push(first);
            ligature_sets.push(vec![ligature]);
        }
        Self {
            coverage: Coverage::new(glyphs),
            ligature_sets,
        }
    }

    pub fn ligature_set(&self, first: GlyphId) -> Option<&[Ligature]> {
        self.coverage
            .get(first)
            .and_then(|index| self.ligature_sets.get(index))
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_subst() {
        let subst = SingleSubst::from_pairs([(GlyphId(5), GlyphId(50)), (GlyphId(2), GlyphId(20))]);
        assert_eq!(subst.apply(GlyphId(2)), Some(GlyphId(20)));
        assert_eq!(subst.apply(GlyphId(5)), Some(GlyphId(50)));
        assert_eq!(subst.apply(GlyphId(3)), None);
    }

    #[test]
    fn test_alternate_uses_feature_value() {
        let SubstSubtable::Alternate(subst) =
            SubstSubtable::alternate([(GlyphId(1), vec![GlyphId(10), GlyphId(11)])])
        else {
            panic!("expected alternate subtable");
        };
        assert_eq!(subst.alternate(GlyphId(1), 1), Some(GlyphId(10)));
        assert_eq!(subst.alternate(GlyphId(1), 2), Some(GlyphId(11)));
        assert_eq!(subst.alternate(GlyphId(1), 3), None);
        assert_eq!(subst.alternate(GlyphId(1), 0), None);
    }

    #[test]
    fn test_ligature_sets_group_by_first_glyph() {
        let subst = LigatureSubst::from_rules([
            (vec![GlyphId(3), GlyphId(4)], GlyphId(100)),
            (vec![GlyphId(1), GlyphId(2)], GlyphId(101)),
            (vec![GlyphId(3), GlyphId(4), GlyphId(5)], GlyphId(102)),
            (vec![], GlyphId(103)),
        ]);
        assert_eq!(subst.coverage.glyphs(), &[GlyphId(1), GlyphId(3)]);
        assert_eq!(subst.ligature_set(GlyphId(3)).map(<[_]>::len), Some(2));
        assert!(subst.ligature_set(GlyphId(4)).is_none());
    }

    #[test]
    fn test_subtable_json_shape() {
        let subtable = SubstSubtable::single([(GlyphId(1), GlyphId(2))]);
        let json = serde_json::to_value(&subtable).unwrap();
        assert_eq!(json["type"], "single");
        assert_eq!(json["coverage"], serde_json::json!([1]));
        let back: SubstSubtable = serde_json::from_value(json).unwrap();
        assert_eq!(back, subtable);
    }
}
