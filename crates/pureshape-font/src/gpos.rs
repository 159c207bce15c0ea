// this_file: crates/pureshape-font/src/gpos.rs

//! Glyph positioning subtables.

use crate::layout::{ChainRule, ClassDef, Coverage};
use crate::program::GlyphId;
use serde::{Deserialize, Serialize};

/// Placement and advance adjustment, in font units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueRecord {
    pub x_placement: i16,
    pub y_placement: i16,
    pub x_advance: i16,
    pub y_advance: i16,
}

impl ValueRecord {
    /// Horizontal advance adjustment only, the common kerning case.
    pub const fn advance(x_advance: i16) -> Self {
        Self {
            x_placement: 0,
            y_placement: 0,
            x_advance,
            y_advance: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub x: i16,
    pub y: i16,
}

impl Anchor {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkRecord {
    pub class: u16,
    pub anchor: Anchor,
}

/// One positioning rule set; the variant decides the matching behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PosSubtable {
    Single(SinglePos),
    Pair(PairPos),
    ClassPair(ClassPairPos),
    MarkToBase(MarkAttachPos),
    MarkToMark(MarkAttachPos),
    Context(ChainRule),
}

impl PosSubtable {
    pub fn single(values: impl IntoIterator<Item = (GlyphId, ValueRecord)>) -> Self {
        let mut values: Vec<(GlyphId, ValueRecord)> = values.into_iter().collect();
        values.sort_by_key(|(glyph, _)| *glyph);
        values.dedup_by_key(|(glyph, _)| *glyph);
        Self::Single(SinglePos {
            coverage: Coverage::new(values.iter().map(|(glyph, _)| *glyph)),
            values: values.into_iter().map(|(_, value)| value).collect(),
        })
    }

    /// Glyph pairs `(first, second, value1, value2)`.
    pub fn pair(pairs: impl IntoIterator<Item = (GlyphId, GlyphId, ValueRecord, ValueRecord)>) -> Self {
        let mut pairs: Vec<_> = pairs.into_iter().collect();
        pairs.sort_by_key(|(first, second, _, _)| (*first, *second));
        pairs.dedup_by_key(|(first, second, _, _)| (*first, *second));

        let mut firsts: Vec<GlyphId> = Vec::new();
        let mut pair_sets: Vec<Vec<PairValue>> = Vec::new();
        for (first, second, value1, value2) in pairs {
            let value = PairValue {
                second,
                value1,
                value2,
            };
            if firsts.last() == Some(&first) {
                if let Some(set) = pair_sets.last_mut() {
                    set.push(value);
                    continue;
                }
            }
            firsts.push(first);
            pair_sets.push(vec![value]);
        }
        Self::Pair(PairPos {
            coverage: Coverage::new(firsts),
            pair_sets,
        })
    }

    /// Class-based pairs; `matrix[class1][class2]` holds `(value1, value2)`.
    pub fn class_pair(
        coverage: Coverage,
        class_def1: ClassDef,
        class_def2: ClassDef,
        matrix: Vec<Vec<(ValueRecord, ValueRecord)>>,
    ) -> Self {
        Self::ClassPair(ClassPairPos {
            coverage,
            class_def1,
            class_def2,
            matrix,
        })
    }

    /// `marks` carry their class and anchor; `bases` carry one optional anchor per mark class.
    pub fn mark_to_base(
        marks: impl IntoIterator<Item = (GlyphId, MarkRecord)>,
        bases: impl IntoIterator<Item = (GlyphId, Vec<Option<Anchor>>)>,
    ) -> Self {
        Self::MarkToBase(MarkAttachPos::from_records(marks, bases))
    }

    pub fn mark_to_mark(
        marks: impl IntoIterator<Item = (GlyphId, MarkRecord)>,
        bases: impl IntoIterator<Item = (GlyphId, Vec<Option<Anchor>>)>,
    ) -> Self {
        Self::MarkToMark(MarkAttachPos::from_records(marks, bases))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinglePos {
    pub coverage: Coverage,
    pub values: Vec<ValueRecord>,
}

impl SinglePos {
    pub fn value(&self, glyph: GlyphId) -> Option<ValueRecord> {
        self.coverage
            .get(glyph)
            .and_then(|index| self.values.get(index).copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairValue {
    pub second: GlyphId,
    #[serde(default)]
    pub value1: ValueRecord,
    #[serde(default)]
    pub value2: ValueRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairPos {
    pub coverage: Coverage,
    /// Per covered first glyph, pairs sorted by second glyph
    pub pair_sets: Vec<Vec<PairValue>>,
}

impl PairPos {
    pub fn get(&self, first: GlyphId, second: GlyphId) -> Option<(ValueRecord, ValueRecord)> {
        let set = self.pair_sets.get(self.coverage.get(first)?)?;
        set.binary_search_by_key(&second, |pair| pair.second)
            .ok()
            .map(|index| (set[index].value1, set[index].value2))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPairPos {
    pub coverage: Coverage,
    pub class_def1: ClassDef,
    pub class_def2: ClassDef,
    pub matrix: Vec<Vec<(ValueRecord, ValueRecord)>>,
}

impl ClassPairPos {
    pub fn get(&self, first: GlyphId, second: GlyphId) -> Option<(ValueRecord, ValueRecord)> {
        if !self.coverage.contains(first) {
            return None;
        }
        let row = self.matrix.get(self.class_def1.get(first) as usize)?;
        row.get(self.class_def2.get(second) as usize).copied()
    }
}

/// Mark attachment data shared by mark-to-base and mark-to-mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkAttachPos {
    pub mark_coverage: Coverage,
    pub base_coverage: Coverage,
    pub marks: Vec<MarkRecord>,
    /// Per covered base, one anchor slot per mark class
    pub bases: Vec<Vec<Option<Anchor>>>,
}

impl MarkAttachPos {
    pub fn from_records(
        marks: impl IntoIterator<Item = (GlyphId, MarkRecord)>,
        bases: impl IntoIterator<Item = (GlyphId, Vec<Option<Anchor>>)>,
    ) -> Self {
        let mut marks: Vec<_> = marks.into_iter().collect();
        marks.sort_by_key(|(glyph, _)| *glyph);
        marks.dedup_by_key(|(glyph, _)| *glyph);
        let mut bases: Vec<_> = bases.into_iter().collect();
        bases.sort_by_key(|(glyph, _)| *glyph);
        bases.dedup_by_key(|(glyph, _)| *glyph);
        Self {
            mark_coverage: Coverage::new(marks.iter().map(|(glyph, _)| *glyph)),
            base_coverage: Coverage::new(bases.iter().map(|(glyph, _)| *glyph)),
            marks: marks.into_iter().map(|(_, record)| record).collect(),
            bases: bases.into_iter().map(|(_, anchors)| anchors).collect(),
        }
    }

    pub fn covers_mark(&self, glyph: GlyphId) -> bool {
        self.mark_coverage.contains(glyph)
    }

    /// `(mark_anchor, base_anchor)` when both glyphs are covered and the
    /// base has an anchor for the mark's class.
    pub fn anchors(&self, mark: GlyphId, base: GlyphId) -> Option<(Anchor, Anchor)> {
        let record = self.marks.get(self.mark_coverage.get(mark)?)?;
        let base_anchors = self.bases.get(self.base_coverage.get(base)?)?;
        let base_anchor = (*base_anchors.get(record.class as usize)?)?;
        Some((record.anchor, base_anchor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_lookup() {
        let PosSubtable::Pair(pairs) = PosSubtable::pair([
            (GlyphId(2), GlyphId(3), ValueRecord::advance(-50), ValueRecord::default()),
            (GlyphId(2), GlyphId(1), ValueRecord::advance(-20), ValueRecord::default()),
            (GlyphId(4), GlyphId(3), ValueRecord::advance(10), ValueRecord::advance(5)),
        ]) else {
            panic!("expected pair subtable");
        };
        assert_eq!(pairs.get(GlyphId(2), GlyphId(3)).unwrap().0.x_advance, -50);
        assert_eq!(pairs.get(GlyphId(2), GlyphId(1)).unwrap().0.x_advance, -20);
        assert_eq!(pairs.get(GlyphId(4), GlyphId(3)).unwrap().1.x_advance, 5);
        assert!(pairs.get(GlyphId(3), GlyphId(2)).is_none());
    }

    #[test]
    fn test_class_pair_lookup() {
        let PosSubtable::ClassPair(pairs) = PosSubtable::class_pair(
            Coverage::new([GlyphId(1), GlyphId(2)]),
            ClassDef::new([(GlyphId(2), 1)]),
            ClassDef::new([(GlyphId(5), 1)]),
            vec![
                vec![(ValueRecord::default(), ValueRecord::default()); 2],
                vec![
                    (ValueRecord::default(), ValueRecord::default()),
                    (ValueRecord::advance(-30), ValueRecord::default()),
                ],
            ],
        ) else {
            panic!("expected class pair subtable");
        };
        assert_eq!(pairs.get(GlyphId(2), GlyphId(5)).unwrap().0.x_advance, -30);
        assert!(pairs.get(GlyphId(1), GlyphId(5)).unwrap().0.is_zero());
        assert!(pairs.get(GlyphId(9), GlyphId(5)).is_none());
    }

    #[test]
    fn test_mark_anchors() {
        let attach = MarkAttachPos::from_records(
            [(
                GlyphId(10),
                MarkRecord {
                    class: 0,
                    anchor: Anchor::new(100, 0),
                },
            )],
            [(GlyphId(1), vec![Some(Anchor::new(250, 600))])],
        );
        assert_eq!(
            attach.anchors(GlyphId(10), GlyphId(1)),
            Some((Anchor::new(100, 0), Anchor::new(250, 600)))
        );
        assert!(attach.anchors(GlyphId(10), GlyphId(2)).is_none());
        assert!(attach.covers_mark(GlyphId(10)));
    }
}
