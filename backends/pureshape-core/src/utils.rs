// this_file: backends/pureshape-core/src/utils.rs

//! Utility functions over shaped glyph sequences.

use crate::types::{Direction, Fixed, GlyphRecord};

/// Sum of horizontal advances
pub fn total_advance(glyphs: &[GlyphRecord]) -> Fixed {
    glyphs.iter().map(|g| g.x_advance).sum()
}

/// One `gid{id}={cluster}@{xoff},{yoff}+{xadv},{yadv}` line per glyph.
pub fn format_glyphs(glyphs: &[GlyphRecord]) -> String {
    glyphs
        .iter()
        .map(|g| g.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Clusters never decrease for LTR and never increase for RTL.
pub fn clusters_monotonic(glyphs: &[GlyphRecord], direction: Direction) -> bool {
    glyphs.windows(2).all(|pair| match direction {
        Direction::LeftToRight => pair[0].cluster <= pair[1].cluster,
        Direction::RightToLeft => pair[0].cluster >= pair[1].cluster,
    })
}

/// Distinct cluster values in ascending order.
pub fn cluster_values(glyphs: &[GlyphRecord]) -> Vec<u32> {
    let mut clusters: Vec<u32> = glyphs.iter().map(|g| g.cluster).collect();
    clusters.sort_unstable();
    clusters.dedup();
    clusters
}
