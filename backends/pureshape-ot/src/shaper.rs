// this_file: backends/pureshape-ot/src/shaper.rs

//! The shaping pipeline: decode, segment, then plan, substitute, position
//! and scale each run.

use log::debug;
use pureshape_core::{
    diagnostics::log_result, CacheStats, FontShaper, GlyphRecord, Result, ShapeDiagnostics,
    ShapeOptions, ShapedRunInfo, ShapingResult, TextInput, TextRun, TextSegmenter,
};
use pureshape_font::{FontId, FontProgram};
use pureshape_shaping::{
    apply_positioning, apply_substitutions, GlyphBuffer, PlanCache, Scaler, ShapingPlan,
    DEFAULT_PLAN_CACHE_CAPACITY,
};
use pureshape_unicode::Segmenter;
use std::sync::Arc;

const SHAPER_NAME: &str = "pureshape-ot";

/// Stateless apart from its plan cache; share one instance across threads.
pub struct Shaper {
    segmenter: Segmenter,
    plans: PlanCache,
}

impl Shaper {
    pub fn new() -> Self {
        Self::with_plan_capacity(DEFAULT_PLAN_CACHE_CAPACITY)
    }

    /// A shaper whose plan cache holds at most `capacity` plans.
    pub fn with_plan_capacity(capacity: usize) -> Self {
        Self {
            segmenter: Segmenter::new(),
            plans: PlanCache::with_capacity(capacity),
        }
    }

    /// Shape `text` with `font`.
    ///
    /// Only malformed input is an error. Scripts the font has no layout
    /// data for are shaped by pass-through.
    pub fn shape(
        &self,
        font: &FontProgram,
        text: TextInput<'_>,
        options: &ShapeOptions,
    ) -> Result<ShapingResult> {
        let mut result = ShapingResult::empty(font.units_per_em(), options.size);
        if text.is_empty() {
            return Ok(result);
        }

        let runs = self.segmenter.segment(&text, &options.segment)?;
        let scaler = Scaler::new(font.units_per_em(), options.size);
        for run in &runs {
            let plan = self.plan_for(font, run, options);
            let glyph_start = result.glyphs.len();
            result
                .glyphs
                .extend(shape_run(font, run, &plan, options, &scaler));

            ShapeDiagnostics::new(SHAPER_NAME, run, result.glyphs.len() - glyph_start)
                .with_plan(plan.gsub_lookups.len(), plan.gpos_lookups.len(), plan.fallback)
                .with_size(options.size)
                .log();

            result.runs.push(ShapedRunInfo {
                range: run.range(),
                glyph_range: (glyph_start, result.glyphs.len()),
                script: run.script,
                direction: run.direction,
                language: run.language.clone(),
                fallback: plan.fallback,
            });
        }

        log_result(SHAPER_NAME, &result);
        Ok(result)
    }

    fn plan_for(&self, font: &FontProgram, run: &TextRun, options: &ShapeOptions) -> Arc<ShapingPlan> {
        self.plans.get_or_build(
            font,
            run.script,
            run.language.as_ref(),
            run.direction,
            &options.features,
        )
    }

    /// Forget cached plans of a font that is about to be dropped.
    pub fn invalidate_font(&self, font_id: FontId) {
        self.plans.invalidate_font(font_id);
        debug!(target: "pureshape::plan", "invalidated plans for {font_id}");
    }

    pub fn plan_cache_stats(&self) -> CacheStats {
        self.plans.stats()
    }
}

fn shape_run(
    font: &FontProgram,
    run: &TextRun,
    plan: &ShapingPlan,
    options: &ShapeOptions,
    scaler: &Scaler,
) -> Vec<GlyphRecord> {
    let mut buffer = GlyphBuffer::from_run(run, font, options.cluster_level);
    if !plan.fallback {
        apply_substitutions(&mut buffer, plan, font);
    }
    apply_positioning(&mut buffer, plan, font);
    buffer.into_visual_order().to_records(scaler)
}

impl FontShaper<FontProgram> for Shaper {
    fn shape(
        &self,
        text: &TextInput<'_>,
        font: &FontProgram,
        options: &ShapeOptions,
    ) -> Result<ShapingResult> {
        Shaper::shape(self, font, *text, options)
    }

    fn name(&self) -> &str {
        SHAPER_NAME
    }

    fn clear_cache(&self) {
        self.plans.clear();
    }
}

impl Default for Shaper {
    fn default() -> Self {
        Self::new()
    }
}
