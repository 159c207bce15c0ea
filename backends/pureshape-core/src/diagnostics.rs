// this_file: backends/pureshape-core/src/diagnostics.rs

//! Shaping diagnostics used for structured debug logging.

use crate::types::{ShapingResult, TextRun};
use log::{debug, log_enabled, Level};

/// Lightweight snapshot of one shaped run.
#[derive(Debug)]
pub struct ShapeDiagnostics<'a> {
    shaper: &'a str,
    script: String,
    direction: &'static str,
    language: Option<&'a str>,
    codepoints: usize,
    glyphs: usize,
    gsub_lookups: usize,
    gpos_lookups: usize,
    fallback: bool,
    size: Option<f32>,
}

impl<'a> ShapeDiagnostics<'a> {
    /// Capture the diagnostic snapshot for a run and the glyphs it produced.
    pub fn new(shaper: &'a str, run: &'a TextRun, glyphs: usize) -> Self {
        Self {
            shaper,
            script: run.script.to_string(),
            direction: if run.direction.is_rtl() { "rtl" } else { "ltr" },
            language: run.language.as_ref().map(|lang| lang.as_str()),
            codepoints: run.len(),
            glyphs,
            gsub_lookups: 0,
            gpos_lookups: 0,
            fallback: false,
            size: None,
        }
    }

    /// Record the plan that shaped the run.
    pub fn with_plan(mut self, gsub_lookups: usize, gpos_lookups: usize, fallback: bool) -> Self {
        self.gsub_lookups = gsub_lookups;
        self.gpos_lookups = gpos_lookups;
        self.fallback = fallback;
        self
    }

    pub fn with_size(mut self, size: Option<f32>) -> Self {
        self.size = size;
        self
    }

    /// Emit the diagnostic snapshot at debug level when logging is enabled.
    pub fn log(&self) {
        if log_enabled!(target: "pureshape::shape", Level::Debug) {
            debug!(
                target: "pureshape::shape",
                "shaper={shaper} script={script} dir={dir} lang={lang} codepoints={cps} glyphs={glyphs} gsub={gsub} gpos={gpos} fallback={fallback} size={size}",
                shaper = self.shaper,
                script = self.script,
                dir = self.direction,
                lang = self.language.unwrap_or("<none>"),
                cps = self.codepoints,
                glyphs = self.glyphs,
                gsub = self.gsub_lookups,
                gpos = self.gpos_lookups,
                fallback = self.fallback,
                size = self
                    .size
                    .map(|s| format!("{s:.1}"))
                    .unwrap_or_else(|| "units".to_string()),
            );
        }
    }
}

/// Emit a one-line summary of a whole shaping call.
pub fn log_result(shaper: &str, result: &ShapingResult) {
    if log_enabled!(target: "pureshape::shape", Level::Debug) {
        debug!(
            target: "pureshape::shape",
            "shaper={shaper} runs={runs} glyphs={glyphs} advance={advance}",
            runs = result.runs.len(),
            glyphs = result.glyphs.len(),
            advance = result.advance(),
        );
    }
}
