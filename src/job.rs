// this_file: src/job.rs

//! Batch job format (JSONL in, JSONL out) and job execution.

use anyhow::{bail, Context, Result};
use camino::Utf8PathBuf;
use pureshape::{
    BatchItem, BatchResult, BatchShaper, ClusterLevel, Direction, Features, Fixed, FontLoader,
    GlyphRecord, ShapeOptions, ShapingResult,
};
use serde::{Deserialize, Serialize};

/// Maximum accepted text length per job, in bytes
pub const MAX_TEXT_LENGTH: usize = 10_000;
/// Largest accepted size in pixels
pub const MAX_SIZE: f32 = 10_000.0;

/// Single shaping job.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    /// Job identifier, echoed in the result
    pub id: String,
    /// Font file (`.ttf`, `.otf`, or a `.json` font program)
    pub font: Utf8PathBuf,
    /// Face index inside a collection
    #[serde(default)]
    pub face_index: u32,
    pub text: String,
    /// Size in pixels; font units when absent
    #[serde(default)]
    pub size: Option<f32>,
    /// Feature settings, e.g. `"-liga,kern,salt=2"`
    #[serde(default)]
    pub features: Option<String>,
    /// BCP-47 language tag
    #[serde(default)]
    pub language: Option<String>,
    /// Paragraph direction
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Assign clusters per grapheme instead of per codepoint
    #[serde(default)]
    pub graphemes: bool,
}

/// Job result (one JSONL output line).
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    /// Job ID (matches input)
    pub id: String,
    /// Status: "success" or "error"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glyphs: Option<Vec<GlyphRecord>>,
    /// Total horizontal advance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advance: Option<Fixed>,
    /// Error message (only present on error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobResult {
    pub fn success(id: &str, result: ShapingResult) -> Self {
        Self {
            id: id.to_string(),
            status: "success".to_string(),
            advance: Some(result.advance()),
            glyphs: Some(result.glyphs),
            error: None,
        }
    }

    pub fn failure(id: &str, error: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            status: "error".to_string(),
            glyphs: None,
            advance: None,
            error: Some(error.to_string()),
        }
    }
}

impl Job {
    /// Validate job parameters.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            bail!("Job ID is empty");
        }
        if self.text.len() > MAX_TEXT_LENGTH {
            bail!(
                "Text too long ({} bytes, max {})",
                self.text.len(),
                MAX_TEXT_LENGTH
            );
        }
        if let Some(size) = self.size {
            if !size.is_finite() || size <= 0.0 || size > MAX_SIZE {
                bail!("Size {size} out of bounds (0-{MAX_SIZE})");
            }
        }
        Ok(())
    }

    /// Shaping options described by the job.
    pub fn options(&self) -> Result<ShapeOptions> {
        let mut options = ShapeOptions::default();
        if let Some(features) = &self.features {
            options.features = features
                .parse::<Features>()
                .with_context(|| format!("job {}", self.id))?;
        }
        options.size = self.size;
        options.segment.language = self.language.clone();
        options.segment.direction = self.direction;
        if self.graphemes {
            options.cluster_level = ClusterLevel::Graphemes;
        }
        Ok(options)
    }

    /// Validate the job and load its font.
    pub fn prepare(&self, loader: &FontLoader) -> Result<BatchItem> {
        self.validate()?;
        let options = self.options()?;
        let font = loader.load(self.font.as_std_path(), self.face_index)?;
        Ok(BatchItem::new(self.text.clone(), font).with_options(options))
    }
}

/// Run `jobs` through `batch`, returning one result per job in input order.
///
/// `threads == 0` uses rayon's global pool.
pub fn run_jobs(
    jobs: &[Job],
    loader: &FontLoader,
    batch: &BatchShaper,
    threads: usize,
) -> Result<Vec<JobResult>> {
    let mut results: Vec<Option<JobResult>> = vec![None; jobs.len()];
    let mut items = Vec::with_capacity(jobs.len());
    let mut owners = Vec::with_capacity(jobs.len());
    for (index, job) in jobs.iter().enumerate() {
        match job.prepare(loader) {
            Ok(item) => {
                items.push(item);
                owners.push(index);
            }
            Err(err) => {
                log::warn!("Job {}: {:#}", job.id, err);
                results[index] = Some(JobResult::failure(&job.id, format!("{err:#}")));
            }
        }
    }

    let shaped = if threads == 0 {
        batch.shape_batch(items)
    } else {
        batch.shape_batch_with_threads(items, threads)?
    };
    for font_id in loader.take_evicted() {
        batch.shaper().invalidate_font(font_id);
    }
    for BatchResult { index, result } in shaped {
        let owner = owners[index];
        let id = &jobs[owner].id;
        results[owner] = Some(match result {
            Ok(result) => JobResult::success(id, result),
            Err(err) => JobResult::failure(id, err),
        });
    }

    Ok(results.into_iter().flatten().collect())
}
