// this_file: backends/pureshape-ot/src/batch.rs

//! Parallel batch shaping.

use crate::shaper::Shaper;
use pureshape_core::{Result, ShapeError, ShapeOptions, ShapingResult, TextInput};
use pureshape_font::FontProgram;
use rayon::iter::IndexedParallelIterator;
use rayon::prelude::*;
use std::sync::Arc;

/// Item to be shaped in batch.
#[derive(Clone)]
pub struct BatchItem {
    /// Text to shape
    pub text: String,
    /// Font to shape with; items usually share one
    pub font: Arc<FontProgram>,
    /// Shaping options
    pub options: ShapeOptions,
}

impl BatchItem {
    pub fn new(text: impl Into<String>, font: Arc<FontProgram>) -> Self {
        Self {
            text: text.into(),
            font,
            options: ShapeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ShapeOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result from batch shaping.
#[derive(Debug)]
pub struct BatchResult {
    /// Index of the item in the batch
    pub index: usize,
    /// Shaping result or error
    pub result: Result<ShapingResult>,
}

/// Batch shaper for parallel text shaping.
pub struct BatchShaper {
    shaper: Arc<Shaper>,
}

impl BatchShaper {
    /// Create a batch shaper around a shared shaper (and its plan cache).
    pub fn new(shaper: Arc<Shaper>) -> Self {
        Self { shaper }
    }

    pub fn shaper(&self) -> &Shaper {
        &self.shaper
    }

    /// Shape a batch of items in parallel. Results keep the input order.
    pub fn shape_batch(&self, items: Vec<BatchItem>) -> Vec<BatchResult> {
        items
            .into_par_iter()
            .enumerate()
            .map(|(index, item)| BatchResult {
                index,
                result: self.shape_single(&item),
            })
            .collect()
    }

    /// Shape a batch on a dedicated pool of `num_threads` threads.
    pub fn shape_batch_with_threads(
        &self,
        items: Vec<BatchItem>,
        num_threads: usize,
    ) -> Result<Vec<BatchResult>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|err| ShapeError::Internal(format!("failed to build thread pool: {err}")))?;

        Ok(pool.install(|| self.shape_batch(items)))
    }

    /// Process items from an indexed parallel iterator.
    pub fn shape_streaming<'a, I>(
        &'a self,
        items: I,
    ) -> impl ParallelIterator<Item = BatchResult> + 'a
    where
        I: IndexedParallelIterator<Item = BatchItem> + 'a,
    {
        items.enumerate().map(move |(index, item)| BatchResult {
            index,
            result: self.shape_single(&item),
        })
    }

    fn shape_single(&self, item: &BatchItem) -> Result<ShapingResult> {
        self.shaper
            .shape(&item.font, TextInput::Utf8(&item.text), &item.options)
    }
}
