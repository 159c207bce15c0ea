// this_file: src/input.rs

//! Helpers for parsing job input payloads for the CLI.

use anyhow::{anyhow, bail, Result};

use crate::job::Job;

/// Maximum allowed stdin payload size (10MB)
pub const MAX_PAYLOAD_SIZE: usize = 10 * 1024 * 1024;
/// Maximum allowed number of jobs per payload
pub const MAX_JOBS: usize = 10_000;

/// Parse stdin payload into a list of jobs.
///
/// Accepts either a JSON array of jobs or newline-delimited job objects.
pub fn parse_jobs_payload(payload: &str) -> Result<Vec<Job>> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        bail!(
            "Input too large ({} bytes, max {})",
            payload.len(),
            MAX_PAYLOAD_SIZE
        );
    }
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        bail!("No jobs supplied in stdin payload");
    }

    if trimmed.starts_with('[') {
        let jobs: Vec<Job> = serde_json::from_str(trimmed)
            .map_err(|e| anyhow!("Invalid job array: {}", e))?;
        return check_count(jobs);
    }

    let mut jobs = Vec::new();
    for (idx, line) in payload.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let job: Job = serde_json::from_str(line)
            .map_err(|e| anyhow!("Line {}: invalid JSON: {}", idx + 1, e))?;
        jobs.push(job);
        if jobs.len() > MAX_JOBS {
            bail!("Too many jobs ({}), max {}", jobs.len(), MAX_JOBS);
        }
    }
    check_count(jobs)
}

fn check_count(jobs: Vec<Job>) -> Result<Vec<Job>> {
    if jobs.is_empty() {
        bail!("No jobs parsed from input");
    }
    if jobs.len() > MAX_JOBS {
        bail!("Too many jobs ({}), max {}", jobs.len(), MAX_JOBS);
    }
    Ok(jobs)
}
