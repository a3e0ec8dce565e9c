//! Ingest Command
//!
//! Streams a safetensors container into the store.

use super::{open_target, TargetArgs};
use anyhow::Result;
use glome::{Ingestor, Progress, SparsityMode};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Ingest one container file.
pub fn run(
    file: &Path,
    model: &str,
    threshold: f32,
    target_sparsity: Option<f32>,
    target: &TargetArgs,
) -> Result<()> {
    let mode = target_sparsity.map_or(SparsityMode::Threshold(threshold), |percent| {
        SparsityMode::TargetPercent(percent)
    });

    let mut ingestor = Ingestor::new(open_target(target)?);

    let bar = ProgressBar::new(0);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} tensors {msg}",
    )?);

    let mut on_progress = |p: &Progress<'_>| {
        bar.set_length(u64::try_from(p.units_total).unwrap_or(0));
        bar.set_position(u64::try_from(p.units_done).unwrap_or(0));
        bar.set_message(format!(
            "{} ({} rows, {:.1}% sparse)",
            p.phase, p.records_written, p.sparsity_percent
        ));
    };

    let report = ingestor.ingest_tensor_file(file, model, mode, Some(&mut on_progress))?;
    bar.finish();

    println!(
        "ingested {} of {} values across {} tensors ({} skipped, {:.2}% sparse) in {} ms",
        report.stored_values,
        report.total_values,
        report.tensor_count,
        report.skipped_values,
        report.sparsity_percent,
        report.processing_time_ms,
    );
    Ok(())
}
