//! Ingestion orchestrator.
//!
//! Two entry points share one pipeline: Unicode range seeding and tensor
//! container ingestion. Both enumerate seeds, compute the numeric triple
//! (point, Hilbert key, digest) in a data-parallel region with no shared
//! mutable state, gather records into fixed-size batches, and hand each
//! batch to the configured [`CopyTarget`]. I/O and wire emission stay
//! single-threaded; record order is the input iteration order.

mod progress;

pub use progress::{IngestReport, Progress, ProgressSink, SparsityMode};

use crate::errors::IngestError;
use crate::hashing::hash_seed_u32;
use crate::hilbert;
use crate::projection::project;
use crate::store::CopyTarget;
use crate::tensor::TensorContainer;
use crate::types::{ConstantRecord, Seed};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Rows per bulk-copy batch.
pub const COPY_BATCH_ROWS: usize = 500_000;

/// Elements sampled per tensor when deriving a target-sparsity threshold.
pub const SAMPLE_ELEMENTS_PER_TENSOR: u64 = 100_000;

/// Largest Unicode codepoint.
pub const UNICODE_MAX: u32 = 0x0010_FFFF;

const SURROGATE_FIRST: u32 = 0xD800;
const SURROGATE_LAST: u32 = 0xDFFF;

// =============================================================================
// RECORD DERIVATION
// =============================================================================

/// True for UTF-16 surrogate codepoints, which are never seeded.
#[must_use]
pub const fn is_surrogate(cp: u32) -> bool {
    cp >= SURROGATE_FIRST && cp <= SURROGATE_LAST
}

#[allow(clippy::cast_possible_wrap)]
fn codepoint_record(cp: u32) -> ConstantRecord {
    let point = project(&Seed::Codepoint(cp));
    let key = hilbert::encode(point);
    ConstantRecord {
        seed_value: i64::from(cp),
        seed_type: Seed::Codepoint(cp).kind().as_i32(),
        digest: hash_seed_u32(cp),
        hilbert_high: key.high as i64,
        hilbert_low: key.low as i64,
        point,
    }
}

#[allow(clippy::cast_possible_wrap)]
fn float_bits_record(bits: u32) -> ConstantRecord {
    let seed = Seed::from_f32_bits(bits);
    let point = project(&seed);
    let key = hilbert::encode(point);
    ConstantRecord {
        seed_value: i64::from(bits),
        seed_type: seed.kind().as_i32(),
        digest: hash_seed_u32(bits),
        hilbert_high: key.high as i64,
        hilbert_low: key.low as i64,
        point,
    }
}

// =============================================================================
// PARALLEL REGION
// =============================================================================

/// Feature-agnostic data-parallel map over disjoint indices.
///
/// Output order equals input order in both modes, so results are
/// identical to serial execution.
fn map_records<I, R, F>(items: &[I], derive: F) -> Vec<R>
where
    I: Sync,
    R: Send,
    F: Fn(&I) -> R + Sync + Send,
{
    #[cfg(feature = "multithread")]
    {
        use rayon::prelude::*;
        items.par_iter().map(derive).collect()
    }
    #[cfg(not(feature = "multithread"))]
    {
        items.iter().map(derive).collect()
    }
}

// =============================================================================
// ORCHESTRATOR
// =============================================================================

/// Drives the full pipeline against one [`CopyTarget`].
#[derive(Debug)]
pub struct Ingestor<T: CopyTarget> {
    target: T,
}

impl<T: CopyTarget> Ingestor<T> {
    /// Wrap a copy target.
    pub fn new(target: T) -> Self {
        Self { target }
    }

    /// Unwrap the copy target.
    pub fn into_target(self) -> T {
        self.target
    }

    // =========================================================================
    // UNICODE SEEDING
    // =========================================================================

    /// Seed every non-surrogate codepoint in the inclusive range.
    ///
    /// Returns the number of records written.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidInput`] for a reversed or
    /// out-of-plane range, or a [`StoreError`](crate::StoreError) when a
    /// batch cannot be copied; already-committed batches stay committed.
    pub fn seed_unicode_range(
        &mut self,
        start: u32,
        end: u32,
        mut progress: ProgressSink<'_>,
    ) -> Result<i64, IngestError> {
        if start > end || end > UNICODE_MAX {
            return Err(IngestError::InvalidInput(format!(
                "codepoint range {start:#X}..={end:#X} is not within the Unicode planes"
            )));
        }

        let codepoints: Vec<u32> = (start..=end).filter(|&cp| !is_surrogate(cp)).collect();
        let valid_count = codepoints.len();
        info!(start, end, valid_count, "seeding Unicode range");

        let records = map_records(&codepoints, |&cp| codepoint_record(cp));

        let mut total_written: i64 = 0;
        let mut processed = 0usize;
        for batch in records.chunks(COPY_BATCH_ROWS) {
            let accepted = self.target.copy_batch(batch)?;
            #[allow(clippy::cast_possible_wrap)]
            {
                total_written += accepted as i64;
            }
            processed += batch.len();
            emit(
                &mut progress,
                "Unicode seeding",
                as_units(processed),
                as_units(valid_count),
                total_written,
                0.0,
            );
        }

        emit(
            &mut progress,
            "Complete",
            as_units(valid_count),
            as_units(valid_count),
            total_written,
            0.0,
        );
        Ok(total_written)
    }

    // =========================================================================
    // TENSOR INGESTION
    // =========================================================================

    /// Ingest every F32/F16 tensor of a container file.
    ///
    /// Elements below the sparsity threshold are skipped; surviving 32-bit
    /// patterns are deduplicated for the duration of the run and stored as
    /// zero-extended float-bits seeds. `model` is an opaque label carried
    /// into the logs.
    ///
    /// # Errors
    /// Returns [`IngestError`] on parse or store failure. Batches
    /// committed before the failure remain committed; re-running is safe
    /// because the store deduplicates on (seed_type, seed_value).
    pub fn ingest_tensor_file(
        &mut self,
        path: &Path,
        model: &str,
        mode: SparsityMode,
        mut progress: ProgressSink<'_>,
    ) -> Result<IngestReport, IngestError> {
        let started = Instant::now();
        let mut container = TensorContainer::open(path)?;

        let mut report = IngestReport {
            tensor_count: as_units(container.tensors().len()),
            ..IngestReport::default()
        };
        info!(
            model,
            tensors = report.tensor_count,
            payload_len = container.payload_len(),
            "ingesting tensor container"
        );
        emit(
            &mut progress,
            "Parsed header",
            0,
            report.tensor_count,
            0,
            0.0,
        );

        let threshold = match mode {
            SparsityMode::Threshold(t) => t,
            SparsityMode::TargetPercent(percent) => {
                let t = sample_threshold(&mut container, percent)?;
                info!(target_percent = percent, threshold = t, "sampled sparsity threshold");
                t
            }
        };

        let mut seen_bits: HashSet<u32> = HashSet::new();
        let mut batch: Vec<ConstantRecord> = Vec::with_capacity(COPY_BATCH_ROWS);
        let mut tensors_done: i32 = 0;
        let mut fresh: Vec<u32> = Vec::new();

        for index in 0..container.tensors().len() {
            let descriptor = container.tensors()[index].clone();
            if !descriptor.dtype.is_materialized() {
                debug!(tensor = %descriptor.name, "skipping unsupported dtype");
                tensors_done += 1;
                continue;
            }

            report.total_parameters += descriptor.total_elements();

            let mut reader = container.elements(index, None)?;
            while let Some(chunk) = reader.next_chunk()? {
                // Threshold and dedupe serially; order decides which
                // occurrence of a pattern creates the record.
                fresh.clear();
                for &value in chunk {
                    report.total_values += 1;
                    // Exact zeros pass through: the threshold drops values
                    // that would round to zero, not zero itself.
                    if value != 0.0 && value.abs() < threshold {
                        report.skipped_values += 1;
                        continue;
                    }
                    report.stored_values += 1;
                    let bits = value.to_bits();
                    if seen_bits.insert(bits) {
                        fresh.push(bits);
                    }
                }

                let records = map_records(&fresh, |&bits| float_bits_record(bits));
                for record in records {
                    batch.push(record);
                    if batch.len() >= COPY_BATCH_ROWS {
                        self.target.copy_batch(&batch)?;
                        batch.clear();
                    }
                }
            }

            tensors_done += 1;
            report.finish_sparsity();
            emit(
                &mut progress,
                &descriptor.name,
                tensors_done,
                report.tensor_count,
                report.stored_values,
                report.sparsity_percent,
            );
        }

        if !batch.is_empty() {
            self.target.copy_batch(&batch)?;
        }

        report.finish_sparsity();
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        {
            report.processing_time_ms = started.elapsed().as_millis() as i64;
        }

        emit(
            &mut progress,
            "Complete",
            report.tensor_count,
            report.tensor_count,
            report.stored_values,
            report.sparsity_percent,
        );
        Ok(report)
    }
}

// =============================================================================
// THRESHOLD SAMPLING
// =============================================================================

/// Derive the magnitude threshold that lands `target_percent` of sampled
/// elements below it.
///
/// Reads up to [`SAMPLE_ELEMENTS_PER_TENSOR`] decoded elements from the
/// head of every materialised tensor, sorts the magnitudes, and picks the
/// value at the target percentile. An out-of-range percentile falls back
/// to storing everything.
fn sample_threshold(
    container: &mut TensorContainer,
    target_percent: f32,
) -> Result<f32, IngestError> {
    let mut magnitudes: Vec<f32> = Vec::new();
    for index in 0..container.tensors().len() {
        if !container.tensors()[index].dtype.is_materialized() {
            continue;
        }
        let mut reader = container.elements(index, Some(SAMPLE_ELEMENTS_PER_TENSOR))?;
        while let Some(chunk) = reader.next_chunk()? {
            magnitudes.extend(chunk.iter().map(|v| v.abs()));
        }
    }

    magnitudes.sort_by(f32::total_cmp);

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pick = (magnitudes.len() as f64 * f64::from(target_percent) / 100.0) as usize;
    Ok(magnitudes.get(pick).copied().unwrap_or(0.0))
}

// =============================================================================
// PROGRESS PLUMBING
// =============================================================================

fn emit(
    progress: &mut ProgressSink<'_>,
    phase: &str,
    units_done: i32,
    units_total: i32,
    records_written: i64,
    sparsity_percent: f64,
) {
    if let Some(callback) = progress.as_mut() {
        callback(&Progress {
            phase,
            units_done,
            units_total,
            records_written,
            sparsity_percent,
        });
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn as_units(count: usize) -> i32 {
    count as i32
}
