//! Progress and result contracts for the ingestion pipeline.

// =============================================================================
// PROGRESS
// =============================================================================

/// One progress notification.
///
/// Emitted after every flushed batch and at pipeline boundaries (header
/// parsed, tensor finished, run complete). The meaning of the unit fields
/// depends on the phase: codepoints for Unicode seeding, tensors for
/// container ingestion.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// Phase label: `"Unicode seeding"`, `"Parsed header"`, a tensor name,
    /// or `"Complete"`.
    pub phase: &'a str,
    /// Units finished so far.
    pub units_done: i32,
    /// Total units in this phase.
    pub units_total: i32,
    /// Records written to the store so far.
    pub records_written: i64,
    /// Share of skipped values so far, in percent.
    pub sparsity_percent: f64,
}

/// Optional progress callback; context travels in the closure capture.
pub type ProgressSink<'a> = Option<&'a mut dyn FnMut(&Progress<'_>)>;

// =============================================================================
// SPARSITY
// =============================================================================

/// How tensor elements are thresholded before storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SparsityMode {
    /// Skip any nonzero element with |v| < threshold; exact zeros always
    /// pass through. A zero threshold stores everything.
    Threshold(f32),
    /// Sample the container first and derive the threshold that lands the
    /// given percentage of elements below it.
    TargetPercent(f32),
}

// =============================================================================
// REPORT
// =============================================================================

/// Summary of one tensor ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IngestReport {
    /// Tensors declared by the container header.
    pub tensor_count: i32,
    /// Declared elements across materialised tensors.
    pub total_parameters: i64,
    /// Elements examined.
    pub total_values: i64,
    /// Elements at or above the sparsity threshold.
    pub stored_values: i64,
    /// Elements below the sparsity threshold.
    pub skipped_values: i64,
    /// `100 · skipped / total`.
    pub sparsity_percent: f64,
    /// Wall-clock duration of the run.
    pub processing_time_ms: i64,
}

impl IngestReport {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn finish_sparsity(&mut self) {
        self.sparsity_percent = if self.total_values > 0 {
            100.0 * self.skipped_values as f64 / self.total_values as f64
        } else {
            0.0
        };
    }
}
