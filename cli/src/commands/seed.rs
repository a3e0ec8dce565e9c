//! Seed Command
//!
//! Bulk-seeds a Unicode codepoint range.

use super::{open_target, TargetArgs};
use anyhow::Result;
use glome::{Ingestor, Progress};
use indicatif::{ProgressBar, ProgressStyle};

/// Seed every non-surrogate codepoint in `start..=end`.
pub fn run(start: u32, end: u32, target: &TargetArgs) -> Result<()> {
    let mut ingestor = Ingestor::new(open_target(target)?);

    let bar = ProgressBar::new(u64::from(end.saturating_sub(start)) + 1);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} {msg}",
    )?);

    let mut on_progress = |p: &Progress<'_>| {
        bar.set_position(u64::try_from(p.units_done).unwrap_or(0));
        bar.set_length(u64::try_from(p.units_total).unwrap_or(0));
        bar.set_message(format!("{} ({} rows)", p.phase, p.records_written));
    };

    let written = ingestor.seed_unicode_range(start, end, Some(&mut on_progress))?;
    bar.finish();

    println!("seeded {written} codepoint constants from U+{start:04X}..=U+{end:04X}");
    Ok(())
}
