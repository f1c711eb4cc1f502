//! Per-iteration score CSV for agentic runs.

use std::path::Path;

use crate::error::PipelineError;

/// One row of `iteration_scores.csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRow {
    pub iteration: u32,
    pub avg_score: f64,
    pub hard_ok: bool,
    pub gherkin_ok: bool,
    pub trace_ok: bool,
    pub edits_count: usize,
}

/// Write `iteration_scores.csv` into the run folder.
///
/// # Errors
///
/// Returns `PipelineError::Io` if the write fails.
pub fn write_iteration_scores(
    run_folder: &Path,
    rows: &[IterationRow],
) -> Result<(), PipelineError> {
    let mut lines =
        vec!["iteration,avg_score,hard_ok,gherkin_ok,trace_ok,edits_count".to_string()];
    for row in rows {
        lines.push(format!(
            "{},{:.3},{},{},{},{}",
            row.iteration, row.avg_score, row.hard_ok, row.gherkin_ok, row.trace_ok,
            row.edits_count,
        ));
    }
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(run_folder.join("iteration_scores.csv"), content)?;
    Ok(())
}
