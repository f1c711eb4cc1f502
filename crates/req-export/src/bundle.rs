//! Run folder layout and the per-run artifact bundle.
//!
//! Every run gets `{out_dir}/{epic_id}/{mode}/{run_id}/` containing
//! `epic.json`, `requirement_set.json`, `requirements.md`, and
//! `summary.csv`. The agentic loop writes its audit log and iteration
//! scores into the same folder.

use std::fs;
use std::path::{Path, PathBuf};

use req_core::entities::{Epic, RequirementSet};

use crate::error::ExportError;
use crate::markdown::to_markdown;

/// Resolve (and create) the run folder for a run.
///
/// # Errors
///
/// Returns `ExportError::Io` if the directory cannot be created.
pub fn get_run_folder(
    epic_id: &str,
    mode: &str,
    run_id: &str,
    out_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let run_folder = out_dir.join(epic_id).join(mode).join(run_id);
    fs::create_dir_all(&run_folder)?;
    Ok(run_folder)
}

/// Write the four run artifacts and return the run folder.
///
/// # Errors
///
/// Returns `ExportError` if serialization or any file write fails.
pub fn export_bundle(
    epic: &Epic,
    req: &RequirementSet,
    out_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let run_folder = get_run_folder(
        &epic.epic_id,
        req.mode.as_str(),
        &req.run_metadata.run_id,
        out_dir,
    )?;

    fs::write(
        run_folder.join("epic.json"),
        serde_json::to_string_pretty(epic)?,
    )?;
    fs::write(
        run_folder.join("requirement_set.json"),
        serde_json::to_string_pretty(req)?,
    )?;
    fs::write(run_folder.join("requirements.md"), to_markdown(epic, req))?;
    fs::write(run_folder.join("summary.csv"), summary_csv(req))?;

    Ok(run_folder)
}

/// Per-story score summary as CSV.
fn summary_csv(req: &RequirementSet) -> String {
    let mut rows = vec!["story_id,overall_score,I,N,V,E,S,T,gherkin_valid".to_string()];
    for qr in &req.quality_reports {
        let inv = &qr.invest;
        rows.push(format!(
            "{},{:.2},{},{},{},{},{},{},{}",
            qr.story_id,
            qr.overall_score,
            inv.independent,
            inv.negotiable,
            inv.valuable,
            inv.estimable,
            inv.small,
            inv.testable,
            qr.gherkin_valid,
        ));
    }
    let mut csv = rows.join("\n");
    csv.push('\n');
    csv
}
