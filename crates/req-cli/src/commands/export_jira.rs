//! The `rqs export-jira` command: turn an exported run bundle into a
//! Jira import CSV.

use std::fs;
use std::path::Path;

use anyhow::Context;

use req_core::entities::{Epic, RequirementSet};
use req_export::export_jira_csv;

use crate::cli::ExportJiraArgs;

pub fn handle(args: &ExportJiraArgs) -> anyhow::Result<()> {
    let epic: Epic = read_json(&args.run_folder.join("epic.json"))?;
    let req: RequirementSet = read_json(&args.run_folder.join("requirement_set.json"))?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| args.run_folder.join("jira.csv"));
    export_jira_csv(&epic, &req, &out)?;

    println!("Wrote Jira CSV: {}", out.display());
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}' (is this a run folder?)", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("'{}' does not parse", path.display()))
}
