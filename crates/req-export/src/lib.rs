//! # req-export
//!
//! File exports for a finished run: the run folder bundle (JSON, markdown,
//! score CSV), and a Jira import CSV.

mod csv;

pub mod bundle;
pub mod error;
pub mod jira;
pub mod markdown;

pub use bundle::{export_bundle, get_run_folder};
pub use error::ExportError;
pub use jira::export_jira_csv;
pub use markdown::to_markdown;
