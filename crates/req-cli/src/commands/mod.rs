pub mod export_jira;
pub mod generate;
