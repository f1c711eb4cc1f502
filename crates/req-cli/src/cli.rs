use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI parser for the `rqs` binary.
#[derive(Debug, Parser)]
#[command(name = "rqs", version, about = "ReqSmith - agentic requirements generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decompose an epic into user stories and Gherkin scenarios
    Generate(GenerateArgs),
    /// Convert an exported run bundle into a Jira import CSV
    ExportJira(ExportJiraArgs),
}

/// How the bundle is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GenerationMode {
    /// Deterministic stub bundle, fully offline
    Baseline,
    /// Single LLM completion, no critique loop
    Llm,
    /// Full generate/critique/refine loop
    Agentic,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Path to the epic JSON file
    #[arg(long)]
    pub epic: PathBuf,

    /// Generation mode
    #[arg(long, value_enum, default_value_t = GenerationMode::Llm)]
    pub mode: GenerationMode,

    /// Model override (defaults to config / OPENAI_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature override
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Max critique/refine iterations (agentic mode)
    #[arg(long)]
    pub max_iters: Option<u32>,

    /// Average score that ends the loop early (agentic mode)
    #[arg(long)]
    pub target_score: Option<f64>,

    /// Minimum iterations before early exit (agentic mode)
    #[arg(long)]
    pub force_min_iters: Option<u32>,

    /// Output directory override
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Skip persisting the decomposition and story embeddings
    #[arg(long)]
    pub no_persist: bool,
}

#[derive(Debug, Args)]
pub struct ExportJiraArgs {
    /// Run folder containing epic.json and requirement_set.json
    #[arg(long)]
    pub run_folder: PathBuf,

    /// Output CSV path (defaults to jira.csv inside the run folder)
    #[arg(long)]
    pub out: Option<PathBuf>,
}
