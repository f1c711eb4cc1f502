//! The `rqs generate` command: run a pipeline mode end to end and export
//! the run bundle.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use req_config::{OpenAiConfig, ReqConfig};
use req_core::entities::{Epic, RequirementSet};
use req_db::ReqDb;
use req_embeddings::EmbeddingEngine;
use req_llm::LlmClient;
use req_pipeline::{
    RunOptions, embed_stories, persist_decomposition, run_agentic, run_llm_baseline,
    run_stub_baseline,
};

use crate::cli::{GenerateArgs, GenerationMode};

pub async fn handle(args: &GenerateArgs) -> anyhow::Result<()> {
    let config = ReqConfig::load_with_dotenv().context("failed to load configuration")?;
    let epic = load_epic(&args.epic)?;

    let out_dir = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.pipeline.out_dir));
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| config.openai.model.clone());
    let temperature = args.temperature.unwrap_or(config.openai.temperature);

    let db = open_db(&config.cache.db_path).await?;

    let (req, cache_message) = match args.mode {
        GenerationMode::Baseline => {
            let req = run_stub_baseline(&epic);
            if !args.no_persist {
                persist_decomposition(&db, &epic, &req).await?;
            }
            (req, None)
        }
        GenerationMode::Llm => {
            let llm = build_client(&config.openai, &model, temperature)?;
            let mut embedder = load_embedder()?;
            let (req, meta) = run_llm_baseline(
                &llm,
                &mut embedder,
                &db,
                &epic,
                &model,
                temperature,
                &config.cache,
            )
            .await?;
            if !args.no_persist {
                persist(&db, &mut embedder, &epic, &req).await?;
            }
            (req, Some(meta.user_message))
        }
        GenerationMode::Agentic => {
            let llm = build_client(&config.openai, &model, temperature)?;
            let mut embedder = load_embedder()?;
            let mut opts = RunOptions::from_config(&config.pipeline, &model, temperature);
            opts.out_dir.clone_from(&out_dir);
            if let Some(n) = args.max_iters {
                opts.max_iters = n;
            }
            if let Some(score) = args.target_score {
                opts.target_score = score;
            }
            if let Some(n) = args.force_min_iters {
                opts.force_min_iters = n;
            }

            let (req, meta) =
                run_agentic(&llm, &mut embedder, &db, &epic, &config.cache, &opts).await?;
            if !args.no_persist {
                persist(&db, &mut embedder, &epic, &req).await?;
            }
            (req, Some(meta.user_message))
        }
    };

    let folder = req_export::export_bundle(&epic, &req, &out_dir)?;

    if let Some(message) = cache_message {
        println!("[cache] {message}");
    }
    println!("Exported run bundle to: {}", folder.display());
    println!(
        "Mode: {} | Generator: {} | Iteration: {}",
        req.mode,
        req.run_metadata.model_name.as_deref().unwrap_or("-"),
        req.run_metadata.iteration,
    );
    Ok(())
}

/// Read and validate an epic JSON file.
fn load_epic(path: &Path) -> anyhow::Result<Epic> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read epic file '{}'", path.display()))?;
    let epic: Epic = serde_json::from_str(&raw)
        .with_context(|| format!("'{}' is not a valid epic JSON file", path.display()))?;
    epic.validate()?;
    Ok(epic)
}

async fn open_db(db_path: &str) -> anyhow::Result<ReqDb> {
    if let Some(parent) = Path::new(db_path).parent() {
        fs::create_dir_all(parent)?;
    }
    ReqDb::open_local(db_path)
        .await
        .with_context(|| format!("failed to open database at '{db_path}'"))
}

fn build_client(openai: &OpenAiConfig, model: &str, temperature: f64) -> anyhow::Result<LlmClient> {
    anyhow::ensure!(
        openai.is_configured(),
        "OPENAI_API_KEY is not set; use '--mode baseline' for an offline run"
    );
    Ok(LlmClient::new(
        &openai.api_key,
        model,
        &openai.base_url,
        temperature,
        openai.timeout_secs,
    )?)
}

fn load_embedder() -> anyhow::Result<EmbeddingEngine> {
    EmbeddingEngine::new().context("failed to load the embedding model")
}

async fn persist(
    db: &ReqDb,
    embedder: &mut EmbeddingEngine,
    epic: &Epic,
    req: &RequirementSet,
) -> anyhow::Result<()> {
    persist_decomposition(db, epic, req).await?;
    embed_stories(embedder, db, &epic.epic_id, &req.stories).await?;
    Ok(())
}
