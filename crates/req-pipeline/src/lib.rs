//! # req-pipeline
//!
//! Run orchestration: the stub and LLM baselines, the agentic
//! generate/critique/refine loop, semantic cache policy, and the run
//! evidence files (audit log, iteration scores).
//!
//! The orchestrator is generic over [`req_llm::Completion`] and
//! [`req_embeddings::Embedder`], so the whole loop runs offline in tests
//! with scripted completions and a stub embedder.

pub mod audit;
pub mod cache;
pub mod error;
pub mod scores;

#[cfg(test)]
pub(crate) mod test_support;

pub use audit::AuditLogger;
pub use cache::{CacheMeta, POLICY_VERSION, generate_bundle_cached};
pub use error::PipelineError;
pub use scores::{IterationRow, write_iteration_scores};

use std::path::{Path, PathBuf};

use serde_json::json;

use req_agents::{AgentError, GeneratedBundle, critique, generate_baseline, refine};
use req_config::{CacheConfig, PipelineConfig};
use req_core::entities::{Epic, RequirementSet, RunMetadata, UserStory};
use req_core::enums::Mode;
use req_core::ids::new_run_id;
use req_db::ReqDb;
use req_db::helpers::sha256_hex;
use req_db::repos::story::story_embedding_owner;
use req_embeddings::Embedder;
use req_export::get_run_folder;
use req_llm::Completion;
use req_quality::{QualityAssessment, build_quality_reports, check_trace};

/// Tuning for an agentic run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub model: String,
    pub temperature: f64,
    /// Critique/refine iterations after the initial generation.
    pub max_iters: u32,
    /// Average score at which the loop stops, if hard checks also pass.
    pub target_score: f64,
    /// Minimum iterations even when iteration 0 already meets the target.
    pub force_min_iters: u32,
    pub out_dir: PathBuf,
}

impl RunOptions {
    /// Build run options from pipeline config plus the chosen model.
    #[must_use]
    pub fn from_config(pipeline: &PipelineConfig, model: &str, temperature: f64) -> Self {
        Self {
            model: model.to_string(),
            temperature,
            max_iters: pipeline.max_iters,
            target_score: pipeline.target_score,
            force_min_iters: pipeline.force_min_iters,
            out_dir: PathBuf::from(&pipeline.out_dir),
        }
    }
}

/// Assemble a scored requirement set from a generated bundle.
fn make_requirement_set(
    epic: &Epic,
    run_id: &str,
    mode: Mode,
    iteration: u32,
    model: Option<&str>,
    temperature: Option<f64>,
    bundle: GeneratedBundle,
) -> (RequirementSet, QualityAssessment) {
    let mut req = RequirementSet {
        epic_id: epic.epic_id.clone(),
        mode,
        stories: bundle.stories,
        scenarios: bundle.scenarios,
        quality_reports: vec![],
        trace_map: bundle.trace_map,
        run_metadata: RunMetadata {
            run_id: run_id.to_string(),
            epic_id: epic.epic_id.clone(),
            mode,
            iteration,
            model_name: model.map(ToString::to_string),
            temperature,
        },
    };
    let assessment = build_quality_reports(&req);
    req.quality_reports.clone_from(&assessment.reports);
    (req, assessment)
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Baseline with no network at all: the deterministic stub bundle, scored.
#[must_use]
pub fn run_stub_baseline(epic: &Epic) -> RequirementSet {
    let run_id = new_run_id();
    let bundle = generate_baseline(epic);
    let (req, _) = make_requirement_set(
        epic,
        &run_id,
        Mode::LlmBaseline,
        0,
        Some("stub"),
        None,
        bundle,
    );
    req
}

/// Single-shot LLM baseline: one cached generation, scored, no critique
/// loop.
///
/// # Errors
///
/// Returns [`PipelineError`] on agent, embedding, or database failure.
pub async fn run_llm_baseline<C: Completion, E: Embedder>(
    llm: &C,
    embedder: &mut E,
    db: &ReqDb,
    epic: &Epic,
    model: &str,
    temperature: f64,
    cache_cfg: &CacheConfig,
) -> Result<(RequirementSet, CacheMeta), PipelineError> {
    let run_id = new_run_id();
    let (bundle, cache_meta) =
        generate_bundle_cached(llm, embedder, db, epic, model, cache_cfg).await?;
    tracing::info!(
        cache_hit = %cache_meta.cache_hit,
        "{}",
        cache_meta.user_message
    );

    let (req, _) = make_requirement_set(
        epic,
        &run_id,
        Mode::LlmBaseline,
        0,
        Some(model),
        Some(temperature),
        bundle,
    );
    Ok((req, cache_meta))
}

/// The agentic loop: generate, score, then critique/refine until the
/// target score is met, the critic declines to iterate, the iteration
/// budget runs out, or an agent fails.
///
/// Writes `audit_log.jsonl` and `iteration_scores.csv` into the run
/// folder on every exit path. On agent failure the best set seen so far
/// is returned rather than an error.
///
/// # Errors
///
/// Returns [`PipelineError`] if the initial generation fails or a run
/// evidence file cannot be written.
#[allow(clippy::too_many_lines)]
pub async fn run_agentic<C: Completion, E: Embedder>(
    llm: &C,
    embedder: &mut E,
    db: &ReqDb,
    epic: &Epic,
    cache_cfg: &CacheConfig,
    opts: &RunOptions,
) -> Result<(RequirementSet, CacheMeta), PipelineError> {
    let run_id = new_run_id();
    let run_folder = get_run_folder(&epic.epic_id, Mode::Agentic.as_str(), &run_id, &opts.out_dir)?;
    let audit = AuditLogger::create(run_folder.clone())?;

    let mut rows: Vec<IterationRow> = Vec::new();

    let (bundle, cache_meta) =
        generate_bundle_cached(llm, embedder, db, epic, &opts.model, cache_cfg).await?;
    tracing::info!(
        cache_hit = %cache_meta.cache_hit,
        "{}",
        cache_meta.user_message
    );

    let (mut req, assessment) = make_requirement_set(
        epic,
        &run_id,
        Mode::Agentic,
        0,
        Some(&opts.model),
        Some(opts.temperature),
        bundle,
    );

    let mut avg_score = assessment.avg_score;
    let mut hard_ok = assessment.hard_ok;
    log_iteration(&audit, &req, &assessment, 0, 0, None)?;
    rows.push(iteration_row(&req, &assessment, 0, 0));

    let mut best_req = req.clone();
    let mut best_score = avg_score;

    if hard_ok && avg_score >= opts.target_score && opts.force_min_iters == 0 {
        write_iteration_scores(&run_folder, &rows)?;
        return Ok((best_req, cache_meta));
    }

    for it in 1..=opts.max_iters {
        let crit = match critique(llm, epic, &req).await {
            Ok(c) => c,
            Err(e) => {
                log_agent_error(&audit, &run_folder, &rows, it, &e)?;
                return Ok((best_req, cache_meta));
            }
        };
        audit.log(
            "critique",
            json!({
                "iteration": it,
                "should_iterate": crit.should_iterate,
                "summary": crit.summary,
                "edits_count": crit.edits.len(),
            }),
        )?;

        if !crit.should_iterate {
            write_iteration_scores(&run_folder, &rows)?;
            return Ok((req, cache_meta));
        }

        let refined = match refine(llm, epic, &req, &crit).await {
            Ok(r) => r,
            Err(e) => {
                log_agent_error(&audit, &run_folder, &rows, it, &e)?;
                return Ok((best_req, cache_meta));
            }
        };

        let (next_req, assessment) = make_requirement_set(
            epic,
            &run_id,
            Mode::Agentic,
            it,
            Some(&opts.model),
            Some(opts.temperature),
            refined,
        );
        req = next_req;
        avg_score = assessment.avg_score;
        hard_ok = assessment.hard_ok;

        log_iteration(&audit, &req, &assessment, it, crit.edits.len(), Some(&crit.summary))?;
        rows.push(iteration_row(&req, &assessment, it, crit.edits.len()));

        if hard_ok && avg_score >= best_score {
            best_req = req.clone();
            best_score = avg_score;
        }

        if hard_ok && avg_score >= opts.target_score {
            write_iteration_scores(&run_folder, &rows)?;
            return Ok((req, cache_meta));
        }
    }

    write_iteration_scores(&run_folder, &rows)?;
    Ok((best_req, cache_meta))
}

fn log_iteration(
    audit: &AuditLogger,
    req: &RequirementSet,
    assessment: &QualityAssessment,
    iteration: u32,
    edits_count: usize,
    critic_summary: Option<&str>,
) -> Result<(), PipelineError> {
    let capped: Vec<&String> = assessment.hard_violations.iter().take(20).collect();
    audit.log(
        "iteration_result",
        json!({
            "iteration": iteration,
            "avg_score": round3(assessment.avg_score),
            "hard_ok": assessment.hard_ok,
            "gherkin_ok": gherkin_ok(assessment),
            "trace_ok": check_trace(req).0,
            "hard_violations": capped,
            "stories": req.stories.len(),
            "scenarios": req.scenarios.len(),
            "edits_count": edits_count,
            "critic_summary": critic_summary,
        }),
    )
}

fn iteration_row(
    req: &RequirementSet,
    assessment: &QualityAssessment,
    iteration: u32,
    edits_count: usize,
) -> IterationRow {
    IterationRow {
        iteration,
        avg_score: assessment.avg_score,
        hard_ok: assessment.hard_ok,
        gherkin_ok: gherkin_ok(assessment),
        trace_ok: check_trace(req).0,
        edits_count,
    }
}

fn gherkin_ok(assessment: &QualityAssessment) -> bool {
    assessment.reports.iter().all(|r| r.gherkin_valid)
}

fn log_agent_error(
    audit: &AuditLogger,
    run_folder: &Path,
    rows: &[IterationRow],
    iteration: u32,
    err: &AgentError,
) -> Result<(), PipelineError> {
    tracing::warn!(iteration, error = %err, "agent failed, keeping best set");
    audit.log(
        "error",
        json!({"iteration": iteration, "error": err.to_string()}),
    )?;
    write_iteration_scores(run_folder, rows)
}

/// Persist an accepted requirement set as the epic's decomposition.
///
/// Upserts the epic, replaces its stored stories and scenarios, and marks
/// it decomposed.
///
/// # Errors
///
/// Returns [`PipelineError::Db`] if any statement fails.
pub async fn persist_decomposition(
    db: &ReqDb,
    epic: &Epic,
    req: &RequirementSet,
) -> Result<(), PipelineError> {
    db.upsert_epic(epic).await?;
    db.replace_decomposition(epic, &req.stories, &req.scenarios)
        .await?;
    Ok(())
}

/// Embed each story's text and store the vectors for later similarity
/// queries. Separate from persistence so offline runs skip the model.
///
/// # Errors
///
/// Returns [`PipelineError`] if embedding or a write fails.
pub async fn embed_stories<E: Embedder>(
    embedder: &mut E,
    db: &ReqDb,
    epic_id: &str,
    stories: &[UserStory],
) -> Result<(), PipelineError> {
    for story in stories {
        let vector = embedder.embed(&story.story_text)?;
        db.upsert_embedding(
            "story",
            &story_embedding_owner(epic_id, &story.story_id),
            &sha256_hex(&story.story_text),
            &vector,
        )
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::test_support::{BUNDLE_JSON, Scripted, StubEmbedder, sample_epic};

    const STOP_CRITIQUE: &str = r#"{
        "should_iterate": false,
        "summary": "Stories and scenarios are in good shape.",
        "edits": []
    }"#;

    const ITERATE_CRITIQUE: &str = r#"{
        "should_iterate": true,
        "summary": "SC-001 THEN step needs a measurable outcome.",
        "edits": [{
            "issue_type": "Gherkin_Structure",
            "target_id": "SC-001",
            "action": "revise_scenario",
            "rationale": "THEN is not measurable.",
            "patch_guidance": "State the delivery window explicitly."
        }]
    }"#;

    async fn test_db() -> ReqDb {
        ReqDb::open_local(":memory:").await.unwrap()
    }

    fn opts(out_dir: &Path) -> RunOptions {
        RunOptions {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_iters: 3,
            target_score: 4.2,
            force_min_iters: 1,
            out_dir: out_dir.to_path_buf(),
        }
    }

    #[test]
    fn stub_baseline_is_scored_and_offline() {
        let req = run_stub_baseline(&sample_epic());
        assert_eq!(req.mode, Mode::LlmBaseline);
        assert_eq!(req.run_metadata.model_name.as_deref(), Some("stub"));
        assert!(!req.stories.is_empty());
        assert_eq!(req.quality_reports.len(), req.stories.len());
    }

    #[tokio::test]
    async fn llm_baseline_scores_generated_bundle() {
        let db = test_db().await;
        let llm = Scripted::new(&[BUNDLE_JSON]);
        let mut emb = StubEmbedder::new(&[1.0, 0.0]);

        let (req, meta) = run_llm_baseline(
            &llm,
            &mut emb,
            &db,
            &sample_epic(),
            "gpt-4o-mini",
            0.2,
            &CacheConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(req.mode, Mode::LlmBaseline);
        assert_eq!(req.run_metadata.iteration, 0);
        assert_eq!(req.stories[0].story_id, "US-001");
        assert!(!req.quality_reports.is_empty());
        assert_eq!(meta.policy_version, POLICY_VERSION);
    }

    #[tokio::test]
    async fn agentic_stops_when_critic_declines() {
        let db = test_db().await;
        let tmp = tempfile::tempdir().unwrap();
        let llm = Scripted::new(&[BUNDLE_JSON, STOP_CRITIQUE]);
        let mut emb = StubEmbedder::new(&[1.0, 0.0]);

        let (req, _) = run_agentic(
            &llm,
            &mut emb,
            &db,
            &sample_epic(),
            &CacheConfig::default(),
            &opts(tmp.path()),
        )
        .await
        .unwrap();

        assert_eq!(req.run_metadata.iteration, 0);

        let run_folder = tmp
            .path()
            .join("E-AUTH")
            .join("agentic")
            .join(&req.run_metadata.run_id);
        let audit = std::fs::read_to_string(run_folder.join("audit_log.jsonl")).unwrap();
        let events: Vec<serde_json::Value> = audit
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events[0]["event"], "iteration_result");
        assert_eq!(events[1]["event"], "critique");
        assert_eq!(events[1]["should_iterate"], false);

        let csv = std::fs::read_to_string(run_folder.join("iteration_scores.csv")).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[tokio::test]
    async fn agentic_refines_until_target() {
        let db = test_db().await;
        let tmp = tempfile::tempdir().unwrap();
        // generation, critique (iterate), refinement; the clean bundle
        // scores 29/6 which is above the 4.2 target
        let llm = Scripted::new(&[BUNDLE_JSON, ITERATE_CRITIQUE, BUNDLE_JSON]);
        let mut emb = StubEmbedder::new(&[1.0, 0.0]);

        let (req, _) = run_agentic(
            &llm,
            &mut emb,
            &db,
            &sample_epic(),
            &CacheConfig::default(),
            &opts(tmp.path()),
        )
        .await
        .unwrap();

        assert_eq!(req.run_metadata.iteration, 1);

        let run_folder = tmp
            .path()
            .join("E-AUTH")
            .join("agentic")
            .join(&req.run_metadata.run_id);
        let csv = std::fs::read_to_string(run_folder.join("iteration_scores.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("1,"));
        assert!(lines[2].ends_with(",1"), "edits_count should be 1: {}", lines[2]);
    }

    #[tokio::test]
    async fn agentic_returns_best_on_agent_failure() {
        let db = test_db().await;
        let tmp = tempfile::tempdir().unwrap();
        // critique never parses: initial attempt plus two repairs all fail
        let llm = Scripted::new(&[BUNDLE_JSON, "not json", "still not", "nope"]);
        let mut emb = StubEmbedder::new(&[1.0, 0.0]);

        let (req, _) = run_agentic(
            &llm,
            &mut emb,
            &db,
            &sample_epic(),
            &CacheConfig::default(),
            &opts(tmp.path()),
        )
        .await
        .unwrap();

        assert_eq!(req.run_metadata.iteration, 0);

        let run_folder = tmp
            .path()
            .join("E-AUTH")
            .join("agentic")
            .join(&req.run_metadata.run_id);
        let audit = std::fs::read_to_string(run_folder.join("audit_log.jsonl")).unwrap();
        assert!(audit.contains("\"event\":\"error\""));
        assert!(run_folder.join("iteration_scores.csv").exists());
    }

    #[tokio::test]
    async fn early_exit_honors_force_min_iters() {
        let db = test_db().await;
        let tmp = tempfile::tempdir().unwrap();
        let llm = Scripted::new(&[BUNDLE_JSON]);
        let mut emb = StubEmbedder::new(&[1.0, 0.0]);
        let mut options = opts(tmp.path());
        options.force_min_iters = 0;

        // No critique scripted: an immediate exit is the only way this
        // resolves without a script-exhausted error.
        let (req, _) = run_agentic(
            &llm,
            &mut emb,
            &db,
            &sample_epic(),
            &CacheConfig::default(),
            &options,
        )
        .await
        .unwrap();
        assert_eq!(req.run_metadata.iteration, 0);
    }

    #[tokio::test]
    async fn persist_and_embed_stories() {
        let db = test_db().await;
        let epic = sample_epic();
        let req = run_stub_baseline(&epic);

        persist_decomposition(&db, &epic, &req).await.unwrap();
        let stored = db.list_stories(&epic.epic_id).await.unwrap();
        assert_eq!(stored.len(), req.stories.len());

        let mut emb = StubEmbedder::new(&[0.5, 0.5]);
        embed_stories(&mut emb, &db, &epic.epic_id, &req.stories)
            .await
            .unwrap();

        let first = &req.stories[0];
        let vector = db
            .get_embedding(
                "story",
                &story_embedding_owner(&epic.epic_id, &first.story_id),
                &sha256_hex(&first.story_text),
            )
            .await
            .unwrap();
        assert_eq!(vector, Some(vec![0.5, 0.5]));
    }
}
