// Resilience pipeline: change records in, structured test plan out
//
// The pipeline drives the local model through three sequential stages and
// always terminates with a usable plan, whatever the model does.

pub mod assemble;
pub mod fallback;
pub mod orchestrator;
pub mod parse;
pub mod prompts;

use anyhow::Result;

use crate::config::AiConfig;
use crate::models::{AiInsights, ChangeRecord, TestPlan};
use crate::ollama::OllamaClient;

pub use orchestrator::{DegradeReason, Orchestrator, Stage, StageOutcome, StageRecord, StageStatus};
pub use parse::{Parsed, ScenarioOutput};

/// Everything one pipeline run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    pub plan: TestPlan,
    pub insights: AiInsights,
    pub stages: Vec<StageRecord>,
}

impl PipelineOutput {
    /// True when every stage ran on the AI path.
    pub fn fully_ai_generated(&self) -> bool {
        self.stages.iter().all(|r| r.status == StageStatus::Succeeded)
    }
}

/// Run the full pipeline for one merge request.
///
/// A fresh HTTP client is scoped to this run and dropped at its end; nothing
/// is shared across runs. Dropping the returned future abandons any in-flight
/// network call without leaving partial stage state behind.
pub async fn generate_test_plan(
    config: &AiConfig,
    changes: &[ChangeRecord],
    title: &str,
) -> Result<PipelineOutput> {
    let client = OllamaClient::new(config.clone())?;
    let mut orchestrator = Orchestrator::new(client);

    let analysis = orchestrator.analyze(changes, title).await;
    let pages = orchestrator.infer_pages(&analysis, changes);
    let scenarios = orchestrator
        .generate_scenarios(changes, pages.value(), title, analysis.value())
        .await;

    let (plan, insights) = assemble::assemble(title, changes, &analysis, &pages, scenarios);

    Ok(PipelineOutput {
        plan,
        insights,
        stages: orchestrator.records().to_vec(),
    })
}
