// Stage orchestration
//
// Three sequential stages: impact analysis, affected-area inference, scenario
// generation. Each stage moves Pending → Running → {Succeeded | Degraded}.
// A degraded stage takes its deterministic fallback and the run continues;
// no stage failure ever aborts the pipeline.

use crate::error::PipelineError;
use crate::models::{AnalysisResult, ChangeRecord};
use crate::ollama::OllamaClient;

use super::fallback;
use super::parse::{self, Parsed, ScenarioOutput};
use super::prompts;

/// Identity of a pipeline stage, used in logs and stage records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ImpactAnalysis,
    AffectedAreas,
    ScenarioGeneration,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::ImpactAnalysis => "impact_analysis",
            Stage::AffectedAreas => "affected_areas",
            Stage::ScenarioGeneration => "scenario_generation",
        }
    }
}

/// Lifecycle state of a stage within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Running,
    Succeeded,
    Degraded,
}

/// Why a stage fell back to deterministic output.
#[derive(Debug, Clone, PartialEq)]
pub enum DegradeReason {
    /// Health probe reported the generation service down
    ServiceUnavailable,
    /// Transport failure or non-success status during generation
    Connectivity(String),
    /// Model output failed the strict structural parse
    MalformedResponse,
    /// Model answered with structurally valid but empty output
    EmptyModelOutput,
    /// An earlier stage this one depends on was degraded
    UpstreamDegraded,
}

impl std::fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradeReason::ServiceUnavailable => write!(f, "generation service unavailable"),
            DegradeReason::Connectivity(msg) => write!(f, "connectivity failure: {msg}"),
            DegradeReason::MalformedResponse => write!(f, "malformed model response"),
            DegradeReason::EmptyModelOutput => write!(f, "empty model output"),
            DegradeReason::UpstreamDegraded => write!(f, "upstream stage degraded"),
        }
    }
}

/// Outcome of one stage: the AI path succeeded, or the stage degraded and
/// carries fallback data. Expected-path branching is this tagged union, not
/// control-flow errors.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Succeeded(T),
    Degraded { value: T, reason: DegradeReason },
}

impl<T> StageOutcome<T> {
    pub fn value(&self) -> &T {
        match self {
            StageOutcome::Succeeded(value) => value,
            StageOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            StageOutcome::Succeeded(value) => value,
            StageOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded { .. })
    }
}

/// Final status of one stage after a run, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
}

/// Drives the three stages against one run-scoped [`OllamaClient`].
pub struct Orchestrator {
    client: OllamaClient,
    records: Vec<StageRecord>,
}

impl Orchestrator {
    pub fn new(client: OllamaClient) -> Self {
        let records = [
            Stage::ImpactAnalysis,
            Stage::AffectedAreas,
            Stage::ScenarioGeneration,
        ]
        .into_iter()
        .map(|stage| StageRecord {
            stage,
            status: StageStatus::Pending,
        })
        .collect();

        Self { client, records }
    }

    /// Per-stage status after (or during) a run.
    pub fn records(&self) -> &[StageRecord] {
        &self.records
    }

    /// Stage 1: impact analysis of the change set.
    pub async fn analyze(
        &mut self,
        changes: &[ChangeRecord],
        title: &str,
    ) -> StageOutcome<AnalysisResult> {
        self.set_status(Stage::ImpactAnalysis, StageStatus::Running);

        if !self.client.health_check().await {
            return self.degrade(
                Stage::ImpactAnalysis,
                fallback::fallback_analysis(changes, title),
                DegradeReason::ServiceUnavailable,
            );
        }

        let (system, user) = prompts::analysis_prompts(changes, title);
        let text = match self.client.generate(&user, &system).await {
            Ok(text) => text,
            Err(e) => {
                return self.degrade(
                    Stage::ImpactAnalysis,
                    fallback::fallback_analysis(changes, title),
                    connectivity_reason(e),
                );
            }
        };

        match parse::parse_analysis(parse::sanitize(&text)) {
            Parsed::Success(analysis) => self.succeed(Stage::ImpactAnalysis, analysis),
            Parsed::Failure { raw } => {
                let err = PipelineError::malformed(raw);
                tracing::debug!(stage = Stage::ImpactAnalysis.name(), %err, "Rejected model output");
                self.degrade(
                    Stage::ImpactAnalysis,
                    fallback::fallback_analysis(changes, title),
                    DegradeReason::MalformedResponse,
                )
            }
        }
    }

    /// Stage 2: affected-area inference.
    ///
    /// Reuses stage 1's AnalysisResult instead of issuing a duplicate
    /// generation call; only when that yields no areas does the path-based
    /// heuristic take over.
    pub fn infer_pages(
        &mut self,
        analysis: &StageOutcome<AnalysisResult>,
        changes: &[ChangeRecord],
    ) -> StageOutcome<Vec<String>> {
        self.set_status(Stage::AffectedAreas, StageStatus::Running);

        match analysis {
            StageOutcome::Succeeded(result) if !result.affected_areas.is_empty() => {
                self.succeed(Stage::AffectedAreas, result.affected_areas.clone())
            }
            StageOutcome::Succeeded(_) => self.degrade(
                Stage::AffectedAreas,
                fallback::infer_affected_pages(changes),
                DegradeReason::EmptyModelOutput,
            ),
            StageOutcome::Degraded { value, .. } => {
                let pages = if value.affected_areas.is_empty() {
                    fallback::infer_affected_pages(changes)
                } else {
                    value.affected_areas.clone()
                };
                self.degrade(Stage::AffectedAreas, pages, DegradeReason::UpstreamDegraded)
            }
        }
    }

    /// Stage 3: scenario / enhanced-plan generation.
    pub async fn generate_scenarios(
        &mut self,
        changes: &[ChangeRecord],
        affected_pages: &[String],
        title: &str,
        analysis: &AnalysisResult,
    ) -> StageOutcome<ScenarioOutput> {
        self.set_status(Stage::ScenarioGeneration, StageStatus::Running);

        if !self.client.health_check().await {
            return self.degrade(
                Stage::ScenarioGeneration,
                fallback::fallback_scenario_output(affected_pages),
                DegradeReason::ServiceUnavailable,
            );
        }

        let (system, user) = prompts::scenario_prompts(
            changes,
            affected_pages,
            title,
            &analysis.summary,
            &analysis.user_impact,
            &analysis.risk_areas,
        );
        let text = match self.client.generate(&user, &system).await {
            Ok(text) => text,
            Err(e) => {
                return self.degrade(
                    Stage::ScenarioGeneration,
                    fallback::fallback_scenario_output(affected_pages),
                    connectivity_reason(e),
                );
            }
        };

        match parse::parse_scenarios(parse::sanitize(&text)) {
            Parsed::Success(output) if output.scenarios.is_empty() => self.degrade(
                Stage::ScenarioGeneration,
                fallback::fallback_scenario_output(affected_pages),
                DegradeReason::EmptyModelOutput,
            ),
            Parsed::Success(output) => self.succeed(Stage::ScenarioGeneration, output),
            Parsed::Failure { raw } => {
                let err = PipelineError::malformed(raw);
                tracing::debug!(stage = Stage::ScenarioGeneration.name(), %err, "Rejected model output");
                self.degrade(
                    Stage::ScenarioGeneration,
                    fallback::fallback_scenario_output(affected_pages),
                    DegradeReason::MalformedResponse,
                )
            }
        }
    }

    fn succeed<T>(&mut self, stage: Stage, value: T) -> StageOutcome<T> {
        self.set_status(stage, StageStatus::Succeeded);
        tracing::info!(stage = stage.name(), "Stage succeeded");
        StageOutcome::Succeeded(value)
    }

    fn degrade<T>(&mut self, stage: Stage, value: T, reason: DegradeReason) -> StageOutcome<T> {
        self.set_status(stage, StageStatus::Degraded);
        tracing::warn!(stage = stage.name(), %reason, "Stage degraded to fallback output");
        StageOutcome::Degraded { value, reason }
    }

    fn set_status(&mut self, stage: Stage, status: StageStatus) {
        if let Some(record) = self.records.iter_mut().find(|r| r.stage == stage) {
            record.status = status;
        }
    }
}

fn connectivity_reason(e: PipelineError) -> DegradeReason {
    DegradeReason::Connectivity(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::models::ChangeType;

    fn unreachable_orchestrator() -> Orchestrator {
        // Nothing listens on port 1; health probes fail fast
        let config = AiConfig {
            host: "http://127.0.0.1:1".to_string(),
            ..AiConfig::default()
        };
        Orchestrator::new(OllamaClient::new(config).unwrap())
    }

    fn changes() -> Vec<ChangeRecord> {
        vec![ChangeRecord::new(
            "src/pages/login.tsx",
            ChangeType::Modified,
            "+ fix",
        )]
    }

    #[tokio::test]
    async fn test_analyze_degrades_when_service_down() {
        let mut orch = unreachable_orchestrator();
        let outcome = orch.analyze(&changes(), "Fix login").await;
        assert!(outcome.is_degraded());
        assert!(outcome.value().summary.contains("1 files"));

        let record = orch.records()[0];
        assert_eq!(record.stage, Stage::ImpactAnalysis);
        assert_eq!(record.status, StageStatus::Degraded);
    }

    #[tokio::test]
    async fn test_scenarios_degrade_when_service_down() {
        let mut orch = unreachable_orchestrator();
        let pages = vec!["Login Page".to_string()];
        let analysis = fallback::fallback_analysis(&changes(), "Fix login");
        let outcome = orch
            .generate_scenarios(&changes(), &pages, "Fix login", &analysis)
            .await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.value().scenarios.len(), 2);
        assert!(outcome.value().component_overview.is_none());
    }

    #[tokio::test]
    async fn test_analyze_degrades_on_prose_output() {
        let mut server = mockito::Server::new_async().await;
        let _health = server
            .mock("GET", "/api/version")
            .with_status(200)
            .create_async()
            .await;
        let _gen = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response":"The changes look fine to me."}"#)
            .create_async()
            .await;

        let config = AiConfig {
            host: server.url(),
            ..AiConfig::default()
        };
        let mut orch = Orchestrator::new(OllamaClient::new(config).unwrap());

        match orch.analyze(&changes(), "Fix login").await {
            StageOutcome::Degraded { reason, .. } => {
                assert_eq!(reason, DegradeReason::MalformedResponse);
            }
            StageOutcome::Succeeded(_) => panic!("prose must not parse"),
        }
        assert_eq!(orch.records()[0].status, StageStatus::Degraded);
    }

    #[test]
    fn test_infer_pages_reuses_successful_analysis() {
        let mut orch = unreachable_orchestrator();
        let analysis = StageOutcome::Succeeded(AnalysisResult {
            summary: "s".to_string(),
            affected_areas: vec!["Catalog Page".to_string()],
            user_impact: "u".to_string(),
            risk_areas: vec![],
            ai_insights: None,
            thinking_process: None,
        });
        let outcome = orch.infer_pages(&analysis, &changes());
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value(), &vec!["Catalog Page".to_string()]);
    }

    #[test]
    fn test_infer_pages_heuristic_when_analysis_empty() {
        let mut orch = unreachable_orchestrator();
        let analysis = StageOutcome::Succeeded(AnalysisResult {
            summary: "s".to_string(),
            affected_areas: vec![],
            user_impact: "u".to_string(),
            risk_areas: vec![],
            ai_insights: None,
            thinking_process: None,
        });
        let outcome = orch.infer_pages(&analysis, &changes());
        assert!(outcome.is_degraded());
        assert_eq!(outcome.value(), &vec!["Login Tsx".to_string()]);
    }

    #[test]
    fn test_infer_pages_marks_upstream_degradation() {
        let mut orch = unreachable_orchestrator();
        let analysis = StageOutcome::Degraded {
            value: fallback::fallback_analysis(&changes(), "MR"),
            reason: DegradeReason::ServiceUnavailable,
        };
        let outcome = orch.infer_pages(&analysis, &changes());
        match outcome {
            StageOutcome::Degraded { value, reason } => {
                assert_eq!(reason, DegradeReason::UpstreamDegraded);
                assert!(!value.is_empty());
            }
            StageOutcome::Succeeded(_) => panic!("expected degraded outcome"),
        }
    }

    #[test]
    fn test_records_start_pending() {
        let orch = unreachable_orchestrator();
        assert_eq!(orch.records().len(), 3);
        assert!(orch
            .records()
            .iter()
            .all(|r| r.status == StageStatus::Pending));
    }
}
