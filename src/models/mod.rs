// Data model for merge-request change analysis and UI test plans

use serde::{Deserialize, Serialize};

/// How a single file changed within the merge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChangeType::Added => "added",
            ChangeType::Modified => "modified",
            ChangeType::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// One changed file, as reported by the change source.
///
/// Created once per file at the start of a pipeline run and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub file_path: String,
    pub change_type: ChangeType,
    pub raw_diff: String,
}

impl ChangeRecord {
    pub fn new(
        file_path: impl Into<String>,
        change_type: ChangeType,
        raw_diff: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            change_type,
            raw_diff: raw_diff.into(),
        }
    }
}

/// Impact analysis of the whole change set (stage 1 output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub affected_areas: Vec<String>,
    pub user_impact: String,
    pub risk_areas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_process: Option<String>,
}

/// A single, actionable step in a test scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStep {
    pub action: String,
    pub expected_result: String,
}

impl TestStep {
    pub fn new(action: impl Into<String>, expected_result: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            expected_result: expected_result.into(),
        }
    }
}

/// Estimated risk if a scenario fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Normalize a free-text risk label from the model.
    ///
    /// Anything outside {low, medium, high} (case-insensitive) maps to Medium.
    pub fn normalize(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "high" => RiskLevel::High,
            _ => RiskLevel::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// A complete user scenario to verify on the UI.
///
/// Invariant: `steps` is never empty. The parser drops scenarios that arrive
/// without steps, and the assembler substitutes fallback scenarios if that
/// leaves the plan with none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestScenario {
    pub title: String,
    pub steps: Vec<TestStep>,
    pub risk_level: RiskLevel,
}

/// The assembled test plan for a merge request.
///
/// The enhanced sections are independently optional: each is populated only
/// when the scenario-generation stage succeeded AND the model produced that
/// section. Their absence is not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestPlan {
    pub title: String,
    pub affected_pages: Vec<String>,
    pub overall_summary: String,
    pub scenarios: Vec<TestScenario>,
    pub analysis: AnalysisResult,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_mappings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_tests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_tests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testing_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_checklist: Option<Vec<String>>,
}

/// Derived insight bundle handed to external formatters alongside the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiInsights {
    pub analysis_summary: String,
    pub user_impact: String,
    pub risk_areas: Vec<String>,
    /// False when the analysis stage ran on fallback output.
    pub ai_powered: bool,
}
