// Response sanitization and strict structured parsing
//
// The model is asked for bare JSON but routinely wraps it in markdown code
// fences. Sanitization strips those fences and nothing else; parsing is then
// strict. A failed structural parse is returned as `Parsed::Failure` carrying
// the raw text — control goes back to the orchestrator, which degrades the
// stage. No fuzzy recovery is attempted here.
//
// Structurally valid JSON with missing keys is NOT a failure: per-field
// defaults are applied instead.

use serde::Deserialize;

use crate::models::{AnalysisResult, RiskLevel, TestScenario, TestStep};

/// Default summary when the model omits the key.
const DEFAULT_SUMMARY: &str = "Code changes detected";
/// Default user-impact text when the model omits the key.
const DEFAULT_USER_IMPACT: &str = "Functionality may be affected";
/// Default scenario title when the model omits the key.
const DEFAULT_SCENARIO_TITLE: &str = "Test Scenario";

/// Discriminated parse result. `Failure` carries the text that failed to
/// parse, for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Success(T),
    Failure { raw: String },
}

/// Structured output of the scenario / enhanced stage.
///
/// The optional sections are independently present; they are populated only
/// when the model produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioOutput {
    pub scenarios: Vec<TestScenario>,
    pub component_overview: Option<String>,
    pub data_flow: Option<String>,
    pub column_mappings: Option<Vec<String>>,
    pub filter_tests: Option<Vec<String>>,
    pub pagination_tests: Option<Vec<String>>,
    pub testing_methods: Option<Vec<String>>,
    pub test_checklist: Option<Vec<String>>,
}

impl ScenarioOutput {
    /// Output carrying only scenarios, no enhanced sections.
    pub fn scenarios_only(scenarios: Vec<TestScenario>) -> Self {
        Self {
            scenarios,
            ..Self::default()
        }
    }
}

/// Strip leading/trailing markdown code fences (```json ... ``` or ``` ... ```).
/// The fence label is matched case-insensitively; nothing else is removed.
pub fn sanitize(raw: &str) -> &str {
    let s = raw.trim();
    let s = if let Some(rest) = strip_prefix_ignore_case(s, "```json") {
        rest
    } else if let Some(rest) = s.strip_prefix("```") {
        rest
    } else {
        s
    };
    if let Some(rest) = s.strip_suffix("```") {
        rest.trim()
    } else {
        s.trim()
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

/// Parse sanitized text into an [`AnalysisResult`].
pub fn parse_analysis(text: &str) -> Parsed<AnalysisResult> {
    match serde_json::from_str::<RawAnalysis>(text) {
        Ok(raw) => Parsed::Success(raw.into()),
        Err(_) => Parsed::Failure {
            raw: text.to_string(),
        },
    }
}

/// Parse sanitized text into a [`ScenarioOutput`].
///
/// Accepts either a JSON object with a `scenarios` array (plus optional
/// enhanced sections) or a bare JSON array of scenarios.
pub fn parse_scenarios(text: &str) -> Parsed<ScenarioOutput> {
    match serde_json::from_str::<RawScenarioResponse>(text) {
        Ok(raw) => Parsed::Success(raw.into()),
        Err(_) => Parsed::Failure {
            raw: text.to_string(),
        },
    }
}

// Raw JSON shapes from the model. Lenient on missing keys; the conversions
// below apply the documented per-field defaults and normalizations.

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    affected_areas: Vec<String>,
    #[serde(default)]
    user_impact: Option<String>,
    #[serde(default)]
    risk_areas: Vec<String>,
    #[serde(default)]
    ai_insights: Option<String>,
    #[serde(default)]
    thinking_process: Option<String>,
}

impl From<RawAnalysis> for AnalysisResult {
    fn from(raw: RawAnalysis) -> Self {
        AnalysisResult {
            summary: raw.summary.unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
            affected_areas: raw.affected_areas,
            user_impact: raw
                .user_impact
                .unwrap_or_else(|| DEFAULT_USER_IMPACT.to_string()),
            risk_areas: raw.risk_areas,
            ai_insights: raw.ai_insights,
            thinking_process: raw.thinking_process,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScenarioResponse {
    Object(RawEnhanced),
    Array(Vec<RawScenario>),
}

#[derive(Debug, Deserialize)]
struct RawEnhanced {
    #[serde(default)]
    scenarios: Vec<RawScenario>,
    #[serde(default)]
    component_overview: Option<String>,
    #[serde(default)]
    data_flow: Option<String>,
    #[serde(default)]
    column_mappings: Option<Vec<String>>,
    #[serde(default)]
    filter_tests: Option<Vec<String>>,
    #[serde(default)]
    pagination_tests: Option<Vec<String>>,
    #[serde(default)]
    testing_methods: Option<Vec<String>>,
    #[serde(default)]
    test_checklist: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawScenario {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    steps: Vec<RawStep>,
    #[serde(default)]
    risk_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    #[serde(default)]
    action: String,
    #[serde(default)]
    expected_result: String,
}

fn convert_scenarios(raw: Vec<RawScenario>) -> Vec<TestScenario> {
    raw.into_iter()
        .filter_map(|s| {
            // A scenario without steps violates the steps >= 1 invariant
            if s.steps.is_empty() {
                tracing::warn!("Dropping model scenario without steps");
                return None;
            }
            Some(TestScenario {
                title: s
                    .title
                    .unwrap_or_else(|| DEFAULT_SCENARIO_TITLE.to_string()),
                steps: s
                    .steps
                    .into_iter()
                    .map(|step| TestStep::new(step.action, step.expected_result))
                    .collect(),
                risk_level: RiskLevel::normalize(s.risk_level.as_deref().unwrap_or("")),
            })
        })
        .collect()
}

impl From<RawScenarioResponse> for ScenarioOutput {
    fn from(raw: RawScenarioResponse) -> Self {
        match raw {
            RawScenarioResponse::Array(scenarios) => {
                ScenarioOutput::scenarios_only(convert_scenarios(scenarios))
            }
            RawScenarioResponse::Object(obj) => ScenarioOutput {
                scenarios: convert_scenarios(obj.scenarios),
                component_overview: obj.component_overview,
                data_flow: obj.data_flow,
                column_mappings: obj.column_mappings,
                filter_tests: obj.filter_tests,
                pagination_tests: obj.pagination_tests,
                testing_methods: obj.testing_methods,
                test_checklist: obj.test_checklist,
            },
        }
    }
}
