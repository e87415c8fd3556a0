// Deterministic, model-free fallbacks — one per stage
//
// Pure functions of their inputs: no I/O, no randomness. They guarantee the
// pipeline always has a non-empty, valid result for every stage regardless of
// model availability.

use crate::models::{AnalysisResult, ChangeRecord, RiskLevel, TestScenario, TestStep};
use crate::pipeline::parse::ScenarioOutput;

/// Extensions that suggest a file renders UI.
const UI_EXTENSIONS: [&str; 7] = [".tsx", ".jsx", ".vue", ".html", ".css", ".js", ".ts"];

/// At most this many pages are inferred heuristically.
const INFERRED_PAGE_CAP: usize = 5;

/// Heuristic impact analysis for when the model path is unavailable.
pub fn fallback_analysis(changes: &[ChangeRecord], title: &str) -> AnalysisResult {
    AnalysisResult {
        summary: format!(
            "Modified {} files in merge request: {title}",
            changes.len()
        ),
        affected_areas: infer_affected_pages(changes),
        user_impact: "Code changes detected. Manual verification recommended.".to_string(),
        risk_areas: vec!["UI functionality".to_string(), "User workflows".to_string()],
        ai_insights: None,
        thinking_process: None,
    }
}

/// Infer affected UI pages from file paths alone.
///
/// Files with UI-ish extensions contribute a title-cased page name derived
/// from their file name; everything else is ignored. Capped at five pages,
/// with "General UI" as the catch-all when nothing matches.
pub fn infer_affected_pages(changes: &[ChangeRecord]) -> Vec<String> {
    let mut pages: Vec<String> = changes
        .iter()
        .filter(|c| {
            let lower = c.file_path.to_ascii_lowercase();
            UI_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        })
        .map(|c| page_name_from_path(&c.file_path))
        .collect();
    pages.truncate(INFERRED_PAGE_CAP);

    if pages.is_empty() {
        vec!["General UI".to_string()]
    } else {
        pages
    }
}

fn page_name_from_path(path: &str) -> String {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name
        .replace('.', " ")
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// The two-scenario minimum plan: one core-functionality scenario referencing
/// the first affected page, one generic edge-case scenario.
pub fn fallback_scenarios(affected_pages: &[String]) -> Vec<TestScenario> {
    let first_page = affected_pages
        .first()
        .map(String::as_str)
        .unwrap_or("main page");

    vec![
        TestScenario {
            title: format!("Happy Path: Verify core functionality on '{first_page}' page"),
            steps: vec![
                TestStep::new(
                    format!("Navigate to the '{first_page}' page."),
                    "The page loads without errors and the main content is visible.",
                ),
                TestStep::new(
                    "Interact with the primary element related to the change.",
                    "The element behaves as expected according to the new functionality.",
                ),
                TestStep::new(
                    "Check for any UI inconsistencies or broken layouts.",
                    "UI displays correctly and consistently.",
                ),
            ],
            risk_level: RiskLevel::High,
        },
        TestScenario {
            title: "Edge Case: Input validation and error handling".to_string(),
            steps: vec![
                TestStep::new(
                    "Try to trigger error conditions in the changed functionality.",
                    "Appropriate error messages are displayed to the user.",
                ),
                TestStep::new(
                    "Test with edge case inputs (empty, special characters, etc.).",
                    "System handles edge cases gracefully.",
                ),
            ],
            risk_level: RiskLevel::Medium,
        },
    ]
}

/// Scenario-stage fallback output: the minimum scenario pair, no enhanced
/// sections.
pub fn fallback_scenario_output(affected_pages: &[String]) -> ScenarioOutput {
    ScenarioOutput::scenarios_only(fallback_scenarios(affected_pages))
}
