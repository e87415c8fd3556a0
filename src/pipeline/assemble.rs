// Final plan assembly
//
// Merges the three stage outcomes into one TestPlan value plus the derived
// AiInsights bundle. The overall summary is always computed here, never taken
// from model output, so it stays stable under full degradation.

use crate::models::{AiInsights, AnalysisResult, ChangeRecord, TestPlan};

use super::fallback;
use super::orchestrator::StageOutcome;
use super::parse::ScenarioOutput;

/// Deterministic plan summary from change count and affected pages.
pub fn overall_summary(change_count: usize, affected_pages: &[String]) -> String {
    format!(
        "This test plan covers changes to {change_count} file(s), primarily \
         impacting the following UI areas: {}. The focus is on end-to-end user \
         scenarios to ensure the UI remains functional, intuitive, and visually \
         correct.",
        affected_pages.join(", ")
    )
}

/// Merge stage outputs into the final plan and insight bundle.
pub fn assemble(
    title: &str,
    changes: &[ChangeRecord],
    analysis: &StageOutcome<AnalysisResult>,
    pages: &StageOutcome<Vec<String>>,
    scenarios: StageOutcome<ScenarioOutput>,
) -> (TestPlan, AiInsights) {
    let affected_pages = pages.value().clone();
    let summary = overall_summary(changes.len(), &affected_pages);

    // Enhanced sections only survive a successful scenario stage
    let enhanced = !scenarios.is_degraded();
    let output = scenarios.into_value();

    let scenario_list = if output.scenarios.is_empty() {
        fallback::fallback_scenarios(&affected_pages)
    } else {
        output.scenarios
    };

    let analysis_result = analysis.value().clone();
    let insights = AiInsights {
        analysis_summary: analysis_result.summary.clone(),
        user_impact: analysis_result.user_impact.clone(),
        risk_areas: analysis_result.risk_areas.clone(),
        ai_powered: !analysis.is_degraded(),
    };

    let plan = TestPlan {
        title: title.to_string(),
        affected_pages,
        overall_summary: summary,
        scenarios: scenario_list,
        analysis: analysis_result,
        component_overview: enhanced.then_some(output.component_overview).flatten(),
        data_flow: enhanced.then_some(output.data_flow).flatten(),
        column_mappings: enhanced.then_some(output.column_mappings).flatten(),
        filter_tests: enhanced.then_some(output.filter_tests).flatten(),
        pagination_tests: enhanced.then_some(output.pagination_tests).flatten(),
        testing_methods: enhanced.then_some(output.testing_methods).flatten(),
        test_checklist: enhanced.then_some(output.test_checklist).flatten(),
    };

    (plan, insights)
}
