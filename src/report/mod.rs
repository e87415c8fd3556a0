// Textual report rendering
//
// External consumer of the plan value object; nothing here feeds back into
// the pipeline.

use crate::models::{AiInsights, TestPlan};

/// Render the plan as a markdown report.
pub fn render_markdown(plan: &TestPlan, insights: &AiInsights) -> String {
    let mut out = String::new();

    out.push_str("# UI Test Plan\n\n");
    out.push_str(&format!("**Merge Request:** {}\n\n", plan.title));
    out.push_str(&format!(
        "**Affected Pages:** {}\n\n",
        plan.affected_pages.join(", ")
    ));
    out.push_str(&format!("## Overview\n\n{}\n\n", plan.overall_summary));

    if let Some(overview) = &plan.component_overview {
        out.push_str(&format!("## Component Overview\n\n{overview}\n\n"));
    }
    if let Some(flow) = &plan.data_flow {
        out.push_str(&format!("## Data Flow\n\n{flow}\n\n"));
    }
    push_list_section(&mut out, "Column Mappings", &plan.column_mappings);
    push_list_section(&mut out, "Filter Tests", &plan.filter_tests);
    push_list_section(&mut out, "Pagination Tests", &plan.pagination_tests);
    push_list_section(&mut out, "Testing Methods", &plan.testing_methods);

    out.push_str(&format!(
        "## Test Scenarios ({})\n\n",
        plan.scenarios.len()
    ));
    for (i, scenario) in plan.scenarios.iter().enumerate() {
        out.push_str(&format!(
            "### {}. {} (risk: {})\n\n",
            i + 1,
            scenario.title,
            scenario.risk_level.as_str()
        ));
        for (j, step) in scenario.steps.iter().enumerate() {
            out.push_str(&format!(
                "{}. **Action:** {}\n   **Expected:** {}\n",
                j + 1,
                step.action,
                step.expected_result
            ));
        }
        out.push('\n');
    }

    push_list_section(&mut out, "Pre-release Checklist", &plan.test_checklist);

    out.push_str("## Analysis Insights\n\n");
    out.push_str(&format!("- Summary: {}\n", insights.analysis_summary));
    out.push_str(&format!("- User impact: {}\n", insights.user_impact));
    for risk in &insights.risk_areas {
        out.push_str(&format!("- Risk area: {risk}\n"));
    }
    if !insights.ai_powered {
        out.push_str("\n*Generated with fallback analysis (model unavailable).*\n");
    }

    out
}

fn push_list_section(out: &mut String, heading: &str, items: &Option<Vec<String>>) {
    if let Some(items) = items {
        out.push_str(&format!("## {heading}\n\n"));
        for item in items {
            out.push_str(&format!("- {item}\n"));
        }
        out.push('\n');
    }
}
