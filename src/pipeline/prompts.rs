// Stage prompt construction
//
// Every function here is pure: identical inputs always produce identical
// (system, user) prompt pairs, which is what makes the stages testable
// without a live model.

use crate::models::ChangeRecord;

/// Per-file diff ceiling for the impact-analysis stage, in characters.
pub const ANALYSIS_DIFF_CEILING: usize = 2_000;
/// File cap for the impact-analysis stage.
pub const ANALYSIS_FILE_CAP: usize = 10;

/// Per-file diff ceiling for the enhanced scenario stage. Larger than the
/// analysis ceiling because fewer files are included.
pub const ENHANCED_DIFF_CEILING: usize = 6_000;
/// File cap for diffs in the enhanced scenario stage.
pub const ENHANCED_FILE_CAP: usize = 6;

/// File cap for the bare file listing in the scenario prompt.
pub const SCENARIO_LIST_CAP: usize = 10;

/// Marker appended whenever a diff is cut at its ceiling.
pub const TRUNCATION_MARKER: &str = "\n... [diff truncated]";

const ANALYSIS_SYSTEM_PROMPT: &str = "\
You are a senior software engineer analyzing code changes for a merge request.
Your task is to understand the impact of the changes and identify which UI components or pages might be affected.

Focus on:
1. What functionality is being changed/added/removed
2. Which UI components or pages will be impacted
3. What user workflows might be affected
4. Potential edge cases or areas of concern

Respond with a JSON object containing:
{
    \"summary\": \"Brief summary of changes\",
    \"affected_areas\": [\"list\", \"of\", \"affected\", \"ui\", \"areas\"],
    \"user_impact\": \"Description of how users will be affected\",
    \"risk_areas\": [\"potential\", \"risk\", \"areas\"]
}";

const SCENARIO_SYSTEM_PROMPT: &str = "\
You are a QA engineer creating detailed UI test scenarios for a web application.
Your task is to create comprehensive, actionable test scenarios that a manual tester can follow.

For each scenario, provide:
1. A clear, descriptive title
2. Step-by-step testing instructions
3. Expected results for each step
4. Risk level (low, medium, high)

Respond with a JSON object:
{
    \"scenarios\": [
        {
            \"title\": \"Test scenario title\",
            \"steps\": [
                {\"action\": \"What the tester should do\", \"expected_result\": \"What should happen\"}
            ],
            \"risk_level\": \"low|medium|high\"
        }
    ],
    \"component_overview\": \"Optional: what the affected components do\",
    \"data_flow\": \"Optional: how data moves through the changed code\",
    \"column_mappings\": [\"Optional: column/field mappings to verify\"],
    \"filter_tests\": [\"Optional: filter behaviors to verify\"],
    \"pagination_tests\": [\"Optional: pagination behaviors to verify\"],
    \"testing_methods\": [\"Optional: suggested testing approaches\"],
    \"test_checklist\": [\"Optional: quick pre-release checklist items\"]
}

Only include the optional keys when you have something concrete to say.
Do not wrap the JSON in markdown code fences.";

/// Truncate a diff to `ceiling` characters, appending an explicit marker.
///
/// Diffs are never silently dropped: a too-long diff keeps exactly its first
/// `ceiling` characters plus [`TRUNCATION_MARKER`].
pub fn truncate_diff(diff: &str, ceiling: usize) -> String {
    match diff.char_indices().nth(ceiling) {
        Some((byte_idx, _)) => {
            let mut out = diff[..byte_idx].to_string();
            out.push_str(TRUNCATION_MARKER);
            out
        }
        None => diff.to_string(),
    }
}

/// Build the (system, user) prompt pair for the impact-analysis stage.
pub fn analysis_prompts(changes: &[ChangeRecord], title: &str) -> (String, String) {
    let mut summary = format!("Merge Request: {title}\n\nCode Changes:\n");

    for change in changes.iter().take(ANALYSIS_FILE_CAP) {
        summary.push_str(&format!("\nFile: {}\n", change.file_path));
        summary.push_str(&format!("Change Type: {}\n", change.change_type));
        summary.push_str(&format!(
            "Diff:\n{}\n",
            truncate_diff(&change.raw_diff, ANALYSIS_DIFF_CEILING)
        ));
        summary.push_str("---\n");
    }

    let user = format!("Analyze these code changes:\n\n{summary}");
    (ANALYSIS_SYSTEM_PROMPT.to_string(), user)
}

/// Build the (system, user) prompt pair for the scenario / enhanced stage.
pub fn scenario_prompts(
    changes: &[ChangeRecord],
    affected_pages: &[String],
    title: &str,
    summary: &str,
    user_impact: &str,
    risk_areas: &[String],
) -> (String, String) {
    let file_list = changes
        .iter()
        .take(SCENARIO_LIST_CAP)
        .map(|c| format!("- {} ({})", c.file_path, c.change_type))
        .collect::<Vec<_>>()
        .join("\n");

    let mut user = format!(
        "Generate UI test scenarios for this merge request:\n\n\
         Title: {title}\n\
         Summary: {summary}\n\
         Affected UI Areas: {areas}\n\
         User Impact: {user_impact}\n\
         Risk Areas: {risks}\n\n\
         Files Changed:\n{file_list}\n",
        areas = affected_pages.join(", "),
        risks = risk_areas.join(", "),
    );

    user.push_str("\nKey Diffs:\n");
    for change in changes.iter().take(ENHANCED_FILE_CAP) {
        user.push_str(&format!(
            "\nFile: {}\n{}\n",
            change.file_path,
            truncate_diff(&change.raw_diff, ENHANCED_DIFF_CEILING)
        ));
    }

    user.push_str(
        "\nCreate 3-5 focused test scenarios that cover the main functionality \
         and potential edge cases.",
    );

    (SCENARIO_SYSTEM_PROMPT.to_string(), user)
}
