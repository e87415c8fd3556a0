// End-to-end pipeline tests against a mocked Ollama server
//
// The pipeline must produce a structurally valid plan for every simulated
// failure mode: service down, error statuses, and malformed model output.

use mockito::Matcher;

use mrplan::config::AiConfig;
use mrplan::models::{ChangeRecord, ChangeType, RiskLevel};
use mrplan::pipeline::{generate_test_plan, StageStatus};

fn login_py_change() -> Vec<ChangeRecord> {
    vec![ChangeRecord::new(
        "login.py",
        ChangeType::Modified,
        "+ def login(): ...",
    )]
}

fn config_for(url: &str) -> AiConfig {
    AiConfig {
        host: url.to_string(),
        ..AiConfig::default()
    }
}

fn assert_structurally_valid(plan: &mrplan::models::TestPlan) {
    assert!(!plan.title.is_empty());
    assert!(!plan.scenarios.is_empty());
    assert!(plan.scenarios.iter().all(|s| !s.steps.is_empty()));
}

#[tokio::test]
async fn test_unavailable_service_yields_minimum_viable_plan() {
    // Nothing listens on port 1
    let config = config_for("http://127.0.0.1:1");

    let output = generate_test_plan(&config, &login_py_change(), "Fix login")
        .await
        .unwrap();

    assert_structurally_valid(&output.plan);
    assert!(output.plan.scenarios.len() >= 2);

    // login.py is not a UI file, so the heuristic falls back to General UI
    assert_eq!(output.plan.affected_pages, vec!["General UI"]);
    assert!(output.plan.scenarios[0].title.contains("General UI"));
    assert!(output
        .plan
        .scenarios
        .iter()
        .any(|s| s.title.contains("Edge Case") && s.risk_level == RiskLevel::Medium));

    assert!(output.plan.overall_summary.contains("1 file(s)"));
    assert!(output.plan.overall_summary.contains("General UI"));

    assert!(!output.insights.ai_powered);
    assert!(output
        .stages
        .iter()
        .all(|r| r.status == StageStatus::Degraded));
}

#[tokio::test]
async fn test_healthy_model_end_to_end() {
    let mut server = mockito::Server::new_async().await;

    let _health = server
        .mock("GET", "/api/version")
        .with_status(200)
        .with_body(r#"{"version":"0.5.4"}"#)
        .create_async()
        .await;

    let analysis_inner = serde_json::json!({
        "summary": "Reworks the login form validation",
        "affected_areas": ["Login Page"],
        "user_impact": "Users see new validation messages",
        "risk_areas": ["Form validation"]
    })
    .to_string();
    let _analysis = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::Regex("Analyze these code changes".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "response": analysis_inner }).to_string())
        .create_async()
        .await;

    let scenarios_inner = serde_json::json!({
        "scenarios": [
            {"title": "Valid login succeeds",
             "steps": [{"action": "Enter valid credentials", "expected_result": "Redirect to dashboard"}],
             "risk_level": "high"},
            {"title": "Invalid password shows error",
             "steps": [{"action": "Enter wrong password", "expected_result": "Inline error appears"}],
             "risk_level": "medium"},
            {"title": "Empty form blocked",
             "steps": [{"action": "Submit empty form", "expected_result": "Validation errors shown"}],
             "risk_level": "low"}
        ],
        "component_overview": "Login form with client-side validation",
        "test_checklist": ["Check error styling", "Check tab order"]
    })
    .to_string();
    let _scenarios = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::Regex("Generate UI test scenarios".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "response": scenarios_inner }).to_string())
        .create_async()
        .await;

    let output = generate_test_plan(&config_for(&server.url()), &login_py_change(), "Fix login")
        .await
        .unwrap();

    assert_structurally_valid(&output.plan);
    assert_eq!(output.plan.affected_pages, vec!["Login Page"]);

    // Exactly N scenarios with fields preserved verbatim
    assert_eq!(output.plan.scenarios.len(), 3);
    assert_eq!(output.plan.scenarios[0].title, "Valid login succeeds");
    assert_eq!(
        output.plan.scenarios[0].steps[0].action,
        "Enter valid credentials"
    );
    assert_eq!(
        output.plan.scenarios[0].steps[0].expected_result,
        "Redirect to dashboard"
    );
    assert_eq!(output.plan.scenarios[0].risk_level, RiskLevel::High);
    assert_eq!(output.plan.scenarios[2].risk_level, RiskLevel::Low);

    // Enhanced sections survive a successful stage
    assert_eq!(
        output.plan.component_overview.as_deref(),
        Some("Login form with client-side validation")
    );
    assert_eq!(output.plan.test_checklist.as_ref().unwrap().len(), 2);

    // Summary is computed, not taken from the model
    assert!(output.plan.overall_summary.contains("1 file(s)"));
    assert!(output.plan.overall_summary.contains("Login Page"));

    assert!(output.insights.ai_powered);
    assert!(output.fully_ai_generated());
}

#[tokio::test]
async fn test_fenced_non_json_degrades_like_unavailable_service() {
    let mut server = mockito::Server::new_async().await;

    let _health = server
        .mock("GET", "/api/version")
        .with_status(200)
        .create_async()
        .await;
    let _generate = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "response": "```\nSure! Here is my analysis of the changes...\n```"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let from_malformed =
        generate_test_plan(&config_for(&server.url()), &login_py_change(), "Fix login")
            .await
            .unwrap();
    let from_unavailable =
        generate_test_plan(&config_for("http://127.0.0.1:1"), &login_py_change(), "Fix login")
            .await
            .unwrap();

    // Malformed output produces the same minimum-viable plan as a dead service
    assert_eq!(
        from_malformed.plan.scenarios,
        from_unavailable.plan.scenarios
    );
    assert_eq!(
        from_malformed.plan.overall_summary,
        from_unavailable.plan.overall_summary
    );
    assert!(from_malformed
        .stages
        .iter()
        .all(|r| r.status == StageStatus::Degraded));
}

#[tokio::test]
async fn test_error_status_on_generate_degrades_scenarios_only() {
    let mut server = mockito::Server::new_async().await;

    let _health = server
        .mock("GET", "/api/version")
        .with_status(200)
        .create_async()
        .await;

    let analysis_inner = serde_json::json!({
        "summary": "Touches the checkout flow",
        "affected_areas": ["Checkout Page"],
        "user_impact": "Order submission may change",
        "risk_areas": ["Payments"]
    })
    .to_string();
    let _analysis = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::Regex("Analyze these code changes".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "response": analysis_inner }).to_string())
        .create_async()
        .await;
    let _scenarios = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::Regex("Generate UI test scenarios".to_string()))
        .with_status(500)
        .with_body("model crashed")
        .create_async()
        .await;

    let output = generate_test_plan(&config_for(&server.url()), &login_py_change(), "Checkout fix")
        .await
        .unwrap();

    assert_structurally_valid(&output.plan);

    // Analysis succeeded, so its output is trusted and insights are AI-backed
    assert_eq!(output.plan.affected_pages, vec!["Checkout Page"]);
    assert!(output.insights.ai_powered);
    assert_eq!(output.stages[0].status, StageStatus::Succeeded);
    assert_eq!(output.stages[1].status, StageStatus::Succeeded);
    assert_eq!(output.stages[2].status, StageStatus::Degraded);

    // Scenario stage fell back: two scenarios, first references the page
    assert_eq!(output.plan.scenarios.len(), 2);
    assert!(output.plan.scenarios[0].title.contains("Checkout Page"));
    assert!(output.plan.component_overview.is_none());
}

#[tokio::test]
async fn test_fallback_plan_references_given_affected_page() {
    // The documented minimum-viable shape when only the page list is known
    use mrplan::pipeline::fallback::fallback_scenarios;

    let pages = vec!["Login Page".to_string()];
    let scenarios = fallback_scenarios(&pages);

    assert!(scenarios.len() >= 2);
    assert!(scenarios[0].title.contains("Login Page"));
    assert!(scenarios
        .iter()
        .any(|s| s.title.contains("Edge Case") && s.risk_level == RiskLevel::Medium));

    // Pure function: identical inputs, identical outputs
    assert_eq!(scenarios, fallback_scenarios(&pages));
}
