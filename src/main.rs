// mrplan - UI test plans for GitLab merge requests via a local Ollama model
// Main entry point

use anyhow::Result;
use clap::Parser;

use mrplan::config::load_config;
use mrplan::gitlab::{GitLabClient, MergeRequestRef};
use mrplan::pipeline::generate_test_plan;
use mrplan::report::render_markdown;

/// Generate a UI test plan for a GitLab merge request using a locally hosted
/// model. Code never leaves your machine.
#[derive(Parser)]
#[command(name = "mrplan", version, about)]
struct Cli {
    /// Full merge request URL, e.g.
    /// https://gitlab.example.com/group/project/-/merge_requests/123
    mr_url: String,

    /// Emit the plan as JSON instead of a markdown report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mrplan=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config()?;

    let mr = MergeRequestRef::parse(&cli.mr_url)?;
    tracing::info!(project = %mr.project_path, iid = mr.iid, "Analyzing merge request");

    let gitlab = GitLabClient::new(&config.gitlab)?;
    let fetched = gitlab.fetch_changes(&mr).await?;
    tracing::info!("Found {} changed files", fetched.changes.len());

    let output = generate_test_plan(&config.ai, &fetched.changes, &fetched.title).await?;
    tracing::info!(
        scenarios = output.plan.scenarios.len(),
        ai_powered = output.fully_ai_generated(),
        "Test plan generated"
    );

    if cli.json {
        let bundle = serde_json::json!({
            "plan": output.plan,
            "ai_insights": output.insights,
        });
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        println!("{}", render_markdown(&output.plan, &output.insights));
    }

    Ok(())
}
