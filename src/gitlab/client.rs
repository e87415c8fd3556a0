// GitLab API client
//
// Fetches the changed files of one merge request. This is deliberately thin:
// one URL parse, one API call, one mapping into ChangeRecords. Everything
// interesting happens downstream in the pipeline.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::GitLabConfig;
use crate::models::{ChangeRecord, ChangeType};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// A parsed merge-request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequestRef {
    /// Scheme + host, e.g. "https://gitlab.example.com"
    pub base_url: String,
    /// Full project path, e.g. "group/project"
    pub project_path: String,
    /// Project-local merge request number
    pub iid: u64,
}

impl MergeRequestRef {
    /// Parse a full MR URL of the form
    /// `https://host/group/project/-/merge_requests/123`.
    pub fn parse(mr_url: &str) -> Result<Self> {
        let url = reqwest::Url::parse(mr_url)
            .with_context(|| format!("Invalid merge request URL: {mr_url}"))?;

        let host = url
            .host_str()
            .with_context(|| format!("Merge request URL has no host: {mr_url}"))?;
        let base_url = match url.port() {
            Some(port) => format!("{}://{host}:{port}", url.scheme()),
            None => format!("{}://{host}", url.scheme()),
        };

        let path = url.path().trim_matches('/');
        let (project_path, rest) = path
            .split_once("/-/")
            .with_context(|| format!("Not a merge request URL (missing '/-/'): {mr_url}"))?;

        let iid = rest
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .parse()
            .with_context(|| format!("Could not read merge request number from: {mr_url}"))?;

        Ok(Self {
            base_url,
            project_path: project_path.to_string(),
            iid,
        })
    }
}

/// What the change source hands to the pipeline: a title and the ordered
/// change records.
#[derive(Debug, Clone)]
pub struct MergeRequestChanges {
    pub title: String,
    pub changes: Vec<ChangeRecord>,
}

pub struct GitLabClient {
    http: Client,
    token: String,
}

impl GitLabClient {
    pub fn new(config: &GitLabConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .danger_accept_invalid_certs(!config.ssl_verify)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            token: config.token.clone(),
        })
    }

    /// Fetch the title and changed files for one merge request.
    pub async fn fetch_changes(&self, mr: &MergeRequestRef) -> Result<MergeRequestChanges> {
        let url = format!(
            "{}/api/v4/projects/{}/merge_requests/{}/changes",
            mr.base_url,
            encode_project_path(&mr.project_path),
            mr.iid
        );

        tracing::debug!(%url, "Fetching merge request changes");

        let response = self
            .http
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await
            .context("Failed to reach GitLab")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GitLab API error {status}: {body}");
        }

        let body: ChangesResponse = response
            .json()
            .await
            .context("Failed to parse GitLab changes response")?;

        let changes = body
            .changes
            .into_iter()
            .map(|c| {
                let change_type = if c.deleted_file {
                    ChangeType::Deleted
                } else if c.new_file {
                    ChangeType::Added
                } else {
                    ChangeType::Modified
                };
                ChangeRecord::new(c.new_path, change_type, c.diff)
            })
            .collect();

        Ok(MergeRequestChanges {
            title: body.title,
            changes,
        })
    }
}

/// Percent-encode the path separator — the only character GitLab project
/// paths contain that must be escaped in the projects API.
fn encode_project_path(path: &str) -> String {
    path.replace('/', "%2F")
}

// GitLab API wire types (subset we read)

#[derive(Debug, Deserialize)]
struct ChangesResponse {
    title: String,
    changes: Vec<RawChange>,
}

#[derive(Debug, Deserialize)]
struct RawChange {
    new_path: String,
    #[serde(default)]
    diff: String,
    #[serde(default)]
    new_file: bool,
    #[serde(default)]
    deleted_file: bool,
}
