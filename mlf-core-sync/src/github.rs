//! Opening the sync pull request.
//!
//! # Design
//!
//! The engine only talks to [`PullRequestClient`]. [`GithubClient`] is the
//! blocking GitHub REST v3 implementation (HTTP basic auth with username and
//! personal access token); [`MockPullRequests`](crate::mock::MockPullRequests)
//! records calls for tests.
//!
//! No request is retried. Reads time out after [`READ_TIMEOUT`].

use std::time::Duration;

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mlf_core_core::types::ProjectMetadata;

/// Title prefix shared by every sync pull request.
pub const SYNC_PR_TITLE_PREFIX: &str = "Important mlf-core template update";

/// Branch every sync pull request targets.
pub const SYNC_PR_BASE: &str = "development";

pub const SYNC_PR_BODY: &str = "A new release of the main template in mlf-core has just been released. \
This automated pull-request attempts to apply the relevant updates to this Project.\n\n\
Please make sure to merge this pull-request as soon as possible. \
Once complete, make a new minor release of your Project.\n\n\
For more information on the actual changes, read the latest mlf-core changelog.";

pub const READ_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const GITHUB_API: &str = "https://api.github.com";

/// `mlf_core_sync_v{version}`.
pub fn sync_branch_name(version: &str) -> String {
    format!("mlf_core_sync_v{version}")
}

pub fn sync_pr_title(version: &str) -> String {
    format!("{SYNC_PR_TITLE_PREFIX} {version} released!")
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Errors from the pull request API.
#[derive(Debug, Clone, Error)]
pub enum PullRequestError {
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("expected HTTP {expected}, GitHub answered {status}")]
    UnexpectedStatus { expected: u16, status: u16 },

    #[error("network error: {0}")]
    Network(String),
}

/// An existing pull request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub html_url: String,
}

/// Body of `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
    pub maintainer_can_modify: bool,
}

impl NewPullRequest {
    /// The pull request announcing template `version`.
    pub fn sync(version: &str) -> Self {
        NewPullRequest {
            title: sync_pr_title(version),
            body: SYNC_PR_BODY.to_string(),
            head: sync_branch_name(version),
            base: SYNC_PR_BASE.to_string(),
            maintainer_can_modify: true,
        }
    }
}

/// The pull request operations a sync needs.
pub trait PullRequestClient {
    fn list_open(&self) -> Result<Vec<PullRequestSummary>, PullRequestError>;
    fn close(&self, number: u64) -> Result<(), PullRequestError>;
    fn create(&self, request: &NewPullRequest) -> Result<PullRequestSummary, PullRequestError>;
}

/// Close every open sync pull request, then open the one for `version`.
pub fn open_sync_pull_request(
    client: &dyn PullRequestClient,
    version: &str,
) -> Result<PullRequestSummary, PullRequestError> {
    for pr in client.list_open()? {
        if pr.title.contains(SYNC_PR_TITLE_PREFIX) {
            tracing::info!("closing outdated sync pull request #{}", pr.number);
            client.close(pr.number)?;
        }
    }
    let created = client.create(&NewPullRequest::sync(version))?;
    tracing::info!("opened sync pull request #{}", created.number);
    Ok(created)
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct GithubErrorResponse {
    message: String,
}

/// Blocking GitHub REST v3 client for one repository.
pub struct GithubClient {
    agent: ureq::Agent,
    api_base: String,
    owner: String,
    repo: String,
    authorization: String,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_base", &self.api_base)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        username: &str,
        token: &str,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .build();
        let credentials = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{token}"));
        GithubClient {
            agent,
            api_base: GITHUB_API.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            authorization: format!("Basic {credentials}"),
        }
    }

    /// Client for the repository of a project: `{repo_owner}/{project_slug}`.
    pub fn for_project(metadata: &ProjectMetadata, username: &str, token: &str) -> Self {
        Self::new(metadata.repo_owner(), metadata.project_slug.clone(), username, token)
    }

    /// Point the client at another API root (GitHub Enterprise).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn pulls_url(&self, suffix: &str) -> String {
        format!("{}/repos/{}/{}/pulls{suffix}", self.api_base, self.owner, self.repo)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &self.authorization)
            .set("Accept", "application/vnd.github.v3+json")
            .set("User-Agent", "mlf-core")
    }
}

fn map_error(err: ureq::Error) -> PullRequestError {
    match err {
        ureq::Error::Status(status, response) => {
            let message = response
                .into_json::<GithubErrorResponse>()
                .map(|e| e.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            match status {
                401 => PullRequestError::AuthFailed("Invalid or expired token".to_string()),
                403 => PullRequestError::AuthFailed(format!("Permission denied: {message}")),
                404 => PullRequestError::NotFound(message),
                _ => PullRequestError::Api { status, message },
            }
        }
        ureq::Error::Transport(transport) => PullRequestError::Network(
            transport.message().map(str::to_string).unwrap_or_else(|| transport.kind().to_string()),
        ),
    }
}

fn decode<T: for<'de> Deserialize<'de>>(response: ureq::Response) -> Result<T, PullRequestError> {
    let status = response.status();
    response.into_json::<T>().map_err(|e| PullRequestError::Api {
        status,
        message: format!("unreadable response: {e}"),
    })
}

impl PullRequestClient for GithubClient {
    fn list_open(&self) -> Result<Vec<PullRequestSummary>, PullRequestError> {
        let response = self
            .request("GET", &self.pulls_url(""))
            .query("state", "open")
            .call()
            .map_err(map_error)?;
        decode(response)
    }

    fn close(&self, number: u64) -> Result<(), PullRequestError> {
        self.request("PATCH", &self.pulls_url(&format!("/{number}")))
            .send_json(serde_json::json!({ "state": "closed" }))
            .map_err(map_error)?;
        Ok(())
    }

    fn create(&self, request: &NewPullRequest) -> Result<PullRequestSummary, PullRequestError> {
        let response = self
            .request("POST", &self.pulls_url(""))
            .send_json(request)
            .map_err(map_error)?;
        if response.status() != 201 {
            return Err(PullRequestError::UnexpectedStatus { expected: 201, status: response.status() });
        }
        decode(response)
    }
}
