//! GitHub GraphQL transport.
//!
//! [`GitHubClient`] performs exactly one HTTP exchange per call and sorts the
//! result into resolved repository data, a rate-limit signal, or a transient
//! failure. Retrying is left to [`crate::retry`].

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::SelectorConfig;
use crate::error::Result;
use crate::retry::{AttemptFailure, RateLimitInfo};
use crate::types::{RepoSlug, RepositoryNode};

/// User agent string identifying this selector.
const USER_AGENT: &str = concat!("repo-corpus-selector/", env!("CARGO_PKG_VERSION"));

/// Primary language and the date of the latest commit on the default branch.
pub const REPOSITORY_QUERY: &str = r#"
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    primaryLanguage {
      name
    }
    defaultBranchRef {
      target {
        ... on Commit {
          history(first: 1) {
            edges {
              node {
                committedDate
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// One qualification query against the remote API.
pub trait RepositoryApi {
    /// Fetch repository data. `Ok(None)` means the repository does not exist
    /// or is not visible with the configured credentials.
    fn fetch_repository(
        &self,
        slug: &RepoSlug,
    ) -> std::result::Result<Option<RepositoryNode>, AttemptFailure>;
}

impl<A: RepositoryApi + ?Sized> RepositoryApi for &A {
    fn fetch_repository(
        &self,
        slug: &RepoSlug,
    ) -> std::result::Result<Option<RepositoryNode>, AttemptFailure> {
        (**self).fetch_repository(slug)
    }
}

/// GitHub GraphQL client authenticated with a bearer token.
///
/// NOTE: Do NOT derive `Debug` on this struct — `token` would be exposed.
pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: String,
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Variables<'a>,
}

#[derive(Serialize)]
struct Variables<'a> {
    owner: &'a str,
    name: &'a str,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<QueryData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct QueryData {
    repository: Option<RepositoryNode>,
}

#[derive(Deserialize)]
struct GraphQlError {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &SelectorConfig, token: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            token: token.into(),
        })
    }
}

impl RepositoryApi for GitHubClient {
    fn fetch_repository(
        &self,
        slug: &RepoSlug,
    ) -> std::result::Result<Option<RepositoryNode>, AttemptFailure> {
        let body = GraphQlRequest {
            query: REPOSITORY_QUERY,
            variables: Variables {
                owner: &slug.owner,
                name: &slug.name,
            },
        };

        let response = self
            .http
            .post(&self.api_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .map_err(|e| AttemptFailure::Transport(e.to_string()))?;

        classify_response(response)
    }
}

/// Sort a completed HTTP exchange into data, rate limiting, or failure.
fn classify_response(
    response: Response,
) -> std::result::Result<Option<RepositoryNode>, AttemptFailure> {
    let status = response.status();
    let rate_limit = rate_limit_info(response.headers());

    if is_rate_limited(status, &rate_limit) {
        return Err(AttemptFailure::RateLimited(rate_limit));
    }
    if !status.is_success() {
        return Err(AttemptFailure::Http {
            status: status.as_u16(),
        });
    }

    let text = response
        .text()
        .map_err(|e| AttemptFailure::Transport(e.to_string()))?;
    let parsed: GraphQlResponse = serde_json::from_str(&text)
        .map_err(|e| AttemptFailure::MalformedResponse(e.to_string()))?;

    if parsed
        .errors
        .iter()
        .any(|e| e.kind.as_deref() == Some("RATE_LIMITED"))
    {
        return Err(AttemptFailure::RateLimited(rate_limit));
    }

    match parsed.data {
        // NOT_FOUND errors come with `repository: null`, which is a valid answer.
        Some(data) => Ok(data.repository),
        None => {
            let messages: Vec<&str> = parsed
                .errors
                .iter()
                .filter_map(|e| e.message.as_deref())
                .collect();
            if messages.is_empty() {
                Err(AttemptFailure::MalformedResponse("response has no data".into()))
            } else {
                Err(AttemptFailure::GraphQl(messages.join("; ")))
            }
        }
    }
}

/// GitHub signals rate limiting with 429, or with 403 plus rate-limit headers.
fn is_rate_limited(status: StatusCode, info: &RateLimitInfo) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && (info.retry_after.is_some() || info.remaining == Some(0)))
}

fn rate_limit_info(headers: &HeaderMap) -> RateLimitInfo {
    fn header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }

    RateLimitInfo {
        retry_after: header(headers, "retry-after"),
        remaining: header(headers, "x-ratelimit-remaining"),
        reset_at: header(headers, "x-ratelimit-reset"),
    }
}
