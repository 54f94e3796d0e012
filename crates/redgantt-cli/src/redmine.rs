//! Blocking Redmine REST client
//!
//! Talks to `/issues.json` and `/issues/<id>.json`, decodes the JSON
//! payloads into local DTOs and converts them into domain issues. List
//! queries follow the tracker's `offset`/`total_count` paging protocol so a
//! filter hit larger than one page still comes back complete.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use redgantt_core::{FilterCriteria, Issue, IssueId, IssueRepository, TrackerError};

const PAGE_LIMIT: u64 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for one tracker instance.
pub struct RedmineClient {
    agent: ureq::Agent,
    base_url: String,
    auth_header: Option<String>,
}

impl RedmineClient {
    /// `base_url` without a trailing slash, credentials as HTTP basic auth.
    pub fn new(base_url: impl Into<String>, username: Option<&str>, password: Option<&str>) -> Self {
        let auth_header = username.map(|user| {
            let token = STANDARD.encode(format!("{user}:{}", password.unwrap_or("")));
            format!("Basic {token}")
        });
        Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            base_url: base_url.into(),
            auth_header,
        }
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "tracker request");

        let mut request = self.agent.get(&url);
        for (key, value) in params {
            request = request.query(key, value);
        }
        if let Some(auth) = &self.auth_header {
            request = request.set("Authorization", auth);
        }

        let response = request.call().map_err(|e| match e {
            ureq::Error::Status(code, _) => FetchError::Status(code),
            ureq::Error::Transport(t) => FetchError::Transport(t.to_string()),
        })?;
        response
            .into_json::<T>()
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Run a paged `issues.json` query to completion.
    fn fetch_all_pages(&self, params: &[(&str, String)]) -> Result<Vec<Issue>, FetchError> {
        let mut all = Vec::new();
        let mut offset = 0u64;
        loop {
            let mut page_params = params.to_vec();
            page_params.push(("limit", PAGE_LIMIT.to_string()));
            page_params.push(("offset", offset.to_string()));

            let page: IssueListDto = self.get_json("issues.json", &page_params)?;
            let fetched = page.issues.len() as u64;
            all.extend(page.issues.into_iter().map(IssueDto::into_issue));

            offset += fetched;
            if fetched == 0 || offset >= page.total_count {
                break;
            }
        }
        Ok(all)
    }
}

impl IssueRepository for RedmineClient {
    fn get(&mut self, id: IssueId) -> Result<Issue, TrackerError> {
        let envelope: IssueEnvelopeDto = self
            .get_json(&format!("issues/{id}.json"), &[])
            .map_err(|e| match e {
                FetchError::Status(404) => TrackerError::NotFound(id),
                other => other.into(),
            })?;
        Ok(envelope.issue.into_issue())
    }

    fn filter(&mut self, criteria: &FilterCriteria) -> Result<Vec<Issue>, TrackerError> {
        let params = criteria.query_pairs();
        Ok(self.fetch_all_pages(&params)?)
    }

    fn children(&mut self, id: IssueId) -> Result<Vec<Issue>, TrackerError> {
        // status_id=* so closed children still show up in the tree
        let params = vec![
            ("parent_id", id.to_string()),
            ("status_id", "*".to_string()),
        ];
        Ok(self.fetch_all_pages(&params)?)
    }
}

enum FetchError {
    Status(u16),
    Transport(String),
    Decode(String),
}

impl From<FetchError> for TrackerError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Status(401 | 403) => TrackerError::Auth,
            FetchError::Status(code) => TrackerError::Transport(format!("HTTP {code}")),
            FetchError::Transport(msg) | FetchError::Decode(msg) => TrackerError::Transport(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IssueListDto {
    issues: Vec<IssueDto>,
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct IssueEnvelopeDto {
    issue: IssueDto,
}

#[derive(Debug, Deserialize)]
struct IssueDto {
    id: IssueId,
    subject: String,
    assigned_to: Option<NamedDto>,
    start_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    closed_on: Option<DateTime<Utc>>,
    done_ratio: Option<u8>,
    parent: Option<ParentDto>,
}

#[derive(Debug, Deserialize)]
struct NamedDto {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ParentDto {
    id: IssueId,
}

impl IssueDto {
    fn into_issue(self) -> Issue {
        let mut issue = Issue::new(self.id, self.subject);
        if let Some(assigned) = self.assigned_to {
            issue = issue.assignee(assigned.name);
        }
        if let Some(date) = self.start_date {
            issue = issue.start(date);
        }
        if let Some(date) = self.due_date {
            issue = issue.due(date);
        }
        if let Some(closed) = self.closed_on {
            issue = issue.closed(closed.date_naive());
        }
        if let Some(ratio) = self.done_ratio {
            issue = issue.done_ratio(ratio);
        }
        if let Some(parent) = self.parent {
            issue = issue.parent(parent.id);
        }
        issue
    }
}
