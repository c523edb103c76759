//! Client for the remote work-item API.
//!
//! Only three calls are needed: read the releasable flag, patch the release
//! date, and post a comment. They sit behind [`WorkItemApi`] so the
//! validator can run against a recording fake.

use crate::config::Config;
use crate::error::ValidationError;
use crate::sanitize::{sanitize, sanitize_url};
use async_trait::async_trait;
use base64::Engine as _;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};

pub const RELEASE_DATE_FIELD: &str = "NT.Release.ReleaseDate";
const RELEASABLE_MARKER: &str = "\"NT.App.Releasable\":true";
const JSON_PATCH: &str = "application/json-patch+json";

#[async_trait]
pub trait WorkItemApi: Send + Sync {
    /// True when the work item has its releasable flag set.
    async fn fetch_releasable_toggle(
        &self,
        org_url: &str,
        project_name: &str,
        work_item_id: i64,
    ) -> Result<bool, ValidationError>;

    /// Replace the release-date field. `None` clears it.
    async fn update_work_item(
        &self,
        org_url: &str,
        project_name: &str,
        work_item_id: i64,
        release_date: Option<&str>,
    ) -> Result<(), ValidationError>;

    async fn add_validation_comment(
        &self,
        org_url: &str,
        project_name: &str,
        work_item_id: i64,
        comment: &str,
    ) -> Result<(), ValidationError>;
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    FetchToggle,
    Update,
    Comment,
}

impl Operation {
    fn rejected(self) -> ValidationError {
        ValidationError::BadGateway(
            match self {
                Self::FetchToggle => "Failed to fetch releasable toggle",
                Self::Update => "Failed to update work item",
                Self::Comment => "Failed to add comment",
            }
            .to_string(),
        )
    }

    fn failed(self) -> ValidationError {
        ValidationError::Internal(
            match self {
                Self::FetchToggle => "Error fetching releasable toggle",
                Self::Update => "Error updating work item",
                Self::Comment => "Error adding comment",
            }
            .to_string(),
        )
    }
}

/// Work-item API client authenticated with a personal access token.
#[derive(Debug, Clone)]
pub struct AdoClient {
    http: reqwest::Client,
    access_token: Option<String>,
}

impl AdoClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            access_token: config.access_token.clone(),
        })
    }

    /// `Basic base64(":" + token)`; the user name is left empty.
    fn authorization(&self) -> Result<String, ValidationError> {
        let token = match self.access_token.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(ValidationError::Unauthorized("Missing access token".to_string())),
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(format!(":{token}"));
        Ok(format!("Basic {encoded}"))
    }

    /// Sanitized `{org}/{project}` prefix for API paths.
    fn project_base(org_url: &str, project_name: &str) -> Result<String, ValidationError> {
        if org_url.trim().is_empty() || project_name.trim().is_empty() {
            return Err(ValidationError::bad_request("Invalid Org URL or project name"));
        }
        let org = sanitize_url(org_url);
        let org = org.trim_end_matches('/');
        let project = sanitize_url(project_name);
        if org.is_empty() || project.is_empty() {
            return Err(ValidationError::bad_request("Invalid Org URL or project name"));
        }
        Ok(format!("{org}/{project}"))
    }

    fn request(
        &self,
        method: Method,
        url: &str,
        content_type: &str,
    ) -> Result<RequestBuilder, ValidationError> {
        Ok(self
            .http
            .request(method, url)
            .header(AUTHORIZATION, self.authorization()?)
            .header(CONTENT_TYPE, content_type))
    }

    /// Send and map the outcome: 4xx is the upstream rejecting us, anything
    /// else that is not a success is ours to report as internal.
    async fn send(
        &self,
        op: Operation,
        work_item_id: i64,
        request: RequestBuilder,
    ) -> Result<String, ValidationError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(work_item_id, ?op, "request failed: {e}");
            op.failed()
        })?;

        let status = response.status();
        if status.is_client_error() {
            tracing::error!(work_item_id, ?op, status = status.as_u16(), "rejected by work-item API");
            return Err(op.rejected());
        }
        if !status.is_success() {
            tracing::error!(work_item_id, ?op, status = status.as_u16(), "work-item API error");
            return Err(op.failed());
        }

        response.text().await.map_err(|e| {
            tracing::error!(work_item_id, ?op, "failed to read response: {e}");
            op.failed()
        })
    }
}

#[async_trait]
impl WorkItemApi for AdoClient {
    async fn fetch_releasable_toggle(
        &self,
        org_url: &str,
        project_name: &str,
        work_item_id: i64,
    ) -> Result<bool, ValidationError> {
        let base = Self::project_base(org_url, project_name)?;
        let url = format!("{base}/_apis/wit/workitems/{work_item_id}?api-version=6.0");
        let request = self.request(Method::GET, &url, "application/json")?;

        let body = self.send(Operation::FetchToggle, work_item_id, request).await?;
        let releasable = body.contains(RELEASABLE_MARKER);
        tracing::debug!(work_item_id, releasable, "fetched releasable toggle");
        Ok(releasable)
    }

    async fn update_work_item(
        &self,
        org_url: &str,
        project_name: &str,
        work_item_id: i64,
        release_date: Option<&str>,
    ) -> Result<(), ValidationError> {
        let base = Self::project_base(org_url, project_name)?;
        let url = format!("{base}/_apis/wit/workitems/{work_item_id}?api-version=6.0");
        let patch = serde_json::json!([{
            "op": "replace",
            "path": format!("/fields/{RELEASE_DATE_FIELD}"),
            "value": sanitize(release_date),
        }]);
        let request = self
            .request(Method::PATCH, &url, JSON_PATCH)?
            .body(patch.to_string());

        self.send(Operation::Update, work_item_id, request).await?;
        tracing::info!(work_item_id, "reverted release date");
        Ok(())
    }

    async fn add_validation_comment(
        &self,
        org_url: &str,
        project_name: &str,
        work_item_id: i64,
        comment: &str,
    ) -> Result<(), ValidationError> {
        let base = Self::project_base(org_url, project_name)?;
        let url = format!(
            "{base}/_apis/wit/workItems/{work_item_id}/comments?api-version=7.0-preview.3"
        );
        let body = serde_json::json!({ "text": sanitize(Some(comment)) });
        let request = self
            .request(Method::POST, &url, "application/json")?
            .json(&body);

        self.send(Operation::Comment, work_item_id, request).await?;
        tracing::info!(work_item_id, "added validation comment");
        Ok(())
    }
}
