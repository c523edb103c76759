//! Release-date policy: a changed release date must lie strictly after
//! today (UTC). Violations are reverted and explained on the work item.

use crate::config::Config;
use crate::error::ValidationError;
use crate::sanitize::sanitize;
use crate::types::{ValidationOutcome, WebhookPayload};
use crate::work_items::WorkItemApi;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

pub const REVERT_COMMENT: &str =
    "Release Date was invalid (past or today). Reverted to previous valid value.";

pub struct ReleaseDateValidator {
    org_url_prefix: String,
    project_name: String,
    api: Arc<dyn WorkItemApi>,
}

impl ReleaseDateValidator {
    pub fn new(config: &Config, api: Arc<dyn WorkItemApi>) -> Self {
        Self {
            org_url_prefix: config.org_url_prefix.clone(),
            project_name: config.project_name.clone(),
            api,
        }
    }

    pub async fn validate(
        &self,
        payload: &WebhookPayload,
    ) -> Result<ValidationOutcome, ValidationError> {
        self.validate_on(payload, Utc::now().date_naive()).await
    }

    /// Checks run in order and stop at the first decision. Everything before
    /// the releasability read is local.
    pub async fn validate_on(
        &self,
        payload: &WebhookPayload,
        today: NaiveDate,
    ) -> Result<ValidationOutcome, ValidationError> {
        let org_url = sanitize(payload.collection_url());
        let project_name = sanitize(payload.project_name());
        let new_date = sanitize(payload.new_release_date());
        let old_date = sanitize(payload.old_release_date());

        if org_url.is_empty() || !org_url.starts_with(&self.org_url_prefix) {
            tracing::warn!("blocked event from untrusted organization URL");
            return Err(ValidationError::bad_request("Invalid Organization URL"));
        }

        if project_name.is_empty() {
            tracing::warn!("blocked event without project name");
            return Err(ValidationError::bad_request("Invalid project name"));
        }
        if !project_name.eq_ignore_ascii_case(&self.project_name) {
            tracing::warn!(
                project = %project_name,
                configured = %self.project_name,
                "event for a project other than the configured one"
            );
        }

        if new_date.is_empty() {
            tracing::info!(work_item_id = ?payload.work_item_id(), "no release date change");
            return Ok(ValidationOutcome::NoChange);
        }

        let Some(work_item_id) = payload.work_item_id() else {
            tracing::warn!("release date changed but work item id is missing");
            return Err(ValidationError::bad_request("Invalid work item id"));
        };

        if !self
            .api
            .fetch_releasable_toggle(&org_url, &project_name, work_item_id)
            .await?
        {
            tracing::info!(work_item_id, "work item not releasable");
            return Ok(ValidationOutcome::NotReleasable);
        }

        let new_day = parse_release_day(&new_date).map_err(|e| {
            tracing::error!(work_item_id, "failed to parse release date: {e}");
            ValidationError::bad_request("Invalid date format")
        })?;

        if new_day <= today {
            tracing::warn!(work_item_id, %new_day, %today, "release date not in the future");
            let previous = (!old_date.is_empty()).then_some(old_date.as_str());
            self.api
                .update_work_item(&org_url, &project_name, work_item_id, previous)
                .await?;
            self.api
                .add_validation_comment(&org_url, &project_name, work_item_id, REVERT_COMMENT)
                .await?;
            return Ok(ValidationOutcome::Reverted);
        }

        tracing::info!(work_item_id, %new_day, "release date valid");
        Ok(ValidationOutcome::Valid)
    }
}

/// Calendar day in UTC of an RFC 3339 timestamp.
fn parse_release_day(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(value)?
        .with_timezone(&Utc)
        .date_naive())
}
