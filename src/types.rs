use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Work-item update event as delivered by the tracker's service hook.
/// Unknown fields are ignored; any level may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub resource: Option<Resource>,
    #[serde(default)]
    pub resource_containers: Option<ResourceContainers>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    pub work_item_id: Option<i64>,
    #[serde(default)]
    pub fields: Option<Fields>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fields {
    #[serde(rename = "NT.Release.ReleaseDate", default)]
    pub release_date: Option<FieldChange>,
    #[serde(rename = "System.TeamProject", default)]
    pub team_project: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceContainers {
    #[serde(default)]
    pub collection: Option<Container>,
    #[serde(default)]
    pub project: Option<Container>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default)]
    pub base_url: Option<String>,
}

impl WebhookPayload {
    fn fields(&self) -> Option<&Fields> {
        self.resource.as_ref()?.fields.as_ref()
    }

    fn release_date(&self) -> Option<&FieldChange> {
        self.fields()?.release_date.as_ref()
    }

    pub fn work_item_id(&self) -> Option<i64> {
        self.resource.as_ref()?.work_item_id
    }

    pub fn old_release_date(&self) -> Option<&str> {
        self.release_date()?.old_value.as_deref()
    }

    pub fn new_release_date(&self) -> Option<&str> {
        self.release_date()?.new_value.as_deref()
    }

    pub fn project_name(&self) -> Option<&str> {
        self.fields()?.team_project.as_deref()
    }

    /// Organization base URL as claimed by the sender.
    pub fn collection_url(&self) -> Option<&str> {
        self.resource_containers
            .as_ref()?
            .collection
            .as_ref()?
            .base_url
            .as_deref()
    }
}

/// Non-error result of validating one release-date change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    NoChange,
    NotReleasable,
    Reverted,
    Valid,
}

impl ValidationOutcome {
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Reverted => StatusCode::BAD_REQUEST,
            Self::NoChange | Self::NotReleasable | Self::Valid => StatusCode::OK,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::NoChange => "No ReleaseDate change detected",
            Self::NotReleasable => "Work item not releasable",
            Self::Reverted => "Invalid ReleaseDate, reverted.",
            Self::Valid => "ReleaseDate is valid.",
        }
    }
}
