use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Checklist, ChecklistStatus};

/// Body of both create and update; update is a full replace.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistResponse {
    pub id: Uuid,
    pub title: String,
    pub short_name: String,
    pub status: ChecklistStatus,
    pub user_id: Uuid,
    pub user_name: String,
    pub created_at: i64, // epoch millis
    pub updated_at: i64, // epoch millis
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub(crate) fn epoch_millis(ts: OffsetDateTime) -> i64 {
    (ts.unix_timestamp_nanos() / 1_000_000) as i64
}

impl From<Checklist> for ChecklistResponse {
    fn from(c: Checklist) -> Self {
        Self {
            id: c.id,
            title: c.title,
            short_name: c.short_name,
            status: c.status,
            user_id: c.user_id,
            user_name: c.user_name,
            created_at: epoch_millis(c.created_at),
            updated_at: epoch_millis(c.updated_at),
        }
    }
}
