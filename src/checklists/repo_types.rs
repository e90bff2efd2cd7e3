use std::{fmt, str::FromStr};

use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle of a checklist. Stored and serialised in snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    Pending,
    InProgress,
    Completed,
}

impl ChecklistStatus {
    pub const ALL: [ChecklistStatus; 3] = [
        ChecklistStatus::Pending,
        ChecklistStatus::InProgress,
        ChecklistStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChecklistStatus::Pending => "pending",
            ChecklistStatus::InProgress => "in_progress",
            ChecklistStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ChecklistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown checklist status {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for ChecklistStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Row as read from `checklists`.
#[derive(Debug, FromRow)]
pub struct ChecklistRow {
    pub id: Uuid,
    pub title: String,
    pub short_name: String,
    pub status: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checklist {
    pub id: Uuid,
    pub title: String,
    pub short_name: String,
    pub status: ChecklistStatus,
    pub user_id: Uuid,
    pub user_name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<ChecklistRow> for Checklist {
    type Error = UnknownStatus;

    fn try_from(r: ChecklistRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: r.status.parse()?,
            id: r.id,
            title: r.title,
            short_name: r.short_name,
            user_id: r.user_id,
            user_name: r.user_name,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Validated, user-editable fields. Update replaces all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistFields {
    pub title: String,
    pub short_name: String,
    pub status: ChecklistStatus,
}
