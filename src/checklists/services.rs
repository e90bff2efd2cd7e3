use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::ChecklistPayload,
    repo::ChecklistRepo,
    repo_types::{Checklist, ChecklistFields, ChecklistStatus},
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
};

const NOT_FOUND: &str = "Checklist not found";

fn required(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Presence is checked for all three fields before the status value.
pub fn validate(payload: ChecklistPayload) -> ApiResult<ChecklistFields> {
    let (Some(title), Some(short_name), Some(status)) = (
        required(payload.title),
        required(payload.short_name),
        required(payload.status),
    ) else {
        return Err(ApiError::validation(
            "Title, shortName and status are required",
        ));
    };

    let status = status
        .parse::<ChecklistStatus>()
        .map_err(|_| ApiError::validation("Invalid status value"))?;

    Ok(ChecklistFields {
        title,
        short_name,
        status,
    })
}

/// Ids that do not parse are reported exactly like missing rows.
pub fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(NOT_FOUND))
}

pub async fn list(repo: &dyn ChecklistRepo, owner: &AuthUser) -> ApiResult<Vec<Checklist>> {
    Ok(repo.list_by_owner(owner.id).await?)
}

/// The owner's email at this moment becomes the checklist's `user_name`.
pub async fn create(
    repo: &dyn ChecklistRepo,
    owner: &AuthUser,
    payload: ChecklistPayload,
) -> ApiResult<Checklist> {
    let fields = validate(payload)?;
    let checklist = repo.insert(owner.id, &owner.email, &fields).await?;
    info!(
        user_id = %owner.id,
        checklist_id = %checklist.id,
        status = %checklist.status,
        "checklist created"
    );
    Ok(checklist)
}

pub async fn update(
    repo: &dyn ChecklistRepo,
    owner: &AuthUser,
    id: &str,
    payload: ChecklistPayload,
) -> ApiResult<Checklist> {
    let fields = validate(payload)?;
    let id = parse_id(id)?;
    let updated = repo
        .update_owned(owner.id, id, &fields)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %owner.id, checklist_id = %id, "update missed");
            ApiError::not_found(NOT_FOUND)
        })?;
    info!(user_id = %owner.id, checklist_id = %id, status = %updated.status, "checklist updated");
    Ok(updated)
}

pub async fn delete(repo: &dyn ChecklistRepo, owner: &AuthUser, id: &str) -> ApiResult<()> {
    let id = parse_id(id)?;
    if repo.delete_owned(owner.id, id).await? {
        info!(user_id = %owner.id, checklist_id = %id, "checklist deleted");
        Ok(())
    } else {
        warn!(user_id = %owner.id, checklist_id = %id, "delete missed");
        Err(ApiError::not_found(NOT_FOUND))
    }
}
