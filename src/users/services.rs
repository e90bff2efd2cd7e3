use std::path::Path;

use bytes::Bytes;
use rand::Rng;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::UpdateProfileRequest;
use crate::{
    auth::{
        repo::{UserRepo, UserWriteError},
        repo_types::{ProfileChanges, User},
        services::{email_taken, is_valid_email},
    },
    error::{ApiError, ApiResult},
    storage::StorageClient,
};

pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

const AVATAR_DIR: &str = "avatars";
const UPLOAD_FAILED: &str = "Error uploading avatar";

pub struct AvatarUpload {
    pub body: Bytes,
    pub content_type: String,
    pub ext: &'static str,
}

fn user_not_found() -> ApiError {
    ApiError::not_found("User not found")
}

pub fn bad_image_type() -> ApiError {
    ApiError::validation("Only .png, .jpg, .jpeg and .gif format allowed!")
}

pub fn avatar_too_large() -> ApiError {
    ApiError::validation("File size too large. Maximum size is 5MB")
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

fn ext_from_file_name(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("jpg"),
        "png" => Some("png"),
        "gif" => Some("gif"),
        _ => None,
    }
}

/// Both the declared content type and the file name must name a supported image.
pub fn image_extension(content_type: &str, file_name: &str) -> ApiResult<&'static str> {
    let ct = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match (ext_from_mime(&ct), ext_from_file_name(file_name)) {
        (Some(ext), Some(_)) => Ok(ext),
        _ => Err(bad_image_type()),
    }
}

fn avatar_file_name(ext: &str) -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("avatar-{millis}-{suffix}.{ext}")
}

fn avatar_key(file_name: &str) -> String {
    format!("{AVATAR_DIR}/{file_name}")
}

pub async fn get_profile(users: &dyn UserRepo, id: Uuid) -> ApiResult<User> {
    users.find_by_id(id).await?.ok_or_else(user_not_found)
}

pub async fn update_profile(
    users: &dyn UserRepo,
    id: Uuid,
    req: UpdateProfileRequest,
) -> ApiResult<User> {
    let changes = ProfileChanges {
        name: req.name.filter(|s| !s.trim().is_empty()),
        email: req.email.filter(|s| !s.trim().is_empty()),
    };
    if changes.name.is_none() && changes.email.is_none() {
        return Err(ApiError::validation(
            "At least one field (name or email) must be provided",
        ));
    }

    if let Some(email) = &changes.email {
        if !is_valid_email(email) {
            return Err(ApiError::validation("Invalid email format"));
        }
        if let Some(other) = users.find_by_email(email).await? {
            if other.id != id {
                warn!(user_id = %id, "profile email already in use");
                return Err(email_taken());
            }
        }
    }

    let user = users
        .update_profile(id, &changes)
        .await
        .map_err(|e| match e {
            UserWriteError::EmailTaken => email_taken(),
            UserWriteError::Other(e) => e.into(),
        })?
        .ok_or_else(user_not_found)?;

    info!(user_id = %id, "profile updated");
    Ok(user)
}

/// Store the new file, point the user at it, then drop the previous file.
///
/// Removing the previous file is best effort: a failure is logged and the
/// file is left behind.
pub async fn replace_avatar(
    users: &dyn UserRepo,
    storage: &dyn StorageClient,
    user_id: Uuid,
    upload: AvatarUpload,
) -> ApiResult<String> {
    let user = users.find_by_id(user_id).await?.ok_or_else(user_not_found)?;

    let file_name = avatar_file_name(upload.ext);
    let key = avatar_key(&file_name);
    storage
        .put_object(&key, upload.body, &upload.content_type)
        .await
        .map_err(|e| ApiError::internal_with(UPLOAD_FAILED, e))?;

    let updated = match users.set_avatar(user_id, &file_name).await {
        Ok(updated) => updated,
        Err(e) => {
            discard(storage, &key).await;
            return Err(ApiError::internal_with(UPLOAD_FAILED, e));
        }
    };
    if updated.is_none() {
        discard(storage, &key).await;
        return Err(user_not_found());
    }

    if let Some(old) = user.avatar.as_deref() {
        // only the base name is trusted; older rows may carry a path
        if let Some(old_name) = Path::new(old).file_name().and_then(|s| s.to_str()) {
            discard(storage, &avatar_key(old_name)).await;
        }
    }

    info!(user_id = %user_id, avatar = %file_name, "avatar replaced");
    Ok(file_name)
}

async fn discard(storage: &dyn StorageClient, key: &str) {
    if let Err(e) = storage.delete_object(key).await {
        warn!(error = %format!("{e:#}"), key, "failed to remove avatar file");
    }
}
