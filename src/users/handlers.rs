use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bytes::BytesMut;
use tracing::{instrument, warn};

use super::{
    dto::{AvatarResponse, ProfileResponse, UpdateProfileRequest},
    services::{self, avatar_too_large, AvatarUpload, MAX_AVATAR_BYTES},
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Multipart overhead allowed on top of the file itself.
const AVATAR_BODY_SLACK: usize = 64 * 1024;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/profile", get(get_profile).put(update_profile))
        .route(
            "/user/avatar",
            post(upload_avatar).layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + AVATAR_BODY_SLACK)),
        )
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let found = services::get_profile(state.users.as_ref(), user.id).await?;
    Ok(Json(found.into()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<Json<ProfileResponse>> {
    let Json(payload) = payload?;
    let updated = services::update_profile(state.users.as_ref(), user.id, payload).await?;
    Ok(Json(updated.into()))
}

/// POST /user/avatar (multipart, field `avatar`)
#[instrument(skip(state, user, mp), fields(user_id = %user.id))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    mp: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AvatarResponse>> {
    let mut mp = mp.map_err(|e| {
        warn!(error = %e, "avatar request is not multipart");
        ApiError::validation("No file uploaded")
    })?;
    let mut upload = None;
    while let Some(field) = mp.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("avatar") {
            upload = Some(read_avatar(field).await?);
            break;
        }
    }
    let Some(upload) = upload else {
        return Err(ApiError::validation("No file uploaded"));
    };

    let avatar_url = services::replace_avatar(
        state.users.as_ref(),
        state.storage.as_ref(),
        user.id,
        upload,
    )
    .await?;

    Ok(Json(AvatarResponse {
        message: "Avatar uploaded successfully",
        avatar_url,
    }))
}

/// Type is checked before any byte is read; size is enforced while streaming.
async fn read_avatar(mut field: Field<'_>) -> ApiResult<AvatarUpload> {
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let file_name = field.file_name().unwrap_or_default().to_string();
    let ext = services::image_extension(&content_type, &file_name)?;

    let mut body = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if body.len() + chunk.len() > MAX_AVATAR_BYTES {
            warn!(file_name = %file_name, "avatar over size limit");
            return Err(avatar_too_large());
        }
        body.extend_from_slice(&chunk);
    }

    Ok(AvatarUpload {
        body: body.freeze(),
        content_type,
        ext,
    })
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        avatar_too_large()
    } else {
        ApiError::validation(e.body_text())
    }
}
