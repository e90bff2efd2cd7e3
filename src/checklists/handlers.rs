use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{ChecklistPayload, ChecklistResponse, MessageResponse},
    services,
};
use crate::{auth::AuthUser, error::ApiResult, state::AppState};

pub fn checklist_routes() -> Router<AppState> {
    Router::new()
        .route("/checklist", get(list_checklists).post(create_checklist))
        .route(
            "/checklist/:id",
            put(update_checklist).delete(delete_checklist),
        )
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_checklists(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<ChecklistResponse>>> {
    let items = services::list(state.checklists.as_ref(), &user).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_checklist(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<ChecklistPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ChecklistResponse>)> {
    let Json(payload) = payload?;
    let created = services::create(state.checklists.as_ref(), &user, payload).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_checklist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<ChecklistPayload>, JsonRejection>,
) -> ApiResult<Json<ChecklistResponse>> {
    let Json(payload) = payload?;
    let updated = services::update(state.checklists.as_ref(), &user, &id, payload).await?;
    Ok(Json(updated.into()))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_checklist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    services::delete(state.checklists.as_ref(), &user, &id).await?;
    Ok(Json(MessageResponse {
        message: "Checklist deleted successfully",
    }))
}
