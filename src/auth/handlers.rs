use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        extractors::AuthUser,
        repo_types::User,
        services,
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(get_me))
}

fn auth_response(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let token = state.jwt.issue(user.id, &user.email).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::from(e)
    })?;
    Ok(AuthResponse {
        user: user.into(),
        token,
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(payload) = payload?;
    let user = services::register(state.users.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(auth_response(&state, user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(payload) = payload?;
    let user = services::authenticate(state.users.as_ref(), payload).await?;
    Ok(Json(auth_response(&state, user)?))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_me(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<PublicUser>> {
    let found = state
        .users
        .find_by_id(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(found.into()))
}
