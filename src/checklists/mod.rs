mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
mod services;

use crate::state::AppState;
use axum::Router;

pub(crate) use dto::epoch_millis;

pub fn router() -> Router<AppState> {
    handlers::checklist_routes()
}
