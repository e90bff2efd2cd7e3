use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::repo_types::User, checklists::epoch_millis};

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<User> for ProfileResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            avatar: u.avatar,
            created_at: epoch_millis(u.created_at),
            updated_at: epoch_millis(u.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResponse {
    pub message: &'static str,
    pub avatar_url: String,
}
