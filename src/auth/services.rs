use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        password::{hash_password, verify_password},
        repo::{UserRepo, UserWriteError},
        repo_types::User,
    },
    error::{ApiError, ApiResult},
};

pub const MIN_PASSWORD_LEN: usize = 6;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn present(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Passwords are taken as typed; only an empty one counts as missing.
fn given(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

pub(crate) fn email_taken() -> ApiError {
    ApiError::Conflict("Email already exists".into())
}

/// Checks run in order; the first failure is reported on its own.
pub async fn register(users: &dyn UserRepo, req: RegisterRequest) -> ApiResult<User> {
    let (Some(name), Some(email), Some(password)) =
        (present(req.name), present(req.email), given(req.password))
    else {
        return Err(ApiError::validation("All fields are required"));
    };

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::validation("Invalid email format"));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    if users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(email_taken());
    }

    let hash = hash_password(&password)?;
    let user = users
        .create(&name, &email, &hash)
        .await
        .map_err(|e| match e {
            UserWriteError::EmailTaken => email_taken(),
            UserWriteError::Other(e) => e.into(),
        })?;

    info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Unknown email and wrong password produce the same error.
pub async fn authenticate(users: &dyn UserRepo, req: LoginRequest) -> ApiResult<User> {
    let (Some(email), Some(password)) = (present(req.email), given(req.password)) else {
        return Err(ApiError::validation("Email and password are required"));
    };

    let Some(user) = users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user)
}
