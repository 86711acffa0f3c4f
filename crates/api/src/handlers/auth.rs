//! Handlers for the `/auth` resource (authenticate, register).

use axum::extract::State;
use axum::Json;
use quotedex_core::catalog::{require_text, MAX_NAME_LEN};
use quotedex_core::error::CoreError;
use quotedex_db::models::user::{CreateUser, PublicUser};
use quotedex_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{is_unique_violation, AppError, AppResult, AuthFailure};
use crate::extract::AppJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of both `POST /auth` and `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Reject missing or blank fields before touching the store.
    fn validated(self) -> Result<(String, String), CoreError> {
        let username = require_text("username", self.username.as_deref(), MAX_NAME_LEN)?;
        let password = self
            .password
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| CoreError::validation("password is required"))?;
        Ok((username, password))
    }
}

/// `{user: {_id, username}, token}`.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

fn issue(state: &AppState, user: PublicUser) -> AppResult<Json<AuthResponse>> {
    let token = generate_token(user.id, &user.username, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;
    Ok(Json(AuthResponse { user, token }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth
///
/// Exchange username + password for a bearer token.
pub async fn authenticate(
    State(state): State<AppState>,
    AppJson(input): AppJson<CredentialsRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (username, password) = input.validated()?;

    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or(AuthFailure::UserNotFound)?;

    let password_valid = verify_password(&password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Rejected bad credentials");
        return Err(AuthFailure::BadCredentials.into());
    }

    tracing::info!(user_id = user.id, "User authenticated");
    issue(&state, PublicUser::from(&user))
}

/// POST /api/v1/auth/register
///
/// Create an account and sign the new user in.
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<CredentialsRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (username, password) = input.validated()?;

    if UserRepo::find_by_username(&state.pool, &username)
        .await?
        .is_some()
    {
        return Err(AuthFailure::UsernameTaken.into());
    }

    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let input = CreateUser {
        username,
        password_hash,
    };
    let user = match UserRepo::create(&state.pool, &input).await {
        Ok(user) => user,
        // Lost a race with a concurrent registration of the same name.
        Err(err) if is_unique_violation(&err, "uq_users_username") => {
            return Err(AuthFailure::UsernameTaken.into());
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(user_id = user.id, "User registered");
    issue(&state, PublicUser::from(&user))
}
