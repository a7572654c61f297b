//! Handlers for the `/auth` resource (login, current-user info).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use zeus_core::error::CoreError;
use zeus_core::permissions::PermissionSet;
use zeus_db::repositories::{PermissionRepo, UserRepo};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Response body for `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub permissions: PermissionSet,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns a bearer token whose
/// claims carry the principal's permission snapshot as of now. Unknown
/// usernames, wrong passwords, and deactivated accounts all produce the
/// same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or(AppError::Core(CoreError::InvalidCredentials))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::InvalidCredentials));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(AppError::Core(CoreError::InvalidCredentials));
    }

    let permissions = PermissionRepo::snapshot_for_user(&state.pool, user.id).await?;

    let access_token = generate_access_token(user.id, &user.username, &permissions, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
    }))
}

/// GET /api/v1/auth/me
///
/// Return the authenticated principal's identity and the permission
/// snapshot embedded in its token.
pub async fn me(user: AuthUser) -> AppResult<Json<MeResponse>> {
    Ok(Json(MeResponse {
        username: user.username,
        permissions: user.permissions,
    }))
}
