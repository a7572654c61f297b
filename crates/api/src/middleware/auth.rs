//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use zeus_core::error::CoreError;
use zeus_core::permissions::PermissionSet;
use zeus_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated principal extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, username = %user.username, "handling request");
///     Ok(Json(()))
/// }
/// ```
///
/// The carried [`PermissionSet`] is the token's issuance-time snapshot,
/// not a live database read.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The principal's internal database id (from `claims.uid`).
    pub user_id: DbId,
    /// The principal's username (from `claims.sub`).
    pub username: String,
    /// Permission snapshot embedded in the token.
    pub permissions: PermissionSet,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Core(CoreError::InvalidToken))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Core(CoreError::InvalidToken))?;

        let claims = validate_token(token, &state.config.jwt).map_err(AppError::Core)?;

        Ok(AuthUser {
            user_id: claims.uid,
            username: claims.sub,
            permissions: claims.permissions,
        })
    }
}
