//! JWT claims-token generation and validation.
//!
//! Tokens are HS256-signed JWTs carrying the principal's identity and a
//! point-in-time [`PermissionSet`] snapshot. The snapshot does not track
//! later grant changes; it is refreshed only by logging in again.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeus_core::error::CoreError;
use zeus_core::permissions::PermissionSet;
use zeus_core::types::DbId;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the principal's username.
    pub sub: String,
    /// The principal's internal database id.
    pub uid: DbId,
    /// Permission snapshot at issuance time.
    pub permissions: PermissionSet,
    /// Expiration time (UTC Unix timestamp). Strictly greater than `iat`.
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 30).
    pub access_token_expiry_mins: i64,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 30;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `ACCESS_TOKEN_EXPIRE_MINS` | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("ACCESS_TOKEN_EXPIRE_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("ACCESS_TOKEN_EXPIRE_MINS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
        }
    }
}

/// Generate an HS256 access token for the given principal.
///
/// The token embeds the permission snapshot as of now; permission changes
/// after issuance are not reflected until the principal re-authenticates.
pub fn generate_access_token(
    user_id: DbId,
    username: &str,
    permissions: &PermissionSet,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.access_token_expiry_mins * 60;

    let claims = Claims {
        sub: username.to_string(),
        uid: user_id,
        permissions: permissions.clone(),
        exp,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Distinguishes the failure modes: an expired token is `TokenExpired`, a
/// bad signature or undecodable token is `InvalidToken`, and a decoded
/// token without a usable subject is `MalformedClaims`. No side effects.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, CoreError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => CoreError::TokenExpired,
        _ => CoreError::InvalidToken,
    })?;

    if token_data.claims.sub.is_empty() {
        return Err(CoreError::MalformedClaims);
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// Helper to build a test config with a known secret.
    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 30,
        }
    }

    fn test_permissions() -> PermissionSet {
        PermissionSet::new(
            ["module1".to_string(), "module3".to_string()],
            [("module3".to_string(), "drug_interaction".to_string())],
        )
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let config = test_config();
        let perms = test_permissions();
        let token = generate_access_token(42, "user2", &perms, &config)
            .expect("token generation should succeed");

        let claims = validate_token(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.sub, "user2");
        assert_eq!(claims.uid, 42);
        assert_eq!(claims.permissions, perms);
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_expired_token_fails_as_expired() {
        let config = test_config();

        // Manually create an already-expired token.
        // Use a margin well beyond the default 60-second leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "user1".to_string(),
            uid: 1,
            permissions: test_permissions(),
            exp: now - 300, // expired 5 minutes ago (well past leeway)
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("encoding should succeed");

        assert_matches!(validate_token(&token, &config), Err(CoreError::TokenExpired));
    }

    #[test]
    fn test_different_secret_fails_as_invalid() {
        let config_a = test_config();
        let config_b = JwtConfig {
            secret: "a-completely-different-secret".to_string(),
            access_token_expiry_mins: 30,
        };

        let token = generate_access_token(1, "admin", &test_permissions(), &config_a)
            .expect("token generation should succeed");

        assert_matches!(
            validate_token(&token, &config_b),
            Err(CoreError::InvalidToken)
        );
    }

    #[test]
    fn test_garbage_token_fails_as_invalid() {
        let config = test_config();
        assert_matches!(
            validate_token("not-a-jwt", &config),
            Err(CoreError::InvalidToken)
        );
    }

    #[test]
    fn test_empty_subject_fails_as_malformed() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: String::new(),
            uid: 1,
            permissions: PermissionSet::default(),
            exp: now + 600,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("encoding should succeed");

        assert_matches!(
            validate_token(&token, &config),
            Err(CoreError::MalformedClaims)
        );
    }
}
