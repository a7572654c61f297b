//! Domain error taxonomy.
//!
//! Authentication failures carry no detail about which part of the
//! credential check failed. `PermissionDenied` names the missing scope and
//! nothing else.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Username unknown, password mismatch, or account deactivated.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Token signature or structure is invalid.
    #[error("Invalid token")]
    InvalidToken,

    /// Token was valid once but its expiry has passed.
    #[error("Token expired")]
    TokenExpired,

    /// Token decoded but its claims are unusable (e.g. empty subject).
    #[error("Malformed claims")]
    MalformedClaims,

    /// Caller lacks the named scope (`module1` or `module1.script_name`).
    #[error("Permission denied. Required permission: {scope}")]
    PermissionDenied { scope: String },

    /// The execution backend could not be reached or timed out.
    #[error("Job queue unavailable: {0}")]
    QueueUnavailable(String),

    #[error("Entity not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },
}
