/// Authentication context for Axum requests
///
/// This module provides the request-scoped authentication context produced
/// by the API server's JWT middleware. The middleware extracts the Bearer
/// token from the Authorization header, validates it, and inserts an
/// [`AuthContext`] into the request extensions for handlers to consume.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use listings_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {} (admin: {})", auth.username, auth.admin)
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::jwt::Claims;

/// Authentication context added to request extensions
///
/// Present on a request only after the JWT middleware has validated the
/// token. Handlers behind the auth layer can rely on it being set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated username
    pub username: String,

    /// Whether the user carries the admin role
    pub admin: bool,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            username: claims.sub.clone(),
            admin: claims.admin,
        }
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Valid token but insufficient role
    Forbidden(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_from_claims() {
        let claims = Claims::new("alice", true);
        let ctx = AuthContext::from_claims(&claims);

        assert_eq!(ctx.username, "alice");
        assert!(ctx.admin);
    }

    #[test]
    fn test_auth_context_non_admin() {
        let claims = Claims::new("bob", false);
        let ctx = AuthContext::from_claims(&claims);

        assert_eq!(ctx.username, "bob");
        assert!(!ctx.admin);
    }
}
