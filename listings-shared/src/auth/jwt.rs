/// JWT token generation and validation module
///
/// This module provides JWT (JSON Web Token) functionality for user
/// authentication. Tokens are signed using HS256 (HMAC-SHA256) and assert
/// the username plus an admin flag, which is all the authorization model
/// of this service needs.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 24 hours
/// - **Validation**: Signature, expiration, and issuer checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use listings_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Create a token for an admin user
/// let claims = Claims::new("alice", true);
/// let token = create_token(&claims, "your-secret-key")?;
///
/// // Validate the token
/// let validated = validate_token(&token, "your-secret-key")?;
/// assert_eq!(validated.sub, "alice");
/// assert!(validated.admin);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token issuer embedded in every token and checked on validation
const ISSUER: &str = "listings";

/// Default token lifetime
const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (username)
/// - `iss`: Issuer (always "listings")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `admin`: Whether the user has the admin role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - username
    pub sub: String,

    /// Issuer - always "listings"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Whether the user has the admin role (custom claim)
    pub admin: bool,
}

impl Claims {
    /// Creates new claims with the default 24 hour expiration
    ///
    /// # Arguments
    ///
    /// * `username` - Username (subject)
    /// * `admin` - Whether the user has the admin role
    pub fn new(username: impl Into<String>, admin: bool) -> Self {
        Self::with_expiration(username, admin, Duration::hours(TOKEN_LIFETIME_HOURS))
    }

    /// Creates claims with a custom expiration
    ///
    /// Useful in tests to produce already-expired tokens.
    pub fn with_expiration(username: impl Into<String>, admin: bool, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: username.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            admin,
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a JWT token from claims
///
/// Signs the token using HS256 (HMAC-SHA256) with the provided secret.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies:
/// - Signature is valid
/// - Token hasn't expired
/// - Issuer is "listings"
/// - Token is not used before nbf time
///
/// # Errors
///
/// Returns error if:
/// - Signature is invalid
/// - Token has expired
/// - Issuer doesn't match
/// - Token format is invalid
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("alice", true);

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iss, "listings");
        assert!(claims.admin);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new("bob", false);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, "bob");
        assert!(!validated.admin);
        assert_eq!(validated.iss, "listings");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new("alice", true);
        let token = create_token(&claims, "secret1").expect("Should create token");

        let result = validate_token(&token, "wrong-secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        // Create token that expired 1 hour ago
        let claims = Claims::with_expiration("alice", false, Duration::seconds(-3600));

        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).expect("Should create token");
        let result = validate_token(&token, SECRET);

        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), JwtError::Expired));
    }

    #[test]
    fn test_admin_claim_survives_roundtrip() {
        let admin_token = create_token(&Claims::new("root", true), SECRET).unwrap();
        let user_token = create_token(&Claims::new("guest", false), SECRET).unwrap();

        assert!(validate_token(&admin_token, SECRET).unwrap().admin);
        assert!(!validate_token(&user_token, SECRET).unwrap().admin);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let claims = Claims::new("alice", false);
        let mut token = create_token(&claims, SECRET).unwrap();

        // Flip a character in the payload section
        let mid = token.len() / 2;
        let replacement = if token.as_bytes()[mid] == b'A' { 'B' } else { 'A' };
        token.replace_range(mid..mid + 1, &replacement.to_string());

        assert!(validate_token(&token, SECRET).is_err());
    }
}
