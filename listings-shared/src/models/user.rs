/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing
/// user accounts. Authorization is a single role string: `ROLE_ADMIN`
/// unlocks mutation endpoints, everything else is a regular user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     role TEXT NOT NULL DEFAULT 'ROLE_USER',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use listings_shared::models::user::{CreateUser, User};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         username: "alice".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         role: "ROLE_ADMIN".to_string(),
///     },
/// )
/// .await?;
///
/// let found = User::find_by_username(&pool, "alice").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// Role string granting access to mutation endpoints
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Default role assigned at registration
pub const ROLE_USER: &str = "ROLE_USER";

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext, and the
/// hash is never serialized into API responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Login name, unique across all users
    pub username: String,

    /// Argon2id password hash, excluded from serialized output
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role string (`ROLE_ADMIN` or `ROLE_USER`)
    pub role: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Login name
    pub username: String,

    /// Argon2id password hash (NOT the plaintext password!)
    pub password_hash: String,

    /// Role string
    pub role: String,
}

impl User {
    /// Whether this account carries the admin role
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Username already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, role, created_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether a username is already taken
    pub async fn exists_by_username(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: &str) -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            password_hash: "$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$aGFzaA".to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_admin() {
        assert!(sample_user(ROLE_ADMIN).is_admin());
        assert!(!sample_user(ROLE_USER).is_admin());
        assert!(!sample_user("ROLE_MANAGER").is_admin());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = sample_user(ROLE_USER);
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["username"], "alice");
        assert_eq!(json["role"], "ROLE_USER");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    // Integration tests for database operations are in listings-api/tests/
}
