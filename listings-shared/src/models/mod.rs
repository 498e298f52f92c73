/// Database models for the listings service
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and authentication
/// - `property`: Real-estate listings and filtered search
/// - `image`: Uploaded images attached to properties
/// - `page`: Pagination envelope shared by list endpoints
///
/// # Example
///
/// ```no_run
/// use listings_shared::models::user::{CreateUser, User};
/// use listings_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     username: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: "ROLE_USER".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod image;
pub mod page;
pub mod property;
pub mod user;
