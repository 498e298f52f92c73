/// API route handlers
///
/// Each module maps to one resource under `/api`:
/// - `health`: liveness and database connectivity
/// - `auth`: registration and login
/// - `properties`: listing CRUD and paginated search
/// - `images`: image upload, serving, and management

pub mod auth;
pub mod health;
pub mod images;
pub mod properties;
