/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register new user
/// - `POST /api/auth/login` - Login and get a token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use listings_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User, ROLE_USER},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional role; omitted means a regular account
    pub role: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Signed JWT, valid for 24 hours
    pub token: String,

    /// Authenticated username
    pub username: String,

    /// Whether the user carries the admin role
    pub is_admin: bool,
}

/// Maps validator output into the field-level error response
fn validation_details(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// Register a new user
///
/// Creates an account, defaulting to the regular (non-admin) role when
/// the request carries no role.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "correct-horse-battery",
///   "role": "ROLE_ADMIN"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or username already exists
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    // Validate request
    req.validate().map_err(validation_details)?;

    // Validate password strength
    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    // Checked up front for a clean message; the unique index still
    // catches concurrent registrations
    if User::exists_by_username(&state.db, &req.username).await? {
        return Err(ApiError::BadRequest("Username already exists".to_string()));
    }

    // Hash password
    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            password_hash,
            role: req.role.unwrap_or_else(|| ROLE_USER.to_string()),
        },
    )
    .await?;

    tracing::info!(username = %user.username, "Registered new user");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login endpoint
///
/// Authenticates a user and returns a signed JWT.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "correct-horse-battery"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "username": "alice",
///   "isAdmin": false
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    // Validate request
    req.validate().map_err(validation_details)?;

    // The same message covers an unknown username and a wrong password,
    // so responses do not reveal which usernames exist
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let claims = jwt::Claims::new(&user.username, user.is_admin());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        is_admin: claims.admin,
    }))
}
