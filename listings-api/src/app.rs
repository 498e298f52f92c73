/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use listings_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = listings_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config, middleware::security::SecurityHeadersLayer, storage::ImageStore,
};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use listings_shared::auth::{
    jwt,
    middleware::{AuthContext, AuthError},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Store for uploaded image files
    pub images: ImageStore,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let images = ImageStore::new(&config.uploads.dir);
        Self {
            db,
            config: Arc::new(config),
            images,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /api
/// ├── /health                       # Health check (public)
/// ├── /auth/
/// │   ├── POST /register            # Create account (public)
/// │   └── POST /login               # Obtain JWT (public)
/// ├── /properties/
/// │   ├── GET    /                  # Paginated, filtered search (public)
/// │   ├── GET    /search            # Alias of GET / (public)
/// │   ├── GET    /:id               # Fetch one listing (public)
/// │   ├── POST   /                  # Create listing (admin)
/// │   ├── PUT    /:id               # Replace listing (admin)
/// │   └── DELETE /:id               # Delete listing (admin)
/// └── /images/
///     ├── GET    /:filename         # Serve stored file (public)
///     ├── GET    /property/:id      # List a listing's images (public)
///     ├── POST   /upload/:id        # Attach files to a listing (admin)
///     └── DELETE /:id               # Remove one image (admin)
/// ```
///
/// Admin routes carry the JWT layer only when `AUTH_ENABLED` is on;
/// with the gate off they are open and mutations record no audit user.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route basis)
///
/// # Example
///
/// ```no_run
/// use listings_api::app::{AppState, build_router};
/// use listings_api::config::Config;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
///
/// let app = build_router(state);
///
/// // Start server
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn build_router(state: AppState) -> Router {
    // Import route handlers
    use crate::routes;

    let auth_enabled = state.config.api.auth_enabled;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Property reads are public; /search is a legacy alias of /
    let property_routes = Router::new()
        .route("/", get(routes::properties::search_properties))
        .route("/search", get(routes::properties::search_properties))
        .route("/:id", get(routes::properties::get_property));

    // Property mutations require an admin token
    let mut property_admin_routes = Router::new()
        .route("/", post(routes::properties::create_property))
        .route("/:id", put(routes::properties::update_property))
        .route("/:id", delete(routes::properties::delete_property));

    // Image reads are public; the serve route's path segment is the
    // stored filename rather than a numeric id
    let image_routes = Router::new()
        .route("/:id", get(routes::images::serve_image))
        .route(
            "/property/:property_id",
            get(routes::images::list_property_images),
        );

    let mut image_admin_routes = Router::new()
        .route(
            "/upload/:property_id",
            post(routes::images::upload_images),
        )
        .route("/:id", delete(routes::images::delete_image));

    if auth_enabled {
        property_admin_routes = property_admin_routes.route_layer(
            axum::middleware::from_fn_with_state(state.clone(), admin_auth_layer),
        );
        image_admin_routes = image_admin_routes.route_layer(
            axum::middleware::from_fn_with_state(state.clone(), admin_auth_layer),
        );
    }

    // Build complete /api surface
    let api_routes = Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .nest("/properties", property_routes.merge(property_admin_routes))
        .nest("/images", image_routes.merge(image_admin_routes));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(false))
        .with_state(state)
}

/// Admin authentication middleware layer
///
/// Extracts and validates the JWT from the Authorization header, requires
/// the admin role, then injects [`AuthContext`] into request extensions.
async fn admin_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = jwt::validate_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::from_claims(&claims);

    // Every gated route is a mutation, and mutations are admin-only
    if !auth_context.admin {
        return Err(AuthError::Forbidden("Admin role required".to_string()).into());
    }

    // Insert into request extensions
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
