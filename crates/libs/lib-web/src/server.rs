//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! [`create_router`] builds the complete application (routes, guards and the
//! outer middleware stack) from an [`AppState`], so tests drive exactly what
//! production serves. [`start_server`] adds logging, configuration, the
//! database and the listener around it.

// region: --- Imports
use crate::handlers;
use crate::middleware::{
    log_requests, require_auth, require_permission, stamp_req, PermissionGuard, RequestStamp,
};
use axum::{
    http::{Request, Response, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use lib_core::config::init_config;
use lib_core::{create_pool, run_migrations, AppError, Config, DbPool};
use lib_utils::get_env_or;
use std::path::Path;
use std::time::Duration;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Span};
use tracing_subscriber::EnvFilter;
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
}

impl axum::extract::FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3001")
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3001".to_string(),
        }
    }
}

impl ServerConfig {
    /// Read `BIND_ADDRESS`, keeping the default when it is unset.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            bind_address: get_env_or("BIND_ADDRESS", &default.bind_address),
        }
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Initialize and start the HTTP server
///
/// # Errors
///
/// This function will return an error if:
/// - Configuration loading or validation fails
/// - Database connection or migrations fail
/// - Server binding fails
pub async fn start_server(server: ServerConfig) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = get_env_or("LOG_LEVEL", "info").to_lowercase();
    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    // A host binary may already have installed a subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .try_init();

    info!("MARKETPLACE BACKEND STARTING");
    info!("Log level: {}", log_level);

    info!("Loading configuration...");
    let app_config = init_config().map_err(anyhow::Error::msg)?.clone();

    ensure_database_dir(&app_config.database_url)?;

    info!("Connecting to database: {}", app_config.database_url);
    let pool = create_pool(&app_config.database_url).await?;

    info!("Running database migrations...");
    run_migrations(&pool).await?;
    info!("Migrations complete");

    let app = create_router(AppState {
        db: pool,
        config: app_config,
    });

    let listener = tokio::net::TcpListener::bind(&server.bind_address).await?;

    info!("SERVER READY: http://{}", server.bind_address);
    log_server_info();

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the parent directory of a file-backed SQLite database.
fn ensure_database_dir(database_url: &str) -> std::io::Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    if db_path.contains(":memory:") || db_path.contains("mode=memory") {
        return Ok(());
    }

    let db_path = db_path.trim_start_matches("//");
    let db_path = db_path.split('?').next().unwrap_or(db_path);
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            info!("Created database directory: {:?}", parent);
        }
    }
    Ok(())
}

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    info!("[ROUTE SETUP] Registering HTTP routes...");

    let public = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/listings", get(handlers::listings::list_listings))
        .route("/listings/{id}", get(handlers::listings::get_listing));

    let protected = Router::new()
        .route("/listings", post(handlers::listings::create_listing))
        .route("/listings/{id}", delete(handlers::listings::delete_listing))
        .route("/listings/{id}/buy", post(handlers::listings::buy_listing))
        .route("/users/me", get(handlers::users::me))
        .route("/users/me/listings", get(handlers::users::my_listings))
        .route("/users/me/purchases", get(handlers::users::my_purchases))
        .route("/users/wallet/deposit", post(handlers::users::deposit))
        .route("/users/wallet/withdraw", post(handlers::users::withdraw))
        .route_layer(from_fn_with_state(state.config.clone(), require_auth));

    // Guards read the claims, so they are layered before (inside) auth.
    let manage_users = Router::new()
        .route("/auth/manage_users", get(handlers::auth::manage_users))
        .route("/users/{id}", delete(handlers::users::delete_user))
        .route_layer(from_fn_with_state(
            PermissionGuard::new(state.db.clone(), "manage_users"),
            require_permission,
        ))
        .route_layer(from_fn_with_state(state.config.clone(), require_auth));

    let manage_roles = Router::new()
        .route("/users/{id}/roles", post(handlers::users::assign_role))
        .route_layer(from_fn_with_state(
            PermissionGuard::new(state.db.clone(), "manage_roles"),
            require_permission,
        ))
        .route_layer(from_fn_with_state(state.config.clone(), require_auth));

    let api = public
        .merge(protected)
        .merge(manage_users)
        .merge(manage_roles);

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(handlers::health))
        .fallback(route_not_found)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_response(|_response: &Response<_>, _latency: Duration, _span: &Span| {
                    // log_requests reports completed requests
                })
                .on_failure(
                    |error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                        tracing::error!(
                            error = ?error,
                            latency_ms = latency.as_millis(),
                            "[HTTP FAILURE]"
                        );
                    },
                ),
        )
        .layer(from_fn(log_requests))
        // Outermost, so the stamp is visible to everything above.
        .layer(from_fn(stamp_req))
}

async fn route_not_found() -> AppError {
    info!("[404 HANDLER] Unmatched route");
    AppError::NotFound("Route not found.".to_string())
}

/// Log server information
fn log_server_info() {
    info!(" AUTH:");
    info!("   • POST   /api/v1/auth/register");
    info!("   • POST   /api/v1/auth/login");
    info!("   • GET    /api/v1/auth/manage_users (manage_users)");
    info!(" LISTINGS:");
    info!("   • GET    /api/v1/listings?page={{n}}&per_page={{n}}");
    info!("   • GET    /api/v1/listings/{{id}}");
    info!("   • POST   /api/v1/listings");
    info!("   • POST   /api/v1/listings/{{id}}/buy");
    info!("   • DELETE /api/v1/listings/{{id}}");
    info!(" USERS:");
    info!("   • GET    /api/v1/users/me");
    info!("   • GET    /api/v1/users/me/listings");
    info!("   • GET    /api/v1/users/me/purchases");
    info!("   • POST   /api/v1/users/wallet/deposit");
    info!("   • POST   /api/v1/users/wallet/withdraw");
    info!("   • DELETE /api/v1/users/{{id}} (manage_users)");
    info!("   • POST   /api/v1/users/{{id}}/roles (manage_roles)");
    info!(" HEALTH:");
    info!("   • GET    /health");
}
// endregion: --- Server Setup
