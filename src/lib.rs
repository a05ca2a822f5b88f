pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ApiError;
use crate::middleware::{jwt_auth_middleware, require_admin_middleware};
use crate::state::AppState;

/// Build the HTTP application around an initialized state.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected: reader routes and admin routes share paths with different methods
        .merge(
            reader_routes()
                .merge(admin_routes())
                .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware)),
        )
        // Global middleware
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/api/login", post(auth::login_post))
        .route("/api/register", post(auth::register_post))
}

fn reader_routes() -> Router<AppState> {
    use handlers::protected::{auth, projects, questions};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/questions", get(questions::list))
        .route("/api/questions/:id", get(questions::get))
        .route("/api/projects", get(projects::list))
        .route("/api/projects/:id", get(projects::get))
}

fn admin_routes() -> Router<AppState> {
    use axum::routing::put;
    use handlers::elevated::{projects, questions, users};

    Router::new()
        .route("/api/questions", post(questions::create))
        .route("/api/questions/:id", put(questions::update).delete(questions::delete))
        .route("/api/projects", post(projects::create))
        .route("/api/projects/:id", put(projects::update).delete(projects::delete))
        .route("/api/admin/users", get(users::list))
        .route_layer(from_fn(require_admin_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Portal API",
            "version": version,
            "description": "Interview question bank and GRC project tracker",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/login, /api/register (public - token acquisition)",
                "whoami": "/api/auth/whoami (protected)",
                "questions": "/api/questions[/:id] (protected read, admin write)",
                "projects": "/api/projects[/:id] (protected read, admin write)",
                "admin": "/api/admin/users (admin)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.store.health_check().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        ApiError::service_unavailable("Storage unavailable")
    })?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "storage": "ok"
        }
    })))
}
