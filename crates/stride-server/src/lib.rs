//! Stride Web Server
//!
//! Axum-based REST API for the Stride expense projection tool.
//!
//! The server is a thin boundary around [`ProjectionEngine`]: it holds one
//! immutable engine shared by every request and keeps no other state.
//!
//! Hardening:
//! - Restrictive CORS policy
//! - Input limits (request body size, number of expense entries)
//! - Security headers
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use stride_core::{ErrorKind, Issue, ProjectionEngine, ValidationError};

mod handlers;

/// Maximum request body size (1 MB)
pub const MAX_REQUEST_SIZE: usize = 1024 * 1024;

/// Maximum number of expense entries per request
pub const MAX_EXPENSES: usize = 1000;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub engine: ProjectionEngine,
    pub config: ServerConfig,
}

/// Create the application router
pub fn create_router(
    engine: ProjectionEngine,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> Router {
    let state = Arc::new(AppState {
        engine,
        config: config.clone(),
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/goal", get(handlers::get_goal))
        .route(
            "/calculate-projection",
            post(handlers::calculate_projection),
        )
        .route("/export-excel", post(handlers::export_excel));

    // Build CORS layer
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
            .expose_headers([header::CONTENT_DISPOSITION])
    };

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    engine: ProjectionEngine,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let goal = engine.goal();
    info!(
        target_amount = goal.target_amount,
        horizon_months = goal.horizon_months,
        "Savings goal configured"
    );

    let app = create_router(engine, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    kind: Option<ErrorKind>,
    issues: Vec<Issue>,
    internal: Option<anyhow::Error>,
}

/// JSON body of an error response
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "no_issues")]
    issues: &'a [Issue],
}

fn no_issues(issues: &&[Issue]) -> bool {
    issues.is_empty()
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            kind: Some(ErrorKind::InvalidInput),
            issues: vec![],
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            kind: None,
            issues: vec![],
            internal: None,
        }
    }

    /// Rejected projection input, reported with every offending field
    pub fn validation(err: ValidationError) -> Self {
        warn!(
            kind = %err.kind(),
            issues = err.issues().len(),
            "Rejected projection request"
        );
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: err.to_string(),
            kind: Some(err.kind()),
            issues: err.issues().to_vec(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(ErrorBody {
            error: &self.message,
            kind: self.kind,
            issues: &self.issues,
        });

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            kind: None,
            issues: vec![],
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
