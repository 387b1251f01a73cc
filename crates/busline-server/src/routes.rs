//! Router assembly and catalog/operational handlers

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use mongodb::bson::Document;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use busline::catalog::CatalogService;
use busline::error::ApiResult;

use crate::auth;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config().cors_allowed_origins.as_deref());

    Router::new()
        .route("/", get(root))
        .route("/favicon.ico", get(favicon))
        .route("/health", get(health_check))
        .route("/cities", get(list_cities))
        .route("/routes", get(list_routes))
        .route("/register", post(auth::routes::register))
        .route("/login", post(auth::routes::login))
        .route("/logout", post(auth::routes::logout))
        .route("/session", get(auth::routes::current_session))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS configuration. Credentialed requests are allowed, and browsers
/// reject `Access-Control-Allow-Origin: *` on those, so the permissive
/// default mirrors the request origin; CORS_ALLOWED_ORIGINS restricts it to
/// an explicit list.
fn cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let origin = match allowed_origins {
        Some(list) if !list.trim().is_empty() => {
            let origins: Vec<HeaderValue> = list
                .split(',')
                .filter_map(|s| HeaderValue::from_str(s.trim()).ok())
                .collect();
            AllowOrigin::list(origins)
        }
        _ => AllowOrigin::mirror_request(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn root() -> &'static str {
    "Busline API"
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let db = state
        .db()
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    match db.ping().await {
        Ok(_) => Ok(Json(serde_json::json!({
            "status": "healthy",
            "database": "connected",
            "version": env!("CARGO_PKG_VERSION")
        }))),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

/// List all city documents (pass-through)
async fn list_cities(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Document>>> {
    let db = state.db().await?;
    let cities = CatalogService::new(db.clone()).list_cities().await?;
    Ok(Json(cities))
}

/// List all route documents (pass-through)
async fn list_routes(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Document>>> {
    let db = state.db().await?;
    let routes = CatalogService::new(db.clone()).list_routes().await?;
    Ok(Json(routes))
}
