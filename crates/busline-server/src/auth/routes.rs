//! Authentication API routes

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use busline::error::{ApiError, ApiResult};

use super::service::AuthService;
use super::session::SessionService;
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "busline_session";

/// Build cookie string with optional Secure flag
pub fn build_session_cookie(session_id: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        SESSION_COOKIE_NAME, session_id, max_age_secs, secure_flag
    )
}

/// Build clear-cookie string with optional Secure flag
pub fn build_clear_cookie(secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
        SESSION_COOKIE_NAME, secure_flag
    )
}

/// Credentials body for register and login. The fields are optional so a
/// missing field becomes a validation error instead of a deserialization
/// rejection.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Presence check; runs before any database access. Empty strings count
    /// as missing.
    pub fn require(&self) -> ApiResult<(&str, &str)> {
        let username = self
            .username
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::Validation("username is required".to_string()))?;
        let password = self
            .password
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::Validation("password is required".to_string()))?;
        Ok((username, password))
    }
}

/// Register a new user (public endpoint)
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<Response> {
    let (username, password) = request.require()?;

    let db = state.db().await?;
    AuthService::new(db.clone()).register(username, password).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered" })),
    )
        .into_response())
}

/// Login with username and password (public endpoint)
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<Response> {
    let (username, password) = request.require()?;

    let db = state.db().await?;
    let user = AuthService::new(db.clone()).login(username, password).await?;

    let sessions = SessionService::new(db.clone(), state.config().session_ttl_days);
    let session_id = sessions.create_session(&user.username).await?;

    let cookie = build_session_cookie(
        &session_id,
        state.config().session_ttl_days * 24 * 3600,
        state.config().secure_cookies,
    );
    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(json!({ "message": "Logged in" })),
    )
        .into_response())
}

/// Logout (public endpoint). Destroys the session named by the cookie and
/// clears the cookie either way.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> ApiResult<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        let db = state.db().await?;
        SessionService::new(db.clone(), state.config().session_ttl_days)
            .delete_session(cookie.value())
            .await?;
    }

    let clear_cookie = build_clear_cookie(state.config().secure_cookies);
    Ok((
        StatusCode::OK,
        [(SET_COOKIE, clear_cookie)],
        Json(json!({ "message": "Logged out" })),
    )
        .into_response())
}

/// Get the current session's user (public endpoint)
pub async fn current_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> ApiResult<Response> {
    let session_id = match jar.get(SESSION_COOKIE_NAME) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            return Ok((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "No session" })),
            )
                .into_response())
        }
    };

    let db = state.db().await?;
    let sessions = SessionService::new(db.clone(), state.config().session_ttl_days);

    match sessions.validate_session(&session_id).await? {
        Some(username) => Ok((
            StatusCode::OK,
            Json(json!({ "user": { "username": username } })),
        )
            .into_response()),
        None => {
            let clear_cookie = build_clear_cookie(state.config().secure_cookies);
            Ok((
                StatusCode::UNAUTHORIZED,
                [(SET_COOKIE, clear_cookie)],
                Json(json!({ "error": "Invalid session" })),
            )
                .into_response())
        }
    }
}
