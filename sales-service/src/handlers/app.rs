//! Page shell for the sales PWA.

use crate::middleware::UserId;
use crate::services::session;
use crate::startup::AppState;
use askama::Template;
use axum::extract::State;
use axum::response::IntoResponse;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub session_token: String,
}

/// Serve the application shell with a session token injected into the
/// page, so the frontend can echo it back on API calls. Unauthenticated
/// visitors get a guest-bound token; the API itself still requires the
/// BFF identity header.
pub async fn index(State(state): State<AppState>, user: Option<UserId>) -> impl IntoResponse {
    let user = user.map(|u| u.0).unwrap_or_else(|| "Guest".to_string());
    let session_token = session::issue_token(&state.config.session.secret, &user);
    IndexTemplate { session_token }
}
