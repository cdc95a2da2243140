use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    models::session::AuthSession,
    state::AppState,
};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Extracts the session token from the request cookies.
///
/// # Arguments
///
/// * `cookies` - The request cookies.
///
/// # Returns
///
/// An `Option` containing the token if found.
pub fn extract_session_token(cookies: &Cookies) -> Option<String> {
    cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Resolves the caller's session, if any.
///
/// A store failure is logged and treated as "no session".
pub async fn current_session(state: &AppState, cookies: &Cookies) -> Option<AuthSession> {
    let token = extract_session_token(cookies)?;

    match state.sessions.get(&token).await {
        Ok(Some(session)) => Some(AuthSession { token, session }),
        Ok(None) => {
            tracing::debug!("❌ Session token not found or expired");
            None
        }
        Err(e) => {
            tracing::warn!("❌ Session lookup failed: {}", e);
            None
        }
    }
}

/// A middleware that requires a valid session to be present.
///
/// On success the [`AuthSession`] is inserted into the request extensions.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response`, or `AppError::Unauthorized`.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");

    let auth = current_session(&state, &cookies)
        .await
        .ok_or(AppError::Unauthorized)?;

    tracing::debug!("✅ User authenticated: {}", auth.user_id());

    request.extensions_mut().insert(auth);

    Ok(next.run(request).await)
}
