use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};
use tower_cookies::cookie::time::Duration;

use crate::{
    config::Config,
    error::{AppError, Result},
    extract::Payload,
    middleware_layer::auth::{current_session, extract_session_token, SESSION_COOKIE},
    models::session::SessionUser,
    repositories::user::DUPLICATE_USER_ID_MESSAGE,
    services::auth as auth_service,
    state::AppState,
    validation::auth::*,
};

/// The request payload for signup.
#[derive(Deserialize, Debug, Default)]
pub struct SignupRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// The request payload for the id availability check.
#[derive(Deserialize, Debug, Default)]
pub struct CheckDuplicateRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// The request payload for login.
#[derive(Deserialize, Debug, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A bare `{message}` body.
#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// The `/session-check` body.
#[derive(Serialize, Debug)]
pub struct SessionCheckResponse {
    #[serde(rename = "loggedIn")]
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

/// Creates the session cookie.
fn create_session_cookie(config: &Config, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);

    cookie.set_http_only(true);
    if config.secure_cookies {
        cookie.set_secure(true);
    }
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_max_age(Duration::seconds(config.session_ttl_secs() as i64));
    cookie.set_path("/");

    cookie
}

/// Tells the client to drop the session cookie.
pub fn clear_session_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_http_only(true);
    cookie.set_max_age(Duration::seconds(0));
    cookie.set_path("/");
    cookies.add(cookie);
}

/// Handles signup.
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Payload(payload): Payload<SignupRequest>,
) -> Result<Response> {
    let (Some(user_id), Some(username), Some(email), Some(password)) = (
        present(&payload.user_id),
        present(&payload.username),
        present(&payload.email),
        present(&payload.password),
    ) else {
        return Err(AppError::Validation(
            "아이디, 이름, 이메일, 비밀번호는 필수 항목입니다.".to_string(),
        ));
    };

    tracing::info!("📝 Signup attempt: {}", user_id);
    validate_password(password)?;
    validate_email(email)?;

    auth_service::create_user(
        &state,
        user_id.to_string(),
        username.to_string(),
        payload.nickname.clone(),
        email.to_string(),
        password.to_string(),
    )
    .await?;

    Ok((StatusCode::CREATED, MessageResponse::new("회원가입 성공!")).into_response())
}

/// Handles the id availability check.
#[axum::debug_handler]
pub async fn check_duplicate(
    State(state): State<AppState>,
    Payload(payload): Payload<CheckDuplicateRequest>,
) -> Result<Response> {
    let user_id = present(&payload.user_id)
        .ok_or_else(|| AppError::Validation("아이디를 입력하세요.".to_string()))?;

    if state.users.exists(user_id).await? {
        return Err(AppError::Conflict(DUPLICATE_USER_ID_MESSAGE.to_string()));
    }

    Ok((StatusCode::OK, MessageResponse::new("사용 가능한 아이디 입니다.")).into_response())
}

/// Handles login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Payload(payload): Payload<LoginRequest>,
) -> Result<Response> {
    let (Some(user_id), Some(password)) =
        (present(&payload.user_id), present(&payload.password))
    else {
        return Err(AppError::Validation(
            "아이디와 비밀번호는 필수 항목입니다.".to_string(),
        ));
    };

    tracing::info!("🔐 Login attempt: {}", user_id);

    let user = auth_service::authenticate_user(&state, user_id, password.to_string()).await?;

    if let Some(previous) = extract_session_token(&cookies) {
        if let Err(e) = state.sessions.destroy(&previous).await {
            tracing::warn!("Could not drop previous session: {}", e);
        }
    }

    let token = auth_service::open_session(&state, user).await?;
    cookies.add(create_session_cookie(&state.config, token));

    Ok((StatusCode::OK, MessageResponse::new("로그인 성공!")).into_response())
}

/// Handles logout. Without a session it only clears the cookie.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Response> {
    if let Some(token) = extract_session_token(&cookies) {
        state.sessions.destroy(&token).await.map_err(|e| {
            tracing::error!("Logout failed to destroy session: {}", e);
            AppError::Failure("로그아웃 중 오류가 발생했습니다.")
        })?;
        tracing::info!("👋 Session destroyed");
    }

    clear_session_cookie(&cookies);

    Ok((
        StatusCode::OK,
        MessageResponse::new("로그아웃 되었습니다. 메인 페이지로 이동합니다."),
    )
        .into_response())
}

/// Reports whether the caller holds a session. Always 200.
#[axum::debug_handler]
pub async fn session_check(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Json<SessionCheckResponse> {
    let user = current_session(&state, &cookies)
        .await
        .map(|auth| auth.session.user);

    Json(SessionCheckResponse {
        logged_in: user.is_some(),
        user,
    })
}
