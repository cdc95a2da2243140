use chrono::Utc;

use crate::crypto::{password, token};
use crate::error::{AppError, Result};
use crate::models::session::{Session, SessionUser};
use crate::models::user::NewUser;
use crate::state::AppState;

/// Shared answer for an unknown id and a wrong password.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "아이디 또는 비밀번호가 일치하지 않습니다.";

/// Creates a new user with a hashed password.
///
/// Id and email uniqueness is left to the store's constraints; a violation
/// comes back as `AppError::Conflict`.
pub async fn create_user(
    state: &AppState,
    user_id: String,
    username: String,
    nickname: Option<String>,
    email: String,
    password: String,
) -> Result<()> {
    tracing::debug!("🔐 Creating user: {}", user_id);
    let password_hash = password::hash_password_blocking(password).await?;

    state
        .users
        .insert(NewUser {
            user_id: user_id.clone(),
            username,
            nickname,
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            AppError::Conflict(_) => e,
            other => {
                tracing::error!("Signup insert failed for {}: {}", user_id, other);
                AppError::Failure("회원가입 실패.")
            }
        })?;

    tracing::info!("✅ User created: {}", user_id);
    Ok(())
}

/// Authenticates a user.
///
/// Unknown ids and wrong passwords fail with the same message.
///
/// # Returns
///
/// A `Result` containing the snapshot to store in the session.
pub async fn authenticate_user(
    state: &AppState,
    user_id: &str,
    password: String,
) -> Result<SessionUser> {
    tracing::debug!("🔐 Authenticating user: {}", user_id);

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS_MESSAGE.to_string()))?;

    if !password::verify_password_blocking(password, user.password.clone()).await? {
        return Err(AppError::Authentication(
            INVALID_CREDENTIALS_MESSAGE.to_string(),
        ));
    }

    tracing::info!("✅ User authenticated: {}", user.user_id);

    Ok(SessionUser {
        id: user.user_id,
        username: user.username,
        nickname: user.nickname,
    })
}

/// Starts a session for `user` and returns its token.
pub async fn open_session(state: &AppState, user: SessionUser) -> Result<String> {
    let token = token::generate_session_token();
    let now = Utc::now();
    let session = Session {
        user,
        created_at: now,
        expires_at: now + chrono::Duration::days(state.config.session_duration_days),
    };

    state
        .sessions
        .put(&token, &session, state.config.session_ttl_secs())
        .await?;

    tracing::info!("✅ Session opened for user: {}", session.user.id);
    Ok(token)
}

/// Sets a user's password to the hash of `new_password`.
///
/// # Returns
///
/// The number of rows updated.
pub async fn set_password(state: &AppState, user_id: &str, new_password: String) -> Result<u64> {
    tracing::info!("🔑 Changing password for user: {}", user_id);

    let hashed = password::hash_password_blocking(new_password).await?;
    let updated = state.users.update_password(user_id, &hashed).await?;

    tracing::info!("✅ Password changed for user: {} ({} row)", user_id, updated);
    Ok(updated)
}

/// Checks `current_password` against the stored hash.
pub async fn verify_current_password(
    state: &AppState,
    user_id: &str,
    current_password: String,
) -> Result<()> {
    let hash = state
        .users
        .password_hash(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다.".to_string()))?;

    if !password::verify_password_blocking(current_password, hash).await? {
        return Err(AppError::Authentication(
            "현재 비밀번호가 일치하지 않습니다.".to_string(),
        ));
    }

    Ok(())
}
