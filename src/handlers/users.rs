use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::{
    error::{AppError, Result},
    extract::Payload,
    handlers::auth::{clear_session_cookie, MessageResponse},
    models::{session::AuthSession, user::UserProfile},
    services::{auth as auth_service, uploads::FILE_TOO_LARGE_MESSAGE},
    state::AppState,
    validation::auth::*,
};

/// Multipart field carrying the profile photo.
pub const PHOTO_FIELD: &str = "profilePhoto";

const USER_NOT_FOUND_MESSAGE: &str = "사용자를 찾을 수 없습니다.";
const UPLOAD_FAILED_MESSAGE: &str = "파일 업로드에 실패했습니다.";

#[derive(Deserialize, Debug, Default)]
pub struct NicknameRequest {
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub new_password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPasswordRequest {
    #[serde(default)]
    pub current_password: Option<String>,
}

/// A `{success, message}` body.
#[derive(Serialize, Debug)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_string(),
        })
    }
}

/// The upload-photo body.
#[derive(Serialize, Debug)]
pub struct PhotoResponse {
    pub success: bool,
    #[serde(rename = "photoUrl")]
    pub photo_url: String,
}

/// A body over the route's limit is reported as an oversize file.
fn upload_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Validation(FILE_TOO_LARGE_MESSAGE.to_string())
    } else {
        AppError::Multipart(e.body_text())
    }
}

/// Returns the caller's profile.
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .users
        .profile(auth.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND_MESSAGE.to_string()))?;

    Ok(Json(profile))
}

/// Changes the caller's nickname and refreshes it in the current session.
#[axum::debug_handler]
pub async fn change_nickname(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Payload(payload): Payload<NicknameRequest>,
) -> Result<Response> {
    let nickname = validate_nickname(payload.nickname.as_deref())?;

    state.users.update_nickname(auth.user_id(), nickname).await?;
    tracing::info!("✏️ Nickname changed for user: {}", auth.user_id());

    let mut session = auth.session;
    session.user.nickname = Some(nickname.to_string());
    let remaining = session.remaining_secs(chrono::Utc::now());
    if let Err(e) = state.sessions.put(&auth.token, &session, remaining).await {
        tracing::warn!("Could not refresh nickname in session: {}", e);
    }

    Ok((StatusCode::OK, SuccessResponse::new("닉네임이 변경되었습니다.")).into_response())
}

/// Sets a new password for the caller.
#[axum::debug_handler]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Payload(payload): Payload<ChangePasswordRequest>,
) -> Result<Response> {
    let (Some(new_password), Some(confirm_password)) = (
        present(&payload.new_password),
        present(&payload.confirm_password),
    ) else {
        return Err(AppError::Validation(
            "새 비밀번호와 비밀번호 확인을 모두 입력해주세요.".to_string(),
        ));
    };

    validate_new_password(new_password, confirm_password)?;
    auth_service::set_password(&state, auth.user_id(), new_password.to_string()).await?;

    Ok((
        StatusCode::OK,
        SuccessResponse::new("비밀번호가 성공적으로 변경되었습니다."),
    )
        .into_response())
}

/// Confirms the caller knows their current password.
#[axum::debug_handler]
pub async fn verify_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Payload(payload): Payload<VerifyPasswordRequest>,
) -> Result<Response> {
    let current_password = present(&payload.current_password)
        .ok_or_else(|| AppError::Validation("현재 비밀번호를 입력해주세요.".to_string()))?;

    auth_service::verify_current_password(&state, auth.user_id(), current_password.to_string())
        .await?;

    Ok((
        StatusCode::OK,
        SuccessResponse::new("현재 비밀번호가 확인되었습니다."),
    )
        .into_response())
}

/// Stores a new profile photo and points the caller's picture at it.
#[axum::debug_handler]
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    let mut multipart = multipart.map_err(|e| AppError::Multipart(e.body_text()))?;
    let mut photo = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(upload_error)?;
        photo = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = photo
        .ok_or_else(|| AppError::Validation(UPLOAD_FAILED_MESSAGE.to_string()))?;

    let stored = state.uploads.save(file_name.as_deref(), &bytes).await?;

    if let Err(e) = state
        .users
        .update_picture(auth.user_id(), &stored.public_url)
        .await
    {
        state.uploads.discard(&stored).await;
        return Err(e);
    }

    tracing::info!("🖼️ Profile photo updated for user: {}", auth.user_id());

    Ok((
        StatusCode::OK,
        Json(PhotoResponse {
            success: true,
            photo_url: stored.public_url,
        }),
    )
        .into_response())
}

/// Deletes the caller's account and every session it had.
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    cookies: Cookies,
) -> Result<Response> {
    let deleted = state.users.delete(auth.user_id()).await?;
    if deleted == 0 {
        return Err(AppError::NotFound(USER_NOT_FOUND_MESSAGE.to_string()));
    }

    state.sessions.destroy_user(auth.user_id()).await.map_err(|e| {
        tracing::error!("Account deleted but sessions survived: {}", e);
        AppError::Failure("탈퇴 중 오류가 발생했습니다.")
    })?;

    clear_session_cookie(&cookies);
    tracing::info!("🗑️ User deleted: {}", auth.user_id());

    Ok((StatusCode::OK, MessageResponse::new("회원탈퇴가 완료되었습니다.")).into_response())
}
