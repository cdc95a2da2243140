//! Account recovery: finding a forgotten id and resetting a forgotten password.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    extract::Payload,
    handlers::users::SuccessResponse,
    services::auth as auth_service,
    state::AppState,
    validation::auth::*,
};

#[derive(Deserialize, Debug, Default)]
pub struct FindUserRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ValidateUserRequest {
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, rename = "newPassword")]
    pub new_password: Option<String>,
    #[serde(default, rename = "confirmPassword")]
    pub confirm_password: Option<String>,
}

/// `{success, user_id}`.
#[derive(Serialize, Debug)]
pub struct UserIdResponse {
    pub success: bool,
    pub user_id: String,
}

/// Looks up the login id registered for an email address.
#[axum::debug_handler]
pub async fn find_user(
    State(state): State<AppState>,
    Payload(payload): Payload<FindUserRequest>,
) -> Result<Json<UserIdResponse>> {
    let email = present(&payload.email)
        .ok_or_else(|| AppError::Validation("이메일을 입력하세요.".to_string()))?;

    let user_id = state
        .users
        .find_id_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound("이메일에 해당하는 사용자가 없습니다.".to_string()))?;

    Ok(Json(UserIdResponse {
        success: true,
        user_id,
    }))
}

/// Confirms an id and email belong to the same user.
#[axum::debug_handler]
pub async fn validate_user(
    State(state): State<AppState>,
    Payload(payload): Payload<ValidateUserRequest>,
) -> Result<Json<UserIdResponse>> {
    let (Some(user_id), Some(email)) = (present(&payload.user_id), present(&payload.email)) else {
        return Err(AppError::Validation(
            "아이디와 이메일은 필수 항목입니다.".to_string(),
        ));
    };

    let user_id = state
        .users
        .find_id_by_id_and_email(user_id, email)
        .await?
        .ok_or_else(|| {
            AppError::Authentication("아이디와 이메일이 일치하지 않습니다.".to_string())
        })?;

    Ok(Json(UserIdResponse {
        success: true,
        user_id,
    }))
}

/// Sets a new password for the given id.
///
/// Answers the same way whether or not the id exists.
#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    Payload(payload): Payload<ResetPasswordRequest>,
) -> Result<Response> {
    let (Some(user_id), Some(new_password), Some(confirm_password)) = (
        present(&payload.user_id),
        present(&payload.new_password),
        present(&payload.confirm_password),
    ) else {
        return Err(AppError::Validation(
            "아이디, 새 비밀번호, 비밀번호 확인은 필수 항목입니다.".to_string(),
        ));
    };

    validate_new_password(new_password, confirm_password)?;

    let updated = auth_service::set_password(&state, user_id, new_password.to_string()).await?;
    if updated == 0 {
        tracing::debug!("Password reset for unknown id: {}", user_id);
    }

    Ok((
        StatusCode::OK,
        SuccessResponse::new("비밀번호가 성공적으로 변경되었습니다."),
    )
        .into_response())
}
