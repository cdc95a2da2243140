use axum::{
    body::Bytes,
    extract::{Form, FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

const BAD_BODY_MESSAGE: &str = "잘못된 요청 형식입니다.";

/// A request body read as either JSON or an urlencoded form.
///
/// An empty body deserializes as `{}`, so handlers see missing fields rather
/// than a rejection and can answer with their own message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state).await.map_err(|e| {
                tracing::debug!("Form rejection: {}", e);
                AppError::Validation(BAD_BODY_MESSAGE.to_string())
            })?;
            return Ok(Payload(value));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!("Body rejection: {}", e);
            AppError::Validation(BAD_BODY_MESSAGE.to_string())
        })?;

        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &bytes
        };

        sonic_rs::from_slice::<T>(body)
            .map(Payload)
            .map_err(|e| {
                tracing::debug!("JSON rejection: {}", e);
                AppError::Validation(BAD_BODY_MESSAGE.to_string())
            })
    }
}
