use crate::error::{AppError, Result};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Returns the value when it is present and non-empty.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Validates a password's length.
///
/// # Arguments
///
/// * `password` - The password to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the password is valid.
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(
            "비밀번호는 최소 8자 이상이어야 합니다.".to_string(),
        ));
    }

    Ok(())
}

/// Validates a new password against its confirmation, then its length.
pub fn validate_new_password(new_password: &str, confirm_password: &str) -> Result<()> {
    if new_password != confirm_password {
        return Err(AppError::Validation(
            "새 비밀번호와 비밀번호 확인이 일치하지 않습니다.".to_string(),
        ));
    }

    validate_password(new_password)
}

/// Validates the `local@domain.tld` shape of an email address.
///
/// No whitespace anywhere, exactly one `@`, and a `.` inside the domain with
/// text on both sides of it.
pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || AppError::Validation("유효한 이메일 주소를 입력하세요.".to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let has_dotted_domain = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !has_dotted_domain {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a nickname: anything but blank.
pub fn validate_nickname(nickname: Option<&str>) -> Result<&str> {
    match nickname {
        Some(n) if !n.trim().is_empty() => Ok(n),
        _ => Err(AppError::Validation(
            "유효한 닉네임을 입력해주세요.".to_string(),
        )),
    }
}
