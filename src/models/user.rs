use serde::Serialize;

/// Represents a user row.
#[derive(Clone, Debug)]
pub struct User {
    /// The login id chosen at signup. Never changes.
    pub user_id: String,
    /// The user's display name.
    pub username: String,
    /// The user's nickname.
    pub nickname: Option<String>,
    /// The user's email address.
    pub email: String,
    /// The user's hashed password.
    pub password: String,
    /// Public path of the user's profile picture.
    pub picture: Option<String>,
    /// The user's reviewer tier.
    pub tier: Option<String>,
    /// Number of reviews the user has written.
    pub review_count: i32,
}

/// The fields needed to insert a user.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub user_id: String,
    pub username: String,
    pub nickname: Option<String>,
    pub email: String,
    /// Already hashed.
    pub password_hash: String,
}

/// The profile subset returned by `GET /api/user`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct UserProfile {
    pub username: String,
    pub nickname: Option<String>,
    pub email: String,
    pub picture: Option<String>,
    pub tier: Option<String>,
    pub review_count: i32,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            nickname: user.nickname.clone(),
            email: user.email.clone(),
            picture: user.picture.clone(),
            tier: user.tier.clone(),
            review_count: user.review_count,
        }
    }
}
