#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::sync::Mutex;
use tower::util::ServiceExt; // for `oneshot`

use matjip::{
    app::build_router,
    config::Config,
    error::{AppError, Result},
    models::{
        restaurant::{Restaurant, RestaurantDetail},
        user::{NewUser, User, UserProfile},
    },
    repositories::{
        restaurant::RestaurantRepository,
        user::{UserRepository, DUPLICATE_EMAIL_MESSAGE, DUPLICATE_USER_ID_MESSAGE},
    },
    services::uploads::UploadStore,
    sessions::memory_store::MemorySessionStore,
    state::AppState,
};

/// `User` table kept in a map, enforcing the same unique keys as the real schema.
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<HashMap<String, User>>,
}

impl InMemoryUsers {
    pub async fn get(&self, user_id: &str) -> Option<User> {
        self.rows.lock().await.get(user_id).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, user: NewUser) -> Result<()> {
        let mut rows = self.rows.lock().await;
        if rows.contains_key(&user.user_id) {
            return Err(AppError::Conflict(DUPLICATE_USER_ID_MESSAGE.to_string()));
        }
        if rows.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string()));
        }
        rows.insert(
            user.user_id.clone(),
            User {
                user_id: user.user_id,
                username: user.username,
                nickname: user.nickname,
                email: user.email,
                password: user.password_hash,
                picture: None,
                tier: None,
                review_count: 0,
            },
        );
        Ok(())
    }

    async fn exists(&self, user_id: &str) -> Result<bool> {
        Ok(self.rows.lock().await.contains_key(user_id))
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.get(user_id).await)
    }

    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.get(user_id).await.as_ref().map(UserProfile::from))
    }

    async fn password_hash(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.get(user_id).await.map(|u| u.password))
    }

    async fn update_nickname(&self, user_id: &str, nickname: &str) -> Result<u64> {
        Ok(self
            .rows
            .lock()
            .await
            .get_mut(user_id)
            .map(|u| u.nickname = Some(nickname.to_string()))
            .map_or(0, |_| 1))
    }

    async fn update_password(&self, user_id: &str, password_hash: &str) -> Result<u64> {
        Ok(self
            .rows
            .lock()
            .await
            .get_mut(user_id)
            .map(|u| u.password = password_hash.to_string())
            .map_or(0, |_| 1))
    }

    async fn update_picture(&self, user_id: &str, picture: &str) -> Result<u64> {
        Ok(self
            .rows
            .lock()
            .await
            .get_mut(user_id)
            .map(|u| u.picture = Some(picture.to_string()))
            .map_or(0, |_| 1))
    }

    async fn delete(&self, user_id: &str) -> Result<u64> {
        Ok(self.rows.lock().await.remove(user_id).map_or(0, |_| 1))
    }

    async fn find_id_by_email(&self, email: &str) -> Result<Option<String>> {
        Ok(self
            .rows
            .lock()
            .await
            .values()
            .find(|u| u.email == email)
            .map(|u| u.user_id.clone()))
    }

    async fn find_id_by_id_and_email(&self, user_id: &str, email: &str) -> Result<Option<String>> {
        Ok(self
            .get(user_id)
            .await
            .filter(|u| u.email == email)
            .map(|u| u.user_id))
    }
}

/// A user table whose every call fails like a lost connection.
pub struct BrokenUsers;

fn broken() -> AppError {
    AppError::Internal("connection refused".to_string())
}

#[async_trait]
impl UserRepository for BrokenUsers {
    async fn insert(&self, _: NewUser) -> Result<()> {
        Err(broken())
    }
    async fn exists(&self, _: &str) -> Result<bool> {
        Err(broken())
    }
    async fn find_by_id(&self, _: &str) -> Result<Option<User>> {
        Err(broken())
    }
    async fn profile(&self, _: &str) -> Result<Option<UserProfile>> {
        Err(broken())
    }
    async fn password_hash(&self, _: &str) -> Result<Option<String>> {
        Err(broken())
    }
    async fn update_nickname(&self, _: &str, _: &str) -> Result<u64> {
        Err(broken())
    }
    async fn update_password(&self, _: &str, _: &str) -> Result<u64> {
        Err(broken())
    }
    async fn update_picture(&self, _: &str, _: &str) -> Result<u64> {
        Err(broken())
    }
    async fn delete(&self, _: &str) -> Result<u64> {
        Err(broken())
    }
    async fn find_id_by_email(&self, _: &str) -> Result<Option<String>> {
        Err(broken())
    }
    async fn find_id_by_id_and_email(&self, _: &str, _: &str) -> Result<Option<String>> {
        Err(broken())
    }
}

/// Fixed restaurant rows.
pub struct FixedRestaurants(pub Vec<Restaurant>);

#[async_trait]
impl RestaurantRepository for FixedRestaurants {
    async fn list(&self) -> Result<Vec<Restaurant>> {
        Ok(self.0.clone())
    }

    async fn detail(&self, restaurants_id: i32) -> Result<Option<RestaurantDetail>> {
        Ok(self
            .0
            .iter()
            .find(|r| r.restaurants_id == restaurants_id)
            .cloned()
            .map(RestaurantDetail::from))
    }
}

pub fn sample_restaurants() -> Vec<Restaurant> {
    vec![
        Restaurant {
            restaurants_id: 1,
            name: "을지면옥".to_string(),
            category: Some("한식".to_string()),
            address: Some("서울 중구 충무로14길 2-1".to_string()),
            image_url: Some("/images/euljimyeonok.jpg".to_string()),
            latitude: Some(37.5662),
            longitude: Some(126.9918),
            phone: Some("02-2266-7052".to_string()),
            rating: Some(4.5),
            review: Some("평양냉면 맛집".to_string()),
            hours: Some("11:00-21:00".to_string()),
            price: Some("13000".to_string()),
        },
        Restaurant {
            restaurants_id: 2,
            name: "명동교자".to_string(),
            category: Some("한식".to_string()),
            address: None,
            image_url: None,
            latitude: None,
            longitude: None,
            phone: None,
            rating: None,
            review: None,
            hours: None,
            price: None,
        },
    ]
}

/// A router wired to in-memory stores, plus handles to inspect them.
pub struct TestContext {
    pub app: Router,
    pub users: Arc<InMemoryUsers>,
    pub sessions: Arc<MemorySessionStore>,
    pub upload_dir: tempfile::TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let sessions = Arc::new(MemorySessionStore::new());
        let upload_dir = tempfile::tempdir().unwrap();

        let config = Config {
            upload_dir: upload_dir.path().to_path_buf(),
            upload_max_bytes: 1024 * 1024,
            ..Config::default()
        };

        let state = AppState::from_parts(
            users.clone(),
            Arc::new(FixedRestaurants(sample_restaurants())),
            sessions.clone(),
            UploadStore::new(config.upload_dir.clone(), config.upload_max_bytes),
            config,
        );

        Self {
            app: build_router(state),
            users,
            sessions,
            upload_dir,
        }
    }

    /// A context whose user table always fails.
    pub fn with_broken_store() -> Router {
        let config = Config::default();
        let state = AppState::from_parts(
            Arc::new(BrokenUsers),
            Arc::new(FixedRestaurants(Vec::new())),
            Arc::new(MemorySessionStore::new()),
            UploadStore::new(config.upload_dir.clone(), config.upload_max_bytes),
            config,
        );
        build_router(state)
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        send(&self.app, request).await
    }

    /// Signs up `user_id` with a default profile and the given password.
    pub async fn signup(&self, user_id: &str, password: &str) -> TestResponse {
        self.send(post_json(
            "/signup",
            serde_json::json!({
                "user_id": user_id,
                "username": "A",
                "email": format!("{}@example.com", user_id),
                "password": password,
            }),
            None,
        ))
        .await
    }

    /// Logs in and returns the session cookie value.
    pub async fn login(&self, user_id: &str, password: &str) -> TestResponse {
        self.send(post_json(
            "/login",
            serde_json::json!({ "user_id": user_id, "password": password }),
            None,
        ))
        .await
    }

    /// Signs up and logs in, returning the session token.
    pub async fn signed_in(&self, user_id: &str, password: &str) -> String {
        assert_eq!(self.signup(user_id, password).await.status, StatusCode::CREATED);
        let login = self.login(user_id, password).await;
        assert_eq!(login.status, StatusCode::OK);
        login.session_cookie.expect("login sets a session cookie")
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Value of the `session_id` cookie set by the response, if any.
    pub session_cookie: Option<String>,
    /// Raw `Set-Cookie` header for the session cookie, if any.
    pub set_cookie: Option<String>,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let set_cookie = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session_id="))
        .map(str::to_string);

    let session_cookie = set_cookie.as_deref().map(|raw| {
        raw.trim_start_matches("session_id=")
            .split(';')
            .next()
            .unwrap_or_default()
            .to_string()
    });

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        body,
        session_cookie,
        set_cookie,
    }
}

fn with_cookie(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::COOKIE, format!("session_id={}", token)),
        None => builder,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    with_cookie(Request::builder().method("GET").uri(uri), token)
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    with_cookie(Request::builder().method("DELETE").uri(uri), token)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    with_cookie(Request::builder().method("POST").uri(uri), token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_form(uri: &str, body: &str, token: Option<&str>) -> Request<Body> {
    with_cookie(Request::builder().method("POST").uri(uri), token)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub const BOUNDARY: &str = "matjip-test-boundary";

pub fn post_multipart(
    uri: &str,
    field: &str,
    file_name: &str,
    content: &[u8],
    token: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    with_cookie(Request::builder().method("POST").uri(uri), token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Smallest byte run `infer` recognises as PNG.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
