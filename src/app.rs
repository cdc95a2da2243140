use axum::{
    Router,
    routing::{get, post, delete},
    middleware::from_fn_with_state,
    extract::DefaultBodyLimit,
};

use http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    services::ServeDir,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
    cors::CorsLayer,
};
use tracing::Level;

use crate::{handlers, middleware_layer, services::uploads::PUBLIC_PREFIX, state::AppState};

/// Body limit for every route except the photo upload.
const JSON_BODY_LIMIT: usize = 64 * 1024;
/// Room for multipart headers around the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::COOKIE,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

/// Builds the full HTTP surface over `state`.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.uploads.max_bytes() + MULTIPART_OVERHEAD;

    let public_routes = Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/check-duplicate", post(handlers::auth::check_duplicate))
        .route("/login", post(handlers::auth::login))
        .route("/logout", get(handlers::auth::logout))
        .route("/session-check", get(handlers::auth::session_check))
        .route("/restaurants", get(handlers::restaurants::list_restaurants))
        .route("/restaurant/{id}", get(handlers::restaurants::get_restaurant))
        .route("/find-user", post(handlers::recovery::find_user))
        .route("/validate-user", post(handlers::recovery::validate_user))
        .route("/reset-password", post(handlers::recovery::reset_password))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/user", get(handlers::users::get_profile))
        .route("/api/user/nickname", post(handlers::users::change_nickname))
        .route("/api/user/password", post(handlers::users::change_password))
        .route(
            "/api/user/verify-password",
            post(handlers::users::verify_password),
        )
        .route(
            "/api/user/upload-photo",
            post(handlers::users::upload_photo).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/delete-user", delete(handlers::users::delete_user))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(&state.config.upload_dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .layer(cors_layer(&state.config.allowed_origins))
}
