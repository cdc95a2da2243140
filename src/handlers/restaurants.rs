use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{AppError, Result},
    models::restaurant::{Restaurant, RestaurantDetail},
    state::AppState,
};

const RESTAURANT_NOT_FOUND_MESSAGE: &str = "해당 맛집을 찾을 수 없습니다.";

/// Lists every restaurant.
#[axum::debug_handler]
pub async fn list_restaurants(State(state): State<AppState>) -> Result<Json<Vec<Restaurant>>> {
    let restaurants = state.restaurants.list().await?;
    tracing::debug!("Listing {} restaurants", restaurants.len());
    Ok(Json(restaurants))
}

/// Returns one restaurant. A non-numeric id is simply not found.
#[axum::debug_handler]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RestaurantDetail>> {
    let not_found = || AppError::NotFound(RESTAURANT_NOT_FOUND_MESSAGE.to_string());

    let id: i32 = id.trim().parse().map_err(|_| not_found())?;

    let detail = state
        .restaurants
        .detail(id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(detail))
}
