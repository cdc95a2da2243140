use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use crate::{
    error::{AppError, Result},
    models::restaurant::{Restaurant, RestaurantDetail},
};

/// Read-only access to the `restaurants` table.
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    /// Every restaurant, unfiltered.
    async fn list(&self) -> Result<Vec<Restaurant>>;
    /// One restaurant's detail columns.
    async fn detail(&self, restaurants_id: i32) -> Result<Option<RestaurantDetail>>;
}

/// PostgreSQL-backed [`RestaurantRepository`].
#[derive(Clone)]
pub struct PgRestaurantRepository {
    pool: Pool,
}

impl PgRestaurantRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn get<'a, T>(row: &'a Row, name: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name)
        .map_err(|_| AppError::MissingData(name.to_string()))
}

fn row_to_detail(row: &Row) -> Result<RestaurantDetail> {
    Ok(RestaurantDetail {
        name: get(row, "name")?,
        category: get(row, "category")?,
        address: get(row, "address")?,
        image_url: get(row, "image_url")?,
        latitude: get(row, "latitude")?,
        longitude: get(row, "longitude")?,
        phone: get(row, "phone")?,
        rating: get(row, "rating")?,
        review: get(row, "review")?,
        hours: get(row, "hours")?,
        price: get(row, "price")?,
    })
}

fn row_to_restaurant(row: &Row) -> Result<Restaurant> {
    let detail = row_to_detail(row)?;
    Ok(Restaurant {
        restaurants_id: get(row, "restaurants_id")?,
        name: detail.name,
        category: detail.category,
        address: detail.address,
        image_url: detail.image_url,
        latitude: detail.latitude,
        longitude: detail.longitude,
        phone: detail.phone,
        rating: detail.rating,
        review: detail.review,
        hours: detail.hours,
        price: detail.price,
    })
}

#[async_trait]
impl RestaurantRepository for PgRestaurantRepository {
    async fn list(&self) -> Result<Vec<Restaurant>> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(
                r#"
                SELECT restaurants_id, name, category, address, image_url, latitude, longitude,
                       phone, rating, review, hours, price
                FROM restaurants
                "#,
            )
            .await?;
        let rows = client.query(&stmt, &[]).await?;
        rows.iter().map(row_to_restaurant).collect()
    }

    async fn detail(&self, restaurants_id: i32) -> Result<Option<RestaurantDetail>> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(
                r#"
                SELECT name, category, address, image_url, latitude, longitude,
                       phone, rating, review, hours, price
                FROM restaurants
                WHERE restaurants_id = $1
                "#,
            )
            .await?;
        let row = client.query_opt(&stmt, &[&restaurants_id]).await?;
        row.as_ref().map(row_to_detail).transpose()
    }
}
