use serde::Serialize;

/// A row of the `restaurants` table.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Restaurant {
    pub restaurants_id: i32,
    pub name: String,
    pub category: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub review: Option<String>,
    pub hours: Option<String>,
    pub price: Option<String>,
}

/// The columns returned by the detail endpoint; the id is omitted.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RestaurantDetail {
    pub name: String,
    pub category: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub review: Option<String>,
    pub hours: Option<String>,
    pub price: Option<String>,
}

impl From<Restaurant> for RestaurantDetail {
    fn from(r: Restaurant) -> Self {
        Self {
            name: r.name,
            category: r.category,
            address: r.address,
            image_url: r.image_url,
            latitude: r.latitude,
            longitude: r.longitude,
            phone: r.phone,
            rating: r.rating,
            review: r.review,
            hours: r.hours,
            price: r.price,
        }
    }
}
