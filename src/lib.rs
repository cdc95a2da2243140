//! HTTP backend for a restaurant-review site: accounts, sessions, profile
//! editing, password recovery and read-only restaurant queries.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod state;

pub mod crypto {
    pub mod password;
    pub mod token;
}

pub mod models {
    pub mod user;
    pub mod session;
    pub mod restaurant;
}

pub mod repositories {
    pub mod user;
    pub mod restaurant;
}

pub mod sessions {
    pub mod store;
    pub mod memory_store;
    pub mod redis_store;
}

pub mod services {
    pub mod auth;
    pub mod uploads;
}

pub mod handlers {
    pub mod auth;
    pub mod users;
    pub mod recovery;
    pub mod restaurants;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
}
