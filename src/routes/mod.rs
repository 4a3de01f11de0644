use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod doc;
pub mod health;
pub mod messages;
pub mod orders;
pub mod params;
pub mod products;
pub mod profile;
pub mod seller;
pub mod uploads;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/products", products::router())
        .nest("/categories", products::categories_router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::route())
        .nest("/seller", seller::router())
        .nest("/uploads", uploads::router(max_upload_bytes))
        .nest("/messages", messages::router())
}
