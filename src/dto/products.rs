use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, Product, ProductStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub unit: Option<String>,
    pub quantity: i32,
    pub category_id: Uuid,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub origin: Option<String>,
    pub certification: Option<String>,
    pub delivery_time: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub original_price: Option<i64>,
    pub unit: Option<String>,
    pub quantity: Option<i32>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub origin: Option<String>,
    pub certification: Option<String>,
    pub delivery_time: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductStatusRequest {
    pub status: ProductStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}
