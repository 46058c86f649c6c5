use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::reviews::ReviewDto;

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageDto {
    pub id: Uuid,
    /// Absolute URL the image is served under.
    pub image: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    /// Seller username.
    pub seller: String,
    pub title: String,
    pub description: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    /// Price after discount, rounded to two decimal places.
    #[schema(value_type = String)]
    pub final_price: Decimal,
    pub stock: i32,
    pub discount_percent: i32,
    pub featured: bool,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub tags: Vec<String>,
    pub images: Vec<ImageDto>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductSummary,
    pub reviews: Vec<ReviewDto>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<ProductSummary>)]
    pub items: Vec<ProductSummary>,
}

/// Fields accepted by the multipart create/update form. Category, brand and
/// tags are referenced by slug; `images` file parts are collected
/// separately.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub discount_percent: Option<i32>,
    pub featured: Option<bool>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub tags: Vec<String>,
    pub images: Vec<(String, axum::body::Bytes)>,
}
