use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::products::ProductSummary;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCartRequest {
    #[serde(default)]
    pub session_key: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuantityAction {
    Increase,
    Decrease,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub action: QuantityAction,
    #[serde(default)]
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemDto {
    pub id: Uuid,
    pub product: ProductSummary,
    pub quantity: i32,
    /// Discounted price times quantity, rounded to two decimal places.
    #[schema(value_type = String)]
    pub line_total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartDto {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub session_key: Option<String>,
    pub items: Vec<CartItemDto>,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CartList {
    #[schema(value_type = Vec<CartDto>)]
    pub items: Vec<CartDto>,
}
