use std::collections::HashMap;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    dto::wishlist::{AddWishlistRequest, WishlistItemDto, WishlistList},
    entity::products::{Column as ProdCol, Entity as Products},
    error::{AppError, AppResult},
    models::Wishlist,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::product_service,
    state::AppState,
};

pub async fn list_wishlist(
    state: &AppState,
    user_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<WishlistList>> {
    let (page, limit, offset) = pagination.normalize();
    let entries: Vec<Wishlist> = sqlx::query_as(
        "SELECT * FROM wishlists WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wishlists WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&state.pool)
        .await?;

    let product_ids: Vec<Uuid> = entries.iter().map(|e| e.product_id).collect();
    let products = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&state.orm)
        .await?;
    let mut summaries: HashMap<Uuid, _> = product_service::build_summaries(state, products)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let items = entries
        .into_iter()
        .filter_map(|entry| {
            summaries.remove(&entry.product_id).map(|product| WishlistItemDto {
                id: entry.id,
                product,
                created_at: entry.created_at,
            })
        })
        .collect();

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("OK", WishlistList { items }, Some(meta)))
}

pub async fn add_to_wishlist(
    state: &AppState,
    user_id: Uuid,
    payload: AddWishlistRequest,
) -> AppResult<ApiResponse<WishlistItemDto>> {
    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Product not found".into()))?;

    let entry: Wishlist = sqlx::query_as(
        r#"
        INSERT INTO wishlists (id, user_id, product_id)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(payload.product_id)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| AppError::from_sqlx(e, "Product is already in your wishlist"))?;

    let mut summaries = product_service::build_summaries(state, vec![product]).await?;
    Ok(ApiResponse::success(
        "Added to wishlist",
        WishlistItemDto {
            id: entry.id,
            product: summaries.remove(0),
            created_at: entry.created_at,
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_wishlist(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM wishlists WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
