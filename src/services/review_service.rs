use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    dto::reviews::{CreateReviewRequest, ReviewDto, ReviewList, ReviewUser},
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
    storage,
};

#[derive(FromRow)]
struct ReviewRow {
    id: Uuid,
    rating: i32,
    comment: String,
    created_at: DateTime<Utc>,
    user_id: Uuid,
    username: String,
    avatar: Option<String>,
}

fn to_dto(state: &AppState, row: ReviewRow) -> ReviewDto {
    ReviewDto {
        id: row.id,
        user: ReviewUser {
            id: row.user_id,
            username: row.username,
            avatar: row
                .avatar
                .as_deref()
                .map(|path| storage::media_url(&state.config, path)),
        },
        rating: row.rating,
        comment: row.comment,
        created_at: row.created_at,
    }
}

pub(crate) async fn reviews_for_product(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<Vec<ReviewDto>> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        r#"
        SELECT r.id, r.rating, r.comment, r.created_at,
               u.id AS user_id, u.username, p.avatar
        FROM reviews r
        JOIN users u ON u.id = r.user_id
        LEFT JOIN profiles p ON p.user_id = u.id
        WHERE r.product_id = $1
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(product_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(rows.into_iter().map(|row| to_dto(state, row)).collect())
}

pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<ReviewList>> {
    let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let items = reviews_for_product(state, product_id).await?;
    Ok(ApiResponse::success("Reviews", ReviewList { items }, None))
}

pub async fn create_review(
    state: &AppState,
    user_id: Uuid,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<ReviewDto>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
    }

    let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    // The (product, user) unique constraint is the only duplicate guard;
    // concurrent attempts let the store pick the winner.
    let review_id: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO reviews (id, product_id, user_id, rating, comment)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(product_id)
    .bind(user_id)
    .bind(payload.rating)
    .bind(payload.comment.unwrap_or_default())
    .fetch_one(&state.pool)
    .await
    .map_err(|e| AppError::from_sqlx(e, "You have already reviewed this product"))?;

    let row = sqlx::query_as::<_, ReviewRow>(
        r#"
        SELECT r.id, r.rating, r.comment, r.created_at,
               u.id AS user_id, u.username, p.avatar
        FROM reviews r
        JOIN users u ON u.id = r.user_id
        LEFT JOIN profiles p ON p.user_id = u.id
        WHERE r.id = $1
        "#,
    )
    .bind(review_id.0)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Review created",
        to_dto(state, row),
        Some(Meta::empty()),
    ))
}
