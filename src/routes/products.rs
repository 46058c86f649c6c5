use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    routing::{delete, get},
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    dto::{
        products::{ImageDto, ProductDetail, ProductForm, ProductList},
        reviews::{CreateReviewRequest, ReviewDto, ReviewList},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, MaybeAuthUser},
    policy::{self, Action, Resource},
    response::ApiResponse,
    routes::params::{Pagination, ProductQuery},
    services::{product_service, review_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/featured", get(featured_products))
        .route("/seller", get(seller_products))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/reviews", get(list_reviews).post(create_review))
        .route("/{id}/images", get(list_images))
        .route("/{id}/images/{image_id}", delete(delete_image))
}

/// Pull form fields and file parts out of a multipart product payload.
/// `images` and `tags` may repeat; unknown fields are drained and ignored.
async fn parse_product_form(mut multipart: Multipart) -> AppResult<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "images" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.images.push((filename, data));
            }
            "title" => form.title = Some(text(field).await?),
            "description" => form.description = Some(text(field).await?),
            "price" => {
                let value = text(field).await?;
                let price = value
                    .parse::<Decimal>()
                    .map_err(|_| AppError::BadRequest("invalid price".into()))?;
                form.price = Some(price);
            }
            "stock" => form.stock = Some(parse_int(&text(field).await?, "stock")?),
            "discount_percent" => {
                form.discount_percent =
                    Some(parse_int(&text(field).await?, "discount_percent")?)
            }
            "featured" => form.featured = Some(parse_bool(&text(field).await?, "featured")?),
            "category" => form.category = Some(text(field).await?),
            "brand" => form.brand = Some(text(field).await?),
            "tags" => {
                let value = text(field).await?;
                if !value.is_empty() {
                    form.tags.push(value);
                }
            }
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    Ok(form)
}

async fn text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

fn parse_int(value: &str, name: &str) -> AppResult<i32> {
    value
        .parse::<i32>()
        .map_err(|_| AppError::BadRequest(format!("invalid {name}")))
}

fn parse_bool(value: &str, name: &str) -> AppResult<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(AppError::BadRequest(format!("invalid {name}"))),
    }
}

#[utoipa::path(
    get,
    path = "/api/catalog/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search in title and description"),
        ("category" = Option<String>, Query, description = "Filter by category slug"),
        ("brand" = Option<Uuid>, Query, description = "Filter by brand ID"),
        ("tag" = Option<Uuid>, Query, description = "Filter by tag ID"),
    ),
    responses((status = 200, description = "List products", body = ApiResponse<ProductList>)),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    policy::authorize(Resource::Product, Action::Read, user.role())?;
    Ok(Json(product_service::list_products(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products/featured",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses((status = 200, description = "List featured products", body = ApiResponse<ProductList>)),
    tag = "Products"
)]
pub async fn featured_products(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    policy::authorize(Resource::Product, Action::Read, user.role())?;
    Ok(Json(
        product_service::featured_products(&state, pagination).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products/seller",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List the caller's products", body = ApiResponse<ProductList>),
        (status = 403, description = "Not a seller"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn seller_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    policy::authorize(Resource::Product, Action::Read, user.role())?;
    Ok(Json(
        product_service::seller_products(&state, &user, pagination).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    policy::authorize(Resource::Product, Action::Read, user.role())?;
    Ok(Json(product_service::get_product(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/catalog/products",
    responses(
        (status = 200, description = "Create product from a multipart form", body = ApiResponse<ProductDetail>),
        (status = 400, description = "Invalid form"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    policy::authorize(Resource::Product, Action::Create, user.role())?;
    let form = parse_product_form(multipart).await?;
    Ok(Json(
        product_service::create_product(&state, &user, form).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/catalog/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Update product from a multipart form", body = ApiResponse<ProductDetail>),
        (status = 403, description = "Not the seller"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    policy::authorize(Resource::Product, Action::Update, user.role())?;
    let form = parse_product_form(multipart).await?;
    Ok(Json(
        product_service::update_product(&state, &user, id, form).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/catalog/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Delete product"),
        (status = 403, description = "Not the seller"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    policy::authorize(Resource::Product, Action::Delete, user.role())?;
    Ok(Json(
        product_service::delete_product(&state, &user, id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses((status = 200, description = "List reviews", body = ApiResponse<ReviewList>)),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    policy::authorize(Resource::Review, Action::Read, user.role())?;
    Ok(Json(review_service::list_reviews(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/catalog/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Create review", body = ApiResponse<ReviewDto>),
        (status = 400, description = "Already reviewed or invalid rating"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<ReviewDto>>> {
    policy::authorize(Resource::Review, Action::Create, user.role())?;
    Ok(Json(
        review_service::create_review(&state, user.user_id, id, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products/{id}/images",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses((status = 200, description = "List product images", body = ApiResponse<Vec<ImageDto>>)),
    tag = "Products"
)]
pub async fn list_images(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<ImageDto>>>> {
    policy::authorize(Resource::ProductImage, Action::Read, user.role())?;
    Ok(Json(product_service::list_images(&state, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/catalog/products/{id}/images/{image_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("image_id" = Uuid, Path, description = "Image ID"),
    ),
    responses(
        (status = 200, description = "Delete product image"),
        (status = 403, description = "Not the seller"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    policy::authorize(Resource::ProductImage, Action::Delete, user.role())?;
    Ok(Json(
        product_service::delete_image(&state, &user, id, image_id).await?,
    ))
}
