use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::wishlist::{AddWishlistRequest, WishlistItemDto, WishlistList},
    error::AppResult,
    middleware::auth::AuthUser,
    policy::{self, Action, Resource},
    response::ApiResponse,
    routes::params::Pagination,
    services::wishlist_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_wishlist).post(add_to_wishlist))
        .route("/{id}", delete(remove_from_wishlist))
}

#[utoipa::path(
    get,
    path = "/api/catalog/wishlist",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses((status = 200, description = "List wishlist entries", body = ApiResponse<WishlistList>)),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<WishlistList>>> {
    policy::authorize(Resource::Wishlist, Action::Read, user.role())?;
    Ok(Json(
        wishlist_service::list_wishlist(&state, user.user_id, pagination).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/catalog/wishlist",
    request_body = AddWishlistRequest,
    responses(
        (status = 200, description = "Add product to wishlist", body = ApiResponse<WishlistItemDto>),
        (status = 400, description = "Already in wishlist"),
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddWishlistRequest>,
) -> AppResult<Json<ApiResponse<WishlistItemDto>>> {
    policy::authorize(Resource::Wishlist, Action::Create, user.role())?;
    Ok(Json(
        wishlist_service::add_to_wishlist(&state, user.user_id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/catalog/wishlist/{id}",
    params(("id" = Uuid, Path, description = "Wishlist entry ID")),
    responses(
        (status = 200, description = "Remove wishlist entry"),
        (status = 404, description = "Entry not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    policy::authorize(Resource::Wishlist, Action::Delete, user.role())?;
    Ok(Json(
        wishlist_service::remove_from_wishlist(&state, user.user_id, id).await?,
    ))
}
