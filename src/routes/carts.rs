use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::cart::{
        AddCartItemRequest, CartDto, CartList, CreateCartRequest, UpdateQuantityRequest,
    },
    error::AppResult,
    middleware::auth::MaybeAuthUser,
    policy::{self, Action, Resource},
    response::ApiResponse,
    routes::params::SessionKeyQuery,
    services::cart_service::{self, CartOwner},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_carts).post(create_cart))
        .route("/my", get(my_cart))
        .route("/{cart_id}", get(get_cart).delete(delete_cart))
        .route("/{cart_id}/items", get(list_items).post(add_item))
        .route(
            "/{cart_id}/items/{id}",
            axum::routing::delete(remove_item),
        )
        .route(
            "/{cart_id}/items/{id}/update_quantity",
            patch(update_quantity),
        )
}

#[utoipa::path(
    get,
    path = "/api/orders/carts",
    params(("session_key" = Option<String>, Query, description = "Guest session key")),
    responses((status = 200, description = "List the requester's carts", body = ApiResponse<CartList>)),
    tag = "Carts"
)]
pub async fn list_carts(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Query(query): Query<SessionKeyQuery>,
) -> AppResult<Json<ApiResponse<CartList>>> {
    policy::authorize(Resource::Cart, Action::Read, user.role())?;
    let owner = CartOwner::resolve(&user, query.session_key);
    Ok(Json(cart_service::list_carts(&state, owner).await?))
}

#[utoipa::path(
    post,
    path = "/api/orders/carts",
    request_body = CreateCartRequest,
    responses((status = 200, description = "Create or fetch the requester's cart", body = ApiResponse<CartDto>)),
    tag = "Carts"
)]
pub async fn create_cart(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Json(payload): Json<CreateCartRequest>,
) -> AppResult<Json<ApiResponse<CartDto>>> {
    policy::authorize(Resource::Cart, Action::Create, user.role())?;
    Ok(Json(cart_service::create_cart(&state, &user, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/orders/carts/my",
    params(("session_key" = Option<String>, Query, description = "Guest session key")),
    responses((status = 200, description = "The requester's current cart", body = ApiResponse<CartDto>)),
    tag = "Carts"
)]
pub async fn my_cart(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Query(query): Query<SessionKeyQuery>,
) -> AppResult<Json<ApiResponse<CartDto>>> {
    policy::authorize(Resource::Cart, Action::Read, user.role())?;
    let owner = CartOwner::resolve(&user, query.session_key);
    Ok(Json(cart_service::my_cart(&state, owner).await?))
}

#[utoipa::path(
    get,
    path = "/api/orders/carts/{cart_id}",
    params(
        ("cart_id" = Uuid, Path, description = "Cart ID"),
        ("session_key" = Option<String>, Query, description = "Guest session key"),
    ),
    responses(
        (status = 200, description = "Get cart", body = ApiResponse<CartDto>),
        (status = 404, description = "Cart not found"),
    ),
    tag = "Carts"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(cart_id): Path<Uuid>,
    Query(query): Query<SessionKeyQuery>,
) -> AppResult<Json<ApiResponse<CartDto>>> {
    policy::authorize(Resource::Cart, Action::Read, user.role())?;
    let owner = CartOwner::resolve(&user, query.session_key);
    Ok(Json(cart_service::get_cart(&state, cart_id, owner).await?))
}

#[utoipa::path(
    delete,
    path = "/api/orders/carts/{cart_id}",
    params(
        ("cart_id" = Uuid, Path, description = "Cart ID"),
        ("session_key" = Option<String>, Query, description = "Guest session key"),
    ),
    responses((status = 200, description = "Delete cart")),
    tag = "Carts"
)]
pub async fn delete_cart(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(cart_id): Path<Uuid>,
    Query(query): Query<SessionKeyQuery>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    policy::authorize(Resource::Cart, Action::Delete, user.role())?;
    let owner = CartOwner::resolve(&user, query.session_key);
    Ok(Json(cart_service::delete_cart(&state, cart_id, owner).await?))
}

#[utoipa::path(
    get,
    path = "/api/orders/carts/{cart_id}/items",
    params(
        ("cart_id" = Uuid, Path, description = "Cart ID"),
        ("session_key" = Option<String>, Query, description = "Guest session key"),
    ),
    responses((status = 200, description = "List cart items", body = ApiResponse<CartDto>)),
    tag = "Carts"
)]
pub async fn list_items(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(cart_id): Path<Uuid>,
    Query(query): Query<SessionKeyQuery>,
) -> AppResult<Json<ApiResponse<CartDto>>> {
    policy::authorize(Resource::CartItem, Action::Read, user.role())?;
    let owner = CartOwner::resolve(&user, query.session_key);
    Ok(Json(cart_service::list_items(&state, cart_id, owner).await?))
}

#[utoipa::path(
    post,
    path = "/api/orders/carts/{cart_id}/items",
    params(
        ("cart_id" = Uuid, Path, description = "Cart ID"),
        ("session_key" = Option<String>, Query, description = "Guest session key"),
    ),
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Add or update a cart item", body = ApiResponse<CartDto>),
        (status = 400, description = "Bad request"),
    ),
    tag = "Carts"
)]
pub async fn add_item(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(cart_id): Path<Uuid>,
    Query(query): Query<SessionKeyQuery>,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartDto>>> {
    policy::authorize(Resource::CartItem, Action::Create, user.role())?;
    let owner = CartOwner::resolve(&user, query.session_key);
    Ok(Json(
        cart_service::add_item(&state, cart_id, owner, payload).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/orders/carts/{cart_id}/items/{id}/update_quantity",
    params(
        ("cart_id" = Uuid, Path, description = "Cart ID"),
        ("id" = Uuid, Path, description = "Cart item ID"),
        ("session_key" = Option<String>, Query, description = "Guest session key"),
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Adjust item quantity", body = ApiResponse<CartDto>),
        (status = 400, description = "Invalid action"),
    ),
    tag = "Carts"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path((cart_id, id)): Path<(Uuid, Uuid)>,
    Query(query): Query<SessionKeyQuery>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartDto>>> {
    policy::authorize(Resource::CartItem, Action::Update, user.role())?;
    let owner = CartOwner::resolve(&user, query.session_key);
    Ok(Json(
        cart_service::update_quantity(&state, cart_id, id, owner, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/orders/carts/{cart_id}/items/{id}",
    params(
        ("cart_id" = Uuid, Path, description = "Cart ID"),
        ("id" = Uuid, Path, description = "Cart item ID"),
        ("session_key" = Option<String>, Query, description = "Guest session key"),
    ),
    responses(
        (status = 200, description = "Remove cart item"),
        (status = 404, description = "Item not found"),
    ),
    tag = "Carts"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path((cart_id, id)): Path<(Uuid, Uuid)>,
    Query(query): Query<SessionKeyQuery>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    policy::authorize(Resource::CartItem, Action::Delete, user.role())?;
    let owner = CartOwner::resolve(&user, query.session_key);
    Ok(Json(
        cart_service::remove_item(&state, cart_id, id, owner).await?,
    ))
}
