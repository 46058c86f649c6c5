use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::{
    dto::cart::{
        AddCartItemRequest, CartDto, CartItemDto, CartList, CreateCartRequest, QuantityAction,
        UpdateQuantityRequest,
    },
    entity::{
        cart_items::{
            ActiveModel as CartItemActive, Column as CartItemCol, Entity as CartItems,
            Model as CartItemModel,
        },
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::MaybeAuthUser,
    pricing,
    response::{ApiResponse, Meta},
    services::product_service,
    state::AppState,
};

/// Who a cart belongs to: a logged-in user, or a guest session. Requests
/// with neither have no cart at all.
#[derive(Debug, Clone)]
pub enum CartOwner {
    User(Uuid),
    Session(String),
}

impl CartOwner {
    pub fn resolve(user: &MaybeAuthUser, session_key: Option<String>) -> Option<CartOwner> {
        if let Some(auth) = &user.0 {
            return Some(CartOwner::User(auth.user_id));
        }
        session_key
            .filter(|key| !key.is_empty())
            .map(CartOwner::Session)
    }

    fn condition(&self) -> Condition {
        match self {
            CartOwner::User(user_id) => Condition::all().add(CartCol::UserId.eq(*user_id)),
            CartOwner::Session(key) => Condition::all().add(CartCol::SessionKey.eq(key.clone())),
        }
    }
}

async fn find_cart(state: &AppState, owner: &CartOwner) -> AppResult<Option<CartModel>> {
    let cart = Carts::find()
        .filter(owner.condition())
        .order_by_desc(CartCol::CreatedAt)
        .one(&state.orm)
        .await?;
    Ok(cart)
}

/// Get-or-create against the partial unique indexes: losing the insert race
/// falls back to reading the winner's row.
pub async fn get_or_create_cart(state: &AppState, owner: &CartOwner) -> AppResult<CartModel> {
    if let Some(cart) = find_cart(state, owner).await? {
        return Ok(cart);
    }

    let (user_id, session_key) = match owner {
        CartOwner::User(user_id) => (Some(*user_id), None),
        CartOwner::Session(key) => (None, Some(key.clone())),
    };

    let inserted = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        session_key: Set(session_key),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await;

    match inserted {
        Ok(cart) => Ok(cart),
        Err(err) if err.sql_err().is_some_and(|e| matches!(e, sea_orm::SqlErr::UniqueConstraintViolation(_))) => {
            find_cart(state, owner)
                .await?
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart vanished after conflict")))
        }
        Err(err) => Err(err.into()),
    }
}

/// A cart is only addressable by its owner; everything item-level goes
/// through this scope check.
async fn fetch_cart_scoped(
    state: &AppState,
    cart_id: Uuid,
    owner: &Option<CartOwner>,
) -> AppResult<CartModel> {
    let owner = owner.as_ref().ok_or(AppError::NotFound)?;
    Carts::find_by_id(cart_id)
        .filter(owner.condition())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn build_cart_dto(state: &AppState, cart: CartModel) -> AppResult<CartDto> {
    let items = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .order_by_asc(CartItemCol::Id)
        .all(&state.orm)
        .await?;

    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let products = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&state.orm)
        .await?;
    let mut summaries: std::collections::HashMap<Uuid, _> =
        product_service::build_summaries(state, products)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

    let mut subtotal = Decimal::ZERO;
    let mut item_dtos = Vec::with_capacity(items.len());
    for item in items {
        let Some(product) = summaries.remove(&item.product_id) else {
            continue;
        };
        let line_total = pricing::line_total(product.price, product.discount_percent, item.quantity);
        subtotal += line_total;
        item_dtos.push(CartItemDto {
            id: item.id,
            product,
            quantity: item.quantity,
            line_total,
        });
    }

    Ok(CartDto {
        id: cart.id,
        user_id: cart.user_id,
        session_key: cart.session_key,
        items: item_dtos,
        subtotal: subtotal.round_dp(2),
    })
}

pub async fn list_carts(
    state: &AppState,
    owner: Option<CartOwner>,
) -> AppResult<ApiResponse<CartList>> {
    let Some(owner) = owner else {
        return Ok(ApiResponse::success(
            "OK",
            CartList { items: Vec::new() },
            Some(Meta::empty()),
        ));
    };

    let carts = Carts::find()
        .filter(owner.condition())
        .order_by_desc(CartCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(carts.len());
    for cart in carts {
        items.push(build_cart_dto(state, cart).await?);
    }

    Ok(ApiResponse::success(
        "OK",
        CartList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_cart(
    state: &AppState,
    user: &MaybeAuthUser,
    payload: CreateCartRequest,
) -> AppResult<ApiResponse<CartDto>> {
    let owner = CartOwner::resolve(user, payload.session_key)
        .ok_or_else(|| AppError::BadRequest("session_key is required for guest carts".into()))?;
    let cart = get_or_create_cart(state, &owner).await?;
    let dto = build_cart_dto(state, cart).await?;
    Ok(ApiResponse::success("Cart", dto, Some(Meta::empty())))
}

/// The `my` sub-route: resolves the requester's current cart. A request
/// with no identity at all gets an empty payload rather than an error.
pub async fn my_cart(
    state: &AppState,
    owner: Option<CartOwner>,
) -> AppResult<ApiResponse<CartDto>> {
    let Some(owner) = owner else {
        return Ok(ApiResponse {
            message: "No cart".to_string(),
            data: None,
            meta: Some(Meta::empty()),
        });
    };
    let cart = get_or_create_cart(state, &owner).await?;
    let dto = build_cart_dto(state, cart).await?;
    Ok(ApiResponse::success("Cart", dto, Some(Meta::empty())))
}

pub async fn get_cart(
    state: &AppState,
    cart_id: Uuid,
    owner: Option<CartOwner>,
) -> AppResult<ApiResponse<CartDto>> {
    let cart = fetch_cart_scoped(state, cart_id, &owner).await?;
    let dto = build_cart_dto(state, cart).await?;
    Ok(ApiResponse::success("Cart", dto, Some(Meta::empty())))
}

pub async fn delete_cart(
    state: &AppState,
    cart_id: Uuid,
    owner: Option<CartOwner>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let cart = fetch_cart_scoped(state, cart_id, &owner).await?;
    cart.delete(&state.orm).await?;
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_items(
    state: &AppState,
    cart_id: Uuid,
    owner: Option<CartOwner>,
) -> AppResult<ApiResponse<CartDto>> {
    get_cart(state, cart_id, owner).await
}

async fn touch_cart(state: &AppState, cart: CartModel) -> AppResult<()> {
    let mut active: CartActive = cart.into();
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;
    Ok(())
}

pub async fn add_item(
    state: &AppState,
    cart_id: Uuid,
    owner: Option<CartOwner>,
    payload: AddCartItemRequest,
) -> AppResult<ApiResponse<CartDto>> {
    if payload.quantity < 1 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let cart = fetch_cart_scoped(state, cart_id, &owner).await?;

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::BadRequest("Product not found".to_string()));
    }

    let existing = CartItems::find()
        .filter(
            Condition::all()
                .add(CartItemCol::CartId.eq(cart.id))
                .add(CartItemCol::ProductId.eq(payload.product_id)),
        )
        .one(&state.orm)
        .await?;

    match existing {
        Some(item) => {
            let mut active: CartItemActive = item.into();
            active.quantity = Set(payload.quantity);
            active.update(&state.orm).await?;
        }
        None => {
            CartItemActive {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(payload.product_id),
                quantity: Set(payload.quantity),
            }
            .insert(&state.orm)
            .await?;
        }
    }

    let cart_id = cart.id;
    touch_cart(state, cart).await?;

    let cart = Carts::find_by_id(cart_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let dto = build_cart_dto(state, cart).await?;
    Ok(ApiResponse::success("OK", dto, Some(Meta::empty())))
}

async fn fetch_item(
    state: &AppState,
    cart: &CartModel,
    item_id: Uuid,
) -> AppResult<CartItemModel> {
    CartItems::find_by_id(item_id)
        .filter(CartItemCol::CartId.eq(cart.id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

/// Quantity adjustment: increase adds, decrease subtracts but never drops
/// below one.
pub async fn update_quantity(
    state: &AppState,
    cart_id: Uuid,
    item_id: Uuid,
    owner: Option<CartOwner>,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<CartDto>> {
    let delta = payload.quantity.unwrap_or(1);
    if delta < 1 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let cart = fetch_cart_scoped(state, cart_id, &owner).await?;
    let item = fetch_item(state, &cart, item_id).await?;

    let quantity = match payload.action {
        QuantityAction::Increase => item.quantity + delta,
        QuantityAction::Decrease => (item.quantity - delta).max(1),
    };

    let mut active: CartItemActive = item.into();
    active.quantity = Set(quantity);
    active.update(&state.orm).await?;

    let dto = build_cart_dto(state, cart).await?;
    Ok(ApiResponse::success("OK", dto, Some(Meta::empty())))
}

pub async fn remove_item(
    state: &AppState,
    cart_id: Uuid,
    item_id: Uuid,
    owner: Option<CartOwner>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let cart = fetch_cart_scoped(state, cart_id, &owner).await?;
    let item = fetch_item(state, &cart, item_id).await?;
    item.delete(&state.orm).await?;

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
