use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        CreateOrderRequest, OrderItemDto, OrderList, OrderWithItems, UpdateOrderStatusRequest,
    },
    entity::{
        cart_items::{Column as CartItemCol, Entity as CartItems},
        carts::{Column as CartCol, Entity as Carts},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    mailer,
    middleware::auth::{AuthUser, MaybeAuthUser},
    models::{Order, OrderStatus, PaymentMethod},
    pricing,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::{cart_service::CartOwner, profile_service},
    state::AppState,
};

const MIN_SHIPPING_ADDRESS_LEN: usize = 10;

fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let status = OrderStatus::parse(&model.status)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown order status {}", model.status)))?;
    let payment_method = PaymentMethod::parse(&model.payment_method).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "unknown payment method {}",
            model.payment_method
        ))
    })?;
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        session_key: model.session_key,
        shipping_address: model.shipping_address,
        payment_method,
        status,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

fn item_dto(model: OrderItemModel, titles: &HashMap<Uuid, String>) -> OrderItemDto {
    OrderItemDto {
        id: model.id,
        product_id: model.product_id,
        product_title: titles.get(&model.product_id).cloned().unwrap_or_default(),
        price: model.price,
        quantity: model.quantity,
    }
}

async fn titles_for_items<C: sea_orm::ConnectionTrait>(
    conn: &C,
    items: &[OrderItemModel],
) -> AppResult<HashMap<Uuid, String>> {
    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let titles = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p.title))
        .collect();
    Ok(titles)
}

/// Order placement. One transaction covers the order row, its item
/// snapshots and clearing the requester's cart; the confirmation email runs
/// after commit and can only ever warn. Stock is neither checked nor
/// decremented here.
pub async fn create_order(
    state: &AppState,
    user: &MaybeAuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.shipping_address.chars().count() < MIN_SHIPPING_ADDRESS_LEN {
        return Err(AppError::BadRequest(format!(
            "Ensure shipping_address has at least {MIN_SHIPPING_ADDRESS_LEN} characters."
        )));
    }
    let payment_method = PaymentMethod::parse(&payload.payment_method)
        .ok_or_else(|| AppError::BadRequest("Invalid payment method".into()))?;
    if payload.items.is_empty() {
        return Err(AppError::BadRequest(
            "Order must contain at least one item".into(),
        ));
    }
    for item in &payload.items {
        if item.quantity < 1 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".into(),
            ));
        }
    }

    let owner = CartOwner::resolve(user, payload.session_key.clone());
    let user_id = user.0.as_ref().map(|u| u.user_id);
    let session_key = match &owner {
        Some(CartOwner::Session(key)) => Some(key.clone()),
        _ => None,
    };

    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        session_key: Set(session_key),
        shipping_address: Set(payload.shipping_address.clone()),
        payment_method: Set(payment_method.as_str().to_string()),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        total: Set(Decimal::ZERO),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut total = Decimal::ZERO;
    let mut items: Vec<OrderItemModel> = Vec::with_capacity(payload.items.len());
    let mut titles: HashMap<Uuid, String> = HashMap::new();

    for requested in &payload.items {
        let product = Products::find_by_id(requested.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::BadRequest("Product not found".into()))?;

        // Snapshot of the discounted price; later product price changes
        // must not affect this order.
        let price = pricing::effective_price(product.price, product.discount_percent);
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product.id),
            price: Set(price),
            quantity: Set(requested.quantity),
        }
        .insert(&txn)
        .await?;

        total += price * Decimal::from(requested.quantity);
        titles.insert(product.id, product.title);
        items.push(item);
    }

    let mut active: OrderActive = order.into();
    active.total = Set(total.round_dp(2));
    let order = active.update(&txn).await?;

    // Clear exactly the requester's cart; other carts are never touched.
    if let Some(owner) = &owner {
        let cart_condition = match owner {
            CartOwner::User(id) => Condition::all().add(CartCol::UserId.eq(*id)),
            CartOwner::Session(key) => Condition::all().add(CartCol::SessionKey.eq(key.clone())),
        };
        let carts = Carts::find().filter(cart_condition).all(&txn).await?;
        let cart_ids: Vec<Uuid> = carts.iter().map(|c| c.id).collect();
        if !cart_ids.is_empty() {
            CartItems::delete_many()
                .filter(CartItemCol::CartId.is_in(cart_ids))
                .exec(&txn)
                .await?;
        }
    }

    txn.commit().await?;

    let email_to = match user_id {
        Some(id) => {
            let row: Option<(String,)> = sqlx::query_as("SELECT email FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&state.pool)
                .await?;
            row.map(|(email,)| email)
        }
        None => payload.email.clone(),
    };
    if let Some(email) = email_to {
        if let Err(err) = mailer::send(mailer::order_confirmation(
            &email,
            order.id,
            order.total,
            &order.shipping_address,
            payment_method.as_str(),
        )) {
            tracing::warn!(error = %err, "order confirmation email failed");
        }
    }

    let item_dtos = items.into_iter().map(|i| item_dto(i, &titles)).collect();
    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: order_from_entity(order)?,
            items: item_dtos,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?;
    let titles = titles_for_items(&state.orm, &items).await?;
    let item_dtos = items.into_iter().map(|i| item_dto(i, &titles)).collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order)?,
            items: item_dtos,
        },
        Some(Meta::empty()),
    ))
}

/// Orders that contain at least one product sold by the caller.
pub async fn seller_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderList>> {
    profile_service::ensure_seller(state, user.user_id).await?;

    let order_ids: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT oi.order_id
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE p.seller_id = $1
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    if order_ids.is_empty() {
        return Ok(ApiResponse::success(
            "Ok",
            OrderList { items: Vec::new() },
            Some(Meta::empty()),
        ));
    }

    let orders = Orders::find()
        .filter(OrderCol::Id.is_in(order_ids))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(Meta::empty()),
    ))
}

/// Status transitions are an admin operation; the enum is the only state
/// machine there is.
pub async fn update_status(
    state: &AppState,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status.as_str().to_string());
    let order = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Status updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}
