use axum_storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        cart::{AddCartItemRequest, QuantityAction, UpdateQuantityRequest},
        orders::{CreateOrderRequest, OrderItemRequest},
        reviews::CreateReviewRequest,
    },
    entity::{
        products::ActiveModel as ProductActive, profiles::ActiveModel as ProfileActive,
        users::ActiveModel as UserActive,
    },
    middleware::auth::{AuthUser, MaybeAuthUser},
    services::{cart_service, cart_service::CartOwner, order_service, review_service},
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

// Integration flow: discounted products in a cart -> order placement with
// price snapshots -> cart cleared; quantity floor and duplicate review
// rejection along the way.
#[tokio::test]
async fn checkout_snapshots_prices_and_clears_the_right_cart() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let seller_id = create_user(&state, "flow_seller", "flow_seller@example.com", true).await?;
    let customer_id =
        create_user(&state, "flow_customer", "flow_customer@example.com", false).await?;

    // price = 100.00, discount 25% -> effective 75.00
    let first = create_product(&state, seller_id, "Discounted Widget", "100.00", 25).await?;
    let second = create_product(&state, seller_id, "Discounted Gadget", "100.00", 25).await?;

    let auth = AuthUser {
        user_id: customer_id,
        role: "user".into(),
        is_seller: false,
    };
    let owner = CartOwner::User(customer_id);

    let cart = cart_service::get_or_create_cart(&state, &owner).await?;
    cart_service::add_item(
        &state,
        cart.id,
        Some(owner.clone()),
        AddCartItemRequest {
            product_id: first.id,
            quantity: 3,
        },
    )
    .await?;
    cart_service::add_item(
        &state,
        cart.id,
        Some(owner.clone()),
        AddCartItemRequest {
            product_id: second.id,
            quantity: 1,
        },
    )
    .await?;

    // 75.00 * 3 + 75.00 * 1 = 300.00
    let my = cart_service::my_cart(&state, Some(owner.clone())).await?;
    let my = my.data.unwrap();
    assert_eq!(my.subtotal, dec("300.00"));
    assert_eq!(my.items.len(), 2);
    assert!(my.items.iter().all(|i| i.product.final_price == dec("75.00")));

    // A guest cart with its own item must survive the customer's checkout.
    let guest_owner = CartOwner::Session("guest-session-1".into());
    let guest_cart = cart_service::get_or_create_cart(&state, &guest_owner).await?;
    cart_service::add_item(
        &state,
        guest_cart.id,
        Some(guest_owner.clone()),
        AddCartItemRequest {
            product_id: first.id,
            quantity: 2,
        },
    )
    .await?;

    let requester = MaybeAuthUser(Some(auth.clone()));

    // Too-short shipping address is rejected before anything is written.
    let rejected = order_service::create_order(
        &state,
        &requester,
        CreateOrderRequest {
            shipping_address: "short".into(),
            payment_method: "COD".into(),
            items: vec![OrderItemRequest {
                product_id: first.id,
                quantity: 1,
            }],
            session_key: None,
            email: None,
        },
    )
    .await;
    assert!(rejected.is_err());

    let placed = order_service::create_order(
        &state,
        &requester,
        CreateOrderRequest {
            shipping_address: "1 Example Street, Springfield".into(),
            payment_method: "COD".into(),
            items: vec![
                OrderItemRequest {
                    product_id: first.id,
                    quantity: 3,
                },
                OrderItemRequest {
                    product_id: second.id,
                    quantity: 1,
                },
            ],
            session_key: None,
            email: None,
        },
    )
    .await?;
    let placed = placed.data.unwrap();
    assert_eq!(placed.order.total, dec("300.00"));
    assert_eq!(placed.items.len(), 2);
    assert!(placed.items.iter().all(|i| i.price == dec("75.00")));

    // The customer's cart is empty; the guest cart is untouched.
    let my = cart_service::my_cart(&state, Some(owner.clone())).await?;
    assert!(my.data.unwrap().items.is_empty());
    let guest = cart_service::my_cart(&state, Some(guest_owner.clone())).await?;
    assert_eq!(guest.data.unwrap().items.len(), 1);

    // A later price change must not touch the snapshot.
    let mut active: ProductActive = first.clone().into();
    active.price = Set(dec("999.99"));
    active.update(&state.orm).await?;
    let reread = order_service::get_order(&state, &auth, placed.order.id).await?;
    assert!(
        reread
            .data
            .unwrap()
            .items
            .iter()
            .all(|i| i.price == dec("75.00"))
    );

    // Decrease by more than the current quantity floors at 1.
    let refill = cart_service::add_item(
        &state,
        cart.id,
        Some(owner.clone()),
        AddCartItemRequest {
            product_id: first.id,
            quantity: 2,
        },
    )
    .await?;
    let item_id = refill.data.unwrap().items[0].id;
    let adjusted = cart_service::update_quantity(
        &state,
        cart.id,
        item_id,
        Some(owner.clone()),
        UpdateQuantityRequest {
            action: QuantityAction::Decrease,
            quantity: Some(5),
        },
    )
    .await?;
    assert_eq!(adjusted.data.unwrap().items[0].quantity, 1);

    // One review per (product, user); the second attempt loses.
    review_service::create_review(
        &state,
        customer_id,
        first.id,
        CreateReviewRequest {
            rating: 5,
            comment: Some("Great widget".into()),
        },
    )
    .await?;
    let duplicate = review_service::create_review(
        &state,
        customer_id,
        first.id,
        CreateReviewRequest {
            rating: 1,
            comment: None,
        },
    )
    .await;
    assert!(duplicate.is_err());

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(database_url).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, cart_items, carts, wishlists, reviews, \
         product_tags, product_images, products, profiles, users, categories, brands, tags \
         RESTART IDENTITY CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        site_domain: "localhost:3000".to_string(),
        media_root: "target/test-media".to_string(),
        media_url: "/media".to_string(),
    };

    Ok(AppState { pool, orm, config })
}

async fn create_user(
    state: &AppState,
    username: &str,
    email: &str,
    is_seller: bool,
) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        role: Set("user".into()),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    ProfileActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        mobile: NotSet,
        birthdate: NotSet,
        address: NotSet,
        city: NotSet,
        country: NotSet,
        avatar: NotSet,
        is_seller: Set(is_seller),
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn create_product(
    state: &AppState,
    seller_id: Uuid,
    title: &str,
    price: &str,
    discount_percent: i32,
) -> anyhow::Result<axum_storefront_api::entity::products::Model> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        seller_id: Set(seller_id),
        title: Set(title.to_string()),
        description: Set("A product for testing".into()),
        price: Set(dec(price)),
        stock: Set(10),
        discount_percent: Set(discount_percent),
        featured: Set(false),
        is_approved: Set(true),
        category_id: Set(None),
        brand_id: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product)
}
