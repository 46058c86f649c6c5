use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let pool = create_pool(&config.database_url).await?;

    let admin_id = ensure_user(&pool, "admin", "admin@example.com", "admin123", "admin", false).await?;
    let seller_id = ensure_user(&pool, "seller", "seller@example.com", "seller123", "user", true).await?;
    ensure_user(&pool, "customer", "customer@example.com", "customer123", "user", false).await?;

    seed_taxonomy(&pool).await?;
    seed_products(&pool, seller_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, Seller ID: {seller_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
    is_seller: bool,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, is_active)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    sqlx::query(
        r#"
        INSERT INTO profiles (id, user_id, is_seller)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE SET is_seller = EXCLUDED.is_seller
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(is_seller)
    .execute(pool)
    .await?;

    println!("Ensured user {username} (role={role}, seller={is_seller})");
    Ok(user_id)
}

async fn seed_taxonomy(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = [("Apparel", "apparel"), ("Accessories", "accessories")];
    let brands = [("Ferris Wear", "ferris-wear"), ("Crab Supply", "crab-supply")];
    let tags = [("New", "new"), ("Sale", "sale")];

    for (name, slug) in categories {
        sqlx::query("INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3) ON CONFLICT (slug) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(slug)
            .execute(pool)
            .await?;
    }
    for (name, slug) in brands {
        sqlx::query("INSERT INTO brands (id, name, slug) VALUES ($1, $2, $3) ON CONFLICT (slug) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(slug)
            .execute(pool)
            .await?;
    }
    for (name, slug) in tags {
        sqlx::query("INSERT INTO tags (id, name, slug) VALUES ($1, $2, $3) ON CONFLICT (slug) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(slug)
            .execute(pool)
            .await?;
    }

    println!("Seeded taxonomy");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool, seller_id: Uuid) -> anyhow::Result<()> {
    let products: [(&str, &str, &str, i32, i32, bool); 4] = [
        ("Rust Hoodie", "Warm hoodie for Rustaceans", "55.00", 50, 0, true),
        ("Ferris Mug", "Coffee tastes better with Ferris", "12.00", 100, 25, false),
        ("Sticker Pack", "Decorate your laptop", "5.00", 200, 0, false),
        ("Async Workbook", "Practice async patterns", "25.00", 75, 10, true),
    ];

    for (title, desc, price, stock, discount, featured) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, seller_id, title, description, price, stock, discount_percent, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(seller_id)
        .bind(title)
        .bind(desc)
        .bind(price.parse::<Decimal>()?)
        .bind(stock)
        .bind(discount)
        .bind(featured)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
