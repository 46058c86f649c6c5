use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod carts;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod taxonomy;
pub mod wishlist;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/catalog", catalog_router())
        .nest("/orders", orders_router())
        .nest("/auth", auth::router())
}

fn catalog_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/wishlist", wishlist::router())
        .merge(taxonomy::router())
}

fn orders_router() -> Router<AppState> {
    Router::new()
        .nest("/carts", carts::router())
        .nest("/orders", orders::router())
}
