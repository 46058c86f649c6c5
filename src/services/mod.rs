pub mod auth_service;
pub mod cart_service;
pub mod order_service;
pub mod product_service;
pub mod profile_service;
pub mod review_service;
pub mod taxonomy_service;
pub mod token;
pub mod wishlist_service;
