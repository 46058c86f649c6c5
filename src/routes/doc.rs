use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            LoginRequest, PasswordResetConfirmRequest, PasswordResetRequest,
            PasswordValidationRequest, PasswordValidationResponse, RefreshRequest,
            RegisterRequest, ResendActivationRequest, SocialLoginRequest, TokenPairResponse,
            UpdateMeRequest,
        },
        cart::{
            AddCartItemRequest, CartDto, CartItemDto, CartList, CreateCartRequest,
            QuantityAction, UpdateQuantityRequest,
        },
        orders::{
            CreateOrderRequest, OrderItemDto, OrderItemRequest, OrderList, OrderWithItems,
            UpdateOrderStatusRequest,
        },
        products::{ImageDto, ProductDetail, ProductList, ProductSummary},
        profile::{ProfileDto, UpdateProfileRequest},
        reviews::{CreateReviewRequest, ReviewDto, ReviewList, ReviewUser},
        taxonomy::{TaxonomyForm, TaxonomyItem, TaxonomyUpdate},
        wishlist::{AddWishlistRequest, WishlistItemDto, WishlistList},
    },
    models::{Order, OrderStatus, PaymentMethod, Profile, User, Wishlist},
    response::{ApiResponse, Meta},
    routes::{auth, carts, health, orders, params, products, taxonomy, wishlist},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::refresh,
        auth::validate_password,
        auth::activate,
        auth::resend_activation,
        auth::password_reset,
        auth::password_reset_confirm,
        auth::social_login,
        auth::me,
        auth::update_me,
        auth::my_profile,
        auth::update_profile,
        auth::upload_avatar,
        taxonomy::list_categories,
        taxonomy::create_category,
        taxonomy::get_category,
        taxonomy::update_category,
        taxonomy::delete_category,
        taxonomy::list_brands,
        taxonomy::create_brand,
        taxonomy::get_brand,
        taxonomy::update_brand,
        taxonomy::delete_brand,
        taxonomy::list_tags,
        taxonomy::create_tag,
        taxonomy::get_tag,
        taxonomy::update_tag,
        taxonomy::delete_tag,
        products::list_products,
        products::featured_products,
        products::seller_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::list_reviews,
        products::create_review,
        products::list_images,
        products::delete_image,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        carts::list_carts,
        carts::create_cart,
        carts::my_cart,
        carts::get_cart,
        carts::delete_cart,
        carts::list_items,
        carts::add_item,
        carts::update_quantity,
        carts::remove_item,
        orders::create_order,
        orders::list_orders,
        orders::seller_orders,
        orders::get_order,
        orders::update_order_status,
    ),
    components(
        schemas(
            User,
            Profile,
            Wishlist,
            Order,
            OrderStatus,
            PaymentMethod,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            TokenPairResponse,
            PasswordValidationRequest,
            PasswordValidationResponse,
            ResendActivationRequest,
            PasswordResetRequest,
            PasswordResetConfirmRequest,
            SocialLoginRequest,
            UpdateMeRequest,
            ProfileDto,
            UpdateProfileRequest,
            TaxonomyItem,
            TaxonomyForm,
            TaxonomyUpdate,
            ImageDto,
            ProductSummary,
            ProductDetail,
            ProductList,
            ReviewUser,
            ReviewDto,
            ReviewList,
            CreateReviewRequest,
            AddWishlistRequest,
            WishlistItemDto,
            WishlistList,
            CreateCartRequest,
            AddCartItemRequest,
            QuantityAction,
            UpdateQuantityRequest,
            CartItemDto,
            CartDto,
            CartList,
            OrderItemRequest,
            CreateOrderRequest,
            OrderItemDto,
            OrderWithItems,
            OrderList,
            UpdateOrderStatusRequest,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::SessionKeyQuery,
            Meta,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<CartDto>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<TokenPairResponse>,
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, activation, login and profile endpoints"),
        (name = "Taxonomy", description = "Category, brand and tag endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Reviews", description = "Product review endpoints"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Carts", description = "Cart and cart item endpoints"),
        (name = "Orders", description = "Order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> utoipa_scalar::Scalar<openapi::OpenApi> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
