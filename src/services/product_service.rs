use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::products::{ImageDto, ProductDetail, ProductForm, ProductList, ProductSummary},
    entity::{
        brands::{Column as BrandCol, Entity as Brands},
        categories::{Column as CategoryCol, Entity as Categories},
        product_images::{ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages},
        product_tags::{ActiveModel as ProductTagActive, Column as ProductTagCol, Entity as ProductTags},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products, Model as ProductModel},
        tags::{Column as TagCol, Entity as Tags},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{Pagination, ProductQuery},
    services::{profile_service, review_service},
    state::AppState,
    storage,
};

/// Assemble wire summaries for a page of products, batching the seller,
/// taxonomy, tag and image lookups instead of hitting the store per row.
pub async fn build_summaries(
    state: &AppState,
    products: Vec<ProductModel>,
) -> AppResult<Vec<ProductSummary>> {
    if products.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let seller_ids: Vec<Uuid> = products.iter().map(|p| p.seller_id).collect();
    let category_ids: Vec<Uuid> = products.iter().filter_map(|p| p.category_id).collect();
    let brand_ids: Vec<Uuid> = products.iter().filter_map(|p| p.brand_id).collect();

    let sellers: HashMap<Uuid, String> = Users::find()
        .filter(UserCol::Id.is_in(seller_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let categories: HashMap<Uuid, String> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        Categories::find()
            .filter(CategoryCol::Id.is_in(category_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|c| (c.id, c.slug))
            .collect()
    };

    let brands: HashMap<Uuid, String> = if brand_ids.is_empty() {
        HashMap::new()
    } else {
        Brands::find()
            .filter(BrandCol::Id.is_in(brand_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|b| (b.id, b.slug))
            .collect()
    };

    let links = ProductTags::find()
        .filter(ProductTagCol::ProductId.is_in(product_ids.clone()))
        .all(&state.orm)
        .await?;
    let tag_ids: Vec<Uuid> = links.iter().map(|l| l.tag_id).collect();
    let tag_slugs: HashMap<Uuid, String> = if tag_ids.is_empty() {
        HashMap::new()
    } else {
        Tags::find()
            .filter(TagCol::Id.is_in(tag_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|t| (t.id, t.slug))
            .collect()
    };
    let mut tags_by_product: HashMap<Uuid, Vec<String>> = HashMap::new();
    for link in &links {
        if let Some(slug) = tag_slugs.get(&link.tag_id) {
            tags_by_product
                .entry(link.product_id)
                .or_default()
                .push(slug.clone());
        }
    }

    let mut images_by_product: HashMap<Uuid, Vec<ImageDto>> = HashMap::new();
    for image in ProductImages::find()
        .filter(ImageCol::ProductId.is_in(product_ids))
        .all(&state.orm)
        .await?
    {
        images_by_product
            .entry(image.product_id)
            .or_default()
            .push(ImageDto {
                id: image.id,
                image: storage::media_url(&state.config, &image.image),
            });
    }

    Ok(products
        .into_iter()
        .map(|p| ProductSummary {
            id: p.id,
            seller: sellers.get(&p.seller_id).cloned().unwrap_or_default(),
            title: p.title,
            description: p.description,
            final_price: pricing::effective_price(p.price, p.discount_percent),
            price: p.price,
            stock: p.stock,
            discount_percent: p.discount_percent,
            featured: p.featured,
            category: p.category_id.and_then(|id| categories.get(&id).cloned()),
            brand: p.brand_id.and_then(|id| brands.get(&id).cloned()),
            tags: tags_by_product.remove(&p.id).unwrap_or_default(),
            images: images_by_product.remove(&p.id).unwrap_or_default(),
            created_at: p.created_at.with_timezone(&Utc),
        })
        .collect())
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ProdCol::Title).ilike(pattern.clone()))
                .add(Expr::col(ProdCol::Description).ilike(pattern)),
        );
    }

    if let Some(slug) = query.category.as_ref().filter(|s| !s.is_empty()) {
        let category = Categories::find()
            .filter(CategoryCol::Slug.eq(slug.clone()))
            .one(&state.orm)
            .await?;
        match category {
            Some(c) => condition = condition.add(ProdCol::CategoryId.eq(c.id)),
            // Unknown category slug matches nothing, same as an empty filter result.
            None => {
                return Ok(ApiResponse::success(
                    "Products",
                    ProductList { items: Vec::new() },
                    Some(Meta::new(page, limit, 0)),
                ));
            }
        }
    }

    if let Some(brand_id) = query.brand {
        condition = condition.add(ProdCol::BrandId.eq(brand_id));
    }

    if let Some(tag_id) = query.tag {
        condition = condition.add(
            ProdCol::Id.in_subquery(
                SeaQuery::select()
                    .column(ProductTagCol::ProductId)
                    .from(ProductTags)
                    .and_where(ProductTagCol::TagId.eq(tag_id))
                    .to_owned(),
            ),
        );
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let products = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = build_summaries(state, products).await?;
    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn featured_products(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Products::find()
        .filter(ProdCol::Featured.eq(true))
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let products = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = build_summaries(state, products).await?;
    Ok(ApiResponse::success(
        "Featured products",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn seller_products(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    profile_service::ensure_seller(state, user.user_id).await?;

    let (page, limit, offset) = pagination.normalize();
    let finder = Products::find()
        .filter(ProdCol::SellerId.eq(user.user_id))
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let products = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = build_summaries(state, products).await?;
    Ok(ApiResponse::success(
        "Seller products",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let detail = build_detail(state, product).await?;
    Ok(ApiResponse::success("Product", detail, None))
}

async fn build_detail(state: &AppState, product: ProductModel) -> AppResult<ProductDetail> {
    let id = product.id;
    let mut summaries = build_summaries(state, vec![product]).await?;
    let reviews = review_service::reviews_for_product(state, id).await?;
    Ok(ProductDetail {
        product: summaries.remove(0),
        reviews,
    })
}

async fn resolve_category(state: &AppState, slug: &str) -> AppResult<Uuid> {
    Categories::find()
        .filter(CategoryCol::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown category: {slug}")))
}

async fn resolve_brand(state: &AppState, slug: &str) -> AppResult<Uuid> {
    Brands::find()
        .filter(BrandCol::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .map(|b| b.id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown brand: {slug}")))
}

async fn resolve_tags(state: &AppState, slugs: &[String]) -> AppResult<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let tag = Tags::find()
            .filter(TagCol::Slug.eq(slug.clone()))
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Unknown tag: {slug}")))?;
        ids.push(tag.id);
    }
    Ok(ids)
}

async fn attach_images(
    state: &AppState,
    product_id: Uuid,
    images: Vec<(String, axum::body::Bytes)>,
) -> AppResult<()> {
    for (filename, data) in images {
        let path = storage::save_upload(&state.config, "products", &filename, data).await?;
        ImageActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            image: Set(path),
        }
        .insert(&state.orm)
        .await?;
    }
    Ok(())
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    form: ProductForm,
) -> AppResult<ApiResponse<ProductDetail>> {
    let title = form
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("title is required".into()))?;
    let description = form
        .description
        .ok_or_else(|| AppError::BadRequest("description is required".into()))?;
    let price = form
        .price
        .ok_or_else(|| AppError::BadRequest("price is required".into()))?;
    if price.is_sign_negative() {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    let stock = form.stock.unwrap_or(0);
    if stock < 0 {
        return Err(AppError::BadRequest("stock must not be negative".into()));
    }

    let category_id = match form.category.as_deref() {
        Some(slug) if !slug.is_empty() => Some(resolve_category(state, slug).await?),
        _ => None,
    };
    let brand_id = match form.brand.as_deref() {
        Some(slug) if !slug.is_empty() => Some(resolve_brand(state, slug).await?),
        _ => None,
    };
    let tag_ids = resolve_tags(state, &form.tags).await?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        seller_id: Set(user.user_id),
        title: Set(title),
        description: Set(description),
        price: Set(price.round_dp(2)),
        stock: Set(stock),
        discount_percent: Set(form.discount_percent.unwrap_or(0)),
        featured: Set(form.featured.unwrap_or(false)),
        is_approved: Set(true),
        category_id: Set(category_id),
        brand_id: Set(brand_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    for tag_id in tag_ids {
        ProductTagActive {
            product_id: Set(product.id),
            tag_id: Set(tag_id),
        }
        .insert(&state.orm)
        .await?;
    }

    attach_images(state, product.id, form.images).await?;

    let detail = build_detail(state, product).await?;
    Ok(ApiResponse::success(
        "Product created",
        detail,
        Some(Meta::empty()),
    ))
}

fn ensure_owner(product: &ProductModel, user: &AuthUser) -> AppResult<()> {
    if product.seller_id != user.user_id && !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    form: ProductForm,
) -> AppResult<ApiResponse<ProductDetail>> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner(&existing, user)?;

    let category_id = match form.category.as_deref() {
        Some(slug) if !slug.is_empty() => Some(resolve_category(state, slug).await?),
        _ => existing.category_id,
    };
    let brand_id = match form.brand.as_deref() {
        Some(slug) if !slug.is_empty() => Some(resolve_brand(state, slug).await?),
        _ => existing.brand_id,
    };
    let replacement_tags = if form.tags.is_empty() {
        None
    } else {
        Some(resolve_tags(state, &form.tags).await?)
    };

    if let Some(price) = form.price {
        if price.is_sign_negative() {
            return Err(AppError::BadRequest("price must not be negative".into()));
        }
    }
    if form.stock.is_some_and(|s| s < 0) {
        return Err(AppError::BadRequest("stock must not be negative".into()));
    }

    let product_id = existing.id;
    let mut active: ProductActive = existing.clone().into();
    if let Some(title) = form.title {
        active.title = Set(title);
    }
    if let Some(description) = form.description {
        active.description = Set(description);
    }
    if let Some(price) = form.price {
        active.price = Set(price.round_dp(2));
    }
    if let Some(stock) = form.stock {
        active.stock = Set(stock);
    }
    if let Some(discount) = form.discount_percent {
        active.discount_percent = Set(discount);
    }
    if let Some(featured) = form.featured {
        active.featured = Set(featured);
    }
    active.category_id = Set(category_id);
    active.brand_id = Set(brand_id);
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    if let Some(tag_ids) = replacement_tags {
        ProductTags::delete_many()
            .filter(ProductTagCol::ProductId.eq(product_id))
            .exec(&state.orm)
            .await?;
        for tag_id in tag_ids {
            ProductTagActive {
                product_id: Set(product_id),
                tag_id: Set(tag_id),
            }
            .insert(&state.orm)
            .await?;
        }
    }

    // New uploads are appended; existing images stay untouched.
    attach_images(state, product_id, form.images).await?;

    let detail = build_detail(state, product).await?;
    Ok(ApiResponse::success("Updated", detail, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner(&existing, user)?;

    let images = ProductImages::find()
        .filter(ImageCol::ProductId.eq(id))
        .all(&state.orm)
        .await?;

    existing
        .delete(&state.orm)
        .await
        .map_err(|e| AppError::from_orm(e, "Product has been ordered and cannot be deleted"))?;

    for image in images {
        storage::remove_upload(&state.config, &image.image).await;
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_images(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<Vec<ImageDto>>> {
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let images = ProductImages::find()
        .filter(ImageCol::ProductId.eq(product_id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|image| ImageDto {
            id: image.id,
            image: storage::media_url(&state.config, &image.image),
        })
        .collect();

    Ok(ApiResponse::success("Images", images, None))
}

pub async fn delete_image(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    image_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner(&product, user)?;

    let image = ProductImages::find_by_id(image_id)
        .filter(ImageCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let path = image.image.clone();
    image.delete(&state.orm).await?;
    storage::remove_upload(&state.config, &path).await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
