use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::taxonomy::{TaxonomyForm, TaxonomyItem, TaxonomyUpdate},
    error::AppResult,
    middleware::auth::MaybeAuthUser,
    policy::{self, Action, Resource},
    response::ApiResponse,
    services::taxonomy_service::{self, TaxonomyKind},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/brands", get(list_brands).post(create_brand))
        .route(
            "/brands/{id}",
            get(get_brand).put(update_brand).delete(delete_brand),
        )
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", get(get_tag).put(update_tag).delete(delete_tag))
}

// One resource entry per kind keeps the open taxonomy policy visible in the
// table rather than implied by a missing check.
fn resource(kind: TaxonomyKind) -> Resource {
    match kind {
        TaxonomyKind::Category => Resource::Category,
        TaxonomyKind::Brand => Resource::Brand,
        TaxonomyKind::Tag => Resource::Tag,
    }
}

async fn list(
    state: AppState,
    user: MaybeAuthUser,
    kind: TaxonomyKind,
) -> AppResult<Json<ApiResponse<Vec<TaxonomyItem>>>> {
    policy::authorize(resource(kind), Action::Read, user.role())?;
    Ok(Json(taxonomy_service::list(&state, kind).await?))
}

async fn get_one(
    state: AppState,
    user: MaybeAuthUser,
    kind: TaxonomyKind,
    id: Uuid,
) -> AppResult<Json<ApiResponse<TaxonomyItem>>> {
    policy::authorize(resource(kind), Action::Read, user.role())?;
    Ok(Json(taxonomy_service::get(&state, kind, id).await?))
}

async fn create(
    state: AppState,
    user: MaybeAuthUser,
    kind: TaxonomyKind,
    payload: TaxonomyForm,
) -> AppResult<Json<ApiResponse<TaxonomyItem>>> {
    policy::authorize(resource(kind), Action::Create, user.role())?;
    Ok(Json(taxonomy_service::create(&state, kind, payload).await?))
}

async fn update(
    state: AppState,
    user: MaybeAuthUser,
    kind: TaxonomyKind,
    id: Uuid,
    payload: TaxonomyUpdate,
) -> AppResult<Json<ApiResponse<TaxonomyItem>>> {
    policy::authorize(resource(kind), Action::Update, user.role())?;
    Ok(Json(taxonomy_service::update(&state, kind, id, payload).await?))
}

async fn delete(
    state: AppState,
    user: MaybeAuthUser,
    kind: TaxonomyKind,
    id: Uuid,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    policy::authorize(resource(kind), Action::Delete, user.role())?;
    Ok(Json(taxonomy_service::delete(&state, kind, id).await?))
}

#[utoipa::path(get, path = "/api/catalog/categories",
    responses((status = 200, description = "List categories", body = ApiResponse<Vec<TaxonomyItem>>)),
    tag = "Taxonomy")]
pub async fn list_categories(
    State(state): State<AppState>,
    user: MaybeAuthUser,
) -> AppResult<Json<ApiResponse<Vec<TaxonomyItem>>>> {
    list(state, user, TaxonomyKind::Category).await
}

#[utoipa::path(post, path = "/api/catalog/categories", request_body = TaxonomyForm,
    responses((status = 200, description = "Create category", body = ApiResponse<TaxonomyItem>)),
    tag = "Taxonomy")]
pub async fn create_category(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Json(payload): Json<TaxonomyForm>,
) -> AppResult<Json<ApiResponse<TaxonomyItem>>> {
    create(state, user, TaxonomyKind::Category, payload).await
}

#[utoipa::path(get, path = "/api/catalog/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses((status = 200, description = "Get category", body = ApiResponse<TaxonomyItem>)),
    tag = "Taxonomy")]
pub async fn get_category(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TaxonomyItem>>> {
    get_one(state, user, TaxonomyKind::Category, id).await
}

#[utoipa::path(put, path = "/api/catalog/categories/{id}", request_body = TaxonomyUpdate,
    params(("id" = Uuid, Path, description = "Category ID")),
    responses((status = 200, description = "Update category", body = ApiResponse<TaxonomyItem>)),
    tag = "Taxonomy")]
pub async fn update_category(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TaxonomyUpdate>,
) -> AppResult<Json<ApiResponse<TaxonomyItem>>> {
    update(state, user, TaxonomyKind::Category, id, payload).await
}

#[utoipa::path(delete, path = "/api/catalog/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses((status = 200, description = "Delete category")),
    tag = "Taxonomy")]
pub async fn delete_category(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    delete(state, user, TaxonomyKind::Category, id).await
}

#[utoipa::path(get, path = "/api/catalog/brands",
    responses((status = 200, description = "List brands", body = ApiResponse<Vec<TaxonomyItem>>)),
    tag = "Taxonomy")]
pub async fn list_brands(
    State(state): State<AppState>,
    user: MaybeAuthUser,
) -> AppResult<Json<ApiResponse<Vec<TaxonomyItem>>>> {
    list(state, user, TaxonomyKind::Brand).await
}

#[utoipa::path(post, path = "/api/catalog/brands", request_body = TaxonomyForm,
    responses((status = 200, description = "Create brand", body = ApiResponse<TaxonomyItem>)),
    tag = "Taxonomy")]
pub async fn create_brand(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Json(payload): Json<TaxonomyForm>,
) -> AppResult<Json<ApiResponse<TaxonomyItem>>> {
    create(state, user, TaxonomyKind::Brand, payload).await
}

#[utoipa::path(get, path = "/api/catalog/brands/{id}",
    params(("id" = Uuid, Path, description = "Brand ID")),
    responses((status = 200, description = "Get brand", body = ApiResponse<TaxonomyItem>)),
    tag = "Taxonomy")]
pub async fn get_brand(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TaxonomyItem>>> {
    get_one(state, user, TaxonomyKind::Brand, id).await
}

#[utoipa::path(put, path = "/api/catalog/brands/{id}", request_body = TaxonomyUpdate,
    params(("id" = Uuid, Path, description = "Brand ID")),
    responses((status = 200, description = "Update brand", body = ApiResponse<TaxonomyItem>)),
    tag = "Taxonomy")]
pub async fn update_brand(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TaxonomyUpdate>,
) -> AppResult<Json<ApiResponse<TaxonomyItem>>> {
    update(state, user, TaxonomyKind::Brand, id, payload).await
}

#[utoipa::path(delete, path = "/api/catalog/brands/{id}",
    params(("id" = Uuid, Path, description = "Brand ID")),
    responses((status = 200, description = "Delete brand")),
    tag = "Taxonomy")]
pub async fn delete_brand(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    delete(state, user, TaxonomyKind::Brand, id).await
}

#[utoipa::path(get, path = "/api/catalog/tags",
    responses((status = 200, description = "List tags", body = ApiResponse<Vec<TaxonomyItem>>)),
    tag = "Taxonomy")]
pub async fn list_tags(
    State(state): State<AppState>,
    user: MaybeAuthUser,
) -> AppResult<Json<ApiResponse<Vec<TaxonomyItem>>>> {
    list(state, user, TaxonomyKind::Tag).await
}

#[utoipa::path(post, path = "/api/catalog/tags", request_body = TaxonomyForm,
    responses((status = 200, description = "Create tag", body = ApiResponse<TaxonomyItem>)),
    tag = "Taxonomy")]
pub async fn create_tag(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Json(payload): Json<TaxonomyForm>,
) -> AppResult<Json<ApiResponse<TaxonomyItem>>> {
    create(state, user, TaxonomyKind::Tag, payload).await
}

#[utoipa::path(get, path = "/api/catalog/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses((status = 200, description = "Get tag", body = ApiResponse<TaxonomyItem>)),
    tag = "Taxonomy")]
pub async fn get_tag(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TaxonomyItem>>> {
    get_one(state, user, TaxonomyKind::Tag, id).await
}

#[utoipa::path(put, path = "/api/catalog/tags/{id}", request_body = TaxonomyUpdate,
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses((status = 200, description = "Update tag", body = ApiResponse<TaxonomyItem>)),
    tag = "Taxonomy")]
pub async fn update_tag(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TaxonomyUpdate>,
) -> AppResult<Json<ApiResponse<TaxonomyItem>>> {
    update(state, user, TaxonomyKind::Tag, id, payload).await
}

#[utoipa::path(delete, path = "/api/catalog/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses((status = 200, description = "Delete tag")),
    tag = "Taxonomy")]
pub async fn delete_tag(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    delete(state, user, TaxonomyKind::Tag, id).await
}
