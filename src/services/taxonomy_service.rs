use uuid::Uuid;

use crate::{
    dto::taxonomy::{TaxonomyForm, TaxonomyItem, TaxonomyUpdate},
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Categories, brands and tags share one shape and one set of queries; only
/// the table differs.
#[derive(Debug, Clone, Copy)]
pub enum TaxonomyKind {
    Category,
    Brand,
    Tag,
}

impl TaxonomyKind {
    fn table(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "categories",
            TaxonomyKind::Brand => "brands",
            TaxonomyKind::Tag => "tags",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "Category",
            TaxonomyKind::Brand => "Brand",
            TaxonomyKind::Tag => "Tag",
        }
    }
}

pub async fn list(state: &AppState, kind: TaxonomyKind) -> AppResult<ApiResponse<Vec<TaxonomyItem>>> {
    let query = format!("SELECT id, name, slug FROM {} ORDER BY name", kind.table());
    let items = sqlx::query_as::<_, TaxonomyItem>(&query)
        .fetch_all(&state.pool)
        .await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        kind.label(),
        items,
        Some(Meta::new(1, total.max(1), total)),
    ))
}

pub async fn get(
    state: &AppState,
    kind: TaxonomyKind,
    id: Uuid,
) -> AppResult<ApiResponse<TaxonomyItem>> {
    let query = format!("SELECT id, name, slug FROM {} WHERE id = $1", kind.table());
    let row = sqlx::query_as::<_, TaxonomyItem>(&query)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    match row {
        Some(item) => Ok(ApiResponse::success(kind.label(), item, None)),
        None => Err(AppError::NotFound),
    }
}

pub async fn create(
    state: &AppState,
    kind: TaxonomyKind,
    payload: TaxonomyForm,
) -> AppResult<ApiResponse<TaxonomyItem>> {
    if payload.name.trim().is_empty() || payload.slug.trim().is_empty() {
        return Err(AppError::BadRequest("name and slug are required".into()));
    }
    let query = format!(
        "INSERT INTO {} (id, name, slug) VALUES ($1, $2, $3) RETURNING id, name, slug",
        kind.table()
    );
    let row = sqlx::query_as::<_, TaxonomyItem>(&query)
        .bind(Uuid::new_v4())
        .bind(payload.name.trim())
        .bind(payload.slug.trim())
        .fetch_one(&state.pool)
        .await
        .map_err(|e| AppError::from_sqlx(e, "name or slug already exists"))?;

    Ok(ApiResponse::success(
        format!("{} created", kind.label()),
        row,
        Some(Meta::empty()),
    ))
}

pub async fn update(
    state: &AppState,
    kind: TaxonomyKind,
    id: Uuid,
    payload: TaxonomyUpdate,
) -> AppResult<ApiResponse<TaxonomyItem>> {
    let select = format!("SELECT id, name, slug FROM {} WHERE id = $1", kind.table());
    let existing = sqlx::query_as::<_, TaxonomyItem>(&select)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let existing = match existing {
        Some(row) => row,
        None => return Err(AppError::NotFound),
    };

    let name = payload.name.unwrap_or(existing.name);
    let slug = payload.slug.unwrap_or(existing.slug);

    let query = format!(
        "UPDATE {} SET name = $2, slug = $3 WHERE id = $1 RETURNING id, name, slug",
        kind.table()
    );
    let row = sqlx::query_as::<_, TaxonomyItem>(&query)
        .bind(id)
        .bind(name)
        .bind(slug)
        .fetch_one(&state.pool)
        .await
        .map_err(|e| AppError::from_sqlx(e, "name or slug already exists"))?;

    Ok(ApiResponse::success("Updated", row, Some(Meta::empty())))
}

pub async fn delete(
    state: &AppState,
    kind: TaxonomyKind,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let query = format!("DELETE FROM {} WHERE id = $1", kind.table());
    let result = sqlx::query(&query).bind(id).execute(&state.pool).await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
