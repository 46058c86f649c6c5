use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Categories, brands and tags all share this shape on the wire.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct TaxonomyItem {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct TaxonomyForm {
    pub name: String,
    pub slug: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct TaxonomyUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
}
