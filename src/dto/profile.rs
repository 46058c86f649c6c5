use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::User;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileDto {
    pub user: User,
    pub mobile: String,
    pub birthdate: Option<NaiveDate>,
    pub address: String,
    pub city: String,
    pub country: String,
    /// Absolute URL of the uploaded avatar, if any.
    pub avatar: Option<String>,
    pub is_seller: bool,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateProfileRequest {
    pub mobile: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub is_seller: Option<bool>,
}
