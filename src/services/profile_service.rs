use axum::body::Bytes;
use uuid::Uuid;

use crate::{
    dto::profile::{ProfileDto, UpdateProfileRequest},
    error::{AppError, AppResult},
    models::{Profile, User},
    response::ApiResponse,
    state::AppState,
    storage,
};

async fn fetch_user(state: &AppState, user_id: Uuid) -> AppResult<User> {
    let user: Option<User> = sqlx::query_as(
        "SELECT id, username, first_name, last_name, email FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?;
    user.ok_or(AppError::NotFound)
}

/// Profiles are created lazily; accounts registered before the profile
/// table existed (or seeded directly) get one on first access.
async fn get_or_create(state: &AppState, user_id: Uuid) -> AppResult<Profile> {
    let existing: Option<Profile> =
        sqlx::query_as("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&state.pool)
            .await?;
    if let Some(profile) = existing {
        return Ok(profile);
    }

    let inserted = sqlx::query_as::<_, Profile>(
        "INSERT INTO profiles (id, user_id) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?;
    match inserted {
        Some(profile) => Ok(profile),
        // Lost a get-or-create race; the row exists now.
        None => {
            let profile: Profile = sqlx::query_as("SELECT * FROM profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&state.pool)
                .await?;
            Ok(profile)
        }
    }
}

fn to_dto(state: &AppState, user: User, profile: Profile) -> ProfileDto {
    let avatar = profile
        .avatar
        .as_deref()
        .map(|path| storage::media_url(&state.config, path));
    ProfileDto {
        user,
        mobile: profile.mobile,
        birthdate: profile.birthdate,
        address: profile.address,
        city: profile.city,
        country: profile.country,
        avatar,
        is_seller: profile.is_seller,
    }
}

pub async fn my_profile(state: &AppState, user_id: Uuid) -> AppResult<ApiResponse<ProfileDto>> {
    let user = fetch_user(state, user_id).await?;
    let profile = get_or_create(state, user_id).await?;
    Ok(ApiResponse::success("OK", to_dto(state, user, profile), None))
}

pub async fn update_profile(
    state: &AppState,
    user_id: Uuid,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<ProfileDto>> {
    let user = fetch_user(state, user_id).await?;
    let existing = get_or_create(state, user_id).await?;

    let mobile = payload.mobile.unwrap_or(existing.mobile);
    let birthdate = payload.birthdate.or(existing.birthdate);
    let address = payload.address.unwrap_or(existing.address);
    let city = payload.city.unwrap_or(existing.city);
    let country = payload.country.unwrap_or(existing.country);
    let is_seller = payload.is_seller.unwrap_or(existing.is_seller);

    let profile = sqlx::query_as::<_, Profile>(
        r#"
        UPDATE profiles
        SET mobile = $2, birthdate = $3, address = $4, city = $5, country = $6, is_seller = $7
        WHERE user_id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(mobile)
    .bind(birthdate)
    .bind(address)
    .bind(city)
    .bind(country)
    .bind(is_seller)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Updated",
        to_dto(state, user, profile),
        None,
    ))
}

pub async fn upload_avatar(
    state: &AppState,
    user_id: Uuid,
    filename: &str,
    data: Bytes,
) -> AppResult<ApiResponse<ProfileDto>> {
    let user = fetch_user(state, user_id).await?;
    let existing = get_or_create(state, user_id).await?;

    let path = storage::save_upload(&state.config, "avatars", filename, data).await?;
    if let Some(old) = existing.avatar.as_deref() {
        storage::remove_upload(&state.config, old).await;
    }

    let profile = sqlx::query_as::<_, Profile>(
        "UPDATE profiles SET avatar = $2 WHERE user_id = $1 RETURNING *",
    )
    .bind(user_id)
    .bind(path)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Avatar updated",
        to_dto(state, user, profile),
        None,
    ))
}

/// Seller-only sub-routes check the profile flag at request time, not the
/// (possibly stale) claim minted at login.
pub async fn ensure_seller(state: &AppState, user_id: Uuid) -> AppResult<()> {
    let row: Option<(bool,)> = sqlx::query_as("SELECT is_seller FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?;
    if row.is_some_and(|(s,)| s) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
