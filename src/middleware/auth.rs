use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    error::AppError,
    policy::Role,
    services::token::{self, TOKEN_TYPE_ACCESS},
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
    pub is_seller: bool,
}

impl AuthUser {
    pub fn role(&self) -> Role {
        if self.role == "admin" {
            Role::Admin
        } else if self.is_seller {
            Role::Seller
        } else {
            Role::Customer
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Optional variant for routes that serve both guests and logged-in users.
/// A missing Authorization header resolves to `None`; a present but invalid
/// one is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn role(&self) -> Role {
        self.0.as_ref().map_or(Role::Anonymous, AuthUser::role)
    }
}

fn bearer_token(parts: &axum::http::request::Parts) -> Result<Option<String>, AppError> {
    let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    if !auth_str.starts_with("Bearer ") {
        return Err(AppError::Unauthorized);
    }
    Ok(Some(auth_str.trim_start_matches("Bearer ").trim().to_string()))
}

fn user_from_token(token: &str) -> Result<AuthUser, AppError> {
    let secret = token::jwt_secret()?;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    if decoded.claims.token_type != TOKEN_TYPE_ACCESS {
        return Err(AppError::Unauthorized);
    }

    let user_id =
        Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role.clone(),
        is_seller: decoded.claims.is_seller,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or(AppError::Unauthorized)?;
        user_from_token(&token)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            None => Ok(MaybeAuthUser(None)),
            Some(token) => Ok(MaybeAuthUser(Some(user_from_token(&token)?))),
        }
    }
}
