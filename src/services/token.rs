use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    dto::auth::{ActionClaims, Claims, TokenPairResponse},
    error::{AppError, AppResult},
};

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

pub const PURPOSE_ACTIVATION: &str = "activation";
pub const PURPOSE_PASSWORD_RESET: &str = "password_reset";

const ACCESS_TTL_HOURS: i64 = 24;
const REFRESH_TTL_DAYS: i64 = 7;
const ACTION_TTL_HOURS: i64 = 24;

pub fn jwt_secret() -> AppResult<String> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

fn expiry(duration: Duration) -> AppResult<usize> {
    let expiration = Utc::now()
        .checked_add_signed(duration)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;
    Ok(expiration.timestamp() as usize)
}

fn encode_claims<T: serde::Serialize>(claims: &T, secret: &[u8]) -> AppResult<String> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Issue an access/refresh bearer token pair for a user.
pub fn issue_pair(
    user_id: Uuid,
    role: &str,
    is_seller: bool,
    secret: &[u8],
) -> AppResult<TokenPairResponse> {
    let access = encode_claims(
        &Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            is_seller,
            token_type: TOKEN_TYPE_ACCESS.to_string(),
            exp: expiry(Duration::hours(ACCESS_TTL_HOURS))?,
        },
        secret,
    )?;
    let refresh = encode_claims(
        &Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            is_seller,
            token_type: TOKEN_TYPE_REFRESH.to_string(),
            exp: expiry(Duration::days(REFRESH_TTL_DAYS))?,
        },
        secret,
    )?;
    Ok(TokenPairResponse { access, refresh })
}

/// Decode a refresh token, rejecting access tokens presented in its place.
pub fn verify_refresh(token: &str, secret: &[u8]) -> AppResult<Claims> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map_err(|_| AppError::BadRequest("Invalid or expired token".into()))?;

    if decoded.claims.token_type != TOKEN_TYPE_REFRESH {
        return Err(AppError::BadRequest("Invalid or expired token".into()));
    }
    Ok(decoded.claims)
}

/// Issue a single-purpose account token (activation or password reset).
/// `fingerprint` ties the token to server-side state so it cannot be
/// replayed once that state changes.
pub fn issue_action_token(
    user_id: Uuid,
    purpose: &str,
    fingerprint: Option<&str>,
    secret: &[u8],
) -> AppResult<String> {
    encode_claims(
        &ActionClaims {
            sub: user_id.to_string(),
            purpose: purpose.to_string(),
            fp: fingerprint.map(str::to_string),
            exp: expiry(Duration::hours(ACTION_TTL_HOURS))?,
        },
        secret,
    )
}

pub fn verify_action_token(token: &str, purpose: &str, secret: &[u8]) -> AppResult<ActionClaims> {
    let decoded = decode::<ActionClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map_err(|_| AppError::BadRequest("Invalid or expired link".into()))?;

    if decoded.claims.purpose != purpose {
        return Err(AppError::BadRequest("Invalid or expired link".into()));
    }
    Ok(decoded.claims)
}

/// URL-safe encoding of a user id for activation / reset links.
pub fn encode_uid(user_id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(user_id.as_bytes())
}

pub fn decode_uid(encoded: &str) -> AppResult<Uuid> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| AppError::BadRequest("Invalid or expired link".into()))?;
    Uuid::from_slice(&bytes).map_err(|_| AppError::BadRequest("Invalid or expired link".into()))
}

/// Short stable fingerprint of a password hash, kept in reset tokens so a
/// token issued before a password change stops working after it.
pub fn password_fingerprint(password_hash: &str) -> String {
    password_hash.chars().rev().take(16).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn uid_round_trips() {
        let id = Uuid::new_v4();
        assert_eq!(decode_uid(&encode_uid(id)).unwrap(), id);
        assert!(decode_uid("not-base64!").is_err());
    }

    #[test]
    fn access_token_is_not_a_refresh_token() {
        let pair = issue_pair(Uuid::new_v4(), "user", false, SECRET).unwrap();
        assert!(verify_refresh(&pair.refresh, SECRET).is_ok());
        assert!(verify_refresh(&pair.access, SECRET).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let pair = issue_pair(Uuid::new_v4(), "user", false, SECRET).unwrap();
        let mut tampered = pair.refresh.clone();
        tampered.pop();
        assert!(verify_refresh(&tampered, SECRET).is_err());
        assert!(verify_refresh(&pair.refresh, b"other-secret").is_err());
    }

    #[test]
    fn action_token_purpose_is_enforced() {
        let id = Uuid::new_v4();
        let token = issue_action_token(id, PURPOSE_ACTIVATION, None, SECRET).unwrap();
        let claims = verify_action_token(&token, PURPOSE_ACTIVATION, SECRET).unwrap();
        assert_eq!(claims.sub, id.to_string());
        assert!(verify_action_token(&token, PURPOSE_PASSWORD_RESET, SECRET).is_err());
    }

    #[test]
    fn reset_fingerprint_changes_with_hash() {
        let fp = password_fingerprint("$argon2id$v=19$m=19456,t=2,p=1$abc$hash-one");
        let other = password_fingerprint("$argon2id$v=19$m=19456,t=2,p=1$abc$hash-two");
        assert_ne!(fp, other);
    }
}
