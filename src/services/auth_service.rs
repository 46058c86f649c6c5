use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    dto::auth::{
        LoginRequest, PasswordResetConfirmRequest, PasswordResetRequest,
        PasswordValidationResponse, RefreshRequest, RegisterRequest, ResendActivationRequest,
        SocialLoginRequest, TokenPairResponse, UpdateMeRequest,
    },
    error::{AppError, AppResult},
    mailer,
    models::User,
    response::{ApiResponse, Meta},
    services::token::{self, PURPOSE_ACTIVATION, PURPOSE_PASSWORD_RESET},
    state::AppState,
};

/// Full account row, used internally only; the wire `User` model never
/// carries the password hash.
#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    role: String,
    is_active: bool,
}

const ACCOUNT_COLUMNS: &str =
    "id, username, first_name, last_name, email, password_hash, role, is_active";

fn public_user(row: &AccountRow) -> User {
    User {
        id: row.id,
        username: row.username.clone(),
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        email: row.email.clone(),
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string())
}

fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Password strength rules. Collects every failed reason instead of
/// stopping at the first so the client can show them all at once.
pub fn password_errors(password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long.".to_string());
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("Password cannot be only numbers.".to_string());
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        errors.push("Password must contain at least one uppercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        errors.push("Password must contain at least one lowercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one number.".to_string());
    }
    errors
}

pub fn validate_password(password: &str) -> ApiResponse<PasswordValidationResponse> {
    let errors = password_errors(password);
    ApiResponse::success(
        "OK",
        PasswordValidationResponse {
            valid: errors.is_empty(),
            errors,
        },
        None,
    )
}

async fn find_account(state: &AppState, by: &str, value: &str) -> AppResult<Option<AccountRow>> {
    let query = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE {by} = $1");
    let row = sqlx::query_as::<_, AccountRow>(&query)
        .bind(value)
        .fetch_optional(&state.pool)
        .await?;
    Ok(row)
}

async fn find_account_by_id(state: &AppState, id: Uuid) -> AppResult<Option<AccountRow>> {
    let query = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");
    let row = sqlx::query_as::<_, AccountRow>(&query)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    Ok(row)
}

async fn is_seller(state: &AppState, user_id: Uuid) -> AppResult<bool> {
    let row: Option<(bool,)> =
        sqlx::query_as("SELECT is_seller FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&state.pool)
            .await?;
    Ok(row.is_some_and(|(s,)| s))
}

fn send_activation_email(state: &AppState, user_id: Uuid, email: &str) -> AppResult<()> {
    let secret = token::jwt_secret()?;
    let activation =
        token::issue_action_token(user_id, PURPOSE_ACTIVATION, None, secret.as_bytes())?;
    mailer::send(mailer::activation(
        email,
        &state.config.site_domain,
        &token::encode_uid(user_id),
        &activation,
    ))
}

/// Registration creates an inactive user plus profile in one transaction;
/// the account only becomes usable after the emailed activation link is
/// followed.
pub async fn register(state: &AppState, payload: RegisterRequest) -> AppResult<ApiResponse<User>> {
    if payload.password != payload.confirm_password {
        return Err(AppError::BadRequest("Passwords do not match.".to_string()));
    }
    let errors = password_errors(&payload.password);
    if !errors.is_empty() {
        return Err(AppError::BadRequest(errors.join(" ")));
    }

    let username_taken: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = $1")
            .bind(payload.username.as_str())
            .fetch_optional(&state.pool)
            .await?;
    if username_taken.is_some() {
        return Err(AppError::BadRequest("Username is already taken".to_string()));
    }
    let email_taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(payload.email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if email_taken.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let id = Uuid::new_v4();

    let mut tx = state.pool.begin().await?;
    let query = format!(
        "INSERT INTO users (id, username, email, password_hash, first_name, last_name, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, FALSE) RETURNING {ACCOUNT_COLUMNS}"
    );
    let user = sqlx::query_as::<_, AccountRow>(&query)
        .bind(id)
        .bind(payload.username.as_str())
        .bind(payload.email.as_str())
        .bind(password_hash)
        .bind(payload.first_name.as_str())
        .bind(payload.last_name.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_sqlx(e, "Username or email is already taken"))?;

    sqlx::query(
        "INSERT INTO profiles (id, user_id, mobile, is_seller) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(payload.mobile.unwrap_or_default())
    .bind(payload.is_seller.unwrap_or(false))
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    if let Err(err) = send_activation_email(state, user.id, &user.email) {
        tracing::warn!(error = %err, "activation email failed");
    }

    Ok(ApiResponse::success(
        "User created",
        public_user(&user),
        None,
    ))
}

pub async fn login(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<TokenPairResponse>> {
    let LoginRequest { username, password } = payload;
    let user = find_account(state, "username", &username).await?;

    // One generic message for unknown users, wrong passwords and inactive
    // accounts; nothing here may reveal which of them it was.
    let invalid =
        || AppError::BadRequest("No active account found with the given credentials".into());

    let user = user.ok_or_else(invalid)?;
    if !verify_password(&password, &user.password_hash)? {
        return Err(invalid());
    }
    if !user.is_active {
        return Err(invalid());
    }

    let seller = is_seller(state, user.id).await?;
    let secret = token::jwt_secret()?;
    let pair = token::issue_pair(user.id, &user.role, seller, secret.as_bytes())?;

    Ok(ApiResponse::success("Logged in", pair, Some(Meta::empty())))
}

pub async fn refresh(
    state: &AppState,
    payload: RefreshRequest,
) -> AppResult<ApiResponse<TokenPairResponse>> {
    let secret = token::jwt_secret()?;
    let claims = token::verify_refresh(&payload.refresh, secret.as_bytes())?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::BadRequest("Invalid or expired token".into()))?;

    let user = find_account_by_id(state, user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::BadRequest("Invalid or expired token".into()))?;

    let seller = is_seller(state, user.id).await?;
    let pair = token::issue_pair(user.id, &user.role, seller, secret.as_bytes())?;
    Ok(ApiResponse::success(
        "Token refreshed",
        pair,
        Some(Meta::empty()),
    ))
}

/// Activation flips `is_active` exactly once. An already-active account is
/// indistinguishable from a bad token on the wire.
pub async fn activate(
    state: &AppState,
    uidb64: &str,
    activation_token: &str,
) -> AppResult<ApiResponse<TokenPairResponse>> {
    let invalid = || AppError::BadRequest("Invalid activation link.".into());

    let user_id = token::decode_uid(uidb64).map_err(|_| invalid())?;
    let secret = token::jwt_secret()?;
    let claims = token::verify_action_token(activation_token, PURPOSE_ACTIVATION, secret.as_bytes())
        .map_err(|_| invalid())?;
    if claims.sub != user_id.to_string() {
        return Err(invalid());
    }

    let user = find_account_by_id(state, user_id).await?.ok_or_else(invalid)?;
    if user.is_active {
        return Err(invalid());
    }

    sqlx::query("UPDATE users SET is_active = TRUE WHERE id = $1")
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    if let Err(err) = mailer::send(mailer::welcome(&user.email)) {
        tracing::warn!(error = %err, "welcome email failed");
    }

    let seller = is_seller(state, user.id).await?;
    let pair = token::issue_pair(user.id, &user.role, seller, secret.as_bytes())?;
    Ok(ApiResponse::success(
        "Account activated successfully.",
        pair,
        Some(Meta::empty()),
    ))
}

pub async fn resend_activation(
    state: &AppState,
    payload: ResendActivationRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user = find_account(state, "email", &payload.email)
        .await?
        .filter(|u| !u.is_active)
        .ok_or_else(|| AppError::NotFound)?;

    if let Err(err) = send_activation_email(state, user.id, &user.email) {
        tracing::warn!(error = %err, "activation email failed");
    }

    Ok(ApiResponse::success(
        "Activation email resent.",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Always answers 200 with the same message so the endpoint cannot be used
/// to probe which emails have accounts.
pub async fn request_password_reset(
    state: &AppState,
    payload: PasswordResetRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if let Some(user) = find_account(state, "email", &payload.email).await? {
        let secret = token::jwt_secret()?;
        let fingerprint = token::password_fingerprint(&user.password_hash);
        let reset = token::issue_action_token(
            user.id,
            PURPOSE_PASSWORD_RESET,
            Some(&fingerprint),
            secret.as_bytes(),
        )?;
        if let Err(err) = mailer::send(mailer::password_reset(
            &user.email,
            &state.config.site_domain,
            &token::encode_uid(user.id),
            &reset,
        )) {
            tracing::warn!(error = %err, "password reset email failed");
        }
    }

    Ok(ApiResponse::success(
        "If the email exists, a reset link has been sent.",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn confirm_password_reset(
    state: &AppState,
    payload: PasswordResetConfirmRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let invalid = || AppError::BadRequest("Invalid or expired link".into());

    let user_id = token::decode_uid(&payload.uid)?;
    let secret = token::jwt_secret()?;
    let claims =
        token::verify_action_token(&payload.token, PURPOSE_PASSWORD_RESET, secret.as_bytes())?;
    if claims.sub != user_id.to_string() {
        return Err(invalid());
    }

    let user = find_account_by_id(state, user_id).await?.ok_or_else(invalid)?;

    // The fingerprint pins the token to the hash it was issued against, so
    // a reset link dies as soon as the password changes.
    let fingerprint = token::password_fingerprint(&user.password_hash);
    if claims.fp.as_deref() != Some(fingerprint.as_str()) {
        return Err(invalid());
    }

    let errors = password_errors(&payload.new_password);
    if !errors.is_empty() {
        return Err(AppError::BadRequest(errors.join(" ")));
    }

    let password_hash = hash_password(&payload.new_password)?;
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(user.id)
        .bind(password_hash)
        .execute(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "Password has been reset.",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Exchange a provider-verified identity for a bearer token pair. The OAuth
/// handshake itself happens upstream; by the time this runs the email has
/// been verified by the provider, so first logins create an active account.
pub async fn social_login(
    state: &AppState,
    payload: SocialLoginRequest,
) -> AppResult<ApiResponse<TokenPairResponse>> {
    if payload.email.is_empty() {
        return Err(AppError::BadRequest("Email is required.".into()));
    }

    let user = match find_account(state, "email", &payload.email).await? {
        Some(user) => user,
        None => {
            let username = payload
                .username
                .clone()
                .unwrap_or_else(|| payload.email.clone());
            // Social accounts get an unusable random password; password
            // login stays closed until they reset it.
            let password_hash = hash_password(&Uuid::new_v4().to_string())?;
            let id = Uuid::new_v4();

            let mut tx = state.pool.begin().await?;
            let query = format!(
                "INSERT INTO users (id, username, email, password_hash, first_name, last_name, is_active) \
                 VALUES ($1, $2, $3, $4, $5, $6, TRUE) RETURNING {ACCOUNT_COLUMNS}"
            );
            let user = sqlx::query_as::<_, AccountRow>(&query)
                .bind(id)
                .bind(username)
                .bind(payload.email.as_str())
                .bind(password_hash)
                .bind(payload.first_name.clone().unwrap_or_default())
                .bind(payload.last_name.clone().unwrap_or_default())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| AppError::from_sqlx(e, "Username is already taken"))?;
            sqlx::query("INSERT INTO profiles (id, user_id) VALUES ($1, $2)")
                .bind(Uuid::new_v4())
                .bind(user.id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            tracing::info!(provider = %payload.provider, user_id = %user.id, "social signup");
            user
        }
    };

    let seller = is_seller(state, user.id).await?;
    let secret = token::jwt_secret()?;
    let pair = token::issue_pair(user.id, &user.role, seller, secret.as_bytes())?;
    Ok(ApiResponse::success("Logged in", pair, Some(Meta::empty())))
}

pub async fn me(state: &AppState, user_id: Uuid) -> AppResult<ApiResponse<User>> {
    let user = find_account_by_id(state, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", public_user(&user), None))
}

pub async fn update_me(
    state: &AppState,
    user_id: Uuid,
    payload: UpdateMeRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = find_account_by_id(state, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let first_name = payload.first_name.unwrap_or(existing.first_name);
    let last_name = payload.last_name.unwrap_or(existing.last_name);
    let email = payload.email.unwrap_or(existing.email);

    let query = format!(
        "UPDATE users SET first_name = $2, last_name = $3, email = $4 WHERE id = $1 \
         RETURNING {ACCOUNT_COLUMNS}"
    );
    let user = sqlx::query_as::<_, AccountRow>(&query)
        .bind(user_id)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .fetch_one(&state.pool)
        .await
        .map_err(|e| AppError::from_sqlx(e, "Email is already taken"))?;

    Ok(ApiResponse::success("Updated", public_user(&user), None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_password_passes() {
        assert!(password_errors("Str0ngEnough").is_empty());
    }

    #[test]
    fn weak_passwords_collect_every_reason() {
        let errors = password_errors("1234567");
        assert!(errors.iter().any(|e| e.contains("8 characters")));
        assert!(errors.iter().any(|e| e.contains("only numbers")));
        assert!(errors.iter().any(|e| e.contains("uppercase")));
        assert!(errors.iter().any(|e| e.contains("lowercase")));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn missing_digit_is_reported() {
        let errors = password_errors("NoDigitsHere");
        assert_eq!(errors, vec!["Password must contain at least one number.".to_string()]);
    }

    #[test]
    fn validate_password_never_errors() {
        let resp = validate_password("");
        let data = resp.data.unwrap();
        assert!(!data.valid);
        assert!(!data.errors.is_empty());
    }
}
