use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub is_seller: Option<bool>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Bearer token claims. `token_type` distinguishes access from refresh
/// tokens so one cannot be replayed as the other.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub is_seller: bool,
    pub token_type: String,
    pub exp: usize,
}

/// Claims for single-purpose account links (activation, password reset).
/// `fp` binds a reset token to the password hash it was issued against.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ActionClaims {
    pub sub: String,
    pub purpose: String,
    #[serde(default)]
    pub fp: Option<String>,
    pub exp: usize,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct PasswordValidationRequest {
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PasswordValidationResponse {
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ResendActivationRequest {
    pub email: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct PasswordResetConfirmRequest {
    pub uid: String,
    pub token: String,
    pub new_password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SocialLoginRequest {
    /// Provider name as reported by the OAuth callback layer.
    pub provider: String,
    /// Email address already verified by the provider.
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateMeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}
