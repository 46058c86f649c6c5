use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{get, post},
};

use crate::{
    dto::{
        auth::{
            LoginRequest, PasswordResetConfirmRequest, PasswordResetRequest,
            PasswordValidationRequest, PasswordValidationResponse, RefreshRequest,
            RegisterRequest, ResendActivationRequest, SocialLoginRequest, TokenPairResponse,
            UpdateMeRequest,
        },
        profile::{ProfileDto, UpdateProfileRequest},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    policy::{self, Action, Resource},
    response::ApiResponse,
    services::{auth_service, profile_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/token/refresh", post(refresh))
        .route("/validate-password", post(validate_password))
        .route("/activate/{uidb64}/{token}", get(activate))
        .route("/resend-activation", post(resend_activation))
        .route("/password-reset", post(password_reset))
        .route("/password-reset/confirm", post(password_reset_confirm))
        .route("/social-login", post(social_login))
        .route("/me", get(me).put(update_me))
        .route("/me/profile", get(my_profile).put(update_profile))
        .route("/me/profile/avatar", post(upload_avatar))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Register an inactive user and send the activation link", body = ApiResponse<User>),
        (status = 400, description = "Validation failed"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(auth_service::register(&state, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Issue an access/refresh token pair", body = ApiResponse<TokenPairResponse>),
        (status = 400, description = "Invalid credentials"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<TokenPairResponse>>> {
    Ok(Json(auth_service::login(&state, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/token/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Exchange a refresh token for a new pair", body = ApiResponse<TokenPairResponse>),
        (status = 400, description = "Invalid refresh token"),
    ),
    tag = "Auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<TokenPairResponse>>> {
    Ok(Json(auth_service::refresh(&state, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/validate-password",
    request_body = PasswordValidationRequest,
    responses((status = 200, description = "Structured strength result", body = ApiResponse<PasswordValidationResponse>)),
    tag = "Auth"
)]
pub async fn validate_password(
    Json(payload): Json<PasswordValidationRequest>,
) -> Json<ApiResponse<PasswordValidationResponse>> {
    Json(auth_service::validate_password(&payload.password))
}

#[utoipa::path(
    get,
    path = "/api/auth/activate/{uidb64}/{token}",
    params(
        ("uidb64" = String, Path, description = "Base64-encoded user ID"),
        ("token" = String, Path, description = "Activation token"),
    ),
    responses(
        (status = 200, description = "Account activated; issues a token pair", body = ApiResponse<TokenPairResponse>),
        (status = 400, description = "Invalid activation link"),
    ),
    tag = "Auth"
)]
pub async fn activate(
    State(state): State<AppState>,
    Path((uidb64, token)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<TokenPairResponse>>> {
    Ok(Json(auth_service::activate(&state, &uidb64, &token).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/resend-activation",
    request_body = ResendActivationRequest,
    responses(
        (status = 200, description = "Activation email resent"),
        (status = 404, description = "No inactive account with this email"),
    ),
    tag = "Auth"
)]
pub async fn resend_activation(
    State(state): State<AppState>,
    Json(payload): Json<ResendActivationRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(auth_service::resend_activation(&state, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/password-reset",
    request_body = PasswordResetRequest,
    responses((status = 200, description = "Always succeeds with a generic message")),
    tag = "Auth"
)]
pub async fn password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        auth_service::request_password_reset(&state, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/password-reset/confirm",
    request_body = PasswordResetConfirmRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Invalid or expired link"),
    ),
    tag = "Auth"
)]
pub async fn password_reset_confirm(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetConfirmRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        auth_service::confirm_password_reset(&state, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/social-login",
    request_body = SocialLoginRequest,
    responses((status = 200, description = "Token pair for a provider-verified identity", body = ApiResponse<TokenPairResponse>)),
    tag = "Auth"
)]
pub async fn social_login(
    State(state): State<AppState>,
    Json(payload): Json<SocialLoginRequest>,
) -> AppResult<Json<ApiResponse<TokenPairResponse>>> {
    Ok(Json(auth_service::social_login(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses((status = 200, description = "The authenticated user", body = ApiResponse<User>)),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(auth_service::me(&state, user.user_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/auth/me",
    request_body = UpdateMeRequest,
    responses((status = 200, description = "Update the authenticated user", body = ApiResponse<User>)),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateMeRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(
        auth_service::update_me(&state, user.user_id, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/me/profile",
    responses((status = 200, description = "The authenticated user's profile", body = ApiResponse<ProfileDto>)),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn my_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProfileDto>>> {
    policy::authorize(Resource::Profile, Action::Read, user.role())?;
    Ok(Json(profile_service::my_profile(&state, user.user_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/auth/me/profile",
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Update the profile", body = ApiResponse<ProfileDto>)),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<ProfileDto>>> {
    policy::authorize(Resource::Profile, Action::Update, user.role())?;
    Ok(Json(
        profile_service::update_profile(&state, user.user_id, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/me/profile/avatar",
    responses(
        (status = 200, description = "Upload a new avatar (multipart field `avatar`)", body = ApiResponse<ProfileDto>),
        (status = 400, description = "No avatar field"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn upload_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<ProfileDto>>> {
    policy::authorize(Resource::Profile, Action::Update, user.role())?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("avatar") {
            let filename = field.file_name().unwrap_or("avatar").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            let resp =
                profile_service::upload_avatar(&state, user.user_id, &filename, data).await?;
            return Ok(Json(resp));
        }
        let _ = field.bytes().await;
    }

    Err(AppError::BadRequest("avatar field is required".into()))
}
