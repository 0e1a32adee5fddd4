use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
};
use dwellhub_db::models::{Role, User};
use dwellhub_services::{
    auth::TokenPair,
    dao::{base::DaoError, user::NewUser},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::{required, user::UserResponse};
use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, json::ValidatedJson},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(required, length(min = 2, max = 100))]
    pub full_name: Option<String>,
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 6, max = 128))]
    pub password: Option<String>,
    #[validate(length(max = 32))]
    pub phone_number: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GoogleLoginRequest {
    #[validate(required, length(min = 1))]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GoogleRegisterRequest {
    #[validate(required, length(min = 1))]
    pub token: Option<String>,
    #[validate(required)]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(required)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

/// Only client and owner accounts can be self-created.
fn self_service_role(role: Option<Role>) -> Result<Role, ApiError> {
    match role.unwrap_or_default() {
        Role::Admin => Err(ApiError::Validation(
            "Cannot register as an admin".to_string(),
        )),
        role => Ok(role),
    }
}

fn session_cookie(tokens: &TokenPair) -> Result<HeaderMap, ApiError> {
    let cookie = format!(
        "access_token={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        tokens.access_token, tokens.expires_in
    );
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(|e| ApiError::Internal(e.to_string()))?,
    );
    Ok(headers)
}

fn issue(state: &AppState, user: User) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let user_id = user
        .id
        .ok_or_else(|| ApiError::Internal("User without id".to_string()))?;
    let tokens = state.auth.generate_tokens(user_id, &user.email, user.role)?;
    let headers = session_cookie(&tokens)?;

    Ok((
        headers,
        Json(AuthResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            user: user.into(),
        }),
    ))
}

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    let role = self_service_role(body.role)?;
    let email = required(body.email, "email")?;
    let password = required(body.password, "password")?;

    if state.users.email_taken(&email).await? {
        return Err(ApiError::Conflict("Email already in use".to_string()));
    }

    let user = state
        .users
        .create(NewUser {
            email,
            full_name: required(body.full_name, "full_name")?,
            password_hash: Some(state.auth.hash_password(&password)?),
            google_id: None,
            avatar: None,
            phone_number: body.phone_number,
            role,
            is_verified: false,
        })
        .await?;
    info!(user_id = %super::hex(user.id), role = role.as_str(), "User registered");

    let (headers, body) = issue(&state, user)?;
    Ok((StatusCode::CREATED, headers, body))
}

/// Replaces a missing-record error with `missing`; store failures stay 500s.
fn when_missing(err: DaoError, missing: ApiError) -> ApiError {
    match err {
        DaoError::NotFound(_) => missing,
        other => other.into(),
    }
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let email = required(body.email, "email")?;
    let password = required(body.password, "password")?;

    let user = state
        .users
        .find_by_email(&email)
        .await
        .map_err(|e| {
            when_missing(e, ApiError::Unauthorized("Invalid email or password".to_string()))
        })?;
    state.auth.check_credentials(&user, &password)?;

    issue(&state, user)
}

pub async fn google_login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<GoogleLoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let token = required(body.token, "token")?;
    let profile = state.google.profile(&token).await?;

    let user = state
        .users
        .find_by_email(&profile.email)
        .await
        .map_err(|e| {
            when_missing(e, ApiError::NotFound("User not found. Please register.".to_string()))
        })?;

    issue(&state, user)
}

pub async fn google_register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<GoogleRegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    let role = self_service_role(body.role)?;
    let token = required(body.token, "token")?;
    let profile = state.google.profile(&token).await?;

    if state.users.email_taken(&profile.email).await? {
        return Err(ApiError::Conflict(
            "User already exists. Please log in.".to_string(),
        ));
    }

    let user = state
        .users
        .create(NewUser {
            full_name: profile.name.unwrap_or_else(|| profile.email.clone()),
            email: profile.email,
            password_hash: None,
            google_id: Some(profile.sub),
            avatar: profile.picture,
            phone_number: None,
            role,
            is_verified: true,
        })
        .await?;
    info!(user_id = %super::hex(user.id), "User registered through Google");

    let (headers, body) = issue(&state, user)?;
    Ok((StatusCode::CREATED, headers, body))
}

pub async fn logout() -> Result<(HeaderMap, Json<serde_json::Value>), ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("access_token=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0"),
    );
    Ok((
        headers,
        Json(serde_json::json!({ "message": "Logout successful" })),
    ))
}

pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RefreshRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let token = required(body.refresh_token, "refresh_token")?;
    let claims = state.auth.verify_refresh_token(&token)?;

    let user_id = bson::oid::ObjectId::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid user ID".to_string()))?;
    // Reload so the new tokens carry the current role.
    let user = state.users.base.find_by_id(user_id).await?;

    issue(&state, user)
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.base.find_by_id(auth.id).await?;
    Ok(Json(user.into()))
}
