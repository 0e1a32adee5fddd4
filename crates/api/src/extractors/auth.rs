use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use dwellhub_services::auth::{Entity, Operation, Principal};

use crate::{error::ApiError, state::AppState};

/// The caller behind the request's access token (Authorization header
/// first, then the `access_token` cookie).
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl AuthUser {
    /// Rejects with 403 unless the caller's role may perform `operation`.
    pub fn authorize(&self, entity: Entity, operation: Operation) -> Result<&Principal, ApiError> {
        self.0.authorize(entity, operation)?;
        Ok(&self.0)
    }
}

impl std::ops::Deref for AuthUser {
    type Target = Principal;

    fn deref(&self) -> &Principal {
        &self.0
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .or_else(|| {
            parts
                .headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies
                        .split(';')
                        .find_map(|cookie| cookie.trim().strip_prefix("access_token="))
                        .filter(|token| !token.is_empty())
                        .map(str::to_string)
                })
        })
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        Ok(AuthUser(app_state.auth.authenticate(&token)?))
    }
}

/// Helper trait for extracting AppState from composite state types
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl FromRef<AppState> for AppState {
    fn from_ref(input: &AppState) -> Self {
        input.clone()
    }
}
