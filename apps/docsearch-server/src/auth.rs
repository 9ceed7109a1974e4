//! Bearer-token extractors

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use docsearch_core::{CoreError, Identity};

use crate::app::AppState;
use crate::error::ApiError;

/// Any authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

/// An authenticated administrator
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            CoreError::Unauthorized("Missing bearer token".to_string())
        })?;

        let identity = state.identity.authenticate(token).await?;
        Ok(Self(identity))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(identity) = CurrentUser::from_request_parts(parts, state).await?;

        if !identity.is_admin {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(Self(identity))
    }
}
