//! Token endpoint

use axum::{extract::State, Form, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub is_admin: bool,
}

/// POST /api/v1/auth/token - Exchange form credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let grant = state.identity.login(&form.username, &form.password).await?;

    info!(username = %form.username, is_admin = grant.is_admin, "Token issued");

    Ok(Json(TokenResponse {
        access_token: grant.access_token,
        token_type: "bearer",
        is_admin: grant.is_admin,
    }))
}
