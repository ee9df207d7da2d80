use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::AppError;
use crate::AppState;

/// Extractor guarding admin routes. Checks the bearer token against the
/// configured admin API token and yields the admin username the storage
/// rows are keyed by.
pub struct AdminAuth(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let expected = &state.config.admin.api_token;
        if expected.is_empty() || token != expected {
            return Err(AppError::Unauthorized);
        }

        Ok(AdminAuth(state.config.admin.username.clone()))
    }
}
