//! `AuthUser` extractor: pulls the bearer token from the Authorization
//! header, runs the protected-route authentication, and injects the claims.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use portal_auth::SessionClaims;
use portal_auth::jwt::decoder::INVALID_TOKEN;
use portal_core::error::AppError;
use portal_core::result::AppResult;

use crate::error::ApiError;
use crate::state::AppState;

/// Rejection when no Authorization header is sent at all.
pub const MISSING_AUTHORIZATION: &str = "missing authorization header";

/// Extracted authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Verified session claims.
    pub claims: SessionClaims,
    /// The raw token, needed for logout.
    pub token: String,
}

impl std::ops::Deref for AuthUser {
    type Target = SessionClaims;
    fn deref(&self) -> &Self::Target {
        &self.claims
    }
}

/// Reads the bearer token from `headers`.
///
/// A missing header and a header that is not a well-formed bearer
/// credential are both authentication failures, with different messages.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<String> {
    if !headers.contains_key(AUTHORIZATION) {
        return Err(AppError::authentication(MISSING_AUTHORIZATION));
    }

    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::authentication(INVALID_TOKEN))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already verified by the policy guard on this route.
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(&parts.headers)?;
        let claims = state.session_manager.authenticate(&token).await?;

        Ok(AuthUser { claims, token })
    }
}
