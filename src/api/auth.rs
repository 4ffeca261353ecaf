//! Session extraction from the upstream identity header.
//!
//! The identity provider is an external collaborator: requests arrive
//! already authenticated, carrying the subject's profile ID in the
//! `x-user-id` header. The extractor resolves the profile row and
//! hands every handler an explicit [`SessionContext`]; a missing or
//! unknown subject rejects the request before any handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::domain::SessionContext;
use crate::error::ApiError;

/// Header populated by the upstream identity provider.
pub const USER_ID_HEADER: &str = "x-user-id";

impl FromRequestParts<AppState> for SessionContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;

        let user_id = Uuid::parse_str(raw).map_err(|_| ApiError::Unauthenticated)?;

        let profile = state
            .store
            .get_profile(user_id)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        Ok(Self {
            user_id: profile.id,
            user_type: profile.user_type,
            name: profile.name,
            email: profile.email,
        })
    }
}
