use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Identity and access tier of an authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub premium: bool,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthenticated("Missing bearer token".into()))?;

        let id = state.jwt.verify(token).map_err(|e| {
            warn!(error = %e, "rejected bearer token");
            ApiError::from(e)
        })?;

        // A deleted or unknown subject still passes, just without premium access.
        let premium = match state.store.find_by_id(id).await? {
            Some(user) => user.premium,
            None => {
                debug!(user_id = %id, "token subject not found; treating as free tier");
                false
            }
        };

        Ok(Caller { id, premium })
    }
}
