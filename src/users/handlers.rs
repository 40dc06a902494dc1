use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{dto::MessageResponse, extractors::Caller},
    error::ApiError,
    state::AppState,
    users::{
        dto::{UpdateProfileRequest, UserProfile},
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:email", put(update_profile))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let profiles = services::list_users(state.store.as_ref(), caller.premium).await?;
    Ok(Json(profiles))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    caller: Caller,
    email: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(email) = email?;
    let Json(payload) = payload?;
    services::update_profile(state.store.as_ref(), caller, &email, payload).await?;
    Ok(Json(MessageResponse::new("Profile updated")))
}
