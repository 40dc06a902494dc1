use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest},
        services,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(payload) = payload?;
    services::register(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new("User registered"))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload?;
    let res = services::login(state.store.as_ref(), &state.jwt, payload).await?;
    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_responds_created_with_message() {
        let state = AppState::fake();
        let body = RegisterRequest {
            name: Some("Alan".into()),
            email: Some("alan@example.com".into()),
            password: Some("bombe".into()),
            date_of_birth: Some("1970-06-23".into()),
            role: Some("cryptanalyst".into()),
            image_url: None,
        };

        let (status, Json(res)) = register(State(state.clone()), Ok(Json(body)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(res.message, "User registered");

        let res = login(
            State(state),
            Ok(Json(LoginRequest {
                email: Some("alan@example.com".into()),
                password: Some("bombe".into()),
            })),
        )
        .await
        .unwrap();
        assert!(!res.0.token.is_empty());

        let json = serde_json::to_value(&res.0).unwrap();
        assert_eq!(json["user"]["imageUrl"], "https://via.placeholder.com/150");
        assert!(json["user"].get("passwordHash").is_none());
    }

    #[test]
    fn register_body_accepts_camel_case_and_legacy_image_key() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@b.c","password":"p","dateOfBirth":"1990-01-01","role":"r","image":"x.png"}"#,
        )
        .unwrap();
        assert_eq!(req.date_of_birth.as_deref(), Some("1990-01-01"));
        assert_eq!(req.image_url.as_deref(), Some("x.png"));
    }
}
