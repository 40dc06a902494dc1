use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{auth, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(users::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let body = match body {
            Some(b) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(b)
            }
            None => Body::empty(),
        };

        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn register(app: &Router, email: &str) -> (StatusCode, Value) {
        let body = json!({
            "name": "Hedy",
            "email": email,
            "password": "frequency-hopping",
            "dateOfBirth": "1984-11-09",
            "role": "inventor",
        });
        send(app, Method::POST, "/api/auth/register", None, Some(body.to_string())).await
    }

    async fn login(app: &Router, email: &str) -> (StatusCode, Value) {
        let body = json!({ "email": email, "password": "frequency-hopping" });
        send(app, Method::POST, "/api/auth/login", None, Some(body.to_string())).await
    }

    async fn token_for(app: &Router, email: &str) -> String {
        register(app, email).await;
        let (_, body) = login(app, email).await;
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_served_under_api() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_body_is_json_validation_error() {
        let app = build_app(AppState::fake());
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some("{not json".into()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn register_is_created_then_duplicate_conflicts() {
        let app = build_app(AppState::fake());
        let (status, body) = register(&app, "hedy@example.com").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "message": "User registered" }));

        let (status, body) = register(&app, "hedy@example.com").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({ "error": "User already exists" }));
    }

    #[tokio::test]
    async fn login_returns_token_and_public_user() {
        let app = build_app(AppState::fake());
        register(&app, "hedy@example.com").await;

        let (status, body) = login(&app, "hedy@example.com").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].is_string());
        assert_eq!(body["user"]["imageUrl"], "https://via.placeholder.com/150");
        assert_eq!(body["user"]["premium"], false);
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn bad_credentials_are_generic() {
        let app = build_app(AppState::fake());
        register(&app, "hedy@example.com").await;

        let wrong = json!({ "email": "hedy@example.com", "password": "nope" });
        let (status, body) =
            send(&app, Method::POST, "/api/auth/login", None, Some(wrong.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid credentials" }));

        let (_, unknown) = login(&app, "nobody@example.com").await;
        assert_eq!(unknown, body);
    }

    #[tokio::test]
    async fn listing_requires_valid_token() {
        let app = build_app(AppState::fake());
        let (status, body) = send(&app, Method::GET, "/api/users", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let token = token_for(&app, "hedy@example.com").await;
        let tampered = format!("{token}x");
        let (status, _) = send(&app, Method::GET, "/api/users", Some(&tampered), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, Method::GET, "/api/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn free_caller_listing_is_capped() {
        let app = build_app(AppState::fake());
        for i in 0..4 {
            register(&app, &format!("user{i}@example.com")).await;
        }
        let token = token_for(&app, "hedy@example.com").await;

        let (status, body) = send(&app, Method::GET, "/api/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn own_profile_update_succeeds_foreign_is_forbidden() {
        let app = build_app(AppState::fake());
        let token = token_for(&app, "hedy@example.com").await;
        register(&app, "other@example.com").await;

        let change = json!({ "role": "actress" }).to_string();
        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/users/hedy@example.com",
            Some(&token),
            Some(change.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Profile updated" }));

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/users/other@example.com",
            Some(&token),
            Some(change.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].is_string());

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/users/ghost@example.com",
            Some(&token),
            Some(change),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn undecodable_path_is_json_validation_error() {
        let app = build_app(AppState::fake());
        let token = token_for(&app, "hedy@example.com").await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/users/%FF",
            Some(&token),
            Some("{}".into()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
