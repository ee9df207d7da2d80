pub mod auth;
pub mod health;
pub mod meeting_types;
pub mod schedule;
pub mod settings;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, routing::get, Router};
    use http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    use crate::config::Config;
    use crate::AppState;

    async fn test_state() -> Arc<AppState> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let mut config = Config::default();
        config.admin.username = "admin".to_string();
        config.admin.api_token = "test-token".to_string();

        Arc::new(AppState {
            db: pool,
            config,
            zoom: None,
        })
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/health", get(super::health::health_check))
            .nest("/api/meeting-types", super::meeting_types::router())
            .nest("/api/schedule", super::schedule::router())
            .with_state(state)
    }

    #[tokio::test]
    async fn health_endpoint_reports_ok() {
        let app = app(test_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn admin_routes_reject_missing_or_wrong_token() {
        let app = app(test_state().await);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/meeting-types")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/meeting-types")
                    .header(header::AUTHORIZATION, "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn first_admin_list_provisions_default_meeting_type() {
        let app = app(test_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/meeting-types")
                    .header(header::AUTHORIZATION, "Bearer test-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json[0]["slug"], "intro-call");
        assert_eq!(json[0]["duration_minutes"], 30);
    }

    #[tokio::test]
    async fn public_slots_reject_malformed_date() {
        let state = test_state().await;
        crate::db::MeetingTypeRepository::get_or_create_default(&state.db, "admin")
            .await
            .unwrap();
        let app = app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/schedule/intro-call/slots?date=not-a-date&time_zone=UTC")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
}
