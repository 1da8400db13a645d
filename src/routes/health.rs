use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
};
use serde_json::{Value, json};

use crate::repository::Availability;
use crate::server::AppState;

/// Root banner.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/`
pub async fn root() -> Json<Value> {
    Json(json!({ "success": true, "message": "VTECHSOFT Backend API" }))
}

/// Health check endpoint handler.
///
/// Always answers 200 while the process is up; the `database` field reports
/// whether the credential store answered the availability probe in time.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/api/health`
///
/// # Response Format
/// ```json
/// {
///   "success": true,
///   "message": "Server is running",
///   "database": "connected"
/// }
/// ```
pub async fn health(State(app_state): State<AppState>) -> Json<Value> {
    let database = match app_state.auth_service.store_availability().await {
        Availability::Reachable => "connected",
        Availability::Unreachable => "unavailable",
    };
    Json(json!({
        "success": true,
        "message": "Server is running",
        "database": database,
    }))
}

/// JSON 404 for any unmatched route
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": format!("Route {} not found", uri.path()),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtService, PasswordService};
    use crate::repository::EphemeralRepository;
    use crate::repository::memory::{Failure, MemoryUserRepository};
    use crate::services::{AuthPolicy, AuthService};
    use axum::Router;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_app(store: Arc<MemoryUserRepository>) -> Router {
        let jwt_service =
            Arc::new(JwtService::new("health_secret", chrono::Duration::days(7)).unwrap());
        let auth_service = AuthService::new(
            store,
            Arc::new(EphemeralRepository::new(10, Duration::from_secs(60))),
            jwt_service.clone(),
            PasswordService::new().unwrap(),
            AuthPolicy {
                probe_timeout: Duration::from_millis(100),
                demo_on_store_error: true,
            },
        );
        crate::server::router(
            AppState {
                auth_service: Arc::new(auth_service),
                jwt_service,
            },
            &[],
        )
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root_banner() {
        let (status, body) = get_json(test_app(Arc::new(MemoryUserRepository::new())), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "VTECHSOFT Backend API");
    }

    #[tokio::test]
    async fn test_health_reports_store() {
        let store = Arc::new(MemoryUserRepository::new());
        let (_, body) = get_json(test_app(store.clone()), "/api/health").await;
        assert_eq!(body["database"], "connected");

        store.fail_with(Some(Failure::Unavailable)).await;
        let (status, body) = get_json(test_app(store.clone()), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "unavailable");

        store.fail_with(None).await;
        store.set_ping_delay(Duration::from_secs(1)).await;
        let (_, body) = get_json(test_app(store), "/api/health").await;
        assert_eq!(body["database"], "unavailable");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, body) =
            get_json(test_app(Arc::new(MemoryUserRepository::new())), "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Route /api/nope not found");
    }
}
