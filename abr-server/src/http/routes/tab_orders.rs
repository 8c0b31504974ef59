//! Tab-order preference endpoints
//!
//! GET/PUT/DELETE /users/{user_id}/tab-orders/{page}

use std::sync::Arc;

use abr_core::{ReplaceOrderRequest, TabOrderDocument};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::db::repos::TabOrderRepo;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, TabOrderPath};
use crate::http::server::AppState;
use crate::models::TabOrder;

/// GET - stored order, 404 when the user never reordered this page
async fn get_order(
    State(state): State<Arc<AppState>>,
    TabOrderPath { user, page }: TabOrderPath,
) -> Result<Json<TabOrderDocument>, ApiError> {
    let doc = TabOrderRepo::new(&state.pool).get(&user, &page).await?;
    Ok(Json(doc))
}

/// PUT - replace the whole order
async fn put_order(
    State(state): State<Arc<AppState>>,
    TabOrderPath { user, page }: TabOrderPath,
    ApiJson(req): ApiJson<ReplaceOrderRequest>,
) -> Result<Json<TabOrderDocument>, ApiError> {
    let order = TabOrder::new(req.order)?;
    let doc = TabOrderRepo::new(&state.pool)
        .upsert(&user, &page, &order)
        .await?;
    tracing::info!(user = user.as_str(), page = page.as_str(), tabs = doc.order.len(), "tab order saved");
    Ok(Json(doc))
}

/// DELETE - back to default order; succeeds whether or not a row existed
async fn delete_order(
    State(state): State<Arc<AppState>>,
    TabOrderPath { user, page }: TabOrderPath,
) -> Result<StatusCode, ApiError> {
    let existed = TabOrderRepo::new(&state.pool).delete(&user, &page).await?;
    tracing::info!(user = user.as_str(), page = page.as_str(), existed, "tab order reset");
    Ok(StatusCode::NO_CONTENT)
}

/// Tab-order routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/users/{user_id}/tab-orders/{page}",
        get(get_order).put(put_order).delete(delete_order),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::response::Response;
    use tower::ServiceExt;

    use crate::db::open_in_memory;

    async fn app() -> Router {
        let pool = open_in_memory().await.unwrap();
        router().with_state(Arc::new(AppState { pool }))
    }

    fn put(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn put_returns_persisted_document() {
        let response = app()
            .await
            .oneshot(put("/users/user1/tab-orders/tasks", r#"{"order":["b","a"]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let doc = json(response).await;
        assert_eq!(doc["user_id"], "user1");
        assert_eq!(doc["page"], "tasks");
        assert_eq!(doc["order"], serde_json::json!(["b", "a"]));
        assert!(doc["updated_at"].is_string());
    }

    #[tokio::test]
    async fn missing_order_is_404_json() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/users/user1/tab-orders/parts")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(response).await["error"], "not_found");
    }

    #[tokio::test]
    async fn invalid_input_is_400() {
        let app = app().await;

        let cases = [
            ("/users/user1/tab-orders/tasks", r#"{"order":[]}"#),
            ("/users/user1/tab-orders/tasks", r#"{"order":["a","a"]}"#),
            ("/users/user1/tab-orders/Tasks", r#"{"order":["a"]}"#),
            ("/users/user1/tab-orders/tasks", r#"{"tabs":["a"]}"#),
            ("/users/user1/tab-orders/tasks", "not json"),
        ];
        for (uri, body) in cases {
            let response = app.clone().oneshot(put(uri, body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri} {body}");
        }
    }

    #[tokio::test]
    async fn undecodable_path_reports_rejection() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/users/%FF/tab-orders/tasks")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json(response).await;
        assert_eq!(body["error"], "bad_request");
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("Invalid URL"), "{message}");
        assert!(!message.contains("cannot be empty"), "{message}");
    }

    #[tokio::test]
    async fn delete_resets_to_default() {
        let app = app().await;
        let uri = "/users/user1/tab-orders/tasks";

        app.clone().oneshot(put(uri, r#"{"order":["a"]}"#)).await.unwrap();

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
