use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

// ============================================================================
// HTTP actions against the full router
// ============================================================================

impl TestSetup {
    pub async fn post_json(&self, uri: &str, auth: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("Authorization", auth)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, uri: &str, auth: &str) -> (StatusCode, T) {
        let request = Request::builder()
            .uri(uri)
            .header("Authorization", auth)
            .body(Body::empty())
            .unwrap();
        let (status, value) = self.send(request).await;
        (status, serde_json::from_value(value).unwrap())
    }

    pub async fn get_status(&self, uri: &str, auth: Option<&str>) -> StatusCode {
        let mut builder = Request::builder().uri(uri);
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        let request = builder.body(Body::empty()).unwrap();
        self.send(request).await.0
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&body).into_owned())
            })
        };
        (status, value)
    }
}
