//! In-process HTTP test client.
//!
//! [`TestClient`] sends requests straight into an axum [`Router`] without
//! binding a socket, and collects each response into a [`TestResponse`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use axum::routing::get;
//! use axum::Router;
//! use formconfig_test::client::TestClient;
//!
//! async fn example() {
//!     let app = Router::new().route("/health", get(|| async { "ok" }));
//!     let client = TestClient::new(app);
//!
//!     let response = client.get("/health").await;
//!     assert_eq!(response.status_code(), 200);
//!     assert_eq!(response.text(), "ok");
//! }
//! ```

use axum::body::Body;
use axum::Router;
use bytes::Bytes;
use formconfig_core::{FormConfigError, FormConfigResult};
use http::header::{AUTHORIZATION, CONTENT_TYPE, IF_MATCH};
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde::Serialize;
use tower::ServiceExt;

/// A test client for making in-process HTTP requests.
///
/// A bearer token set with [`with_token`](Self::with_token) is sent on every
/// request.
#[derive(Clone)]
pub struct TestClient {
    app: Router,
    token: Option<String>,
}

impl TestClient {
    /// Creates a new test client wrapping the given router.
    pub const fn new(app: Router) -> Self {
        Self { app, token: None }
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sends a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None, &[]).await
    }

    /// Sends a GET request with extra headers.
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request(Method::GET, path, None, headers).await
    }

    /// Sends a POST request with no body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request(Method::POST, path, None, &[]).await
    }

    /// Sends a POST request with a JSON body.
    pub async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> TestResponse {
        self.request(Method::POST, path, Some(to_json(body)), &[]).await
    }

    /// Sends a POST request whose body is sent as-is with a JSON content type.
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request(Method::POST, path, Some(body.as_bytes().to_vec()), &[])
            .await
    }

    /// Sends a PUT request with a JSON body.
    pub async fn put_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> TestResponse {
        self.request(Method::PUT, path, Some(to_json(body)), &[]).await
    }

    /// Sends a PUT request with a JSON body and `If-Match: <version>`.
    pub async fn put_json_if_match<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        version: u64,
    ) -> TestResponse {
        let version = version.to_string();
        self.request(
            Method::PUT,
            path,
            Some(to_json(body)),
            &[(IF_MATCH.as_str(), version.as_str())],
        )
        .await
    }

    /// Sends a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path, None, &[]).await
    }

    /// Sends a request with an optional JSON body and extra headers.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let req = builder
            .body(body.map_or_else(Body::empty, Body::from))
            .expect("request builder should not fail");

        self.send(req).await
    }

    /// Sends the request through the router and builds a `TestResponse`.
    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(req)
            .await
            .expect("router should not error");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .map_or_else(|_| Bytes::new(), http_body_util::Collected::to_bytes);

        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }
}

impl std::fmt::Debug for TestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestClient")
            .field("has_token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

fn to_json<T: Serialize + ?Sized>(body: &T) -> Vec<u8> {
    serde_json::to_vec(body).expect("test request body should serialize")
}

/// The response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body as raw bytes.
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Returns the response body as a UTF-8 string.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Deserializes the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> FormConfigResult<T> {
        serde_json::from_slice(&self.body).map_err(FormConfigError::from)
    }

    /// Returns the numeric status code.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns the value of a header by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns `true` if the response has the specified header.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Returns `true` if the response body contains the given text.
    pub fn contains(&self, text: &str) -> bool {
        self.text().contains(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::routing::{get, post};
    use serde_json::{json, Value};

    fn echo_app() -> Router {
        Router::new()
            .route("/hello", get(|| async { "Hello" }))
            .route(
                "/echo",
                post(|headers: HeaderMap, body: String| async move {
                    let auth = headers
                        .get(AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    axum::Json(json!({"auth": auth, "body": body}))
                })
                .put(|headers: HeaderMap| async move {
                    headers
                        .get(IF_MATCH)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string()
                }),
            )
    }

    #[tokio::test]
    async fn test_get_text() {
        let client = TestClient::new(echo_app());
        let response = client.get("/hello").await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.text(), "Hello");
        assert!(response.contains("ell"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let client = TestClient::new(echo_app());
        assert_eq!(client.get("/missing").await.status_code(), 404);
    }

    #[tokio::test]
    async fn test_post_json_with_token() {
        let client = TestClient::new(echo_app()).with_token("abc");
        let response = client.post_json("/echo", &json!({"a": 1})).await;
        let body: Value = response.json().unwrap();
        assert_eq!(body["auth"], "Bearer abc");
        assert_eq!(body["body"], r#"{"a":1}"#);
        assert!(response.has_header("content-type"));
    }

    #[tokio::test]
    async fn test_if_match_header() {
        let client = TestClient::new(echo_app());
        let response = client.put_json_if_match("/echo", &json!({}), 7).await;
        assert_eq!(response.text(), "7");
    }

    #[tokio::test]
    async fn test_json_error_on_text_body() {
        let client = TestClient::new(echo_app());
        let response = client.get("/hello").await;
        assert!(response.json::<Value>().is_err());
    }
}
