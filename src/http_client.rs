//! HTTP client abstraction for external API communication.
//!
//! This module provides a trait-based abstraction over HTTP clients, enabling
//! dependency injection and easy mocking in tests. Both text-generation
//! providers and the GitHub host talk to the network exclusively through
//! [`HttpClient`].

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

/// Status and body of a completed HTTP exchange.
///
/// An error status is still a completed exchange; callers decide how to
/// treat it. Only transport failures surface as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for HTTP communication with external APIs.
///
/// This abstraction allows injecting mock HTTP clients for testing without
/// making real network requests.
///
/// # Example
///
/// ```ignore
/// use fabrica::http_client::{HttpClient, ReqwestHttpClient};
///
/// let client = ReqwestHttpClient::new();
/// let response = client.post_json(
///     "https://api.example.com/endpoint",
///     &[("Content-Type", "application/json")],
///     &serde_json::json!({"key": "value"}),
/// ).await?;
/// assert!(response.is_success());
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a POST request with JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the response body
    /// cannot be read.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse>;

    /// Sends a PUT request with JSON body.
    async fn put_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse>;
}

/// HTTP client implementation using reqwest.
///
/// This is the default production implementation that makes real HTTP requests.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client with default configuration.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn send(
        &self,
        mut request: reqwest::RequestBuilder,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse> {
        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        // Error text must not echo the URL; it can carry query credentials.
        let response = request
            .json(body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        Ok(HttpResponse { status, body })
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse> {
        self.send(self.client.post(url), headers, body).await
    }

    async fn put_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse> {
        self.send(self.client.put(url), headers, body).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;

    /// A request captured by [`MockHttpClient`].
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: &'static str,
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub body: serde_json::Value,
    }

    /// Mock HTTP client for testing.
    ///
    /// Replies are matched by URL substring in registration order; unmatched
    /// requests fail as transport errors. Every request is recorded.
    #[derive(Default)]
    pub struct MockHttpClient {
        routes: Mutex<Vec<(String, HttpResponse)>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(self, url_fragment: &str, response: HttpResponse) -> Self {
            self.routes
                .lock()
                .unwrap()
                .push((url_fragment.to_string(), response));
            self
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn reply(
            &self,
            method: &'static str,
            url: &str,
            headers: &[(&str, &str)],
            body: &serde_json::Value,
        ) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(RecordedRequest {
                method,
                url: url.to_string(),
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.clone(),
            });

            self.routes
                .lock()
                .unwrap()
                .iter()
                .find(|(fragment, _)| url.contains(fragment.as_str()))
                .map(|(_, response)| response.clone())
                .ok_or_else(|| anyhow!("connection refused: {}", url))
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            headers: &[(&str, &str)],
            body: &serde_json::Value,
        ) -> Result<HttpResponse> {
            self.reply("POST", url, headers, body)
        }

        async fn put_json(
            &self,
            url: &str,
            headers: &[(&str, &str)],
            body: &serde_json::Value,
        ) -> Result<HttpResponse> {
            self.reply("PUT", url, headers, body)
        }
    }

    #[test]
    fn test_is_success_covers_2xx_only() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(201, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
        assert!(!HttpResponse::new(401, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[tokio::test]
    async fn test_mock_http_client_routes_and_records() {
        let client = MockHttpClient::new().route("example.com", HttpResponse::new(200, "ok"));

        let response = client
            .post_json("https://example.com/a", &[("x", "y")], &serde_json::json!({"k": 1}))
            .await
            .unwrap();
        assert_eq!(response.body, "ok");

        let missing = client
            .put_json("https://other.test/", &[], &serde_json::json!({}))
            .await;
        assert!(missing.is_err());

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[1].method, "PUT");
    }

    #[tokio::test]
    async fn test_transport_error_omits_url() {
        // Nothing listens on port 1, so the connection is refused.
        let client = ReqwestHttpClient {
            client: Client::builder().no_proxy().build().unwrap(),
        };

        let err = client
            .post_json("http://127.0.0.1:1/v1/generate?key=SECRET-QUERY-KEY", &[], &serde_json::json!({}))
            .await
            .unwrap_err();

        let text = format!("{:#}", err);
        assert!(!text.contains("SECRET-QUERY-KEY"), "{}", text);
    }
}
