use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use super::error::EnrichError;
use super::types::{ChatRequest, ChatResponse};

pub const API_URL: &str = "https://blog-api.nosion.ac.cn/api/v1/single/chat";

/// Something that can turn a submission into enrichment text.
///
/// Implemented by [`EnrichmentClient`] for the real service and by
/// in-memory fakes in tests.
pub trait ContentSource: Send + Sync {
    fn fetch(&self, raw: &str) -> impl Future<Output = Result<String, EnrichError>> + Send;
}

pub struct EnrichmentClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl EnrichmentClient {
    /// Build a client for `endpoint`; `timeout` bounds the whole request.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> EnrichError {
        if err.is_timeout() {
            EnrichError::timeout(self.timeout)
        } else {
            EnrichError::NetworkError(err)
        }
    }
}

impl ContentSource for EnrichmentClient {
    async fn fetch(&self, raw: &str) -> Result<String, EnrichError> {
        let req = ChatRequest {
            content: raw.to_string(),
        };
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&req)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(EnrichError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| self.transport_error(e))?;

        if body.status != 200 {
            return Err(EnrichError::Rejected {
                status: body.status,
                msg: body.msg,
            });
        }

        body.data
            .and_then(|data| data.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(EnrichError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CHAT_PATH: &str = "/api/v1/single/chat";

    async fn client_for(server: &MockServer, timeout: Duration) -> EnrichmentClient {
        EnrichmentClient::new(format!("{}{CHAT_PATH}", server.uri()), timeout).unwrap()
    }

    #[tokio::test]
    async fn fetch_returns_content_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"content": "Hello\nWorld"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "msg": "success",
                "data": {"Content": "Thanks!"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5)).await;
        let text = client.fetch("Hello\nWorld").await.unwrap();
        assert_eq!(text, "Thanks!");
    }

    #[tokio::test]
    async fn http_error_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5)).await;
        let err = client.fetch("hi").await.unwrap_err();
        match err {
            EnrichError::ApiError { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn envelope_status_other_than_200_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 400,
                "msg": "content too long"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5)).await;
        let err = client.fetch("hi").await.unwrap_err();
        assert!(matches!(err, EnrichError::Rejected { status: 400, .. }));
    }

    #[tokio::test]
    async fn missing_content_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "msg": "success",
                "data": {}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5)).await;
        let err = client.fetch("hi").await.unwrap_err();
        assert!(matches!(err, EnrichError::EmptyContent));
    }

    #[tokio::test]
    async fn malformed_body_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5)).await;
        let err = client.fetch("hi").await.unwrap_err();
        assert!(matches!(err, EnrichError::NetworkError(_)));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": 200, "msg": "", "data": {"Content": "late"}}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(50)).await;
        let err = client.fetch("hi").await.unwrap_err();
        assert!(matches!(err, EnrichError::Timeout(50)));
    }

    #[test]
    fn default_endpoint() {
        let client = EnrichmentClient::new(API_URL.to_string(), Duration::from_secs(10)).unwrap();
        assert_eq!(client.endpoint(), API_URL);
    }
}
