use crate::error::ServiceError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::time::Duration;

/// Minimal HTTP surface the service clients need
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` with query parameters, returning the raw body
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, ServiceError>;

    /// POST `body` as `text/plain`, returning the raw body
    async fn post_text(&self, url: &str, body: String) -> Result<Vec<u8>, ServiceError>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn read_body(resp: reqwest::Response) -> Result<Vec<u8>, ServiceError> {
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ServiceError::RateLimited);
        }
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, ServiceError> {
        let resp = self.client.get(url).query(query).send().await?;
        Self::read_body(resp).await
    }

    async fn post_text(&self, url: &str, body: String) -> Result<Vec<u8>, ServiceError> {
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await?;
        Self::read_body(resp).await
    }
}
