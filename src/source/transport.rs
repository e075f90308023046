use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

/// Header carrying the Admin API access token.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Raw HTTP outcome of one GraphQL call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Failed(String),
}

/// Sends a GraphQL document to an endpoint.
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn post(
        &self,
        endpoint: &str,
        access_token: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, TransportError>;
}

/// [`GraphqlTransport`] over a shared `reqwest` client.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Failed(error.to_string())
    }
}

#[async_trait]
impl GraphqlTransport for ReqwestTransport {
    async fn post(
        &self,
        endpoint: &str,
        access_token: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(endpoint)
            .header(ACCESS_TOKEN_HEADER, access_token)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;

        Ok(TransportResponse { status, body })
    }
}
