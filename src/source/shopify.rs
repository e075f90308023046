use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::source::config::ShopifyAdapterConfig;
use crate::source::graphql::{
    GraphqlRequest, GraphqlResponse, ProductConnection, ProductsData, products_query,
};
use crate::source::transport::{GraphqlTransport, ReqwestTransport, TransportError};
use crate::source::{ProductSource, RawProduct, SourceCredentials, SourceError};

const HOST_SUFFIX: &str = ".myshopify.com";
const MAX_LOGGED_BODY: usize = 200;

/// Reduce a configured store URL to its `*.myshopify.com` host.
pub fn normalize_host(store_url: &str) -> Result<String, SourceError> {
    let trimmed = store_url.trim();
    let without_scheme = match trimmed.find("://") {
        Some(index) => &trimmed[index + 3..],
        None => trimmed,
    };
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let valid = !host.is_empty()
        && !host.starts_with('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if !valid {
        return Err(SourceError::ConfigInvalid(format!(
            "malformed storeUrl: {store_url:?}"
        )));
    }

    if host.ends_with(HOST_SUFFIX) {
        Ok(host)
    } else {
        Ok(format!("{host}{HOST_SUFFIX}"))
    }
}

pub fn graphql_endpoint(store_url: &str, api_version: &str) -> Result<String, SourceError> {
    let host = normalize_host(store_url)?;
    Ok(format!("https://{host}/admin/api/{api_version}/graphql.json"))
}

/// Failure worth another attempt.
#[derive(Debug, Clone, Copy)]
enum Retryable {
    RateLimited,
    Unavailable(Option<u16>),
}

impl Retryable {
    fn exhausted(self, attempts: u32) -> SourceError {
        match self {
            Retryable::RateLimited => SourceError::RateLimited { attempts },
            Retryable::Unavailable(status) => SourceError::UpstreamUnavailable { status, attempts },
        }
    }
}

enum PageOutcome {
    Page(ProductConnection),
    Retry(Retryable),
}

fn excerpt(body: &str) -> String {
    body.chars().take(MAX_LOGGED_BODY).collect()
}

/// [`ProductSource`] over the Shopify Admin GraphQL API.
pub struct ShopifyAdapter<T: GraphqlTransport = ReqwestTransport> {
    config: Arc<ShopifyAdapterConfig>,
    transport: T,
    cancel: CancellationToken,
}

impl ShopifyAdapter<ReqwestTransport> {
    pub fn with_reqwest(
        config: Arc<ShopifyAdapterConfig>,
        cancel: CancellationToken,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self::new(config, ReqwestTransport::new(client), cancel))
    }
}

impl<T: GraphqlTransport> ShopifyAdapter<T> {
    pub fn new(config: Arc<ShopifyAdapterConfig>, transport: T, cancel: CancellationToken) -> Self {
        Self {
            config,
            transport,
            cancel,
        }
    }

    async fn pause(&self, delay: Duration) -> Result<(), SourceError> {
        if delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(SourceError::Interrupted),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    async fn attempt_page(
        &self,
        endpoint: &str,
        access_token: &str,
        body: &serde_json::Value,
    ) -> Result<PageOutcome, SourceError> {
        let call = tokio::time::timeout(
            self.config.request_timeout(),
            self.transport.post(endpoint, access_token, body),
        );
        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => return Err(SourceError::Interrupted),
            outcome = call => outcome,
        };

        let response = match outcome {
            Err(_) | Ok(Err(TransportError::Timeout)) => {
                return Ok(PageOutcome::Retry(Retryable::Unavailable(None)));
            }
            Ok(Err(TransportError::Failed(message))) => {
                return Err(SourceError::Transport(message));
            }
            Ok(Ok(response)) => response,
        };

        match response.status {
            200..=299 => {}
            401 | 403 => return Err(SourceError::AuthFailed(response.status)),
            429 => return Ok(PageOutcome::Retry(Retryable::RateLimited)),
            500..=599 => {
                return Ok(PageOutcome::Retry(Retryable::Unavailable(Some(
                    response.status,
                ))));
            }
            status => {
                return Err(SourceError::Rejected {
                    status,
                    message: excerpt(&response.body),
                });
            }
        }

        let parsed: GraphqlResponse<ProductsData> = serde_json::from_str(&response.body)
            .map_err(|e| SourceError::Protocol(format!("malformed response: {e}")))?;

        if let Some(errors) = parsed.errors.filter(|errors| !errors.is_empty()) {
            if errors.iter().any(|e| e.is_throttled()) {
                return Ok(PageOutcome::Retry(Retryable::RateLimited));
            }
            let message = errors
                .first()
                .map(|e| e.message.trim())
                .filter(|m| !m.is_empty())
                .unwrap_or("GraphQL error without message")
                .to_string();
            return Err(SourceError::Protocol(message));
        }

        let data = parsed
            .data
            .ok_or_else(|| SourceError::Protocol("response carried no data".to_string()))?;
        Ok(PageOutcome::Page(data.products))
    }

    /// One page, retried on throttling, 5xx and timeouts.
    async fn fetch_page(
        &self,
        endpoint: &str,
        access_token: &str,
        body: &serde_json::Value,
    ) -> Result<ProductConnection, SourceError> {
        let mut attempt: u32 = 0;
        loop {
            let reason = match self.attempt_page(endpoint, access_token, body).await? {
                PageOutcome::Page(page) => return Ok(page),
                PageOutcome::Retry(reason) => reason,
            };

            if attempt >= self.config.max_retries {
                let error = reason.exhausted(attempt + 1);
                log::error!("Giving up on {endpoint}: {error}");
                return Err(error);
            }

            let delay = self.config.backoff_for(attempt);
            log::warn!(
                "Retrying {endpoint} after {reason:?} (attempt {}, backoff {}ms)",
                attempt + 1,
                delay.as_millis()
            );
            self.pause(delay).await?;
            attempt += 1;
        }
    }
}

#[async_trait]
impl<T: GraphqlTransport> ProductSource for ShopifyAdapter<T> {
    async fn fetch_all(
        &self,
        credentials: &SourceCredentials,
    ) -> Result<Vec<RawProduct>, SourceError> {
        credentials.validate()?;
        let endpoint = graphql_endpoint(&credentials.store_url, &self.config.api_version)?;
        let query = products_query(&self.config);

        let mut products = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            if pages > 0 {
                self.pause(self.config.page_delay()).await?;
            }
            let body = serde_json::to_value(GraphqlRequest::products(&query, cursor.as_deref()))
                .map_err(|e| SourceError::Protocol(e.to_string()))?;

            let page = self
                .fetch_page(&endpoint, &credentials.access_token, &body)
                .await?;
            pages += 1;
            log::debug!(
                "Fetched page {pages} from {endpoint}: {} products",
                page.edges.len()
            );

            products.extend(page.edges.into_iter().map(|edge| edge.node));

            match (page.page_info.has_next_page, page.page_info.end_cursor) {
                (false, _) => break,
                (true, Some(next)) => cursor = Some(next),
                (true, None) => {
                    return Err(SourceError::Protocol(
                        "hasNextPage without endCursor".to_string(),
                    ));
                }
            }
        }

        log::info!(
            "Fetched {} products in {pages} pages from {endpoint}",
            products.len()
        );
        Ok(products)
    }
}
