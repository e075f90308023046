use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::source::SourceError;

/// Tunables of the Shopify adapter.
///
/// Populated once at start-up from the `shopify` section of the server
/// configuration and shared immutably afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ShopifyAdapterConfig {
    /// Admin API version used in the endpoint path.
    #[validate(length(min = 1))]
    pub api_version: String,
    /// Products requested per page.
    #[validate(range(min = 1, max = 250))]
    pub page_size: u32,
    /// Pause between consecutive pages.
    pub page_delay_ms: u64,
    /// Deadline for a single upstream call.
    #[validate(range(min = 1))]
    pub request_timeout_ms: u64,
    /// Retries granted to one page after a retryable failure.
    #[validate(range(max = 10))]
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub retry_backoff_ms: u64,
    /// Media edges requested per product.
    #[validate(range(max = 250))]
    pub media_first: u32,
    /// Variant edges requested per product.
    #[validate(range(min = 1, max = 250))]
    pub variants_first: u32,
}

impl Default for ShopifyAdapterConfig {
    fn default() -> Self {
        Self {
            api_version: "2026-01".to_string(),
            page_size: 50,
            page_delay_ms: 600,
            request_timeout_ms: 30_000,
            max_retries: 3,
            retry_backoff_ms: 1_000,
            media_first: 10,
            variants_first: 100,
        }
    }
}

impl ShopifyAdapterConfig {
    /// Check every bound, returning the config unchanged when it is usable.
    pub fn validated(self) -> Result<Self, SourceError> {
        self.validate()
            .map_err(|e| SourceError::ConfigInvalid(e.to_string()))?;
        if self.api_version.trim().is_empty() {
            return Err(SourceError::ConfigInvalid(
                "api_version cannot be blank".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Wait before retry number `attempt + 1`: `backoff * 2^attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }
}
