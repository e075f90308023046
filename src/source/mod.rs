//! Upstream storefront access.
//!
//! A [`ProductSource`] yields every raw product of one merchant's store.
//! Pagination, throttling and retries stay behind the trait.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::source::graphql::ProductNode;

pub mod config;
pub mod graphql;
pub mod shopify;
pub mod transport;

pub type RawProduct = ProductNode;

/// Classified failure of an upstream fetch.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid source configuration: {0}")]
    ConfigInvalid(String),
    #[error("upstream rejected the credentials (HTTP {0})")]
    AuthFailed(u16),
    #[error("upstream kept rate limiting after {attempts} attempts")]
    RateLimited { attempts: u32 },
    #[error("upstream unavailable after {attempts} attempts")]
    UpstreamUnavailable { status: Option<u16>, attempts: u32 },
    #[error("upstream rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("interrupted")]
    Interrupted,
}

/// Per-merchant store credentials taken from the merchant's source config.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCredentials {
    #[serde(default, alias = "store_url")]
    pub store_url: String,
    #[serde(default, alias = "access_token")]
    pub access_token: String,
}

impl fmt::Debug for SourceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCredentials")
            .field("store_url", &self.store_url)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl SourceCredentials {
    pub fn new(store_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            store_url: store_url.into(),
            access_token: access_token.into(),
        }
    }

    /// Parse the JSON mapping stored on the merchant.
    pub fn from_source_config(raw: &str) -> Result<Self, SourceError> {
        if raw.trim().is_empty() {
            return Err(SourceError::ConfigInvalid(
                "merchant has no source configuration".to_string(),
            ));
        }
        let credentials: SourceCredentials = serde_json::from_str(raw)
            .map_err(|e| SourceError::ConfigInvalid(format!("unparsable source config: {e}")))?;
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn validate(&self) -> Result<(), SourceError> {
        if self.store_url.trim().is_empty() {
            return Err(SourceError::ConfigInvalid("storeUrl is blank".to_string()));
        }
        if self.access_token.trim().is_empty() {
            return Err(SourceError::ConfigInvalid(
                "accessToken is blank".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Every product of the store, in upstream order. Never partial.
    async fn fetch_all(
        &self,
        credentials: &SourceCredentials,
    ) -> Result<Vec<RawProduct>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_and_snake_case_keys() {
        let camel = SourceCredentials::from_source_config(
            r#"{"storeUrl":"demo.myshopify.com","accessToken":"shpat_1"}"#,
        )
        .unwrap();
        assert_eq!(camel.store_url, "demo.myshopify.com");

        let snake = SourceCredentials::from_source_config(
            r#"{"store_url":"demo","access_token":"shpat_1"}"#,
        )
        .unwrap();
        assert_eq!(snake.access_token, "shpat_1");
    }

    #[test]
    fn blank_or_broken_config_is_invalid() {
        for raw in [
            "",
            "not json",
            r#"{"storeUrl":"  ","accessToken":"x"}"#,
            r#"{"storeUrl":"demo"}"#,
        ] {
            assert!(matches!(
                SourceCredentials::from_source_config(raw),
                Err(SourceError::ConfigInvalid(_))
            ));
        }
    }

    #[test]
    fn debug_hides_the_token() {
        let credentials = SourceCredentials::new("demo", "shpat_secret");
        let printed = format!("{credentials:?}");
        assert!(!printed.contains("shpat_secret"));
    }
}
