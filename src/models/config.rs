use serde::Deserialize;

use crate::source::config::ShopifyAdapterConfig;

/// Configuration of the catalog service.
///
/// Loaded from `config/default.yaml`, the optional `config/{APP_ENV}.yaml`
/// and `APP_*` environment variables, in that order.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// Origins allowed to call the API from a browser.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default)]
    pub shopify: ShopifyAdapterConfig,
}
