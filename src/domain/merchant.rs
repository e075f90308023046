use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{MerchantId, MerchantName};

/// A seller whose catalog is ingested from an external storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merchant {
    pub id: MerchantId,
    pub name: MerchantName,
    pub email: Option<String>,
    /// Storefront platform, e.g. `SHOPIFY`.
    pub source_type: String,
    /// Opaque JSON holding the storefront credentials.
    pub source_config: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
