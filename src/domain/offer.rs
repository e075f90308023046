use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::staging::{StagingProduct, StagingVariant};
use crate::domain::types::{
    CurrencyCode, MerchantId, OfferId, OfferStatus, PriceMinor, TypeConstraintError, VariantId,
};

/// Currency assigned to offers created from staging data.
pub const DEFAULT_CURRENCY: &str = "INR";

/// A merchant selling a canonical variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantOffer {
    pub id: OfferId,
    pub merchant_id: MerchantId,
    pub variant_id: VariantId,
    pub external_product_id: Option<String>,
    pub external_variant_id: Option<String>,
    pub merchant_sku: Option<String>,
    pub currency_code: CurrencyCode,
    pub cached_price_minor: PriceMinor,
    pub cached_settlement_price_minor: PriceMinor,
    pub current_stock: i32,
    pub offer_status: OfferStatus,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Information required to create a new [`MerchantOffer`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewMerchantOffer {
    pub merchant_id: MerchantId,
    pub variant_id: VariantId,
    pub external_product_id: Option<String>,
    pub external_variant_id: Option<String>,
    pub merchant_sku: Option<String>,
    pub currency_code: CurrencyCode,
    pub cached_price_minor: PriceMinor,
    pub cached_settlement_price_minor: PriceMinor,
    pub current_stock: i32,
    pub offer_status: OfferStatus,
    pub is_active: bool,
}

impl NewMerchantOffer {
    /// Live offer for `variant_id` seeded from a staging variant.
    ///
    /// Stock starts at zero and the settlement price mirrors the listed price.
    pub fn from_staging(
        staging: &StagingProduct,
        variant: &StagingVariant,
        variant_id: VariantId,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            merchant_id: staging.merchant_id,
            variant_id,
            external_product_id: Some(staging.external_product_id.as_str().to_string()),
            external_variant_id: Some(variant.external_variant_id.clone()),
            merchant_sku: variant.raw_sku.clone(),
            currency_code: CurrencyCode::new(DEFAULT_CURRENCY)?,
            cached_price_minor: variant.raw_price_minor,
            cached_settlement_price_minor: variant.raw_price_minor,
            current_stock: 0,
            offer_status: OfferStatus::Live,
            is_active: true,
        })
    }
}
