use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::options::VariantOptions;
use crate::domain::types::{
    ExternalProductId, MediaUrl, MerchantId, PriceMinor, ProductId, StagingMediaId,
    StagingProductId, StagingStatus, StagingVariantId, TypeConstraintError,
};

/// Admin note stored when a re-sync detects changed product details.
pub const DETAILS_CHANGED_NOTE: &str = "Auto-Sync: Product details changed on Shopify.";

/// Option name and its values as declared by the upstream product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingOption {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Raw product record awaiting curation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingProduct {
    pub id: StagingProductId,
    pub merchant_id: MerchantId,
    pub external_product_id: ExternalProductId,
    pub raw_title: String,
    pub raw_body_html: Option<String>,
    pub raw_vendor: Option<String>,
    pub raw_product_type: Option<String>,
    pub raw_tags: Vec<String>,
    /// Whole upstream node as received.
    pub raw_json_dump: serde_json::Value,
    pub raw_options_definition: Vec<StagingOption>,
    pub status: StagingStatus,
    pub match_confidence_score: Option<i32>,
    pub suggested_product_id: Option<ProductId>,
    pub rejection_reason: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl StagingProduct {
    /// Whether a re-sync carrying `incoming_title` must send this record back
    /// to the review queue.
    pub fn requires_review(&self, incoming_title: &str) -> bool {
        requires_review(&self.raw_title, self.status, incoming_title)
    }
}

/// A changed title flags any record that has left `PENDING`.
pub fn requires_review(stored_title: &str, status: StagingStatus, incoming_title: &str) -> bool {
    stored_title != incoming_title && status != StagingStatus::Pending
}

/// Raw variant belonging to a [`StagingProduct`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingVariant {
    pub id: StagingVariantId,
    pub staging_product_id: StagingProductId,
    pub external_variant_id: String,
    pub raw_sku: Option<String>,
    pub raw_barcode: Option<String>,
    pub raw_price_minor: PriceMinor,
    pub raw_options: VariantOptions,
    pub status: StagingStatus,
    pub created_at: NaiveDateTime,
}

/// Raw media item belonging to a [`StagingProduct`]. Positions start at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingMedia {
    pub id: StagingMediaId,
    pub staging_product_id: StagingProductId,
    pub external_media_id: Option<String>,
    pub media_type: String,
    pub source_url: MediaUrl,
    pub alt_text: Option<String>,
    pub position: i32,
    pub created_at: NaiveDateTime,
}

/// A staging product together with its media (by position) and variants.
#[derive(Debug, Clone)]
pub struct StagingAggregate {
    pub product: StagingProduct,
    pub media: Vec<StagingMedia>,
    pub variants: Vec<StagingVariant>,
}

impl StagingAggregate {
    /// URL of the first media item by position.
    pub fn image_url(&self) -> Option<&str> {
        self.media
            .iter()
            .min_by_key(|m| m.position)
            .map(|m| m.source_url.as_str())
    }
}

/// Staging product row with the listing image resolved.
#[derive(Debug, Clone)]
pub struct StagingListItem {
    pub product: StagingProduct,
    pub image_url: Option<String>,
}

/// Variant data produced by a sync run.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingStagingVariant {
    pub external_variant_id: String,
    pub raw_sku: Option<String>,
    pub raw_barcode: Option<String>,
    pub raw_price_minor: PriceMinor,
    pub raw_options: VariantOptions,
}

/// Media data produced by a sync run, already in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingStagingMedia {
    pub external_media_id: Option<String>,
    pub media_type: String,
    pub source_url: MediaUrl,
    pub alt_text: Option<String>,
}

/// Everything a sync run knows about one upstream product.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingStagingProduct {
    pub external_product_id: ExternalProductId,
    pub title: String,
    pub body_html: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub tags: Vec<String>,
    pub raw_json: serde_json::Value,
    pub options_definition: Vec<StagingOption>,
    pub media: Vec<IncomingStagingMedia>,
    pub variants: Vec<IncomingStagingVariant>,
}

/// Result of upserting one [`IncomingStagingProduct`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub staging_id: StagingProductId,
    pub created: bool,
    pub flagged_for_review: bool,
}

/// Counters for the merchant dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MerchantStagingStats {
    pub live_products: usize,
    pub under_review: usize,
    pub issues: usize,
    pub total_skus: usize,
}

impl MerchantStagingStats {
    /// `total_skus` counts every staging record in the three buckets.
    pub fn new(live_products: usize, under_review: usize, issues: usize) -> Self {
        Self {
            live_products,
            under_review,
            issues,
            total_skus: live_products + under_review + issues,
        }
    }
}

/// Convert a decimal price string such as `"12.30"` into minor units.
///
/// Rounds half away from zero at the cent boundary.
pub fn parse_price_minor(raw: &str) -> Result<PriceMinor, TypeConstraintError> {
    let trimmed = raw.trim();
    let price = Decimal::from_str(trimmed)
        .map_err(|_| TypeConstraintError::InvalidValue(format!("price: {trimmed}")))?;
    let minor = (price * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| TypeConstraintError::InvalidValue(format!("price: {trimmed}")))?;
    PriceMinor::new(minor)
}
