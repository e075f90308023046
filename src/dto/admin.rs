//! Reviewer console payloads. Field names are snake_case on the wire.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::catalog::{ProductSummary, Variant};
use crate::domain::options::{MatchReason, VariantOptions};
use crate::domain::staging::{StagingAggregate, StagingMedia, StagingVariant};
use crate::domain::types::StagingStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdminStatsDto {
    pub pending_reviews: usize,
    pub total_master_products: usize,
    pub rejected_this_week: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewQueueItemDto {
    pub staging_id: i32,
    pub merchant_name: String,
    pub raw_title: String,
    pub created_at: NaiveDateTime,
    pub match_confidence: i32,
    pub suggested_master_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagingMediaDto {
    pub id: i32,
    pub source_url: String,
    pub alt_text: Option<String>,
    pub position: i32,
}

impl From<StagingMedia> for StagingMediaDto {
    fn from(value: StagingMedia) -> Self {
        Self {
            id: value.id.get(),
            source_url: value.source_url.into_inner(),
            alt_text: value.alt_text,
            position: value.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagingVariantDto {
    pub staging_variant_id: i32,
    pub raw_sku: Option<String>,
    pub raw_barcode: Option<String>,
    pub raw_price_minor: i64,
    pub raw_options: VariantOptions,
}

impl From<StagingVariant> for StagingVariantDto {
    fn from(value: StagingVariant) -> Self {
        Self {
            staging_variant_id: value.id.get(),
            raw_sku: value.raw_sku,
            raw_barcode: value.raw_barcode,
            raw_price_minor: value.raw_price_minor.get(),
            raw_options: value.raw_options,
        }
    }
}

/// Everything the reviewer sees on the decision screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagingDetailDto {
    pub staging_id: i32,
    pub merchant_id: i32,
    pub merchant_name: String,
    pub raw_title: String,
    pub raw_body_html: Option<String>,
    pub raw_vendor: Option<String>,
    pub raw_product_type: Option<String>,
    pub status: StagingStatus,
    pub match_confidence_score: Option<i32>,
    pub suggested_product_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub image_url: Option<String>,
    pub media: Vec<StagingMediaDto>,
    pub variants: Vec<StagingVariantDto>,
}

impl StagingDetailDto {
    pub fn new(aggregate: StagingAggregate, merchant_name: String) -> Self {
        let image_url = aggregate.image_url().map(str::to_string);
        let StagingAggregate {
            product,
            mut media,
            variants,
        } = aggregate;
        media.sort_by_key(|m| m.position);
        Self {
            staging_id: product.id.get(),
            merchant_id: product.merchant_id.get(),
            merchant_name,
            raw_title: product.raw_title,
            raw_body_html: product.raw_body_html,
            raw_vendor: product.raw_vendor,
            raw_product_type: product.raw_product_type,
            status: product.status,
            match_confidence_score: product.match_confidence_score,
            suggested_product_id: product.suggested_product_id.map(|id| id.get()),
            created_at: product.created_at,
            image_url,
            media: media.into_iter().map(Into::into).collect(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantMatchSuggestionDto {
    pub staging_variant_id: i32,
    pub staging_options: VariantOptions,
    pub suggested_master_variant_id: Option<i32>,
    pub match_reason: MatchReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantMatchResponseDto {
    pub staging_product_id: i32,
    pub master_product_id: i32,
    pub matches: Vec<VariantMatchSuggestionDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterProductListItemDto {
    pub id: i32,
    pub title: String,
    /// Brand name, empty when the product has none.
    pub brand: String,
    pub image_url: Option<String>,
    pub variant_count: usize,
}

impl From<ProductSummary> for MasterProductListItemDto {
    fn from(value: ProductSummary) -> Self {
        Self {
            id: value.product.id.get(),
            title: value.product.title.into_inner(),
            brand: value.brand_name.unwrap_or_default(),
            image_url: value.product.image_url,
            variant_count: value.variant_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterVariantDto {
    pub id: i32,
    pub internal_sku: String,
    pub gtin: Option<String>,
    pub options: VariantOptions,
}

impl From<Variant> for MasterVariantDto {
    fn from(value: Variant) -> Self {
        Self {
            id: value.id.get(),
            internal_sku: value.internal_sku.into_inner(),
            gtin: value.gtin,
            options: value.options,
        }
    }
}
