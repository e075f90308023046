use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::options::VariantOptions;
use crate::domain::staging::{
    IncomingStagingMedia, IncomingStagingProduct, IncomingStagingVariant,
    StagingMedia as DomainStagingMedia, StagingOption, StagingProduct as DomainStagingProduct,
    StagingVariant as DomainStagingVariant,
};
use crate::domain::types::{
    ExternalProductId, MediaUrl, MerchantId, PriceMinor, ProductId, StagingMediaId,
    StagingProductId, StagingStatus, StagingVariantId,
};
use crate::repository::errors::RepositoryError;
use crate::schema::{staging_media, staging_products, staging_variants};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = staging_products)]
pub struct StagingProduct {
    pub id: i32,
    pub merchant_id: i32,
    pub external_product_id: String,
    pub raw_title: String,
    pub raw_body_html: Option<String>,
    pub raw_vendor: Option<String>,
    pub raw_product_type: Option<String>,
    pub raw_tags: String,
    pub raw_json_dump: String,
    pub raw_options_definition: String,
    pub status: String,
    pub match_confidence_score: Option<i32>,
    pub suggested_product_id: Option<i32>,
    pub rejection_reason: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = staging_products)]
pub struct NewStagingProduct<'a> {
    pub merchant_id: i32,
    pub external_product_id: &'a str,
    pub raw_title: &'a str,
    pub raw_body_html: Option<&'a str>,
    pub raw_vendor: Option<&'a str>,
    pub raw_product_type: Option<&'a str>,
    pub raw_tags: String,
    pub raw_json_dump: String,
    pub raw_options_definition: String,
    pub status: &'a str,
    pub match_confidence_score: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Raw columns rewritten on every sync of an existing record.
#[derive(AsChangeset)]
#[diesel(table_name = staging_products, treat_none_as_null = true)]
pub struct StagingProductRawUpdate<'a> {
    pub raw_title: &'a str,
    pub raw_body_html: Option<&'a str>,
    pub raw_vendor: Option<&'a str>,
    pub raw_product_type: Option<&'a str>,
    pub raw_tags: String,
    pub raw_json_dump: String,
    pub raw_options_definition: String,
    pub updated_at: NaiveDateTime,
}

impl<'a> StagingProductRawUpdate<'a> {
    pub fn from_incoming(
        incoming: &'a IncomingStagingProduct,
        now: NaiveDateTime,
    ) -> Result<Self, RepositoryError> {
        Ok(Self {
            raw_title: &incoming.title,
            raw_body_html: incoming.body_html.as_deref(),
            raw_vendor: incoming.vendor.as_deref(),
            raw_product_type: incoming.product_type.as_deref(),
            raw_tags: serde_json::to_string(&incoming.tags)?,
            raw_json_dump: serde_json::to_string(&incoming.raw_json)?,
            raw_options_definition: serde_json::to_string(&incoming.options_definition)?,
            updated_at: now,
        })
    }
}

impl<'a> NewStagingProduct<'a> {
    /// A fresh `PENDING` record with a zero confidence score.
    pub fn from_incoming(
        merchant_id: MerchantId,
        incoming: &'a IncomingStagingProduct,
        now: NaiveDateTime,
    ) -> Result<Self, RepositoryError> {
        Ok(Self {
            merchant_id: merchant_id.get(),
            external_product_id: incoming.external_product_id.as_str(),
            raw_title: &incoming.title,
            raw_body_html: incoming.body_html.as_deref(),
            raw_vendor: incoming.vendor.as_deref(),
            raw_product_type: incoming.product_type.as_deref(),
            raw_tags: serde_json::to_string(&incoming.tags)?,
            raw_json_dump: serde_json::to_string(&incoming.raw_json)?,
            raw_options_definition: serde_json::to_string(&incoming.options_definition)?,
            status: StagingStatus::Pending.as_str(),
            match_confidence_score: Some(0),
            created_at: now,
            updated_at: now,
        })
    }
}

impl TryFrom<StagingProduct> for DomainStagingProduct {
    type Error = RepositoryError;

    fn try_from(row: StagingProduct) -> Result<Self, Self::Error> {
        let raw_tags: Vec<String> = serde_json::from_str(&row.raw_tags)?;
        let raw_json_dump: serde_json::Value = serde_json::from_str(&row.raw_json_dump)?;
        let raw_options_definition: Vec<StagingOption> =
            serde_json::from_str(&row.raw_options_definition)?;
        Ok(Self {
            id: StagingProductId::new(row.id)?,
            merchant_id: MerchantId::new(row.merchant_id)?,
            external_product_id: ExternalProductId::new(row.external_product_id)?,
            raw_title: row.raw_title,
            raw_body_html: row.raw_body_html,
            raw_vendor: row.raw_vendor,
            raw_product_type: row.raw_product_type,
            raw_tags,
            raw_json_dump,
            raw_options_definition,
            status: StagingStatus::try_from(row.status)?,
            match_confidence_score: row.match_confidence_score,
            suggested_product_id: row.suggested_product_id.map(ProductId::new).transpose()?,
            rejection_reason: row.rejection_reason,
            admin_notes: row.admin_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(StagingProduct, foreign_key = staging_product_id))]
#[diesel(table_name = staging_variants)]
pub struct StagingVariant {
    pub id: i32,
    pub staging_product_id: i32,
    pub external_variant_id: String,
    pub raw_sku: Option<String>,
    pub raw_barcode: Option<String>,
    pub raw_price_minor: i64,
    pub raw_options: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = staging_variants)]
pub struct NewStagingVariant<'a> {
    pub staging_product_id: i32,
    pub external_variant_id: &'a str,
    pub raw_sku: Option<&'a str>,
    pub raw_barcode: Option<&'a str>,
    pub raw_price_minor: i64,
    pub raw_options: String,
    pub status: &'a str,
    pub created_at: NaiveDateTime,
}

impl<'a> NewStagingVariant<'a> {
    pub fn from_incoming(
        staging_id: StagingProductId,
        incoming: &'a IncomingStagingVariant,
        now: NaiveDateTime,
    ) -> Result<Self, RepositoryError> {
        Ok(Self {
            staging_product_id: staging_id.get(),
            external_variant_id: &incoming.external_variant_id,
            raw_sku: incoming.raw_sku.as_deref(),
            raw_barcode: incoming.raw_barcode.as_deref(),
            raw_price_minor: incoming.raw_price_minor.get(),
            raw_options: serde_json::to_string(&incoming.raw_options)?,
            status: StagingStatus::Pending.as_str(),
            created_at: now,
        })
    }
}

impl TryFrom<StagingVariant> for DomainStagingVariant {
    type Error = RepositoryError;

    fn try_from(row: StagingVariant) -> Result<Self, Self::Error> {
        let raw_options: VariantOptions = serde_json::from_str(&row.raw_options)?;
        Ok(Self {
            id: StagingVariantId::new(row.id)?,
            staging_product_id: StagingProductId::new(row.staging_product_id)?,
            external_variant_id: row.external_variant_id,
            raw_sku: row.raw_sku,
            raw_barcode: row.raw_barcode,
            raw_price_minor: PriceMinor::new(row.raw_price_minor)?,
            raw_options,
            status: StagingStatus::try_from(row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(StagingProduct, foreign_key = staging_product_id))]
#[diesel(table_name = staging_media)]
pub struct StagingMedia {
    pub id: i32,
    pub staging_product_id: i32,
    pub external_media_id: Option<String>,
    pub media_type: String,
    pub source_url: String,
    pub alt_text: Option<String>,
    pub position: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = staging_media)]
pub struct NewStagingMedia<'a> {
    pub staging_product_id: i32,
    pub external_media_id: Option<&'a str>,
    pub media_type: &'a str,
    pub source_url: &'a str,
    pub alt_text: Option<&'a str>,
    pub position: i32,
    pub created_at: NaiveDateTime,
}

impl<'a> NewStagingMedia<'a> {
    pub fn from_incoming(
        staging_id: StagingProductId,
        incoming: &'a IncomingStagingMedia,
        position: i32,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            staging_product_id: staging_id.get(),
            external_media_id: incoming.external_media_id.as_deref(),
            media_type: &incoming.media_type,
            source_url: incoming.source_url.as_str(),
            alt_text: incoming.alt_text.as_deref(),
            position,
            created_at: now,
        }
    }
}

impl TryFrom<StagingMedia> for DomainStagingMedia {
    type Error = RepositoryError;

    fn try_from(row: StagingMedia) -> Result<Self, Self::Error> {
        Ok(Self {
            id: StagingMediaId::new(row.id)?,
            staging_product_id: StagingProductId::new(row.staging_product_id)?,
            external_media_id: row.external_media_id,
            media_type: row.media_type,
            source_url: MediaUrl::new(row.source_url)?,
            alt_text: row.alt_text,
            position: row.position,
            created_at: row.created_at,
        })
    }
}
