use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::offer::{MerchantOffer as DomainMerchantOffer, NewMerchantOffer as DomainNew};
use crate::domain::types::{
    CurrencyCode, MerchantId, OfferId, OfferStatus, PriceMinor, VariantId,
};
use crate::repository::errors::RepositoryError;
use crate::schema::merchant_offers;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = merchant_offers)]
pub struct MerchantOffer {
    pub id: i32,
    pub merchant_id: i32,
    pub variant_id: i32,
    pub external_product_id: Option<String>,
    pub external_variant_id: Option<String>,
    pub merchant_sku: Option<String>,
    pub currency_code: String,
    pub cached_price_minor: i64,
    pub cached_settlement_price_minor: i64,
    pub current_stock: i32,
    pub offer_status: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = merchant_offers)]
pub struct NewMerchantOffer<'a> {
    pub merchant_id: i32,
    pub variant_id: i32,
    pub external_product_id: Option<&'a str>,
    pub external_variant_id: Option<&'a str>,
    pub merchant_sku: Option<&'a str>,
    pub currency_code: &'a str,
    pub cached_price_minor: i64,
    pub cached_settlement_price_minor: i64,
    pub current_stock: i32,
    pub offer_status: &'a str,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewMerchantOffer<'a> {
    pub fn from_domain(offer: &'a DomainNew, now: NaiveDateTime) -> Self {
        Self {
            merchant_id: offer.merchant_id.get(),
            variant_id: offer.variant_id.get(),
            external_product_id: offer.external_product_id.as_deref(),
            external_variant_id: offer.external_variant_id.as_deref(),
            merchant_sku: offer.merchant_sku.as_deref(),
            currency_code: offer.currency_code.as_str(),
            cached_price_minor: offer.cached_price_minor.get(),
            cached_settlement_price_minor: offer.cached_settlement_price_minor.get(),
            current_stock: offer.current_stock,
            offer_status: offer.offer_status.as_str(),
            is_active: offer.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<MerchantOffer> for DomainMerchantOffer {
    type Error = RepositoryError;

    fn try_from(row: MerchantOffer) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OfferId::new(row.id)?,
            merchant_id: MerchantId::new(row.merchant_id)?,
            variant_id: VariantId::new(row.variant_id)?,
            external_product_id: row.external_product_id,
            external_variant_id: row.external_variant_id,
            merchant_sku: row.merchant_sku,
            currency_code: CurrencyCode::new(row.currency_code)?,
            cached_price_minor: PriceMinor::new(row.cached_price_minor)?,
            cached_settlement_price_minor: PriceMinor::new(row.cached_settlement_price_minor)?,
            current_stock: row.current_stock,
            offer_status: OfferStatus::try_from(row.offer_status)?,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
