use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::options::{OptionsDefinition, VariantOptions, normalized_key};
use crate::domain::types::{
    BrandId, CatalogStatus, CategoryId, InternalSku, MediaId, MediaUrl, ProductId, ProductSlug,
    ProductTitle, VariantId,
};

/// Canonical catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub brand_id: Option<BrandId>,
    pub title: ProductTitle,
    pub slug: ProductSlug,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub options_definition: OptionsDefinition,
    pub specifications: serde_json::Value,
    pub status: CatalogStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    pub fn has_image(&self) -> bool {
        self.image_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

/// Information required to create a new [`Product`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub brand_id: Option<BrandId>,
    pub title: ProductTitle,
    pub slug: ProductSlug,
    pub description: Option<String>,
    pub options_definition: OptionsDefinition,
    pub specifications: serde_json::Value,
    pub status: CatalogStatus,
}

/// Canonical variant. Belongs to exactly one [`Product`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub internal_sku: InternalSku,
    pub gtin: Option<String>,
    pub mpn: Option<String>,
    pub options: VariantOptions,
    pub normalized_attributes: Option<String>,
    pub status: CatalogStatus,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Information required to create a new [`Variant`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewVariant {
    pub product_id: ProductId,
    pub internal_sku: InternalSku,
    pub gtin: Option<String>,
    pub mpn: Option<String>,
    pub options: VariantOptions,
    pub normalized_attributes: Option<String>,
    pub status: CatalogStatus,
    pub is_active: bool,
}

impl NewVariant {
    /// An active variant with its normalized options key precomputed.
    pub fn active(product_id: ProductId, internal_sku: InternalSku, options: VariantOptions) -> Self {
        let key = normalized_key(&options);
        Self {
            product_id,
            internal_sku,
            gtin: None,
            mpn: None,
            normalized_attributes: (!key.is_empty()).then_some(key),
            options,
            status: CatalogStatus::Active,
            is_active: true,
        }
    }
}

/// Canonical media row. Positions start at 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: MediaId,
    pub product_id: ProductId,
    pub src_url: MediaUrl,
    pub alt_text: Option<String>,
    pub position: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMedia {
    pub product_id: ProductId,
    pub src_url: MediaUrl,
    pub alt_text: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub is_active: bool,
}

/// Category node; `path` is the materialized "A > B > C" chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub parent_id: Option<CategoryId>,
    pub name: String,
    pub slug: String,
    pub path: Option<String>,
    pub is_active: bool,
}

/// Master product row enriched for reviewer listings.
#[derive(Debug, Clone)]
pub struct ProductSummary {
    pub product: Product,
    pub brand_name: Option<String>,
    pub variant_count: usize,
}
