use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::catalog::{
    Brand as DomainBrand, Category as DomainCategory, Media as DomainMedia,
    NewMedia as DomainNewMedia, NewProduct as DomainNewProduct, NewVariant as DomainNewVariant,
    Product as DomainProduct, Variant as DomainVariant,
};
use crate::domain::options::{OptionsDefinition, VariantOptions};
use crate::domain::types::{
    BrandId, CatalogStatus, CategoryId, InternalSku, MediaId, MediaUrl, ProductId, ProductSlug,
    ProductTitle, VariantId,
};
use crate::repository::errors::RepositoryError;
use crate::schema::{brands, categories, media, product_categories, products, variants};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = products)]
pub struct Product {
    pub id: i32,
    pub brand_id: Option<i32>,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub options_definition: String,
    pub specifications: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct<'a> {
    pub brand_id: Option<i32>,
    pub title: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub options_definition: String,
    pub specifications: String,
    pub status: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewProduct<'a> {
    pub fn from_domain(
        product: &'a DomainNewProduct,
        now: NaiveDateTime,
    ) -> Result<Self, RepositoryError> {
        Ok(Self {
            brand_id: product.brand_id.map(BrandId::get),
            title: product.title.as_str(),
            slug: product.slug.as_str(),
            description: product.description.as_deref(),
            image_url: None,
            options_definition: serde_json::to_string(&product.options_definition)?,
            specifications: serde_json::to_string(&product.specifications)?,
            status: product.status.as_str(),
            created_at: now,
            updated_at: now,
        })
    }
}

impl TryFrom<Product> for DomainProduct {
    type Error = RepositoryError;

    fn try_from(row: Product) -> Result<Self, Self::Error> {
        let options_definition: OptionsDefinition = serde_json::from_str(&row.options_definition)?;
        let specifications: serde_json::Value = serde_json::from_str(&row.specifications)?;
        Ok(Self {
            id: ProductId::new(row.id)?,
            brand_id: row.brand_id.map(BrandId::new).transpose()?,
            title: ProductTitle::new(row.title)?,
            slug: ProductSlug::new(row.slug)?,
            description: row.description,
            image_url: row.image_url,
            options_definition,
            specifications,
            status: CatalogStatus::try_from(row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Product))]
#[diesel(table_name = variants)]
pub struct Variant {
    pub id: i32,
    pub product_id: i32,
    pub internal_sku: String,
    pub gtin: Option<String>,
    pub mpn: Option<String>,
    pub options: String,
    pub normalized_attributes: Option<String>,
    pub status: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = variants)]
pub struct NewVariant<'a> {
    pub product_id: i32,
    pub internal_sku: &'a str,
    pub gtin: Option<&'a str>,
    pub mpn: Option<&'a str>,
    pub options: String,
    pub normalized_attributes: Option<&'a str>,
    pub status: &'a str,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewVariant<'a> {
    pub fn from_domain(
        variant: &'a DomainNewVariant,
        now: NaiveDateTime,
    ) -> Result<Self, RepositoryError> {
        Ok(Self {
            product_id: variant.product_id.get(),
            internal_sku: variant.internal_sku.as_str(),
            gtin: variant.gtin.as_deref(),
            mpn: variant.mpn.as_deref(),
            options: serde_json::to_string(&variant.options)?,
            normalized_attributes: variant.normalized_attributes.as_deref(),
            status: variant.status.as_str(),
            is_active: variant.is_active,
            created_at: now,
            updated_at: now,
        })
    }
}

impl TryFrom<Variant> for DomainVariant {
    type Error = RepositoryError;

    fn try_from(row: Variant) -> Result<Self, Self::Error> {
        let options: VariantOptions = serde_json::from_str(&row.options)?;
        Ok(Self {
            id: VariantId::new(row.id)?,
            product_id: ProductId::new(row.product_id)?,
            internal_sku: InternalSku::new(row.internal_sku)?,
            gtin: row.gtin,
            mpn: row.mpn,
            options,
            normalized_attributes: row.normalized_attributes,
            status: CatalogStatus::try_from(row.status)?,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Product))]
#[diesel(table_name = media)]
pub struct Media {
    pub id: i32,
    pub product_id: i32,
    pub src_url: String,
    pub alt_text: Option<String>,
    pub position: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = media)]
pub struct NewMedia<'a> {
    pub product_id: i32,
    pub src_url: &'a str,
    pub alt_text: Option<&'a str>,
    pub position: i32,
    pub created_at: NaiveDateTime,
}

impl<'a> NewMedia<'a> {
    pub fn from_domain(media: &'a DomainNewMedia, now: NaiveDateTime) -> Self {
        Self {
            product_id: media.product_id.get(),
            src_url: media.src_url.as_str(),
            alt_text: media.alt_text.as_deref(),
            position: media.position,
            created_at: now,
        }
    }
}

impl TryFrom<Media> for DomainMedia {
    type Error = RepositoryError;

    fn try_from(row: Media) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MediaId::new(row.id)?,
            product_id: ProductId::new(row.product_id)?,
            src_url: MediaUrl::new(row.src_url)?,
            alt_text: row.alt_text,
            position: row.position,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = brands)]
pub struct Brand {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub is_active: bool,
}

impl TryFrom<Brand> for DomainBrand {
    type Error = RepositoryError;

    fn try_from(row: Brand) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BrandId::new(row.id)?,
            name: row.name,
            slug: row.slug,
            logo_url: row.logo_url,
            is_active: row.is_active,
        })
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = categories)]
pub struct Category {
    pub id: i32,
    pub parent_id: Option<i32>,
    pub name: String,
    pub slug: String,
    pub path: Option<String>,
    pub is_active: bool,
}

impl TryFrom<Category> for DomainCategory {
    type Error = RepositoryError;

    fn try_from(row: Category) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CategoryId::new(row.id)?,
            parent_id: row.parent_id.map(CategoryId::new).transpose()?,
            name: row.name,
            slug: row.slug,
            path: row.path,
            is_active: row.is_active,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = product_categories)]
pub struct NewProductCategory {
    pub product_id: i32,
    pub category_id: i32,
}
