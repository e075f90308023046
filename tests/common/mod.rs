//! Helpers for integration tests.
#![allow(dead_code)]

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pushkind_catalog::domain::options::VariantOptions;
use pushkind_catalog::domain::staging::{
    IncomingStagingMedia, IncomingStagingProduct, IncomingStagingVariant, StagingOption,
};
use pushkind_catalog::domain::types::{ExternalProductId, MediaUrl, PriceMinor};
use pushkind_catalog::schema::{brands, categories, merchants, products, variants};
use pushkind_common::db::{DbConnection, DbPool, establish_connection_pool};
use tempfile::NamedTempFile;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!(); // assumes migrations/ exists

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn conn(&self) -> DbConnection {
        self.pool.get().expect("Failed to get SQLite connection from pool.")
    }

    pub fn insert_merchant(&self, name: &str) -> i32 {
        diesel::insert_into(merchants::table)
            .values((
                merchants::name.eq(name),
                merchants::source_config
                    .eq(r#"{"storeUrl":"demo.myshopify.com","accessToken":"shpat_test"}"#),
            ))
            .returning(merchants::id)
            .get_result(&mut self.conn())
            .expect("should insert merchant")
    }

    pub fn insert_brand(&self, name: &str) -> i32 {
        diesel::insert_into(brands::table)
            .values((brands::name.eq(name), brands::slug.eq(name.to_lowercase())))
            .returning(brands::id)
            .get_result(&mut self.conn())
            .expect("should insert brand")
    }

    pub fn insert_category(&self, name: &str) -> i32 {
        diesel::insert_into(categories::table)
            .values((
                categories::name.eq(name),
                categories::slug.eq(name.to_lowercase()),
                categories::path.eq(name),
            ))
            .returning(categories::id)
            .get_result(&mut self.conn())
            .expect("should insert category")
    }

    pub fn insert_product(&self, title: &str, slug: &str) -> i32 {
        diesel::insert_into(products::table)
            .values((products::title.eq(title), products::slug.eq(slug)))
            .returning(products::id)
            .get_result(&mut self.conn())
            .expect("should insert product")
    }

    pub fn insert_variant(&self, product_id: i32, sku: &str, options: &str) -> i32 {
        diesel::insert_into(variants::table)
            .values((
                variants::product_id.eq(product_id),
                variants::internal_sku.eq(sku),
                variants::options.eq(options),
            ))
            .returning(variants::id)
            .get_result(&mut self.conn())
            .expect("should insert variant")
    }
}

pub fn timestamp(day: u32) -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2026, 3, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn options(entries: &[(&str, &str)]) -> VariantOptions {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn variant(id: &str, sku: &str, price_minor: i64, opts: &[(&str, &str)]) -> IncomingStagingVariant {
    IncomingStagingVariant {
        external_variant_id: id.to_string(),
        raw_sku: Some(sku.to_string()),
        raw_barcode: None,
        raw_price_minor: PriceMinor::new(price_minor).unwrap(),
        raw_options: options(opts),
    }
}

/// Upstream product with one image.
pub fn incoming(
    external_id: &str,
    title: &str,
    variants: Vec<IncomingStagingVariant>,
) -> IncomingStagingProduct {
    IncomingStagingProduct {
        external_product_id: ExternalProductId::new(external_id).unwrap(),
        title: title.to_string(),
        body_html: Some("<p>Soft</p>".to_string()),
        vendor: Some("Acme".to_string()),
        product_type: Some("Shirt".to_string()),
        tags: vec!["summer".to_string()],
        raw_json: serde_json::json!({ "id": external_id, "title": title }),
        options_definition: vec![StagingOption {
            name: "Color".to_string(),
            values: vec!["Red".to_string(), "Blue".to_string()],
        }],
        media: vec![IncomingStagingMedia {
            external_media_id: Some(format!("{external_id}/media/1")),
            media_type: "IMAGE".to_string(),
            source_url: MediaUrl::new(format!("https://cdn.example/{external_id}.jpg")).unwrap(),
            alt_text: Some("front".to_string()),
        }],
        variants,
    }
}
