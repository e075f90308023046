use diesel::prelude::*;
use pushkind_catalog::domain::types::{MerchantId, StagingProductId, StagingStatus};
use pushkind_catalog::forms::review::ReviewDecisionForm;
use pushkind_catalog::repository::{DieselRepository, StagingReader, StagingWriter};
use pushkind_catalog::schema::{media, merchant_offers, product_categories, products, variants};
use pushkind_catalog::services::ServiceError;
use pushkind_catalog::services::admin::{review_queue, staging_detail};
use pushkind_catalog::services::clock::FixedClock;
use pushkind_catalog::services::review::submit_decision;
use serde_json::json;

mod common;

use common::{TestDb, incoming, timestamp, variant};

struct Seeded {
    test_db: TestDb,
    repo: DieselRepository,
    staging_id: StagingProductId,
    media_id: i32,
    variant_ids: Vec<i32>,
    brand_id: i32,
    category_id: i32,
}

fn seeded() -> Seeded {
    let test_db = TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let merchant_id = MerchantId::new(test_db.insert_merchant("Acme")).unwrap();
    let brand_id = test_db.insert_brand("Acme");
    let category_id = test_db.insert_category("Shirts");

    let outcome = repo
        .upsert_staging_product(
            merchant_id,
            &incoming(
                "gid://shopify/Product/1",
                "Linen Shirt",
                vec![
                    variant("V1", "RS", 1999, &[("Color", "Red"), ("Size", "S")]),
                    variant("V2", "BM", 2099, &[("Color", "Blue"), ("Size", "M")]),
                ],
            ),
            timestamp(1),
        )
        .expect("should upsert");

    let staged = repo
        .get_staging_product(outcome.staging_id)
        .expect("should load")
        .expect("record exists");

    Seeded {
        repo,
        staging_id: outcome.staging_id,
        media_id: staged.media[0].id.get(),
        variant_ids: staged.variants.iter().map(|v| v.id.get()).collect(),
        brand_id,
        category_id,
        test_db,
    }
}

fn form(value: serde_json::Value) -> ReviewDecisionForm {
    serde_json::from_value(value).expect("valid form json")
}

fn status(seeded: &Seeded) -> StagingStatus {
    seeded
        .repo
        .get_staging_product(seeded.staging_id)
        .expect("should load")
        .expect("record exists")
        .product
        .status
}

fn count_products(seeded: &Seeded) -> i64 {
    products::table
        .count()
        .get_result(&mut seeded.test_db.conn())
        .expect("should count")
}

fn count_variants(seeded: &Seeded) -> i64 {
    variants::table
        .count()
        .get_result(&mut seeded.test_db.conn())
        .expect("should count")
}

fn count_offers(seeded: &Seeded) -> i64 {
    merchant_offers::table
        .count()
        .get_result(&mut seeded.test_db.conn())
        .expect("should count")
}

#[test]
fn create_new_builds_catalog_entry_and_offers() {
    let seeded = seeded();
    let clock = FixedClock(timestamp(5));

    let outcome = submit_decision(
        seeded.staging_id.get(),
        form(json!({
            "action": "CREATE_NEW",
            "clean_data": {
                "title": "Linen Shirt",
                "brand_id": seeded.brand_id,
                "category_ids": [seeded.category_id],
                "selected_media_ids": [seeded.media_id],
                "options_definition": { "Color": ["Red", "Blue"], "Size": ["S", "M"] }
            }
        })),
        &seeded.repo,
        &clock,
    )
    .expect("decision succeeds");

    assert_eq!(outcome.variants_created, 4);
    assert_eq!(outcome.offers_created, 2);
    assert_eq!(status(&seeded), StagingStatus::Approved);

    let product_id = outcome.product_id.expect("product created").get();
    let mut conn = seeded.test_db.conn();
    let image_url: Option<String> = products::table
        .find(product_id)
        .select(products::image_url)
        .first(&mut conn)
        .expect("product row");
    assert_eq!(
        image_url.as_deref(),
        Some("https://cdn.example/gid://shopify/Product/1.jpg")
    );

    let skus: Vec<String> = variants::table
        .filter(variants::product_id.eq(product_id))
        .order(variants::id.asc())
        .select(variants::internal_sku)
        .load(&mut conn)
        .expect("variant rows");
    assert_eq!(skus.len(), 4);
    assert!(skus[0].starts_with("linen-shirt-"));
    assert!(skus[0].contains("-red-s-"));

    let prices: Vec<i64> = merchant_offers::table
        .order(merchant_offers::cached_price_minor.asc())
        .select(merchant_offers::cached_price_minor)
        .load(&mut conn)
        .expect("offer rows");
    assert_eq!(prices, vec![1999, 2099]);

    let linked: i64 = product_categories::table
        .filter(product_categories::product_id.eq(product_id))
        .count()
        .get_result(&mut conn)
        .expect("category links");
    assert_eq!(linked, 1);

    let positions: Vec<i32> = media::table
        .filter(media::product_id.eq(product_id))
        .select(media::position)
        .load(&mut conn)
        .expect("media rows");
    assert_eq!(positions, vec![0]);
}

#[test]
fn link_existing_reuses_master_and_adds_variants() {
    let seeded = seeded();
    let clock = FixedClock(timestamp(5));
    let master_id = seeded.test_db.insert_product("Classic Shirt", "classic-shirt");
    let master_variant = seeded
        .test_db
        .insert_variant(master_id, "CS-RED-S", r#"{"Color":"Red","Size":"S"}"#);

    let outcome = submit_decision(
        seeded.staging_id.get(),
        form(json!({
            "action": "LINK_EXISTING",
            "master_product_id": master_id,
            "variant_mapping": [
                { "staging_variant_id": seeded.variant_ids[0], "master_variant_id": master_variant },
                { "staging_variant_id": seeded.variant_ids[1],
                  "new_variant_attributes": { "Color": "Blue", "Size": "M" } }
            ]
        })),
        &seeded.repo,
        &clock,
    )
    .expect("decision succeeds");

    assert_eq!(outcome.offers_created, 2);
    assert_eq!(outcome.variants_created, 1);
    assert_eq!(status(&seeded), StagingStatus::Approved);

    let mut conn = seeded.test_db.conn();
    let skus: Vec<String> = variants::table
        .filter(variants::product_id.eq(master_id))
        .order(variants::id.asc())
        .select(variants::internal_sku)
        .load(&mut conn)
        .expect("variant rows");
    assert_eq!(
        skus,
        vec![
            "CS-RED-S".to_string(),
            format!("LINK-{}-{}", seeded.staging_id, seeded.variant_ids[1]),
        ]
    );
    assert_eq!(count_products(&seeded), 1);
}

#[test]
fn reject_stores_reason_and_notes() {
    let seeded = seeded();
    let clock = FixedClock(timestamp(5));

    submit_decision(
        seeded.staging_id.get(),
        form(json!({
            "action": "REJECT",
            "rejection_reason": "Counterfeit  ",
            "admin_notes": "Brand complaint"
        })),
        &seeded.repo,
        &clock,
    )
    .expect("decision succeeds");

    let staged = seeded
        .repo
        .get_staging_product(seeded.staging_id)
        .expect("should load")
        .expect("record exists");
    assert_eq!(staged.product.status, StagingStatus::Rejected);
    assert_eq!(staged.product.rejection_reason.as_deref(), Some("Counterfeit  "));
    assert_eq!(staged.product.admin_notes.as_deref(), Some("Brand complaint"));
    assert_eq!(staged.product.updated_at, timestamp(5));
    assert_eq!(count_products(&seeded), 0);
}

#[test]
fn failed_decision_leaves_no_trace() {
    let seeded = seeded();
    let clock = FixedClock(timestamp(5));
    let master_id = seeded.test_db.insert_product("Classic Shirt", "classic-shirt");
    let other_id = seeded.test_db.insert_product("Other", "other");
    let own_variant = seeded.test_db.insert_variant(master_id, "CS-1", "{}");
    let foreign_variant = seeded.test_db.insert_variant(other_id, "OT-1", "{}");

    let result = submit_decision(
        seeded.staging_id.get(),
        form(json!({
            "action": "LINK_EXISTING",
            "master_product_id": master_id,
            "variant_mapping": [
                { "staging_variant_id": seeded.variant_ids[0], "master_variant_id": own_variant },
                { "new_variant_attributes": { "Type": "Manual" } },
                { "staging_variant_id": seeded.variant_ids[1], "master_variant_id": foreign_variant }
            ]
        })),
        &seeded.repo,
        &clock,
    );

    assert!(matches!(result, Err(ServiceError::BadRequest(_))));
    assert_eq!(count_offers(&seeded), 0);
    assert_eq!(count_variants(&seeded), 2);
    assert_eq!(status(&seeded), StagingStatus::Pending);
}

#[test]
fn option_explosion_is_rejected() {
    let seeded = seeded();
    let clock = FixedClock(timestamp(5));
    let values: Vec<String> = (0..8).map(|i| format!("v{i}")).collect();

    let result = submit_decision(
        seeded.staging_id.get(),
        form(json!({
            "action": "CREATE_NEW",
            "clean_data": {
                "title": "Huge",
                "options_definition": { "A": values, "B": values, "C": values }
            }
        })),
        &seeded.repo,
        &clock,
    );

    match result {
        Err(ServiceError::BadRequest(message)) => assert!(message.contains("512")),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(count_products(&seeded), 0);
    assert_eq!(status(&seeded), StagingStatus::Pending);
}

#[test]
fn queue_and_detail_read_back_from_sqlite() {
    let seeded = seeded();

    let queue = review_queue(None, 1, &seeded.repo).expect("queue loads");
    assert_eq!(queue.total, 1);
    assert_eq!(queue.items[0].merchant_name, "Acme");
    assert_eq!(queue.items[0].match_confidence, 0);

    let detail = staging_detail(seeded.staging_id.get(), &seeded.repo).expect("detail loads");
    assert_eq!(detail.raw_title, "Linen Shirt");
    assert_eq!(detail.media.len(), 1);
    assert_eq!(detail.variants.len(), 2);
    assert_eq!(detail.variants[0].raw_options["Size"], "S");
}
