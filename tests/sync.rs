use async_trait::async_trait;
use parking_lot::Mutex;
use pushkind_catalog::domain::types::{MerchantId, StagingStatus};
use pushkind_catalog::repository::{
    DieselRepository, StagingListQuery, StagingReader, StagingWriter,
};
use pushkind_catalog::services::clock::FixedClock;
use pushkind_catalog::services::staging::merchant_stats;
use pushkind_catalog::services::sync::{SyncLocks, sync_merchant};
use pushkind_catalog::source::{ProductSource, RawProduct, SourceCredentials, SourceError};
use serde_json::json;

mod common;

use common::timestamp;

/// Serves a replaceable catalog snapshot.
struct SnapshotSource(Mutex<Vec<serde_json::Value>>);

impl SnapshotSource {
    fn new(nodes: Vec<serde_json::Value>) -> Self {
        Self(Mutex::new(nodes))
    }

    fn replace(&self, nodes: Vec<serde_json::Value>) {
        *self.0.lock() = nodes;
    }
}

#[async_trait]
impl ProductSource for SnapshotSource {
    async fn fetch_all(
        &self,
        _credentials: &SourceCredentials,
    ) -> Result<Vec<RawProduct>, SourceError> {
        self.0
            .lock()
            .iter()
            .map(|node| {
                serde_json::from_value(node.clone()).map_err(|e| SourceError::Protocol(e.to_string()))
            })
            .collect()
    }
}

fn node(id: &str, title: &str, price: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "vendor": "Acme",
        "tags": [],
        "options": [{ "name": "Size", "values": ["S", "M"] }],
        "media": { "edges": [
            { "node": { "id": format!("{id}/m"), "mediaContentType": "IMAGE",
                        "image": { "url": format!("https://cdn.example/{title}.jpg") } } }
        ]},
        "variants": { "edges": [
            { "node": { "id": format!("{id}/v1"), "sku": "S-1", "price": price,
                        "selectedOptions": [{ "name": "Size", "value": "S" }] } },
            { "node": { "id": format!("{id}/v2"), "sku": "M-1", "price": price,
                        "selectedOptions": [{ "name": "Size", "value": "M" }] } }
        ]}
    })
}

#[tokio::test]
async fn resync_flags_changed_titles_only() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let merchant = test_db.insert_merchant("Acme");
    let merchant_id = MerchantId::new(merchant).unwrap();
    let locks = SyncLocks::new();
    let source = SnapshotSource::new(vec![
        node("gid://shopify/Product/1", "Shirt", "19.99"),
        node("gid://shopify/Product/2", "Hat", "5.00"),
    ]);

    let first = sync_merchant(merchant, &repo, &source, &locks, &FixedClock(timestamp(1)))
        .await
        .expect("first sync");
    assert_eq!(first.products_synced, 2);
    assert_eq!(first.variants_synced, 4);

    let (_, items) = repo
        .list_staging_products(StagingListQuery::default().merchant(merchant_id))
        .expect("should list");
    assert!(items.iter().all(|i| i.product.status == StagingStatus::Pending));
    for item in &items {
        repo.set_staging_status(
            merchant_id,
            item.product.id,
            StagingStatus::Approved,
            timestamp(2),
        )
        .expect("should approve");
    }

    source.replace(vec![
        node("gid://shopify/Product/1", "Shirt v2", "17.50"),
        node("gid://shopify/Product/2", "Hat", "5.00"),
    ]);
    sync_merchant(merchant, &repo, &source, &locks, &FixedClock(timestamp(3)))
        .await
        .expect("second sync");

    let stats = merchant_stats(merchant, &repo).expect("stats");
    assert_eq!(stats.live_products, 1);
    assert_eq!(stats.under_review, 1);
    assert_eq!(stats.total_skus, 2);

    let (_, flagged) = repo
        .list_staging_products(
            StagingListQuery::default()
                .merchant(merchant_id)
                .statuses([StagingStatus::NeedsReview]),
        )
        .expect("should list");
    assert_eq!(flagged.len(), 1);
    let staged = repo
        .get_staging_product(flagged[0].product.id)
        .expect("should load")
        .expect("record exists");
    assert_eq!(staged.product.raw_title, "Shirt v2");
    assert!(staged.variants.iter().all(|v| v.raw_price_minor.get() == 1750));
    assert!(!locks.is_running(merchant_id));
}
