use std::collections::HashSet;

use parking_lot::Mutex;
use serde::Serialize;

use crate::domain::options::VariantOptions;
use crate::domain::staging::{
    IncomingStagingMedia, IncomingStagingProduct, IncomingStagingVariant, StagingOption,
    parse_price_minor,
};
use crate::domain::types::{ExternalProductId, MediaUrl, MerchantId};
use crate::repository::{MerchantReader, StagingWriter};
use crate::services::clock::Clock;
use crate::services::{ServiceError, ServiceResult};
use crate::source::{ProductSource, RawProduct, SourceCredentials};

/// Counters reported by a finished sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub products_synced: usize,
    pub variants_synced: usize,
}

/// Merchants with a sync in flight.
#[derive(Debug, Default)]
pub struct SyncLocks {
    running: Mutex<HashSet<MerchantId>>,
}

/// Releases the merchant's sync slot when dropped.
#[derive(Debug)]
pub struct SyncGuard<'a> {
    locks: &'a SyncLocks,
    merchant_id: MerchantId,
}

impl SyncLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the merchant, or `None` when another sync holds it.
    pub fn try_acquire(&self, merchant_id: MerchantId) -> Option<SyncGuard<'_>> {
        let inserted = self.running.lock().insert(merchant_id);
        inserted.then_some(SyncGuard {
            locks: self,
            merchant_id,
        })
    }

    pub fn is_running(&self, merchant_id: MerchantId) -> bool {
        self.running.lock().contains(&merchant_id)
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.locks.running.lock().remove(&self.merchant_id);
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Convert one upstream product into the staging write model.
pub fn to_incoming(node: &RawProduct) -> ServiceResult<IncomingStagingProduct> {
    let external_product_id = ExternalProductId::new(node.id.as_str())
        .map_err(|_| ServiceError::ProtocolError("product without id".to_string()))?;

    let raw_json = serde_json::to_value(node).map_err(|e| {
        log::error!("Failed to serialize product {}: {e}", node.id);
        ServiceError::Internal
    })?;

    let media = node
        .media
        .iter()
        .flat_map(|connection| connection.nodes())
        .filter_map(|item| {
            let url = MediaUrl::new(item.display_url()?).ok()?;
            let image_alt = item.image.as_ref().and_then(|i| i.alt_text.clone());
            Some(IncomingStagingMedia {
                external_media_id: non_blank(item.id.clone()),
                media_type: item
                    .media_content_type
                    .clone()
                    .unwrap_or_else(|| "IMAGE".to_string()),
                source_url: url,
                alt_text: non_blank(item.alt.clone()).or(non_blank(image_alt)),
            })
        })
        .collect();

    let mut variants = Vec::new();
    for variant in node.variants.iter().flat_map(|connection| connection.nodes()) {
        let raw_price_minor = parse_price_minor(&variant.price).map_err(|e| {
            ServiceError::ProtocolError(format!("variant {}: {e}", variant.id))
        })?;
        let raw_options: VariantOptions = variant
            .selected_options
            .iter()
            .map(|o| (o.name.clone(), o.value.clone()))
            .collect();
        variants.push(IncomingStagingVariant {
            external_variant_id: variant.id.clone(),
            raw_sku: non_blank(variant.sku.clone()),
            raw_barcode: non_blank(variant.barcode.clone()),
            raw_price_minor,
            raw_options,
        });
    }

    Ok(IncomingStagingProduct {
        external_product_id,
        title: node.title.clone(),
        body_html: node.description_html.clone(),
        vendor: node.vendor.clone(),
        product_type: node.product_type.clone(),
        tags: node.tags.clone(),
        raw_json,
        options_definition: node
            .options
            .iter()
            .map(|o| StagingOption {
                name: o.name.clone(),
                values: o.values.clone(),
            })
            .collect(),
        media,
        variants,
    })
}

/// Pull the merchant's whole upstream catalog into staging.
///
/// Each product commits on its own; a failure stops the sync but keeps the
/// products already written.
pub async fn sync_merchant<R, S>(
    merchant_id: i32,
    repo: &R,
    source: &S,
    locks: &SyncLocks,
    clock: &dyn Clock,
) -> ServiceResult<SyncResult>
where
    R: MerchantReader + StagingWriter,
    S: ProductSource + ?Sized,
{
    let merchant_id = MerchantId::new(merchant_id).map_err(|_| ServiceError::NotFound)?;

    let merchant = match repo.get_merchant_by_id(merchant_id) {
        Ok(Some(merchant)) => merchant,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get merchant {merchant_id}: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let credentials = SourceCredentials::from_source_config(&merchant.source_config)?;

    let Some(_guard) = locks.try_acquire(merchant_id) else {
        log::warn!("Sync for merchant {merchant_id} rejected: already running");
        return Err(ServiceError::Conflict);
    };

    log::info!("Starting sync for merchant {merchant_id}");
    let products = match source.fetch_all(&credentials).await {
        Ok(products) => products,
        Err(e) => {
            log::error!("Fetch for merchant {merchant_id} failed: {e}");
            return Err(e.into());
        }
    };

    let mut result = SyncResult::default();
    for node in &products {
        let incoming = to_incoming(node)?;
        match repo.upsert_staging_product(merchant_id, &incoming, clock.now()) {
            Ok(outcome) => {
                if outcome.flagged_for_review {
                    log::info!(
                        "Staging product {} changed upstream, flagged for review",
                        outcome.staging_id
                    );
                }
            }
            Err(e) => {
                log::error!(
                    "Failed to stage product {} for merchant {merchant_id}: {e}",
                    incoming.external_product_id
                );
                return Err(ServiceError::Internal);
            }
        }
        result.products_synced += 1;
        result.variants_synced += incoming.variants.len();
    }

    log::info!(
        "Finished sync for merchant {merchant_id}: {} products, {} variants",
        result.products_synced,
        result.variants_synced
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::domain::types::{PriceMinor, StagingProductId, StagingStatus};
    use crate::repository::test::TestRepository;
    use crate::repository::test::fixtures::{aggregate, merchant, staging_product, timestamp};
    use crate::services::clock::FixedClock;
    use crate::source::SourceError;

    const CONFIG: &str = r#"{"storeUrl":"demo.myshopify.com","accessToken":"shpat_1"}"#;

    struct FakeSource(Result<Vec<serde_json::Value>, fn() -> SourceError>);

    #[async_trait]
    impl ProductSource for FakeSource {
        async fn fetch_all(
            &self,
            _credentials: &SourceCredentials,
        ) -> Result<Vec<RawProduct>, SourceError> {
            match &self.0 {
                Ok(nodes) => Ok(nodes
                    .iter()
                    .map(|n| serde_json::from_value(n.clone()).unwrap())
                    .collect()),
                Err(make) => Err(make()),
            }
        }
    }

    fn product_node(id: &str, title: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "descriptionHtml": "<p>Soft</p>",
            "vendor": "Acme",
            "productType": "Shirt",
            "tags": ["summer", "linen"],
            "options": [{ "name": "Color", "values": ["Red"] }],
            "media": { "edges": [
                { "node": { "id": "m1", "mediaContentType": "IMAGE", "alt": "front",
                            "image": { "url": "https://cdn/front.jpg", "altText": null } } },
                { "node": { "id": "m2", "mediaContentType": "MODEL_3D" } },
                { "node": { "id": "m3", "mediaContentType": "VIDEO",
                            "preview": { "image": { "url": "https://cdn/video.jpg" } } } }
            ]},
            "variants": { "edges": [
                { "node": { "id": "V", "sku": "S", "barcode": null, "price": "10.00",
                            "selectedOptions": [{ "name": "Color", "value": "Red" }] } }
            ]}
        })
    }

    fn clock() -> FixedClock {
        FixedClock(timestamp(10))
    }

    #[tokio::test]
    async fn first_sync_stages_products_as_pending() {
        let repo = TestRepository::new().with_merchant(merchant(1, "Acme", CONFIG));
        let source = FakeSource(Ok(vec![product_node("gid://P/1", "T")]));
        let locks = SyncLocks::new();

        let result = sync_merchant(1, &repo, &source, &locks, &clock())
            .await
            .unwrap();

        assert_eq!(
            result,
            SyncResult {
                products_synced: 1,
                variants_synced: 1
            }
        );
        let staged = repo.staging(StagingProductId::new(1001).unwrap()).unwrap();
        assert_eq!(staged.product.status, StagingStatus::Pending);
        assert_eq!(staged.product.raw_title, "T");
        assert_eq!(staged.product.raw_tags, vec!["summer", "linen"]);
        assert_eq!(staged.variants.len(), 1);
        assert_eq!(staged.variants[0].raw_price_minor, PriceMinor::new(1000).unwrap());
        assert_eq!(staged.variants[0].raw_options["Color"], "Red");

        let urls: Vec<_> = staged.media.iter().map(|m| m.source_url.as_str()).collect();
        assert_eq!(urls, vec!["https://cdn/front.jpg", "https://cdn/video.jpg"]);
        assert_eq!(staged.media[0].position, 1);
        assert_eq!(staged.media[1].position, 2);
        assert_eq!(staged.media[0].alt_text.as_deref(), Some("front"));
        assert!(!locks.is_running(MerchantId::new(1).unwrap()));
    }

    #[tokio::test]
    async fn title_change_re_arms_approved_record() {
        let mut seeded = staging_product(5, 1, "Old", StagingStatus::Approved);
        seeded.external_product_id = ExternalProductId::new("gid://P/1").unwrap();
        let repo = TestRepository::new()
            .with_merchant(merchant(1, "Acme", CONFIG))
            .with_staging(aggregate(seeded, vec![], vec![]));
        let source = FakeSource(Ok(vec![product_node("gid://P/1", "New")]));

        sync_merchant(1, &repo, &source, &SyncLocks::new(), &clock())
            .await
            .unwrap();

        let staged = repo.staging(StagingProductId::new(5).unwrap()).unwrap();
        assert_eq!(staged.product.status, StagingStatus::NeedsReview);
        assert_eq!(staged.product.raw_title, "New");
        assert!(staged.product.admin_notes.is_some_and(|n| !n.is_empty()));
        assert_eq!(repo.staging_count(), 1);
    }

    #[tokio::test]
    async fn unchanged_title_keeps_reviewer_status() {
        let mut seeded = staging_product(5, 1, "Same", StagingStatus::Rejected);
        seeded.external_product_id = ExternalProductId::new("gid://P/1").unwrap();
        let repo = TestRepository::new()
            .with_merchant(merchant(1, "Acme", CONFIG))
            .with_staging(aggregate(seeded, vec![], vec![]));
        let source = FakeSource(Ok(vec![product_node("gid://P/1", "Same")]));

        sync_merchant(1, &repo, &source, &SyncLocks::new(), &clock())
            .await
            .unwrap();

        let staged = repo.staging(StagingProductId::new(5).unwrap()).unwrap();
        assert_eq!(staged.product.status, StagingStatus::Rejected);
        assert_eq!(staged.product.admin_notes, None);
    }

    #[tokio::test]
    async fn unknown_merchant_is_not_found() {
        let repo = TestRepository::new();
        let source = FakeSource(Ok(vec![]));
        let result = sync_merchant(9, &repo, &source, &SyncLocks::new(), &clock()).await;
        assert_eq!(result, Err(ServiceError::NotFound));
    }

    #[tokio::test]
    async fn blank_credentials_are_config_invalid() {
        let repo = TestRepository::new().with_merchant(merchant(
            1,
            "Acme",
            r#"{"storeUrl":"","accessToken":"x"}"#,
        ));
        let source = FakeSource(Ok(vec![]));
        let result = sync_merchant(1, &repo, &source, &SyncLocks::new(), &clock()).await;
        assert!(matches!(result, Err(ServiceError::ConfigInvalid(_))));
    }

    #[tokio::test]
    async fn concurrent_sync_for_same_merchant_conflicts() {
        let repo = TestRepository::new().with_merchant(merchant(1, "Acme", CONFIG));
        let source = FakeSource(Ok(vec![]));
        let locks = SyncLocks::new();
        let _held = locks.try_acquire(MerchantId::new(1).unwrap()).unwrap();

        let result = sync_merchant(1, &repo, &source, &locks, &clock()).await;
        assert_eq!(result, Err(ServiceError::Conflict));
    }

    #[tokio::test]
    async fn upstream_failure_releases_the_lock() {
        let repo = TestRepository::new().with_merchant(merchant(1, "Acme", CONFIG));
        let source = FakeSource(Err(|| SourceError::AuthFailed(401)));
        let locks = SyncLocks::new();

        let result = sync_merchant(1, &repo, &source, &locks, &clock()).await;
        assert!(matches!(result, Err(ServiceError::UpstreamFatal(_))));
        assert!(!locks.is_running(MerchantId::new(1).unwrap()));
        assert_eq!(repo.staging_count(), 0);
    }

    #[test]
    fn malformed_price_is_a_protocol_error() {
        let mut node = product_node("gid://P/1", "T");
        node["variants"]["edges"][0]["node"]["price"] = json!("ten");
        let node: RawProduct = serde_json::from_value(node).unwrap();
        assert!(matches!(
            to_incoming(&node),
            Err(ServiceError::ProtocolError(_))
        ));
    }

    #[test]
    fn raw_dump_keeps_the_upstream_shape() {
        let node: RawProduct = serde_json::from_value(product_node("gid://P/1", "T")).unwrap();
        let incoming = to_incoming(&node).unwrap();
        assert_eq!(incoming.raw_json["descriptionHtml"], "<p>Soft</p>");
        assert_eq!(incoming.options_definition[0].values, vec!["Red"]);
    }
}
