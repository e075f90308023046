//! Reviewer console queries.

use std::collections::{BTreeSet, HashMap};

use chrono::Duration;

use crate::domain::options::match_variant;
use crate::domain::types::{MerchantId, ProductId, StagingProductId, StagingStatus};
use crate::dto::PageDto;
use crate::dto::admin::{
    AdminStatsDto, MasterProductListItemDto, MasterVariantDto, ReviewQueueItemDto,
    StagingDetailDto, VariantMatchResponseDto, VariantMatchSuggestionDto,
};
use crate::repository::{
    CatalogReader, MerchantReader, ProductListQuery, RepositoryResult, StagingListQuery,
    StagingOrder, StagingReader,
};
use crate::services::clock::Clock;
use crate::services::{ServiceError, ServiceResult};

/// Page size of reviewer listings.
pub const ADMIN_PAGE_SIZE: usize = 20;

/// Upper bound on master search results.
pub const MASTER_SEARCH_LIMIT: usize = 10;

/// Window used by `rejected_this_week`.
const REJECTION_WINDOW_DAYS: i64 = 7;

/// Headline counters of the review console.
pub fn admin_stats<R>(repo: &R, clock: &dyn Clock) -> ServiceResult<AdminStatsDto>
where
    R: StagingReader + CatalogReader,
{
    let pending = StagingListQuery::default().statuses(StagingStatus::PENDING_REVIEW);
    let rejected = StagingListQuery::default()
        .statuses([StagingStatus::Rejected])
        .updated_after(clock.now() - Duration::days(REJECTION_WINDOW_DAYS));

    let counts = || -> RepositoryResult<(usize, usize, usize)> {
        Ok((
            repo.count_staging_products(&pending)?,
            repo.count_staging_products(&rejected)?,
            repo.count_products()?,
        ))
    };

    match counts() {
        Ok((pending_reviews, rejected_this_week, total_master_products)) => Ok(AdminStatsDto {
            pending_reviews,
            total_master_products,
            rejected_this_week,
        }),
        Err(e) => {
            log::error!("Failed to compute admin stats: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Oldest-first review queue.
///
/// Without `status` the queue holds the pending review set; otherwise only
/// records in that status.
pub fn review_queue<R>(
    status: Option<&str>,
    page: usize,
    repo: &R,
) -> ServiceResult<PageDto<ReviewQueueItemDto>>
where
    R: StagingReader + MerchantReader,
{
    let statuses: Vec<StagingStatus> = match status.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => vec![StagingStatus::try_from(raw)?],
        None => StagingStatus::PENDING_REVIEW.to_vec(),
    };

    let query = StagingListQuery::default()
        .statuses(statuses)
        .order(StagingOrder::CreatedAsc)
        .paginate(page, ADMIN_PAGE_SIZE);

    let (total, items) = match repo.list_staging_products(query) {
        Ok(result) => result,
        Err(e) => {
            log::error!("Failed to list review queue: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let merchant_ids: Vec<MerchantId> = items
        .iter()
        .map(|i| i.product.merchant_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let names: HashMap<MerchantId, String> = match repo.list_merchants_by_ids(&merchant_ids) {
        Ok(merchants) => merchants
            .into_iter()
            .map(|m| (m.id, m.name.into_inner()))
            .collect(),
        Err(e) => {
            log::error!("Failed to load merchants for review queue: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let rows = items
        .into_iter()
        .map(|item| {
            let product = item.product;
            ReviewQueueItemDto {
                staging_id: product.id.get(),
                merchant_name: names.get(&product.merchant_id).cloned().unwrap_or_default(),
                raw_title: product.raw_title,
                created_at: product.created_at,
                match_confidence: product.match_confidence_score.unwrap_or(0),
                suggested_master_id: product.suggested_product_id.map(|id| id.get()),
            }
        })
        .collect();

    Ok(PageDto::new(rows, page, total, ADMIN_PAGE_SIZE))
}

/// Full staging record for the decision screen.
pub fn staging_detail<R>(staging_id: i32, repo: &R) -> ServiceResult<StagingDetailDto>
where
    R: StagingReader + MerchantReader,
{
    let staging_id = StagingProductId::new(staging_id).map_err(|_| ServiceError::NotFound)?;

    let aggregate = match repo.get_staging_product(staging_id) {
        Ok(Some(aggregate)) => aggregate,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get staging product {staging_id}: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let merchant_name = match repo.get_merchant_by_id(aggregate.product.merchant_id) {
        Ok(merchant) => merchant.map(|m| m.name.into_inner()).unwrap_or_default(),
        Err(e) => {
            log::error!("Failed to get merchant {}: {e}", aggregate.product.merchant_id);
            return Err(ServiceError::Internal);
        }
    };

    Ok(StagingDetailDto::new(aggregate, merchant_name))
}

/// Suggest a master variant for every staging variant of the record.
pub fn variant_match_suggestions<R>(
    staging_id: i32,
    master_product_id: i32,
    repo: &R,
) -> ServiceResult<VariantMatchResponseDto>
where
    R: StagingReader + CatalogReader,
{
    let staging_id = StagingProductId::new(staging_id).map_err(|_| ServiceError::NotFound)?;
    let master_id = ProductId::new(master_product_id).map_err(|_| ServiceError::NotFound)?;

    let aggregate = match repo.get_staging_product(staging_id) {
        Ok(Some(aggregate)) => aggregate,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get staging product {staging_id}: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let candidates = match repo.get_product_by_id(master_id) {
        Ok(Some(_)) => repo.list_variants(master_id).map_err(|e| {
            log::error!("Failed to list variants of product {master_id}: {e}");
            ServiceError::Internal
        })?,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product {master_id}: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let matches = aggregate
        .variants
        .into_iter()
        .map(|variant| {
            let found = match_variant(&variant, &candidates);
            VariantMatchSuggestionDto {
                staging_variant_id: variant.id.get(),
                staging_options: variant.raw_options,
                suggested_master_variant_id: found.variant_id.map(|id| id.get()),
                match_reason: found.reason,
            }
        })
        .collect();

    Ok(VariantMatchResponseDto {
        staging_product_id: staging_id.get(),
        master_product_id: master_id.get(),
        matches,
    })
}

/// Paginated master catalog.
pub fn list_master_products<R>(
    page: usize,
    repo: &R,
) -> ServiceResult<PageDto<MasterProductListItemDto>>
where
    R: CatalogReader,
{
    match repo.list_products(ProductListQuery::default().paginate(page, ADMIN_PAGE_SIZE)) {
        Ok((total, items)) => Ok(PageDto::new(
            items.into_iter().map(Into::into).collect(),
            page,
            total,
            ADMIN_PAGE_SIZE,
        )),
        Err(e) => {
            log::error!("Failed to list master products: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Title search over the master catalog for the link picker.
pub fn search_master_products<R>(
    search: Option<&str>,
    repo: &R,
) -> ServiceResult<Vec<MasterProductListItemDto>>
where
    R: CatalogReader,
{
    let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(vec![]);
    };

    let query = ProductListQuery::default()
        .search(search)
        .paginate(1, MASTER_SEARCH_LIMIT);
    match repo.list_products(query) {
        Ok((_, items)) => Ok(items.into_iter().map(Into::into).collect()),
        Err(e) => {
            log::error!("Failed to search master products: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn list_master_variants<R>(product_id: i32, repo: &R) -> ServiceResult<Vec<MasterVariantDto>>
where
    R: CatalogReader,
{
    let product_id = ProductId::new(product_id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_product_by_id(product_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product {product_id}: {e}");
            return Err(ServiceError::Internal);
        }
    }

    match repo.list_variants(product_id) {
        Ok(variants) => Ok(variants.into_iter().map(Into::into).collect()),
        Err(e) => {
            log::error!("Failed to list variants of product {product_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::options::MatchReason;
    use crate::domain::types::BrandId;
    use crate::repository::test::TestRepository;
    use crate::repository::test::fixtures::{
        aggregate, brand, master_product, master_variant, merchant, staging_media,
        staging_product, staging_variant, timestamp,
    };
    use crate::services::clock::FixedClock;

    fn with_staging(
        repo: TestRepository,
        id: i32,
        merchant_id: i32,
        status: StagingStatus,
        day: u32,
    ) -> TestRepository {
        let mut product = staging_product(id, merchant_id, &format!("Item {id}"), status);
        product.created_at = timestamp(day);
        product.updated_at = timestamp(day);
        repo.with_staging(aggregate(product, vec![], vec![]))
    }

    #[test]
    fn stats_count_pending_masters_and_recent_rejections() {
        let repo = with_staging(TestRepository::new(), 10, 1, StagingStatus::Pending, 5);
        let repo = with_staging(repo, 11, 1, StagingStatus::NeedsReview, 6);
        let repo = with_staging(repo, 12, 1, StagingStatus::PendingSync, 6);
        let repo = with_staging(repo, 13, 1, StagingStatus::Rejected, 2);
        let repo = with_staging(repo, 14, 1, StagingStatus::Rejected, 12)
            .with_product(master_product(100, "Shirt", None));

        let stats = admin_stats(&repo, &FixedClock(timestamp(15))).unwrap();
        assert_eq!(
            stats,
            AdminStatsDto {
                pending_reviews: 2,
                total_master_products: 1,
                rejected_this_week: 1,
            }
        );
    }

    #[test]
    fn queue_is_oldest_first_with_merchant_names() {
        let repo = TestRepository::new().with_merchant(merchant(1, "Acme", "{}"));
        let repo = with_staging(repo, 10, 1, StagingStatus::NeedsReview, 8);
        let repo = with_staging(repo, 11, 2, StagingStatus::Pending, 3);
        let repo = with_staging(repo, 12, 1, StagingStatus::Approved, 1);

        let page = review_queue(None, 1, &repo).unwrap();
        let rows: Vec<(i32, &str)> = page
            .items
            .iter()
            .map(|r| (r.staging_id, r.merchant_name.as_str()))
            .collect();
        assert_eq!(rows, vec![(11, ""), (10, "Acme")]);
        assert_eq!(page.items[0].match_confidence, 0);
    }

    #[test]
    fn queue_status_filter_narrows_the_set() {
        let repo = with_staging(TestRepository::new(), 10, 1, StagingStatus::NeedsReview, 8);
        let repo = with_staging(repo, 11, 1, StagingStatus::Pending, 3);

        let page = review_queue(Some("NEEDS_REVIEW"), 1, &repo).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].staging_id, 10);
    }

    #[test]
    fn queue_rejects_unknown_status() {
        let repo = TestRepository::new();
        assert!(matches!(
            review_queue(Some("LOST"), 1, &repo),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[test]
    fn detail_orders_media_and_names_the_merchant() {
        let repo = TestRepository::new()
            .with_merchant(merchant(1, "Acme", "{}"))
            .with_staging(aggregate(
                staging_product(10, 1, "Shirt", StagingStatus::Pending),
                vec![
                    staging_media(21, 10, "https://cdn/b.jpg", 2),
                    staging_media(20, 10, "https://cdn/a.jpg", 1),
                ],
                vec![staging_variant(30, 10, Some("S"), 1299, &[("Color", "Red")])],
            ));

        let detail = staging_detail(10, &repo).unwrap();
        assert_eq!(detail.merchant_name, "Acme");
        assert_eq!(detail.image_url.as_deref(), Some("https://cdn/a.jpg"));
        let positions: Vec<i32> = detail.media.iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert_eq!(detail.variants[0].raw_price_minor, 1299);
        assert_eq!(detail.variants[0].raw_options["Color"], "Red");
    }

    #[test]
    fn detail_of_unknown_record_is_not_found() {
        assert_eq!(
            staging_detail(10, &TestRepository::new()),
            Err(ServiceError::NotFound)
        );
    }

    #[test]
    fn match_suggestions_use_barcode_sku_then_options() {
        let mut by_barcode = staging_variant(30, 10, None, 100, &[]);
        by_barcode.raw_barcode = Some("4006381333931".to_string());
        let by_sku = staging_variant(31, 10, Some("SKU-B"), 100, &[]);
        let by_options = staging_variant(32, 10, None, 100, &[("color", " RED ")]);
        let unmatched = staging_variant(33, 10, None, 100, &[("Color", "Green")]);

        let mut gtin_variant = master_variant(200, 100, "SKU-A", &[]);
        gtin_variant.gtin = Some("4006381333931".to_string());

        let repo = TestRepository::new()
            .with_staging(aggregate(
                staging_product(10, 1, "Shirt", StagingStatus::Pending),
                vec![],
                vec![by_barcode, by_sku, by_options, unmatched],
            ))
            .with_product(master_product(100, "Shirt", None))
            .with_variant(gtin_variant)
            .with_variant(master_variant(201, 100, "SKU-B", &[]))
            .with_variant(master_variant(202, 100, "SKU-C", &[("Color", "Red")]));

        let response = variant_match_suggestions(10, 100, &repo).unwrap();
        let found: Vec<(i32, Option<i32>, MatchReason)> = response
            .matches
            .iter()
            .map(|m| {
                (
                    m.staging_variant_id,
                    m.suggested_master_variant_id,
                    m.match_reason,
                )
            })
            .collect();
        assert_eq!(
            found,
            vec![
                (30, Some(200), MatchReason::BarcodeMatch),
                (31, Some(201), MatchReason::SkuMatch),
                (32, Some(202), MatchReason::OptionsMatch),
                (33, None, MatchReason::None),
            ]
        );
    }

    #[test]
    fn match_suggestions_need_an_existing_master() {
        let repo = TestRepository::new().with_staging(aggregate(
            staging_product(10, 1, "Shirt", StagingStatus::Pending),
            vec![],
            vec![],
        ));
        assert_eq!(
            variant_match_suggestions(10, 100, &repo),
            Err(ServiceError::NotFound)
        );
    }

    #[test]
    fn master_listing_carries_brand_and_variant_count() {
        let mut product = master_product(100, "Linen shirt", Some("https://cdn/m.jpg"));
        product.brand_id = Some(BrandId::new(5).unwrap());
        let repo = TestRepository::new()
            .with_brand(brand(5, "Acme"))
            .with_product(product)
            .with_product(master_product(101, "Wool hat", None))
            .with_variant(master_variant(200, 100, "A", &[]))
            .with_variant(master_variant(201, 100, "B", &[]));

        let page = list_master_products(1, &repo).unwrap();
        assert_eq!(page.total, 2);
        let ids: Vec<i32> = page.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![101, 100]);
        assert_eq!(page.items[0].brand, "");
        assert_eq!(page.items[1].brand, "Acme");
        assert_eq!(page.items[1].variant_count, 2);
    }

    #[test]
    fn blank_master_search_returns_nothing() {
        let repo = TestRepository::new().with_product(master_product(100, "Shirt", None));
        assert!(search_master_products(Some("  "), &repo).unwrap().is_empty());
        assert!(search_master_products(None, &repo).unwrap().is_empty());
    }

    #[test]
    fn master_search_is_capped() {
        let mut repo = TestRepository::new();
        for id in 100..115 {
            repo = repo.with_product(master_product(id, &format!("Shirt {id}"), None));
        }
        let found = search_master_products(Some("SHIRT"), &repo).unwrap();
        assert_eq!(found.len(), MASTER_SEARCH_LIMIT);
    }

    #[test]
    fn master_variants_require_the_product() {
        let repo = TestRepository::new()
            .with_product(master_product(100, "Shirt", None))
            .with_variant(master_variant(200, 100, "SKU-A", &[("Size", "M")]));

        let variants = list_master_variants(100, &repo).unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].internal_sku, "SKU-A");
        assert_eq!(list_master_variants(101, &repo), Err(ServiceError::NotFound));
    }
}
