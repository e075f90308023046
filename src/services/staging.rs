//! Merchant-facing queries over the staging area.

use pushkind_common::pagination::DEFAULT_ITEMS_PER_PAGE;

use crate::domain::staging::MerchantStagingStats;
use crate::domain::types::{MerchantId, StagingProductId, StagingStatus};
use crate::dto::PageDto;
use crate::dto::merchant::{DashboardStatsDto, IssueProductDto, StagingProductListItemDto};
use crate::repository::{
    MerchantReader, StagingListQuery, StagingOrder, StagingReader, StagingWriter,
};
use crate::services::clock::Clock;
use crate::services::{ServiceError, ServiceResult};

/// Product tab on the merchant dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductTab {
    #[default]
    Approved,
    UnderReview,
    Issues,
}

impl ProductTab {
    /// Parse the `tab` query parameter. Unknown or missing values fall back
    /// to the approved tab.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("review" | "under_review" | "under-review") => ProductTab::UnderReview,
            Some("issues") => ProductTab::Issues,
            _ => ProductTab::Approved,
        }
    }

    fn query(self) -> StagingListQuery {
        match self {
            ProductTab::Approved => StagingListQuery::default()
                .statuses([StagingStatus::Approved])
                .order(StagingOrder::UpdatedDesc),
            ProductTab::UnderReview => StagingListQuery::default()
                .statuses(StagingStatus::UNDER_REVIEW)
                .order(StagingOrder::CreatedDesc),
            ProductTab::Issues => StagingListQuery::default()
                .statuses([StagingStatus::Rejected])
                .order(StagingOrder::UpdatedDesc),
        }
    }
}

fn ensure_merchant<R: MerchantReader>(merchant_id: i32, repo: &R) -> ServiceResult<MerchantId> {
    let merchant_id = MerchantId::new(merchant_id).map_err(|_| ServiceError::NotFound)?;
    match repo.get_merchant_by_id(merchant_id) {
        Ok(Some(_)) => Ok(merchant_id),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get merchant {merchant_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

fn count<R: StagingReader>(repo: &R, query: &StagingListQuery) -> ServiceResult<usize> {
    repo.count_staging_products(query).map_err(|e| {
        log::error!("Failed to count staging products: {e}");
        ServiceError::Internal
    })
}

/// Dashboard counters for one merchant.
pub fn merchant_stats<R>(merchant_id: i32, repo: &R) -> ServiceResult<DashboardStatsDto>
where
    R: MerchantReader + StagingReader,
{
    let merchant_id = ensure_merchant(merchant_id, repo)?;
    let scoped = StagingListQuery::default().merchant(merchant_id);

    let live = count(repo, &scoped.clone().statuses([StagingStatus::Approved]))?;
    let under_review = count(repo, &scoped.clone().statuses(StagingStatus::UNDER_REVIEW))?;
    let issues = count(repo, &scoped.statuses([StagingStatus::Rejected]))?;

    Ok(MerchantStagingStats::new(live, under_review, issues).into())
}

/// Paginated listing of one dashboard tab.
///
/// A non-blank `search` looks across every status of the merchant instead of
/// the tab's own statuses.
pub fn list_tab<R>(
    merchant_id: i32,
    tab: ProductTab,
    search: Option<&str>,
    page: usize,
    repo: &R,
) -> ServiceResult<PageDto<StagingProductListItemDto>>
where
    R: MerchantReader + StagingReader,
{
    let merchant_id = ensure_merchant(merchant_id, repo)?;

    let query = match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(search) => StagingListQuery::default().search(search),
        None => tab.query(),
    };
    let query = query
        .merchant(merchant_id)
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);

    match repo.list_staging_products(query) {
        Ok((total, items)) => Ok(PageDto::new(
            items.into_iter().map(Into::into).collect(),
            page,
            total,
            DEFAULT_ITEMS_PER_PAGE,
        )),
        Err(e) => {
            log::error!("Failed to list staging products for merchant {merchant_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Every staging record of the merchant, newest first.
pub fn list_staging<R>(
    merchant_id: i32,
    page: usize,
    repo: &R,
) -> ServiceResult<PageDto<StagingProductListItemDto>>
where
    R: MerchantReader + StagingReader,
{
    let merchant_id = ensure_merchant(merchant_id, repo)?;
    let query = StagingListQuery::default()
        .merchant(merchant_id)
        .order(StagingOrder::CreatedDesc)
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);

    match repo.list_staging_products(query) {
        Ok((total, items)) => Ok(PageDto::new(
            items.into_iter().map(Into::into).collect(),
            page,
            total,
            DEFAULT_ITEMS_PER_PAGE,
        )),
        Err(e) => {
            log::error!("Failed to list staging products for merchant {merchant_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Rejected records with the reviewer's reason, most recent first.
pub fn list_issues<R>(
    merchant_id: i32,
    page: usize,
    repo: &R,
) -> ServiceResult<PageDto<IssueProductDto>>
where
    R: MerchantReader + StagingReader,
{
    let merchant_id = ensure_merchant(merchant_id, repo)?;
    let query = ProductTab::Issues
        .query()
        .merchant(merchant_id)
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);

    match repo.list_staging_products(query) {
        Ok((total, items)) => Ok(PageDto::new(
            items.into_iter().map(Into::into).collect(),
            page,
            total,
            DEFAULT_ITEMS_PER_PAGE,
        )),
        Err(e) => {
            log::error!("Failed to list issues for merchant {merchant_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Send one staging record back to `PENDING_SYNC`.
pub fn mark_pending_sync<R>(
    merchant_id: i32,
    staging_id: i32,
    repo: &R,
    clock: &dyn Clock,
) -> ServiceResult<()>
where
    R: MerchantReader + StagingWriter,
{
    let merchant_id = ensure_merchant(merchant_id, repo)?;
    let staging_id = StagingProductId::new(staging_id).map_err(|_| ServiceError::NotFound)?;

    match repo.set_staging_status(
        merchant_id,
        staging_id,
        StagingStatus::PendingSync,
        clock.now(),
    ) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => {
            log::info!("Staging product {staging_id} of merchant {merchant_id} marked for resync");
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to mark staging product {staging_id} for resync: {e}");
            Err(ServiceError::Internal)
        }
    }
}
