use chrono::NaiveDateTime;
use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::pagination::Pagination;

use crate::domain::catalog::{
    Media, NewMedia, NewProduct, NewVariant, Product, ProductSummary, Variant,
};
use crate::domain::merchant::Merchant;
use crate::domain::offer::NewMerchantOffer;
use crate::domain::staging::{
    IncomingStagingProduct, StagingAggregate, StagingListItem, UpsertOutcome,
};
use crate::domain::types::{
    BrandId, CategoryId, MerchantId, ProductId, StagingProductId, StagingStatus, VariantId,
};

pub mod catalog;
pub mod errors;
pub mod merchant;
pub mod review;
pub mod staging;

pub use errors::{RepositoryError, RepositoryResult};

/// Rows to skip for a 1-based page. Saturates for out-of-range pages.
pub(crate) fn page_offset(pagination: &Pagination) -> usize {
    pagination
        .page
        .max(1)
        .saturating_sub(1)
        .saturating_mul(pagination.per_page)
}

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Ordering applied to staging listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StagingOrder {
    /// Newest first.
    #[default]
    CreatedDesc,
    /// Oldest first, used by the review queue.
    CreatedAsc,
    /// Most recently touched first.
    UpdatedDesc,
}

/// Query parameters used when listing, searching or counting staging products.
#[derive(Debug, Clone, Default)]
pub struct StagingListQuery {
    /// Restrict to one merchant.
    pub merchant_id: Option<MerchantId>,
    /// Restrict to a set of statuses.
    pub statuses: Option<Vec<StagingStatus>>,
    /// Case-insensitive substring over title, vendor, product type and variant SKUs.
    pub search: Option<String>,
    /// Only records updated strictly after this instant.
    pub updated_after: Option<NaiveDateTime>,
    pub order: StagingOrder,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl StagingListQuery {
    pub fn merchant(mut self, merchant_id: MerchantId) -> Self {
        self.merchant_id = Some(merchant_id);
        self
    }
    pub fn statuses(mut self, statuses: impl Into<Vec<StagingStatus>>) -> Self {
        self.statuses = Some(statuses.into());
        self
    }
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn updated_after(mut self, instant: NaiveDateTime) -> Self {
        self.updated_after = Some(instant);
        self
    }
    pub fn order(mut self, order: StagingOrder) -> Self {
        self.order = order;
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Query parameters for listing or searching master products.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Case-insensitive substring over the title.
    pub search: Option<String>,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Read-only operations for merchants.
pub trait MerchantReader {
    /// Retrieve a merchant by its identifier.
    fn get_merchant_by_id(&self, id: MerchantId) -> RepositoryResult<Option<Merchant>>;
    /// Retrieve every merchant among `ids`; unknown ids are ignored.
    fn list_merchants_by_ids(&self, ids: &[MerchantId]) -> RepositoryResult<Vec<Merchant>>;
}

/// Read-only operations for staging products.
pub trait StagingReader {
    /// Load a staging product with its media and variants.
    fn get_staging_product(
        &self,
        id: StagingProductId,
    ) -> RepositoryResult<Option<StagingAggregate>>;
    /// List staging products matching the query.
    fn list_staging_products(
        &self,
        query: StagingListQuery,
    ) -> RepositoryResult<(usize, Vec<StagingListItem>)>;
    /// Count staging products matching the query, ignoring pagination.
    fn count_staging_products(&self, query: &StagingListQuery) -> RepositoryResult<usize>;
}

/// Write operations performed by the sync pipeline and merchant actions.
pub trait StagingWriter {
    /// Insert or refresh one upstream product and its children atomically.
    fn upsert_staging_product(
        &self,
        merchant_id: MerchantId,
        incoming: &IncomingStagingProduct,
        now: NaiveDateTime,
    ) -> RepositoryResult<UpsertOutcome>;
    /// Set the status of a merchant's staging product. Returns affected rows.
    fn set_staging_status(
        &self,
        merchant_id: MerchantId,
        id: StagingProductId,
        status: StagingStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize>;
}

/// Read-only operations over the canonical catalog.
pub trait CatalogReader {
    /// Retrieve a master product by its identifier.
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
    /// List variants of a product in insertion order.
    fn list_variants(&self, product_id: ProductId) -> RepositoryResult<Vec<Variant>>;
    /// List master products with brand names and variant counts.
    fn list_products(
        &self,
        query: ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<ProductSummary>)>;
    /// Total number of master products.
    fn count_products(&self) -> RepositoryResult<usize>;
}

/// Operations available inside a review decision transaction.
///
/// Every call observes the writes made earlier in the same transaction.
pub trait ReviewStore {
    fn staging_product(&mut self, id: StagingProductId)
    -> RepositoryResult<Option<StagingAggregate>>;
    fn product(&mut self, id: ProductId) -> RepositoryResult<Option<Product>>;
    fn variant(&mut self, id: VariantId) -> RepositoryResult<Option<Variant>>;
    fn brand_exists(&mut self, id: BrandId) -> RepositoryResult<bool>;
    fn category_exists(&mut self, id: CategoryId) -> RepositoryResult<bool>;
    fn slug_exists(&mut self, slug: &str) -> RepositoryResult<bool>;
    fn insert_product(&mut self, product: &NewProduct) -> RepositoryResult<Product>;
    /// Set `image_url` unless the product already has a non-blank one.
    fn fill_product_image(&mut self, id: ProductId, url: &str) -> RepositoryResult<()>;
    /// Position following the highest existing media position, 0 when none.
    fn next_media_position(&mut self, product_id: ProductId) -> RepositoryResult<i32>;
    fn insert_media(&mut self, media: &NewMedia) -> RepositoryResult<Media>;
    fn link_categories(
        &mut self,
        product_id: ProductId,
        category_ids: &[CategoryId],
    ) -> RepositoryResult<usize>;
    fn insert_variant(&mut self, variant: &NewVariant) -> RepositoryResult<Variant>;
    /// Insert the offer unless `(merchant, variant)` already has one.
    /// Returns whether a row was written.
    fn insert_offer_if_absent(&mut self, offer: &NewMerchantOffer) -> RepositoryResult<bool>;
    fn approve_staging(&mut self, id: StagingProductId) -> RepositoryResult<()>;
    fn reject_staging(
        &mut self,
        id: StagingProductId,
        rejection_reason: Option<&str>,
        admin_notes: Option<&str>,
    ) -> RepositoryResult<()>;
}

/// Runs review decisions as a single all-or-nothing unit.
pub trait ReviewWriter {
    /// Execute `work` inside one write transaction stamped with `now`.
    ///
    /// Nothing `work` wrote persists when it returns an error.
    fn review_transaction<T, E, F>(&self, now: NaiveDateTime, work: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut dyn ReviewStore) -> Result<T, E>;
}
