use chrono::NaiveDateTime;
use diesel::dsl::{exists, max};
use diesel::prelude::*;

use crate::domain::catalog::{Media, NewMedia, NewProduct, NewVariant, Product, Variant};
use crate::domain::offer::NewMerchantOffer;
use crate::domain::staging::StagingAggregate;
use crate::domain::types::{
    BrandId, CategoryId, ProductId, StagingProductId, StagingStatus, VariantId,
};
use crate::models::catalog::{
    Media as DbMedia, NewMedia as DbNewMedia, NewProduct as DbNewProduct,
    NewProductCategory, NewVariant as DbNewVariant, Product as DbProduct,
    Variant as DbVariant,
};
use crate::models::offer::NewMerchantOffer as DbNewMerchantOffer;
use crate::repository::staging::load_aggregate;
use crate::repository::{
    DieselRepository, RepositoryError, RepositoryResult, ReviewStore, ReviewWriter,
};
use crate::schema::{
    brands, categories, media, merchant_offers, product_categories, products, staging_products,
    variants,
};

/// Error carried out of a Diesel transaction closure.
///
/// Diesel needs the closure error to absorb its own errors; the caller's error
/// is kept intact so it can be returned unchanged after rollback.
enum TxAbort<E> {
    Db(diesel::result::Error),
    Work(E),
}

impl<E> From<diesel::result::Error> for TxAbort<E> {
    fn from(value: diesel::result::Error) -> Self {
        TxAbort::Db(value)
    }
}

struct DieselReviewStore<'c> {
    conn: &'c mut SqliteConnection,
    now: NaiveDateTime,
}

impl ReviewStore for DieselReviewStore<'_> {
    fn staging_product(
        &mut self,
        id: StagingProductId,
    ) -> RepositoryResult<Option<StagingAggregate>> {
        load_aggregate(self.conn, id)
    }

    fn product(&mut self, id: ProductId) -> RepositoryResult<Option<Product>> {
        products::table
            .find(id.get())
            .select(DbProduct::as_select())
            .first::<DbProduct>(self.conn)
            .optional()?
            .map(Product::try_from)
            .transpose()
    }

    fn variant(&mut self, id: VariantId) -> RepositoryResult<Option<Variant>> {
        variants::table
            .find(id.get())
            .select(DbVariant::as_select())
            .first::<DbVariant>(self.conn)
            .optional()?
            .map(Variant::try_from)
            .transpose()
    }

    fn brand_exists(&mut self, id: BrandId) -> RepositoryResult<bool> {
        Ok(diesel::select(exists(brands::table.find(id.get()))).get_result(self.conn)?)
    }

    fn category_exists(&mut self, id: CategoryId) -> RepositoryResult<bool> {
        Ok(diesel::select(exists(categories::table.find(id.get()))).get_result(self.conn)?)
    }

    fn slug_exists(&mut self, slug: &str) -> RepositoryResult<bool> {
        Ok(
            diesel::select(exists(products::table.filter(products::slug.eq(slug))))
                .get_result(self.conn)?,
        )
    }

    fn insert_product(&mut self, product: &NewProduct) -> RepositoryResult<Product> {
        let row = diesel::insert_into(products::table)
            .values(&DbNewProduct::from_domain(product, self.now)?)
            .returning(DbProduct::as_returning())
            .get_result::<DbProduct>(self.conn)?;
        Product::try_from(row)
    }

    fn fill_product_image(&mut self, id: ProductId, url: &str) -> RepositoryResult<()> {
        diesel::update(
            products::table
                .filter(products::id.eq(id.get()))
                .filter(
                    products::image_url
                        .is_null()
                        .or(products::image_url.eq("")),
                ),
        )
        .set((
            products::image_url.eq(url),
            products::updated_at.eq(self.now),
        ))
        .execute(self.conn)?;
        Ok(())
    }

    fn next_media_position(&mut self, product_id: ProductId) -> RepositoryResult<i32> {
        let current: Option<i32> = media::table
            .filter(media::product_id.eq(product_id.get()))
            .select(max(media::position))
            .first(self.conn)?;
        Ok(current.map_or(0, |position| position + 1))
    }

    fn insert_media(&mut self, item: &NewMedia) -> RepositoryResult<Media> {
        let row = diesel::insert_into(media::table)
            .values(&DbNewMedia::from_domain(item, self.now))
            .returning(DbMedia::as_returning())
            .get_result::<DbMedia>(self.conn)?;
        Media::try_from(row)
    }

    fn link_categories(
        &mut self,
        product_id: ProductId,
        category_ids: &[CategoryId],
    ) -> RepositoryResult<usize> {
        let mut linked = 0;
        for category_id in category_ids {
            linked += diesel::insert_or_ignore_into(product_categories::table)
                .values(&NewProductCategory {
                    product_id: product_id.get(),
                    category_id: category_id.get(),
                })
                .execute(self.conn)?;
        }
        Ok(linked)
    }

    fn insert_variant(&mut self, variant: &NewVariant) -> RepositoryResult<Variant> {
        let row = diesel::insert_into(variants::table)
            .values(&DbNewVariant::from_domain(variant, self.now)?)
            .returning(DbVariant::as_returning())
            .get_result::<DbVariant>(self.conn)?;
        Variant::try_from(row)
    }

    fn insert_offer_if_absent(&mut self, offer: &NewMerchantOffer) -> RepositoryResult<bool> {
        let inserted = diesel::insert_or_ignore_into(merchant_offers::table)
            .values(&DbNewMerchantOffer::from_domain(offer, self.now))
            .execute(self.conn)?;
        Ok(inserted > 0)
    }

    fn approve_staging(&mut self, id: StagingProductId) -> RepositoryResult<()> {
        let affected = diesel::update(staging_products::table.find(id.get()))
            .set((
                staging_products::status.eq(StagingStatus::Approved.as_str()),
                staging_products::updated_at.eq(self.now),
            ))
            .execute(self.conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn reject_staging(
        &mut self,
        id: StagingProductId,
        rejection_reason: Option<&str>,
        admin_notes: Option<&str>,
    ) -> RepositoryResult<()> {
        let affected = diesel::update(staging_products::table.find(id.get()))
            .set((
                staging_products::status.eq(StagingStatus::Rejected.as_str()),
                staging_products::rejection_reason.eq(rejection_reason),
                staging_products::admin_notes.eq(admin_notes),
                staging_products::updated_at.eq(self.now),
            ))
            .execute(self.conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

impl ReviewWriter for DieselRepository {
    fn review_transaction<T, E, F>(&self, now: NaiveDateTime, work: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut dyn ReviewStore) -> Result<T, E>,
    {
        let mut conn = self.conn()?;

        let result = conn.immediate_transaction::<T, TxAbort<E>, _>(|conn| {
            let mut store = DieselReviewStore { conn, now };
            work(&mut store).map_err(TxAbort::Work)
        });

        match result {
            Ok(value) => Ok(value),
            Err(TxAbort::Work(e)) => Err(e),
            Err(TxAbort::Db(e)) => Err(RepositoryError::from(e).into()),
        }
    }
}
