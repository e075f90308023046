use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::staging::{
    DETAILS_CHANGED_NOTE, IncomingStagingProduct, StagingAggregate, StagingListItem,
    StagingMedia, StagingProduct, StagingVariant, UpsertOutcome, requires_review,
};
use crate::domain::types::{MerchantId, StagingProductId, StagingStatus};
use crate::models::staging::{
    NewStagingMedia, NewStagingProduct, NewStagingVariant, StagingMedia as DbStagingMedia,
    StagingProduct as DbStagingProduct, StagingProductRawUpdate,
    StagingVariant as DbStagingVariant,
};
use crate::repository::{
    DieselRepository, RepositoryError, RepositoryResult, StagingListQuery, StagingOrder,
    StagingReader, StagingWriter, page_offset,
};
use crate::schema::{staging_media, staging_products, staging_variants};

/// Boxed staging query with every filter of `query` applied.
fn filtered(query: &StagingListQuery) -> staging_products::BoxedQuery<'static, Sqlite> {
    let mut items = staging_products::table.into_boxed::<Sqlite>();

    if let Some(merchant_id) = query.merchant_id {
        items = items.filter(staging_products::merchant_id.eq(merchant_id.get()));
    }

    if let Some(statuses) = &query.statuses {
        let statuses: Vec<&'static str> = statuses.iter().map(|s| s.as_str()).collect();
        items = items.filter(staging_products::status.eq_any(statuses));
    }

    if let Some(updated_after) = query.updated_after {
        items = items.filter(staging_products::updated_at.gt(updated_after));
    }

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        items = items.filter(
            staging_products::raw_title
                .like(pattern.clone())
                .or(staging_products::raw_vendor.like(pattern.clone()))
                .or(staging_products::raw_product_type.like(pattern.clone()))
                .or(staging_products::id.eq_any(
                    staging_variants::table
                        .filter(staging_variants::raw_sku.like(pattern))
                        .select(staging_variants::staging_product_id),
                )),
        );
    }

    items
}

fn first_images(
    conn: &mut SqliteConnection,
    ids: &[i32],
) -> RepositoryResult<HashMap<i32, String>> {
    let rows: Vec<(i32, String)> = staging_media::table
        .filter(staging_media::staging_product_id.eq_any(ids))
        .order((
            staging_media::staging_product_id.asc(),
            staging_media::position.asc(),
        ))
        .select((staging_media::staging_product_id, staging_media::source_url))
        .load(conn)?;

    let mut images = HashMap::new();
    for (staging_id, url) in rows {
        images.entry(staging_id).or_insert(url);
    }
    Ok(images)
}

/// Load one staging product with its children on an open connection.
pub(crate) fn load_aggregate(
    conn: &mut SqliteConnection,
    id: StagingProductId,
) -> RepositoryResult<Option<StagingAggregate>> {
    let Some(row) = staging_products::table
        .find(id.get())
        .select(DbStagingProduct::as_select())
        .first::<DbStagingProduct>(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let media = DbStagingMedia::belonging_to(&row)
        .select(DbStagingMedia::as_select())
        .order((staging_media::position.asc(), staging_media::id.asc()))
        .load::<DbStagingMedia>(conn)?
        .into_iter()
        .map(StagingMedia::try_from)
        .collect::<RepositoryResult<Vec<_>>>()?;

    let variants = DbStagingVariant::belonging_to(&row)
        .select(DbStagingVariant::as_select())
        .order(staging_variants::id.asc())
        .load::<DbStagingVariant>(conn)?
        .into_iter()
        .map(StagingVariant::try_from)
        .collect::<RepositoryResult<Vec<_>>>()?;

    Ok(Some(StagingAggregate {
        product: StagingProduct::try_from(row)?,
        media,
        variants,
    }))
}

impl StagingReader for DieselRepository {
    fn get_staging_product(
        &self,
        id: StagingProductId,
    ) -> RepositoryResult<Option<StagingAggregate>> {
        let mut conn = self.conn()?;
        load_aggregate(&mut conn, id)
    }

    fn list_staging_products(
        &self,
        query: StagingListQuery,
    ) -> RepositoryResult<(usize, Vec<StagingListItem>)> {
        let mut conn = self.conn()?;

        let total = filtered(&query).count().get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered(&query);

        items = match query.order {
            StagingOrder::CreatedDesc => items.order((
                staging_products::created_at.desc(),
                staging_products::id.desc(),
            )),
            StagingOrder::CreatedAsc => items.order((
                staging_products::created_at.asc(),
                staging_products::id.asc(),
            )),
            StagingOrder::UpdatedDesc => items.order((
                staging_products::updated_at.desc(),
                staging_products::id.desc(),
            )),
        };

        // Apply pagination if requested
        if let Some(pagination) = &query.pagination {
            let offset = i64::try_from(page_offset(pagination)).unwrap_or(i64::MAX);
            let limit = i64::try_from(pagination.per_page).unwrap_or(i64::MAX);
            items = items.offset(offset).limit(limit);
        }

        let rows = items
            .select(DbStagingProduct::as_select())
            .load::<DbStagingProduct>(&mut conn)?;

        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let mut images = first_images(&mut conn, &ids)?;

        let items = rows
            .into_iter()
            .map(|row| {
                let image_url = images.remove(&row.id);
                Ok(StagingListItem {
                    product: StagingProduct::try_from(row)?,
                    image_url,
                })
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, items))
    }

    fn count_staging_products(&self, query: &StagingListQuery) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let total = filtered(query).count().get_result::<i64>(&mut conn)?;
        Ok(total as usize)
    }
}

impl StagingWriter for DieselRepository {
    fn upsert_staging_product(
        &self,
        merchant_id: MerchantId,
        incoming: &IncomingStagingProduct,
        now: NaiveDateTime,
    ) -> RepositoryResult<UpsertOutcome> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let existing: Option<(i32, String, String)> = staging_products::table
                .filter(staging_products::merchant_id.eq(merchant_id.get()))
                .filter(
                    staging_products::external_product_id
                        .eq(incoming.external_product_id.as_str()),
                )
                .select((
                    staging_products::id,
                    staging_products::raw_title,
                    staging_products::status,
                ))
                .first(conn)
                .optional()?;

            let outcome = match existing {
                Some((id, stored_title, status)) => {
                    let status = StagingStatus::try_from(status)?;
                    let flagged = requires_review(&stored_title, status, &incoming.title);

                    diesel::update(staging_products::table.find(id))
                        .set(&StagingProductRawUpdate::from_incoming(incoming, now)?)
                        .execute(conn)?;

                    if flagged {
                        diesel::update(staging_products::table.find(id))
                            .set((
                                staging_products::status.eq(StagingStatus::NeedsReview.as_str()),
                                staging_products::admin_notes.eq(DETAILS_CHANGED_NOTE),
                            ))
                            .execute(conn)?;
                    }

                    UpsertOutcome {
                        staging_id: StagingProductId::new(id)?,
                        created: false,
                        flagged_for_review: flagged,
                    }
                }
                None => {
                    let id: i32 = diesel::insert_into(staging_products::table)
                        .values(&NewStagingProduct::from_incoming(merchant_id, incoming, now)?)
                        .returning(staging_products::id)
                        .get_result(conn)?;

                    UpsertOutcome {
                        staging_id: StagingProductId::new(id)?,
                        created: true,
                        flagged_for_review: false,
                    }
                }
            };

            let staging_id = outcome.staging_id;

            diesel::delete(
                staging_media::table.filter(staging_media::staging_product_id.eq(staging_id.get())),
            )
            .execute(conn)?;
            diesel::delete(
                staging_variants::table
                    .filter(staging_variants::staging_product_id.eq(staging_id.get())),
            )
            .execute(conn)?;

            for (index, media) in incoming.media.iter().enumerate() {
                let position = index as i32 + 1;
                diesel::insert_into(staging_media::table)
                    .values(&NewStagingMedia::from_incoming(staging_id, media, position, now))
                    .execute(conn)?;
            }

            for variant in &incoming.variants {
                diesel::insert_into(staging_variants::table)
                    .values(&NewStagingVariant::from_incoming(staging_id, variant, now)?)
                    .execute(conn)?;
            }

            Ok(outcome)
        })
    }

    fn set_staging_status(
        &self,
        merchant_id: MerchantId,
        id: StagingProductId,
        status: StagingStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let affected = diesel::update(
            staging_products::table
                .filter(staging_products::id.eq(id.get()))
                .filter(staging_products::merchant_id.eq(merchant_id.get())),
        )
        .set((
            staging_products::status.eq(status.as_str()),
            staging_products::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }
}
