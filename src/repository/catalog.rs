use std::collections::HashMap;

use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::catalog::{Product, ProductSummary, Variant};
use crate::domain::types::ProductId;
use crate::models::catalog::{Product as DbProduct, Variant as DbVariant};
use crate::repository::{
    CatalogReader, DieselRepository, ProductListQuery, RepositoryResult, page_offset,
};
use crate::schema::{brands, products, variants};

impl CatalogReader for DieselRepository {
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        let mut conn = self.conn()?;

        let product = products::table
            .find(id.get())
            .select(DbProduct::as_select())
            .first::<DbProduct>(&mut conn)
            .optional()?;

        product.map(Product::try_from).transpose()
    }

    fn list_variants(&self, product_id: ProductId) -> RepositoryResult<Vec<Variant>> {
        let mut conn = self.conn()?;

        variants::table
            .filter(variants::product_id.eq(product_id.get()))
            .order(variants::id.asc())
            .select(DbVariant::as_select())
            .load::<DbVariant>(&mut conn)?
            .into_iter()
            .map(Variant::try_from)
            .collect()
    }

    fn list_products(
        &self,
        query: ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<ProductSummary>)> {
        let mut conn = self.conn()?;

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let query_builder = || {
            let mut items = products::table.into_boxed::<Sqlite>();
            if let Some(pattern) = &search {
                items = items.filter(products::title.like(pattern.clone()));
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();

        if search.is_some() {
            items = items.order((products::title.asc(), products::id.asc()));
        } else {
            items = items.order(products::id.desc());
        }

        // Apply pagination if requested
        if let Some(pagination) = &query.pagination {
            let offset = i64::try_from(page_offset(pagination)).unwrap_or(i64::MAX);
            let limit = i64::try_from(pagination.per_page).unwrap_or(i64::MAX);
            items = items.offset(offset).limit(limit);
        }

        let rows = items
            .select(DbProduct::as_select())
            .load::<DbProduct>(&mut conn)?;

        let product_ids: Vec<i32> = rows.iter().map(|p| p.id).collect();
        let brand_ids: Vec<i32> = rows.iter().filter_map(|p| p.brand_id).collect();

        let brand_names: HashMap<i32, String> = if brand_ids.is_empty() {
            HashMap::new()
        } else {
            brands::table
                .filter(brands::id.eq_any(&brand_ids))
                .select((brands::id, brands::name))
                .load::<(i32, String)>(&mut conn)?
                .into_iter()
                .collect()
        };

        let variant_counts: HashMap<i32, i64> = variants::table
            .filter(variants::product_id.eq_any(&product_ids))
            .group_by(variants::product_id)
            .select((variants::product_id, count_star()))
            .load::<(i32, i64)>(&mut conn)?
            .into_iter()
            .collect();

        let items = rows
            .into_iter()
            .map(|row| {
                let brand_name = row.brand_id.and_then(|id| brand_names.get(&id).cloned());
                let variant_count = variant_counts.get(&row.id).copied().unwrap_or(0) as usize;
                Ok(ProductSummary {
                    product: Product::try_from(row)?,
                    brand_name,
                    variant_count,
                })
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, items))
    }

    fn count_products(&self) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let total = products::table.count().get_result::<i64>(&mut conn)?;
        Ok(total as usize)
    }
}
