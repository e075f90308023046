use diesel::prelude::*;

use crate::domain::merchant::Merchant;
use crate::domain::types::MerchantId;
use crate::models::merchant::Merchant as DbMerchant;
use crate::repository::{DieselRepository, MerchantReader, RepositoryResult};

impl MerchantReader for DieselRepository {
    fn get_merchant_by_id(&self, id: MerchantId) -> RepositoryResult<Option<Merchant>> {
        use crate::schema::merchants;

        let mut conn = self.conn()?;

        let merchant = merchants::table
            .filter(merchants::id.eq(id.get()))
            .select(DbMerchant::as_select())
            .first::<DbMerchant>(&mut conn)
            .optional()?;

        merchant.map(Merchant::try_from).transpose()
    }

    fn list_merchants_by_ids(&self, ids: &[MerchantId]) -> RepositoryResult<Vec<Merchant>> {
        use crate::schema::merchants;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.get()).collect();

        merchants::table
            .filter(merchants::id.eq_any(raw_ids))
            .select(DbMerchant::as_select())
            .load::<DbMerchant>(&mut conn)?
            .into_iter()
            .map(Merchant::try_from)
            .collect()
    }
}
