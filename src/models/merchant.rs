use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::merchant::Merchant as DomainMerchant;
use crate::domain::types::{MerchantId, MerchantName};
use crate::repository::errors::RepositoryError;
use crate::schema::merchants;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = merchants)]
pub struct Merchant {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub source_type: String,
    pub source_config: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Merchant> for DomainMerchant {
    type Error = RepositoryError;

    fn try_from(row: Merchant) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MerchantId::new(row.id)?,
            name: MerchantName::new(row.name)?,
            email: row.email,
            source_type: row.source_type,
            source_config: row.source_config,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
