//! Merchant dashboard payloads. Field names are camelCase on the wire.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::staging::{MerchantStagingStats, StagingListItem};
use crate::domain::types::StagingStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsDto {
    pub live_products: usize,
    pub under_review: usize,
    pub issues: usize,
    pub total_skus: usize,
}

impl From<MerchantStagingStats> for DashboardStatsDto {
    fn from(value: MerchantStagingStats) -> Self {
        Self {
            live_products: value.live_products,
            under_review: value.under_review,
            issues: value.issues,
            total_skus: value.total_skus,
        }
    }
}

/// Row of the merchant's product tabs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingProductListItemDto {
    pub id: i32,
    pub title: String,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub created_at: NaiveDateTime,
    pub image_url: Option<String>,
    pub status: StagingStatus,
}

impl From<StagingListItem> for StagingProductListItemDto {
    fn from(value: StagingListItem) -> Self {
        let product = value.product;
        Self {
            id: product.id.get(),
            title: product.raw_title,
            vendor: product.raw_vendor,
            product_type: product.raw_product_type,
            created_at: product.created_at,
            image_url: value.image_url,
            status: product.status,
        }
    }
}

/// Rejected record with the reviewer's reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueProductDto {
    pub id: i32,
    pub title: String,
    pub vendor: Option<String>,
    /// Last update of the record, which is when the rejection was stored.
    pub rejected_at: NaiveDateTime,
    pub rejection_reason: Option<String>,
    pub image_url: Option<String>,
}

impl From<StagingListItem> for IssueProductDto {
    fn from(value: StagingListItem) -> Self {
        let product = value.product;
        Self {
            id: product.id.get(),
            title: product.raw_title,
            vendor: product.raw_vendor,
            rejected_at: product.updated_at,
            rejection_reason: product.rejection_reason,
            image_url: value.image_url,
        }
    }
}
