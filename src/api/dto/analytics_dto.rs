//! Analytics DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::persistence::models::RecentRedemption;
use crate::service::analytics::AnalyticsSummary;

/// One entry in the recent-redemption feed.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecentRedemptionDto {
    /// Redemption ID.
    pub id: Uuid,
    /// When the code was consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeemed_at: Option<DateTime<Utc>>,
    /// Title of the deal.
    pub deal_title: String,
    /// Discount label of the deal.
    pub discount_value: String,
    /// Customer display name.
    pub customer_name: String,
}

impl From<RecentRedemption> for RecentRedemptionDto {
    fn from(entry: RecentRedemption) -> Self {
        Self {
            id: entry.id,
            redeemed_at: entry.redeemed_at,
            deal_title: entry.deal_title,
            discount_value: entry.discount_value,
            customer_name: entry.customer_name,
        }
    }
}

/// Response body for `GET /business/analytics`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsResponse {
    /// All deals the business has ever created.
    pub total_deals: i64,
    /// Deals currently switched on.
    pub active_deals: i64,
    /// Finalized redemptions across all deals.
    pub total_redemptions: i64,
    /// Most recent finalized redemptions, newest first.
    pub recent_redemptions: Vec<RecentRedemptionDto>,
}

impl From<AnalyticsSummary> for AnalyticsResponse {
    fn from(summary: AnalyticsSummary) -> Self {
        Self {
            total_deals: summary.total_deals,
            active_deals: summary.active_deals,
            total_redemptions: summary.total_redemptions,
            recent_redemptions: summary
                .recent_redemptions
                .into_iter()
                .map(RecentRedemptionDto::from)
                .collect(),
        }
    }
}
