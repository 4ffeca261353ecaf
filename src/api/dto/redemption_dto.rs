//! Redemption lifecycle DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::RedemptionStatus;
use crate::persistence::models::{RedemptionHistoryEntry, RedemptionLookup};
use crate::service::redemption::CodeTicket;

/// Request body for `POST /redemptions`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestCodeRequest {
    /// Deal the customer wants to redeem.
    pub deal_id: Uuid,
    /// Business that will consume the code (as shown on the deal card).
    pub business_id: Uuid,
}

/// Response body for `POST /redemptions` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CodeTicketResponse {
    /// ID of the created redemption.
    pub redemption_id: Uuid,
    /// The one-time code to present.
    pub code: String,
    /// Absolute expiry instant for the countdown display.
    pub expires_at: DateTime<Utc>,
    /// URL of the externally rendered scannable image.
    pub qr_image_url: String,
}

impl From<CodeTicket> for CodeTicketResponse {
    fn from(ticket: CodeTicket) -> Self {
        Self {
            redemption_id: ticket.redemption_id,
            code: ticket.code.to_string(),
            expires_at: ticket.expires_at,
            qr_image_url: ticket.qr_image_url,
        }
    }
}

/// Request body for `POST /redemptions/verify`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyCodeRequest {
    /// The scanned or typed code.
    pub code: String,
}

/// Response body for a successful verify: everything the confirmation
/// screen shows.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedemptionDetailsResponse {
    /// Redemption ID, used to finalize.
    pub redemption_id: Uuid,
    /// Title of the deal.
    pub deal_title: String,
    /// Discount label of the deal.
    pub discount_value: String,
    /// Customer display name.
    pub customer_name: String,
    /// Customer email.
    pub customer_email: String,
    /// End of the code's validity window.
    pub expires_at: DateTime<Utc>,
}

impl From<RedemptionLookup> for RedemptionDetailsResponse {
    fn from(lookup: RedemptionLookup) -> Self {
        Self {
            redemption_id: lookup.id,
            deal_title: lookup.deal_title,
            discount_value: lookup.discount_value,
            customer_name: lookup.customer_name,
            customer_email: lookup.customer_email,
            expires_at: lookup.expires_at,
        }
    }
}

/// Response body for `POST /redemptions/{id}/finalize`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FinalizeResponse {
    /// The finalized redemption.
    pub redemption_id: Uuid,
    /// Resulting status (always `redeemed`).
    pub status: RedemptionStatus,
}

/// One entry in `GET /redemptions/history`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedemptionHistoryDto {
    /// Redemption ID.
    pub id: Uuid,
    /// Lifecycle state.
    pub status: RedemptionStatus,
    /// When the code was requested.
    pub created_at: DateTime<Utc>,
    /// When the code was consumed, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeemed_at: Option<DateTime<Utc>>,
    /// Title of the deal.
    pub deal_title: String,
    /// Discount label of the deal.
    pub discount_value: String,
    /// Name of the business.
    pub business_name: String,
}

impl From<RedemptionHistoryEntry> for RedemptionHistoryDto {
    fn from(entry: RedemptionHistoryEntry) -> Self {
        Self {
            id: entry.id,
            status: entry.status,
            created_at: entry.created_at,
            redeemed_at: entry.redeemed_at,
            deal_title: entry.deal_title,
            discount_value: entry.discount_value,
            business_name: entry.business_name,
        }
    }
}

/// Response body for `GET /redemptions/history`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedemptionHistoryResponse {
    /// The caller's redemptions, newest first.
    pub data: Vec<RedemptionHistoryDto>,
}
