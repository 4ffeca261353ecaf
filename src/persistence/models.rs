//! Database models for marketplace rows and joined read views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{RedemptionCode, RedemptionStatus, UserType};

/// A profile row. Created externally at sign-up; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Profile ID (identity provider's subject).
    pub id: Uuid,
    /// Contact email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Account type fixed at sign-up.
    pub user_type: UserType,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A business row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    /// Business ID.
    pub id: Uuid,
    /// Owning profile.
    pub owner_id: Uuid,
    /// Business name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Street address.
    pub address: String,
    /// Optional latitude (stored, never queried).
    pub latitude: Option<f64>,
    /// Optional longitude (stored, never queried).
    pub longitude: Option<f64>,
    /// Category label (e.g. `"Restaurant"`).
    pub category: String,
    /// Optional logo URL.
    pub logo_url: Option<String>,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a business.
#[derive(Debug, Clone)]
pub struct NewBusiness {
    /// Owning profile.
    pub owner_id: Uuid,
    /// Business name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Street address.
    pub address: String,
    /// Optional latitude.
    pub latitude: Option<f64>,
    /// Optional longitude.
    pub longitude: Option<f64>,
    /// Category label.
    pub category: String,
    /// Optional logo URL.
    pub logo_url: Option<String>,
}

/// A deal row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    /// Deal ID.
    pub id: Uuid,
    /// Publishing business.
    pub business_id: Uuid,
    /// Deal title.
    pub title: String,
    /// Deal description.
    pub description: String,
    /// Free-text discount label (e.g. `"20% OFF"`).
    pub discount_value: String,
    /// Optional terms and conditions.
    pub terms: Option<String>,
    /// Instant after which the deal is no longer displayable.
    pub expiry_date: DateTime<Utc>,
    /// Whether the business has the deal switched on.
    pub is_active: bool,
    /// Optional redemption cap.
    pub max_redemptions: Option<i32>,
    /// Denormalized count of finalized redemptions.
    pub current_redemptions: i32,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a deal.
#[derive(Debug, Clone)]
pub struct NewDeal {
    /// Publishing business.
    pub business_id: Uuid,
    /// Deal title.
    pub title: String,
    /// Deal description.
    pub description: String,
    /// Free-text discount label.
    pub discount_value: String,
    /// Optional terms and conditions.
    pub terms: Option<String>,
    /// Expiry instant.
    pub expiry_date: DateTime<Utc>,
    /// Optional redemption cap.
    pub max_redemptions: Option<i32>,
}

/// A deal joined with its publishing business, as the catalog reads it.
#[derive(Debug, Clone)]
pub struct DealWithBusiness {
    /// The deal row.
    pub deal: Deal,
    /// Business name.
    pub business_name: String,
    /// Business address.
    pub business_address: String,
    /// Business category.
    pub business_category: String,
}

/// A redemption row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    /// Redemption ID.
    pub id: Uuid,
    /// Deal being redeemed.
    pub deal_id: Uuid,
    /// Redeeming customer.
    pub user_id: Uuid,
    /// Business that will consume the code.
    pub business_id: Uuid,
    /// Opaque one-time code.
    pub redemption_code: RedemptionCode,
    /// Lifecycle state.
    pub status: RedemptionStatus,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Instant the code was consumed, if it was.
    pub redeemed_at: Option<DateTime<Utc>>,
    /// End of the validity window; never extended.
    pub expires_at: DateTime<Utc>,
}

/// Payload for creating a redemption.
#[derive(Debug, Clone)]
pub struct NewRedemption {
    /// Deal being redeemed.
    pub deal_id: Uuid,
    /// Redeeming customer.
    pub user_id: Uuid,
    /// Business that will consume the code.
    pub business_id: Uuid,
    /// Opaque one-time code.
    pub redemption_code: RedemptionCode,
    /// End of the validity window.
    pub expires_at: DateTime<Utc>,
}

/// The scanner's view of a redemption: the row joined with deal and
/// customer details for the confirmation screen.
#[derive(Debug, Clone)]
pub struct RedemptionLookup {
    /// Redemption ID.
    pub id: Uuid,
    /// Deal being redeemed.
    pub deal_id: Uuid,
    /// Lifecycle state.
    pub status: RedemptionStatus,
    /// End of the validity window.
    pub expires_at: DateTime<Utc>,
    /// Title of the deal.
    pub deal_title: String,
    /// Discount label of the deal.
    pub discount_value: String,
    /// Customer display name.
    pub customer_name: String,
    /// Customer email.
    pub customer_email: String,
}

/// One entry in a customer's redemption history.
#[derive(Debug, Clone)]
pub struct RedemptionHistoryEntry {
    /// Redemption ID.
    pub id: Uuid,
    /// Lifecycle state.
    pub status: RedemptionStatus,
    /// When the code was requested.
    pub created_at: DateTime<Utc>,
    /// When the code was consumed, if it was.
    pub redeemed_at: Option<DateTime<Utc>>,
    /// Title of the deal.
    pub deal_title: String,
    /// Discount label of the deal.
    pub discount_value: String,
    /// Name of the business.
    pub business_name: String,
}

/// One entry in a business's recent-redemption feed.
#[derive(Debug, Clone)]
pub struct RecentRedemption {
    /// Redemption ID.
    pub id: Uuid,
    /// When the code was consumed.
    pub redeemed_at: Option<DateTime<Utc>>,
    /// Title of the deal.
    pub deal_title: String,
    /// Discount label of the deal.
    pub discount_value: String,
    /// Customer display name.
    pub customer_name: String,
}

/// Deal counters for the analytics view.
#[derive(Debug, Clone, Copy)]
pub struct DealCounts {
    /// All deals the business has ever created.
    pub total: i64,
    /// Deals currently switched on.
    pub active: i64,
}
