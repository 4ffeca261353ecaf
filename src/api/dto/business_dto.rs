//! Business setup and deal management DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::persistence::models::{Business, Deal};

/// Request body for `POST /business`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBusinessRequest {
    /// Business name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Street address.
    pub address: String,
    /// Category label (e.g. `"Restaurant"`).
    pub category: String,
    /// Optional latitude.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Optional longitude.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Optional logo URL.
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// A business profile as returned to its owner.
#[derive(Debug, Serialize, ToSchema)]
pub struct BusinessResponse {
    /// Business identifier.
    pub id: Uuid,
    /// Owning profile identifier.
    pub owner_id: Uuid,
    /// Business name.
    pub name: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Street address.
    pub address: String,
    /// Category label.
    pub category: String,
    /// Optional logo URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Business> for BusinessResponse {
    fn from(business: Business) -> Self {
        Self {
            id: business.id,
            owner_id: business.owner_id,
            name: business.name,
            description: business.description,
            address: business.address,
            category: business.category,
            logo_url: business.logo_url,
            created_at: business.created_at,
        }
    }
}

/// Request body for `POST /business/deals`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDealRequest {
    /// Deal title.
    pub title: String,
    /// Deal description.
    pub description: String,
    /// Free-text discount label.
    pub discount_value: String,
    /// Optional terms and conditions.
    #[serde(default)]
    pub terms: Option<String>,
    /// Expiry instant; must be in the future.
    pub expiry_date: DateTime<Utc>,
    /// Optional redemption cap.
    #[serde(default)]
    pub max_redemptions: Option<i32>,
}

/// A deal as its owning business sees it, counters included.
#[derive(Debug, Serialize, ToSchema)]
pub struct BusinessDealDto {
    /// Deal identifier.
    pub id: Uuid,
    /// Deal title.
    pub title: String,
    /// Deal description.
    pub description: String,
    /// Free-text discount label.
    pub discount_value: String,
    /// Optional terms and conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    /// Expiry instant.
    pub expiry_date: DateTime<Utc>,
    /// Whether the deal is switched on.
    pub is_active: bool,
    /// Optional redemption cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_redemptions: Option<i32>,
    /// Finalized redemptions so far.
    pub current_redemptions: i32,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Deal> for BusinessDealDto {
    fn from(deal: Deal) -> Self {
        Self {
            id: deal.id,
            title: deal.title,
            description: deal.description,
            discount_value: deal.discount_value,
            terms: deal.terms,
            expiry_date: deal.expiry_date,
            is_active: deal.is_active,
            max_redemptions: deal.max_redemptions,
            current_redemptions: deal.current_redemptions,
            created_at: deal.created_at,
        }
    }
}

/// Response body for `GET /business/deals`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BusinessDealListResponse {
    /// The business's deals, newest first.
    pub data: Vec<BusinessDealDto>,
}

/// Request body for `PATCH /business/deals/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetDealActiveRequest {
    /// Desired active flag.
    pub is_active: bool,
}
