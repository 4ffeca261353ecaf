//! Catalog and favorites DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::persistence::models::DealWithBusiness;

/// Business metadata shown on a deal card.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BusinessSummaryDto {
    /// Business name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Category label.
    pub category: String,
}

/// A catalog deal joined with its business.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DealDto {
    /// Deal identifier.
    pub id: Uuid,
    /// Publishing business identifier.
    pub business_id: Uuid,
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
    /// Business metadata.
    pub business: BusinessSummaryDto,
    /// Whether the session user has favorited this deal.
    pub is_favorite: bool,
}

impl DealDto {
    /// Builds the DTO from a store read plus the caller's favorite flag.
    #[must_use]
    pub fn from_entry(entry: DealWithBusiness, is_favorite: bool) -> Self {
        Self {
            id: entry.deal.id,
            business_id: entry.deal.business_id,
            title: entry.deal.title,
            description: entry.deal.description,
            discount_value: entry.deal.discount_value,
            terms: entry.deal.terms,
            expiry_date: entry.deal.expiry_date,
            business: BusinessSummaryDto {
                name: entry.business_name,
                address: entry.business_address,
                category: entry.business_category,
            },
            is_favorite,
        }
    }
}

/// Query parameters for `GET /deals`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CatalogQuery {
    /// Case-insensitive substring over title, description, and
    /// business name.
    #[serde(default)]
    pub search: Option<String>,
    /// Exact business-category match.
    #[serde(default)]
    pub category: Option<String>,
}

/// Response body for deal list endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct DealListResponse {
    /// Deals, newest first.
    pub data: Vec<DealDto>,
}

/// Response body for `POST /deals/{id}/favorite`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteToggleResponse {
    /// The toggled deal.
    pub deal_id: Uuid,
    /// Membership after the toggle.
    pub is_favorite: bool,
}
