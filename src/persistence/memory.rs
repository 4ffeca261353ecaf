//! In-memory implementation of the marketplace store.
//!
//! Backs the unit tests and local development. All tables live behind a
//! single `tokio::sync::RwLock`, which serializes writers and makes the
//! conditional transitions ([`MarketStore::expire_redemption`],
//! [`MarketStore::finalize_redemption`]) behave like their
//! transactional PostgreSQL counterparts.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::MarketStore;
use super::models::{
    Business, Deal, DealCounts, DealWithBusiness, NewBusiness, NewDeal, NewRedemption, Profile,
    RecentRedemption, Redemption, RedemptionHistoryEntry, RedemptionLookup,
};
use crate::domain::{RedemptionCode, RedemptionStatus};
use crate::error::ApiError;

#[derive(Debug, Default)]
struct Tables {
    profiles: HashMap<Uuid, Profile>,
    businesses: HashMap<Uuid, Business>,
    deals: HashMap<Uuid, Deal>,
    redemptions: HashMap<Uuid, Redemption>,
    /// (user_id, deal_id) pairs.
    favorites: Vec<(Uuid, Uuid)>,
}

/// In-memory marketplace store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a profile row. Profiles are created by the external
    /// identity provider in production, so this is not part of
    /// [`MarketStore`].
    pub async fn insert_profile(&self, profile: Profile) {
        let mut tables = self.tables.write().await;
        tables.profiles.insert(profile.id, profile);
    }
}

fn join_deal(tables: &Tables, deal: &Deal) -> Result<DealWithBusiness, ApiError> {
    let business = tables
        .businesses
        .get(&deal.business_id)
        .ok_or_else(|| ApiError::PersistenceError(format!(
            "dangling business reference on deal {}",
            deal.id
        )))?;
    Ok(DealWithBusiness {
        deal: deal.clone(),
        business_name: business.name.clone(),
        business_address: business.address.clone(),
        business_category: business.category.clone(),
    })
}

fn newest_first(deals: &mut [DealWithBusiness]) {
    deals.sort_by(|a, b| b.deal.created_at.cmp(&a.deal.created_at));
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, ApiError> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.get(&user_id).cloned())
    }

    async fn list_active_deals(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<DealWithBusiness>, ApiError> {
        let tables = self.tables.read().await;
        let mut deals = tables
            .deals
            .values()
            .filter(|d| d.is_active && d.expiry_date > now)
            .map(|d| join_deal(&tables, d))
            .collect::<Result<Vec<_>, _>>()?;
        newest_first(&mut deals);
        Ok(deals)
    }

    async fn list_favorite_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, ApiError> {
        let tables = self.tables.read().await;
        Ok(tables
            .favorites
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, d)| *d)
            .collect())
    }

    async fn insert_favorite(&self, user_id: Uuid, deal_id: Uuid) -> Result<(), ApiError> {
        let mut tables = self.tables.write().await;
        if !tables.favorites.contains(&(user_id, deal_id)) {
            tables.favorites.push((user_id, deal_id));
        }
        Ok(())
    }

    async fn delete_favorite(&self, user_id: Uuid, deal_id: Uuid) -> Result<bool, ApiError> {
        let mut tables = self.tables.write().await;
        let before = tables.favorites.len();
        tables.favorites.retain(|pair| *pair != (user_id, deal_id));
        Ok(tables.favorites.len() < before)
    }

    async fn list_favorite_deals(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<DealWithBusiness>, ApiError> {
        let tables = self.tables.read().await;
        let mut deals = tables
            .favorites
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, deal_id)| tables.deals.get(deal_id))
            .filter(|d| d.is_active && d.expiry_date > now)
            .map(|d| join_deal(&tables, d))
            .collect::<Result<Vec<_>, _>>()?;
        newest_first(&mut deals);
        Ok(deals)
    }

    async fn find_business_by_owner(&self, owner_id: Uuid) -> Result<Option<Business>, ApiError> {
        let tables = self.tables.read().await;
        Ok(tables
            .businesses
            .values()
            .find(|b| b.owner_id == owner_id)
            .cloned())
    }

    async fn insert_business(&self, new: NewBusiness) -> Result<Business, ApiError> {
        let now = Utc::now();
        let business = Business {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            name: new.name,
            description: new.description,
            address: new.address,
            latitude: new.latitude,
            longitude: new.longitude,
            category: new.category,
            logo_url: new.logo_url,
            created_at: now,
            updated_at: now,
        };
        let mut tables = self.tables.write().await;
        tables.businesses.insert(business.id, business.clone());
        Ok(business)
    }

    async fn list_deals_for_business(&self, business_id: Uuid) -> Result<Vec<Deal>, ApiError> {
        let tables = self.tables.read().await;
        let mut deals: Vec<Deal> = tables
            .deals
            .values()
            .filter(|d| d.business_id == business_id)
            .cloned()
            .collect();
        deals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(deals)
    }

    async fn insert_deal(&self, new: NewDeal) -> Result<Deal, ApiError> {
        let now = Utc::now();
        let deal = Deal {
            id: Uuid::new_v4(),
            business_id: new.business_id,
            title: new.title,
            description: new.description,
            discount_value: new.discount_value,
            terms: new.terms,
            expiry_date: new.expiry_date,
            is_active: true,
            max_redemptions: new.max_redemptions,
            current_redemptions: 0,
            created_at: now,
            updated_at: now,
        };
        let mut tables = self.tables.write().await;
        tables.deals.insert(deal.id, deal.clone());
        Ok(deal)
    }

    async fn set_deal_active(
        &self,
        business_id: Uuid,
        deal_id: Uuid,
        active: bool,
    ) -> Result<bool, ApiError> {
        let mut tables = self.tables.write().await;
        match tables.deals.get_mut(&deal_id) {
            Some(deal) if deal.business_id == business_id => {
                deal.is_active = active;
                deal.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_redemption(&self, new: NewRedemption) -> Result<Redemption, ApiError> {
        let redemption = Redemption {
            id: Uuid::new_v4(),
            deal_id: new.deal_id,
            user_id: new.user_id,
            business_id: new.business_id,
            redemption_code: new.redemption_code,
            status: RedemptionStatus::Pending,
            created_at: Utc::now(),
            redeemed_at: None,
            expires_at: new.expires_at,
        };
        let mut tables = self.tables.write().await;
        tables.redemptions.insert(redemption.id, redemption.clone());
        Ok(redemption)
    }

    async fn find_redemption_by_code(
        &self,
        code: &RedemptionCode,
        business_id: Uuid,
    ) -> Result<Option<RedemptionLookup>, ApiError> {
        let tables = self.tables.read().await;
        let Some(redemption) = tables
            .redemptions
            .values()
            .find(|r| r.redemption_code == *code && r.business_id == business_id)
        else {
            return Ok(None);
        };

        let deal = tables.deals.get(&redemption.deal_id).ok_or_else(|| {
            ApiError::PersistenceError(format!(
                "dangling deal reference on redemption {}",
                redemption.id
            ))
        })?;
        let customer = tables.profiles.get(&redemption.user_id).ok_or_else(|| {
            ApiError::PersistenceError(format!(
                "dangling profile reference on redemption {}",
                redemption.id
            ))
        })?;

        Ok(Some(RedemptionLookup {
            id: redemption.id,
            deal_id: redemption.deal_id,
            status: redemption.status,
            expires_at: redemption.expires_at,
            deal_title: deal.title.clone(),
            discount_value: deal.discount_value.clone(),
            customer_name: customer.name.clone(),
            customer_email: customer.email.clone(),
        }))
    }

    async fn expire_redemption(&self, redemption_id: Uuid) -> Result<bool, ApiError> {
        let mut tables = self.tables.write().await;
        match tables.redemptions.get_mut(&redemption_id) {
            Some(r) if r.status.can_transition_to(RedemptionStatus::Expired) => {
                r.status = RedemptionStatus::Expired;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn finalize_redemption(
        &self,
        redemption_id: Uuid,
        business_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let mut tables = self.tables.write().await;

        let (deal_id, status) = match tables.redemptions.get(&redemption_id) {
            Some(r) if r.business_id == business_id => (r.deal_id, r.status),
            _ => return Err(ApiError::RedemptionNotFound(redemption_id)),
        };

        match status {
            RedemptionStatus::Redeemed => return Err(ApiError::AlreadyRedeemed),
            RedemptionStatus::Expired => return Err(ApiError::CodeExpired),
            RedemptionStatus::Pending => {}
        }

        // Check the counter guard before touching either row, so a
        // failed cap check leaves the redemption pending, the same
        // outcome a rolled-back transaction gives.
        {
            let deal = tables.deals.get(&deal_id).ok_or_else(|| {
                ApiError::PersistenceError(format!(
                    "dangling deal reference on redemption {redemption_id}"
                ))
            })?;
            if let Some(max) = deal.max_redemptions {
                if deal.current_redemptions >= max {
                    return Err(ApiError::DealFullyRedeemed);
                }
            }
        }

        if let Some(r) = tables.redemptions.get_mut(&redemption_id) {
            r.status = RedemptionStatus::Redeemed;
            r.redeemed_at = Some(now);
        }
        if let Some(deal) = tables.deals.get_mut(&deal_id) {
            deal.current_redemptions += 1;
            deal.updated_at = now;
        }

        Ok(())
    }

    async fn list_redemptions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RedemptionHistoryEntry>, ApiError> {
        let tables = self.tables.read().await;
        let mut entries = tables
            .redemptions
            .values()
            .filter(|r| r.user_id == user_id)
            .map(|r| {
                let deal = tables.deals.get(&r.deal_id).ok_or_else(|| {
                    ApiError::PersistenceError(format!(
                        "dangling deal reference on redemption {}",
                        r.id
                    ))
                })?;
                let business = tables.businesses.get(&r.business_id).ok_or_else(|| {
                    ApiError::PersistenceError(format!(
                        "dangling business reference on redemption {}",
                        r.id
                    ))
                })?;
                Ok(RedemptionHistoryEntry {
                    id: r.id,
                    status: r.status,
                    created_at: r.created_at,
                    redeemed_at: r.redeemed_at,
                    deal_title: deal.title.clone(),
                    discount_value: deal.discount_value.clone(),
                    business_name: business.name.clone(),
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn count_deals(&self, business_id: Uuid) -> Result<DealCounts, ApiError> {
        let tables = self.tables.read().await;
        let mut counts = DealCounts { total: 0, active: 0 };
        for deal in tables.deals.values().filter(|d| d.business_id == business_id) {
            counts.total += 1;
            if deal.is_active {
                counts.active += 1;
            }
        }
        Ok(counts)
    }

    async fn count_redeemed(&self, business_id: Uuid) -> Result<i64, ApiError> {
        let tables = self.tables.read().await;
        Ok(tables
            .redemptions
            .values()
            .filter(|r| r.business_id == business_id && r.status == RedemptionStatus::Redeemed)
            .count() as i64)
    }

    async fn recent_redemptions(
        &self,
        business_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RecentRedemption>, ApiError> {
        let tables = self.tables.read().await;
        let mut redeemed: Vec<&Redemption> = tables
            .redemptions
            .values()
            .filter(|r| r.business_id == business_id && r.status == RedemptionStatus::Redeemed)
            .collect();
        redeemed.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        redeemed
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|r| {
                let deal = tables.deals.get(&r.deal_id).ok_or_else(|| {
                    ApiError::PersistenceError(format!(
                        "dangling deal reference on redemption {}",
                        r.id
                    ))
                })?;
                let customer = tables.profiles.get(&r.user_id).ok_or_else(|| {
                    ApiError::PersistenceError(format!(
                        "dangling profile reference on redemption {}",
                        r.id
                    ))
                })?;
                Ok(RecentRedemption {
                    id: r.id,
                    redeemed_at: r.redeemed_at,
                    deal_title: deal.title.clone(),
                    discount_value: deal.discount_value.clone(),
                    customer_name: customer.name.clone(),
                })
            })
            .collect()
    }
}
