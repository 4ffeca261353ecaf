//! Analytics aggregator: derived counts and the recent-redemption feed.

use std::sync::Arc;

use crate::domain::SessionContext;
use crate::error::ApiError;
use crate::persistence::MarketStore;
use crate::persistence::models::RecentRedemption;

/// Aggregate view of a business's deal and redemption activity.
#[derive(Debug, Clone)]
pub struct AnalyticsSummary {
    /// All deals the business has ever created.
    pub total_deals: i64,
    /// Deals currently switched on.
    pub active_deals: i64,
    /// Finalized redemptions across all deals.
    pub total_redemptions: i64,
    /// Most recent finalized redemptions, newest first.
    pub recent_redemptions: Vec<RecentRedemption>,
}

/// Derives analytics for the business dashboard.
#[derive(Debug, Clone)]
pub struct AnalyticsService {
    store: Arc<dyn MarketStore>,
    recent_limit: i64,
}

impl AnalyticsService {
    /// Creates a new analytics service.
    #[must_use]
    pub fn new(store: Arc<dyn MarketStore>, recent_limit: i64) -> Self {
        Self {
            store,
            recent_limit,
        }
    }

    /// Builds the summary for the session owner's business. The three
    /// underlying reads are independent, so they are issued together
    /// and awaited as a group.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for non-business sessions,
    /// [`ApiError::BusinessNotFound`] until setup has happened, or
    /// [`ApiError::PersistenceError`] on backend failure.
    pub async fn summary(
        &self,
        session: &SessionContext,
    ) -> Result<AnalyticsSummary, ApiError> {
        session.require_business()?;
        let business = self
            .store
            .find_business_by_owner(session.user_id)
            .await?
            .ok_or(ApiError::BusinessNotFound)?;

        let (counts, redeemed, recent) = tokio::join!(
            self.store.count_deals(business.id),
            self.store.count_redeemed(business.id),
            self.store.recent_redemptions(business.id, self.recent_limit),
        );
        let counts = counts?;

        Ok(AnalyticsSummary {
            total_deals: counts.total,
            active_deals: counts.active,
            total_redemptions: redeemed?,
            recent_redemptions: recent?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use crate::domain::{RedemptionCode, UserType};
    use crate::persistence::memory::MemoryStore;
    use crate::persistence::models::{NewBusiness, NewDeal, NewRedemption, Profile};

    #[tokio::test]
    async fn summary_counts_deals_and_redemptions() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();

        let owner = Profile {
            id: Uuid::new_v4(),
            email: "grace@example.com".to_string(),
            name: "Grace".to_string(),
            user_type: UserType::Business,
            phone: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_profile(owner.clone()).await;
        let session = SessionContext {
            user_id: owner.id,
            user_type: owner.user_type,
            name: owner.name,
            email: owner.email,
        };

        let customer = Profile {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            user_type: UserType::Customer,
            phone: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_profile(customer.clone()).await;

        let Ok(business) = store
            .insert_business(NewBusiness {
                owner_id: session.user_id,
                name: "Corner Cafe".to_string(),
                description: None,
                address: "1 Main St".to_string(),
                latitude: None,
                longitude: None,
                category: "Cafe".to_string(),
                logo_url: None,
            })
            .await
        else {
            panic!("business insert failed");
        };

        let mut deal_ids = Vec::new();
        for title in ["One", "Two", "Three"] {
            let Ok(deal) = store
                .insert_deal(NewDeal {
                    business_id: business.id,
                    title: title.to_string(),
                    description: "details".to_string(),
                    discount_value: "10% OFF".to_string(),
                    terms: None,
                    expiry_date: now + Duration::days(7),
                    max_redemptions: None,
                })
                .await
            else {
                panic!("deal insert failed");
            };
            deal_ids.push(deal.id);
        }
        let Some(last) = deal_ids.last().copied() else {
            panic!("no deals");
        };
        let Ok(true) = store.set_deal_active(business.id, last, false).await else {
            panic!("deactivation failed");
        };

        // Two finalized redemptions and one still pending.
        for (deal_id, finalized) in [(deal_ids.first(), true), (deal_ids.first(), true), (deal_ids.get(1), false)] {
            let Some(deal_id) = deal_id.copied() else {
                panic!("missing deal id");
            };
            let Ok(redemption) = store
                .insert_redemption(NewRedemption {
                    deal_id,
                    user_id: customer.id,
                    business_id: business.id,
                    redemption_code: RedemptionCode::generate(),
                    expires_at: now + Duration::seconds(60),
                })
                .await
            else {
                panic!("redemption insert failed");
            };
            if finalized {
                let Ok(()) = store
                    .finalize_redemption(redemption.id, business.id, Utc::now())
                    .await
                else {
                    panic!("finalize failed");
                };
            }
        }

        let service = AnalyticsService::new(Arc::clone(&store) as Arc<dyn MarketStore>, 10);
        let Ok(summary) = service.summary(&session).await else {
            panic!("summary failed");
        };

        assert_eq!(summary.total_deals, 3);
        assert_eq!(summary.active_deals, 2);
        assert_eq!(summary.total_redemptions, 2);
        assert_eq!(summary.recent_redemptions.len(), 2);
        for entry in &summary.recent_redemptions {
            assert_eq!(entry.customer_name, "Ada");
        }
    }

    #[tokio::test]
    async fn recent_feed_respects_the_limit() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();

        let owner = Profile {
            id: Uuid::new_v4(),
            email: "grace@example.com".to_string(),
            name: "Grace".to_string(),
            user_type: UserType::Business,
            phone: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_profile(owner.clone()).await;
        let session = SessionContext {
            user_id: owner.id,
            user_type: owner.user_type,
            name: owner.name,
            email: owner.email,
        };

        let customer = Profile {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            user_type: UserType::Customer,
            phone: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_profile(customer.clone()).await;

        let Ok(business) = store
            .insert_business(NewBusiness {
                owner_id: session.user_id,
                name: "Corner Cafe".to_string(),
                description: None,
                address: "1 Main St".to_string(),
                latitude: None,
                longitude: None,
                category: "Cafe".to_string(),
                logo_url: None,
            })
            .await
        else {
            panic!("business insert failed");
        };
        let Ok(deal) = store
            .insert_deal(NewDeal {
                business_id: business.id,
                title: "One".to_string(),
                description: "details".to_string(),
                discount_value: "10% OFF".to_string(),
                terms: None,
                expiry_date: now + Duration::days(7),
                max_redemptions: None,
            })
            .await
        else {
            panic!("deal insert failed");
        };

        for _ in 0..3 {
            let Ok(redemption) = store
                .insert_redemption(NewRedemption {
                    deal_id: deal.id,
                    user_id: customer.id,
                    business_id: business.id,
                    redemption_code: RedemptionCode::generate(),
                    expires_at: now + Duration::seconds(60),
                })
                .await
            else {
                panic!("redemption insert failed");
            };
            let Ok(()) = store
                .finalize_redemption(redemption.id, business.id, Utc::now())
                .await
            else {
                panic!("finalize failed");
            };
        }

        let service = AnalyticsService::new(Arc::clone(&store) as Arc<dyn MarketStore>, 2);
        let Ok(summary) = service.summary(&session).await else {
            panic!("summary failed");
        };
        assert_eq!(summary.total_redemptions, 3);
        assert_eq!(summary.recent_redemptions.len(), 2);
    }
}
