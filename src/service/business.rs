//! Business deal manager: one-time business setup, deal creation,
//! listing, and activation toggling.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::SessionContext;
use crate::error::ApiError;
use crate::persistence::MarketStore;
use crate::persistence::models::{Business, Deal, NewBusiness, NewDeal};

/// Fields a business fills in when publishing a deal.
#[derive(Debug, Clone)]
pub struct DealDraft {
    /// Deal title.
    pub title: String,
    /// Deal description.
    pub description: String,
    /// Free-text discount label.
    pub discount_value: String,
    /// Optional terms and conditions.
    pub terms: Option<String>,
    /// Expiry instant; must be in the future.
    pub expiry_date: DateTime<Utc>,
    /// Optional redemption cap; must be positive when set.
    pub max_redemptions: Option<i32>,
}

/// Manages a business profile and its deals.
#[derive(Debug, Clone)]
pub struct BusinessService {
    store: Arc<dyn MarketStore>,
}

impl BusinessService {
    /// Creates a new business service.
    #[must_use]
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// One-time business setup for the session owner, gated on the
    /// absence of an existing row.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Forbidden`] for non-business sessions.
    /// - [`ApiError::InvalidRequest`] for blank name, address, or
    ///   category.
    /// - [`ApiError::BusinessAlreadyExists`] if the owner already has a
    ///   business.
    /// - [`ApiError::PersistenceError`] on backend failure.
    pub async fn create_business(
        &self,
        session: &SessionContext,
        new: NewBusiness,
    ) -> Result<Business, ApiError> {
        session.require_business()?;

        if new.name.trim().is_empty()
            || new.address.trim().is_empty()
            || new.category.trim().is_empty()
        {
            return Err(ApiError::InvalidRequest(
                "name, address, and category are required".to_string(),
            ));
        }

        if self
            .store
            .find_business_by_owner(session.user_id)
            .await?
            .is_some()
        {
            return Err(ApiError::BusinessAlreadyExists);
        }

        let business = self
            .store
            .insert_business(NewBusiness {
                owner_id: session.user_id,
                ..new
            })
            .await?;

        tracing::info!(business_id = %business.id, "business profile created");
        Ok(business)
    }

    /// The session owner's business.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for non-business sessions,
    /// [`ApiError::BusinessNotFound`] until setup has happened, or
    /// [`ApiError::PersistenceError`] on backend failure.
    pub async fn current_business(
        &self,
        session: &SessionContext,
    ) -> Result<Business, ApiError> {
        session.require_business()?;
        self.store
            .find_business_by_owner(session.user_id)
            .await?
            .ok_or(ApiError::BusinessNotFound)
    }

    /// Every deal of the session owner's business (active or not),
    /// newest first.
    ///
    /// # Errors
    ///
    /// Same as [`BusinessService::current_business`].
    pub async fn list_deals(&self, session: &SessionContext) -> Result<Vec<Deal>, ApiError> {
        let business = self.current_business(session).await?;
        self.store.list_deals_for_business(business.id).await
    }

    /// Publishes a new deal for the session owner's business. New deals
    /// start active with a zero redemption counter.
    ///
    /// # Errors
    ///
    /// - Same session/business errors as
    ///   [`BusinessService::current_business`].
    /// - [`ApiError::InvalidRequest`] for blank required fields, a
    ///   non-future expiry, or a non-positive cap.
    pub async fn create_deal(
        &self,
        session: &SessionContext,
        draft: DealDraft,
    ) -> Result<Deal, ApiError> {
        let business = self.current_business(session).await?;

        if draft.title.trim().is_empty()
            || draft.description.trim().is_empty()
            || draft.discount_value.trim().is_empty()
        {
            return Err(ApiError::InvalidRequest(
                "title, description, and discount are required".to_string(),
            ));
        }
        if draft.expiry_date <= Utc::now() {
            return Err(ApiError::InvalidRequest(
                "expiry date must be in the future".to_string(),
            ));
        }
        if matches!(draft.max_redemptions, Some(max) if max <= 0) {
            return Err(ApiError::InvalidRequest(
                "max redemptions must be positive".to_string(),
            ));
        }

        let deal = self
            .store
            .insert_deal(NewDeal {
                business_id: business.id,
                title: draft.title,
                description: draft.description,
                discount_value: draft.discount_value,
                terms: draft.terms,
                expiry_date: draft.expiry_date,
                max_redemptions: draft.max_redemptions,
            })
            .await?;

        tracing::info!(deal_id = %deal.id, business_id = %business.id, "deal created");
        Ok(deal)
    }

    /// Switches a deal on or off, scoped to the session owner's
    /// business.
    ///
    /// # Errors
    ///
    /// - Same session/business errors as
    ///   [`BusinessService::current_business`].
    /// - [`ApiError::DealNotFound`] if the deal does not exist or
    ///   belongs to another business.
    pub async fn set_deal_active(
        &self,
        session: &SessionContext,
        deal_id: Uuid,
        active: bool,
    ) -> Result<(), ApiError> {
        let business = self.current_business(session).await?;
        if self
            .store
            .set_deal_active(business.id, deal_id, active)
            .await?
        {
            Ok(())
        } else {
            Err(ApiError::DealNotFound(deal_id))
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::domain::UserType;
    use crate::persistence::memory::MemoryStore;
    use crate::persistence::models::Profile;

    fn business_fields(owner_id: Uuid, name: &str) -> NewBusiness {
        NewBusiness {
            owner_id,
            name: name.to_string(),
            description: Some("Espresso and pastries".to_string()),
            address: "1 Main St".to_string(),
            latitude: None,
            longitude: None,
            category: "Cafe".to_string(),
            logo_url: None,
        }
    }

    fn draft(days: i64) -> DealDraft {
        DealDraft {
            title: "Latte Special".to_string(),
            description: "Half price lattes".to_string(),
            discount_value: "50% OFF".to_string(),
            terms: None,
            expiry_date: Utc::now() + Duration::days(days),
            max_redemptions: None,
        }
    }

    async fn merchant(store: &MemoryStore) -> SessionContext {
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            email: "grace@example.com".to_string(),
            name: "Grace".to_string(),
            user_type: UserType::Business,
            phone: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_profile(profile.clone()).await;
        SessionContext {
            user_id: profile.id,
            user_type: profile.user_type,
            name: profile.name,
            email: profile.email,
        }
    }

    #[tokio::test]
    async fn second_business_for_the_same_owner_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let session = merchant(&store).await;
        let service = BusinessService::new(Arc::clone(&store) as Arc<dyn MarketStore>);

        let Ok(_) = service
            .create_business(&session, business_fields(session.user_id, "Corner Cafe"))
            .await
        else {
            panic!("first create failed");
        };

        let second = service
            .create_business(&session, business_fields(session.user_id, "Second Cafe"))
            .await;
        assert!(matches!(second, Err(ApiError::BusinessAlreadyExists)));
    }

    #[tokio::test]
    async fn current_business_is_not_found_until_setup() {
        let store = Arc::new(MemoryStore::new());
        let session = merchant(&store).await;
        let service = BusinessService::new(Arc::clone(&store) as Arc<dyn MarketStore>);

        let result = service.current_business(&session).await;
        assert!(matches!(result, Err(ApiError::BusinessNotFound)));
    }

    #[tokio::test]
    async fn create_deal_validates_fields_and_expiry() {
        let store = Arc::new(MemoryStore::new());
        let session = merchant(&store).await;
        let service = BusinessService::new(Arc::clone(&store) as Arc<dyn MarketStore>);
        let Ok(_) = service
            .create_business(&session, business_fields(session.user_id, "Corner Cafe"))
            .await
        else {
            panic!("business create failed");
        };

        let mut blank_title = draft(7);
        blank_title.title = "  ".to_string();
        assert!(matches!(
            service.create_deal(&session, blank_title).await,
            Err(ApiError::InvalidRequest(_))
        ));

        assert!(matches!(
            service.create_deal(&session, draft(-1)).await,
            Err(ApiError::InvalidRequest(_))
        ));

        let mut zero_cap = draft(7);
        zero_cap.max_redemptions = Some(0);
        assert!(matches!(
            service.create_deal(&session, zero_cap).await,
            Err(ApiError::InvalidRequest(_))
        ));

        let Ok(deal) = service.create_deal(&session, draft(7)).await else {
            panic!("valid draft rejected");
        };
        assert!(deal.is_active);
        assert_eq!(deal.current_redemptions, 0);
    }

    #[tokio::test]
    async fn toggling_another_businesses_deal_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let service = BusinessService::new(Arc::clone(&store) as Arc<dyn MarketStore>);

        let first = merchant(&store).await;
        let Ok(_) = service
            .create_business(&first, business_fields(first.user_id, "Corner Cafe"))
            .await
        else {
            panic!("business create failed");
        };
        let Ok(deal) = service.create_deal(&first, draft(7)).await else {
            panic!("deal create failed");
        };

        let second = merchant(&store).await;
        let Ok(_) = service
            .create_business(&second, business_fields(second.user_id, "Rival Bar"))
            .await
        else {
            panic!("business create failed");
        };

        let result = service.set_deal_active(&second, deal.id, false).await;
        assert!(matches!(result, Err(ApiError::DealNotFound(_))));

        // The owner can, and the flag round-trips.
        let Ok(()) = service.set_deal_active(&first, deal.id, false).await else {
            panic!("owner toggle failed");
        };
        let Ok(deals) = service.list_deals(&first).await else {
            panic!("listing failed");
        };
        let Some(stored) = deals.into_iter().find(|d| d.id == deal.id) else {
            panic!("deal missing");
        };
        assert!(!stored.is_active);
    }
}
