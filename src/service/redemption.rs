//! Redemption-code lifecycle: request, verify, finalize.
//!
//! Mints a single-use proof token binding a deal to a customer for a
//! short validity window, and lets the owning business consume it
//! exactly once. Expiry is observation-driven: there is no background
//! sweep, a pending code becomes `expired` when a verify call notices
//! its window has passed.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::{RedemptionCode, RedemptionStatus, SessionContext};
use crate::error::ApiError;
use crate::persistence::MarketStore;
use crate::persistence::models::{NewRedemption, RedemptionHistoryEntry, RedemptionLookup};

/// What a customer gets back from a code request: everything the code
/// display screen needs.
#[derive(Debug, Clone)]
pub struct CodeTicket {
    /// ID of the freshly created redemption row.
    pub redemption_id: Uuid,
    /// The one-time code.
    pub code: RedemptionCode,
    /// Absolute expiry instant for the client countdown.
    pub expires_at: DateTime<Utc>,
    /// URL of the externally rendered scannable image.
    pub qr_image_url: String,
}

/// Orchestrates the redemption-code lifecycle.
#[derive(Debug, Clone)]
pub struct RedemptionService {
    store: Arc<dyn MarketStore>,
    ttl: Duration,
    qr_image_endpoint: String,
    qr_image_size: u32,
}

impl RedemptionService {
    /// Creates a new redemption service.
    #[must_use]
    pub fn new(
        store: Arc<dyn MarketStore>,
        ttl_secs: u64,
        qr_image_endpoint: String,
        qr_image_size: u32,
    ) -> Self {
        Self {
            store,
            ttl: Duration::seconds(i64::try_from(ttl_secs).unwrap_or(60)),
            qr_image_endpoint,
            qr_image_size,
        }
    }

    /// Mints a one-time code for `{deal, customer}` and persists the
    /// pending redemption. Deal displayability was already checked by
    /// the catalog read that put the deal on screen; it is not
    /// re-validated here, and no deal state is touched.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Forbidden`] for non-customer sessions.
    /// - [`ApiError::PersistenceError`] if the row cannot be written; the
    ///   caller must request a fresh code, which creates an unrelated row.
    pub async fn request_code(
        &self,
        session: &SessionContext,
        deal_id: Uuid,
        business_id: Uuid,
    ) -> Result<CodeTicket, ApiError> {
        session.require_customer()?;

        let code = RedemptionCode::generate();
        let expires_at = Utc::now() + self.ttl;

        let redemption = self
            .store
            .insert_redemption(NewRedemption {
                deal_id,
                user_id: session.user_id,
                business_id,
                redemption_code: code,
                expires_at,
            })
            .await?;

        tracing::info!(
            redemption_id = %redemption.id,
            %deal_id,
            "redemption code issued"
        );

        Ok(CodeTicket {
            redemption_id: redemption.id,
            qr_image_url: self.qr_image_url(&redemption.redemption_code),
            code: redemption.redemption_code,
            expires_at: redemption.expires_at,
        })
    }

    /// Verifies a scanned code for the business owned by the session.
    ///
    /// Decision order, first match wins: unknown code, already redeemed,
    /// expired (persisting the `pending → expired` transition as a side
    /// effect of detection), valid. A valid verify has no side effect,
    /// so repeated scans of a live code return the same details.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Forbidden`] for non-business sessions.
    /// - [`ApiError::BusinessNotFound`] if the session owner has no
    ///   business profile.
    /// - [`ApiError::InvalidRequest`] for an empty code.
    /// - [`ApiError::CodeNotFound`] if no row matches the code for this
    ///   business (codes from other businesses never verify, even if
    ///   guessed).
    /// - [`ApiError::AlreadyRedeemed`] for consumed codes; expiry is not
    ///   re-examined.
    /// - [`ApiError::CodeExpired`] once the validity window has elapsed,
    ///   on this and every subsequent call.
    pub async fn verify_code(
        &self,
        session: &SessionContext,
        code: &RedemptionCode,
    ) -> Result<RedemptionLookup, ApiError> {
        session.require_business()?;
        let business = self
            .store
            .find_business_by_owner(session.user_id)
            .await?
            .ok_or(ApiError::BusinessNotFound)?;

        if code.is_empty() {
            return Err(ApiError::InvalidRequest("empty redemption code".to_string()));
        }

        let lookup = self
            .store
            .find_redemption_by_code(code, business.id)
            .await?
            .ok_or(ApiError::CodeNotFound)?;

        if lookup.status == RedemptionStatus::Redeemed {
            return Err(ApiError::AlreadyRedeemed);
        }

        if lookup.status == RedemptionStatus::Expired || lookup.expires_at < Utc::now() {
            self.store.expire_redemption(lookup.id).await?;
            tracing::debug!(redemption_id = %lookup.id, "redemption code expired on scan");
            return Err(ApiError::CodeExpired);
        }

        Ok(lookup)
    }

    /// Consumes a previously verified code: marks it `redeemed` and
    /// increments the deal's redemption counter, atomically and subject
    /// to the deal's cap. Expiry is not re-checked here: a code
    /// verified just inside its window can still be confirmed.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Forbidden`] for non-business sessions.
    /// - [`ApiError::BusinessNotFound`] if the session owner has no
    ///   business profile.
    /// - [`ApiError::RedemptionNotFound`], [`ApiError::AlreadyRedeemed`],
    ///   [`ApiError::CodeExpired`], or [`ApiError::DealFullyRedeemed`]
    ///   from the store's guarded transition.
    pub async fn finalize(
        &self,
        session: &SessionContext,
        redemption_id: Uuid,
    ) -> Result<(), ApiError> {
        session.require_business()?;
        let business = self
            .store
            .find_business_by_owner(session.user_id)
            .await?
            .ok_or(ApiError::BusinessNotFound)?;

        self.store
            .finalize_redemption(redemption_id, business.id, Utc::now())
            .await?;

        tracing::info!(%redemption_id, business_id = %business.id, "redemption finalized");
        Ok(())
    }

    /// The session customer's redemption history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for non-customer sessions, or
    /// [`ApiError::PersistenceError`] on backend failure.
    pub async fn history(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<RedemptionHistoryEntry>, ApiError> {
        session.require_customer()?;
        self.store.list_redemptions_for_user(session.user_id).await
    }

    fn qr_image_url(&self, code: &RedemptionCode) -> String {
        // The code charset is alphanumeric plus dashes, so it needs no
        // percent-encoding.
        let size = self.qr_image_size;
        format!(
            "{}?size={size}x{size}&data={code}",
            self.qr_image_endpoint
        )
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::UserType;
    use crate::persistence::memory::MemoryStore;
    use crate::persistence::models::{Deal, NewBusiness, NewDeal, Profile};

    const TTL_SECS: u64 = 60;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: RedemptionService,
        customer: SessionContext,
        merchant: SessionContext,
        business_id: Uuid,
    }

    async fn seed_profile(store: &MemoryStore, user_type: UserType, name: &str) -> SessionContext {
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", name.to_lowercase()),
            name: name.to_string(),
            user_type,
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

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_profile(&store, UserType::Customer, "Ada").await;
        let merchant = seed_profile(&store, UserType::Business, "Grace").await;

        let Ok(business) = store
            .insert_business(NewBusiness {
                owner_id: merchant.user_id,
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

        let service = RedemptionService::new(
            Arc::clone(&store) as Arc<dyn MarketStore>,
            TTL_SECS,
            "https://qr.example/render".to_string(),
            300,
        );

        Fixture {
            store,
            service,
            customer,
            merchant,
            business_id: business.id,
        }
    }

    async fn seed_deal(fx: &Fixture, max_redemptions: Option<i32>) -> Deal {
        let Ok(deal) = fx
            .store
            .insert_deal(NewDeal {
                business_id: fx.business_id,
                title: "Two for One".to_string(),
                description: "Any drink".to_string(),
                discount_value: "2-FOR-1".to_string(),
                terms: None,
                expiry_date: Utc::now() + Duration::days(7),
                max_redemptions,
            })
            .await
        else {
            panic!("deal insert failed");
        };
        deal
    }

    async fn deal_counter(fx: &Fixture, deal_id: Uuid) -> i32 {
        let Ok(deals) = fx.store.list_deals_for_business(fx.business_id).await else {
            panic!("deal listing failed");
        };
        let Some(deal) = deals.into_iter().find(|d| d.id == deal_id) else {
            panic!("deal not found");
        };
        deal.current_redemptions
    }

    #[tokio::test]
    async fn requested_code_is_pending_with_future_expiry() {
        let fx = fixture().await;
        let deal = seed_deal(&fx, None).await;

        let Ok(ticket) = fx
            .service
            .request_code(&fx.customer, deal.id, fx.business_id)
            .await
        else {
            panic!("request_code failed");
        };

        let Ok(Some(lookup)) = fx
            .store
            .find_redemption_by_code(&ticket.code, fx.business_id)
            .await
        else {
            panic!("lookup failed");
        };
        assert_eq!(lookup.status, RedemptionStatus::Pending);
        assert!(ticket.expires_at > Utc::now());
        assert!(ticket.qr_image_url.contains(ticket.code.as_str()));
    }

    #[tokio::test]
    async fn request_code_rejects_business_sessions() {
        let fx = fixture().await;
        let deal = seed_deal(&fx, None).await;

        let result = fx
            .service
            .request_code(&fx.merchant, deal.id, fx.business_id)
            .await;
        assert!(matches!(result, Err(ApiError::Forbidden)));
    }

    #[tokio::test]
    async fn verify_returns_details_and_has_no_side_effect_on_valid_codes() {
        let fx = fixture().await;
        let deal = seed_deal(&fx, None).await;
        let Ok(ticket) = fx
            .service
            .request_code(&fx.customer, deal.id, fx.business_id)
            .await
        else {
            panic!("request_code failed");
        };

        // Two scans of the same live code return the same details.
        for _ in 0..2 {
            let Ok(details) = fx.service.verify_code(&fx.merchant, &ticket.code).await else {
                panic!("verify failed");
            };
            assert_eq!(details.id, ticket.redemption_id);
            assert_eq!(details.deal_title, "Two for One");
            assert_eq!(details.customer_name, "Ada");
            assert_eq!(details.status, RedemptionStatus::Pending);
        }
    }

    #[tokio::test]
    async fn verify_rejects_unknown_codes() {
        let fx = fixture().await;
        seed_deal(&fx, None).await;

        let result = fx
            .service
            .verify_code(&fx.merchant, &RedemptionCode::generate())
            .await;
        assert!(matches!(result, Err(ApiError::CodeNotFound)));
    }

    #[tokio::test]
    async fn codes_from_another_business_do_not_verify() {
        let fx = fixture().await;
        let deal = seed_deal(&fx, None).await;
        let Ok(ticket) = fx
            .service
            .request_code(&fx.customer, deal.id, fx.business_id)
            .await
        else {
            panic!("request_code failed");
        };

        // A second merchant with their own business scans the code.
        let other_merchant = seed_profile(&fx.store, UserType::Business, "Mallory").await;
        let Ok(_) = fx
            .store
            .insert_business(NewBusiness {
                owner_id: other_merchant.user_id,
                name: "Rival Bar".to_string(),
                description: None,
                address: "2 Main St".to_string(),
                latitude: None,
                longitude: None,
                category: "Bar".to_string(),
                logo_url: None,
            })
            .await
        else {
            panic!("business insert failed");
        };

        let result = fx.service.verify_code(&other_merchant, &ticket.code).await;
        assert!(matches!(result, Err(ApiError::CodeNotFound)));
    }

    #[tokio::test]
    async fn overdue_pending_code_expires_once_and_stays_expired() {
        let fx = fixture().await;
        let deal = seed_deal(&fx, None).await;

        // Backdate the validity window instead of waiting it out.
        let code = RedemptionCode::generate();
        let Ok(_) = fx
            .store
            .insert_redemption(NewRedemption {
                deal_id: deal.id,
                user_id: fx.customer.user_id,
                business_id: fx.business_id,
                redemption_code: code.clone(),
                expires_at: Utc::now() - Duration::seconds(1),
            })
            .await
        else {
            panic!("redemption insert failed");
        };

        let first = fx.service.verify_code(&fx.merchant, &code).await;
        assert!(matches!(first, Err(ApiError::CodeExpired)));

        let Ok(Some(lookup)) = fx.store.find_redemption_by_code(&code, fx.business_id).await
        else {
            panic!("lookup failed");
        };
        assert_eq!(lookup.status, RedemptionStatus::Expired);

        let second = fx.service.verify_code(&fx.merchant, &code).await;
        assert!(matches!(second, Err(ApiError::CodeExpired)));
    }

    #[tokio::test]
    async fn redeemed_code_reports_already_redeemed_even_past_expiry() {
        let fx = fixture().await;
        let deal = seed_deal(&fx, None).await;

        // A pending row whose window has already passed. Finalize does
        // not re-check expiry, so consuming it still succeeds.
        let code = RedemptionCode::generate();
        let Ok(redemption) = fx
            .store
            .insert_redemption(NewRedemption {
                deal_id: deal.id,
                user_id: fx.customer.user_id,
                business_id: fx.business_id,
                redemption_code: code.clone(),
                expires_at: Utc::now() - Duration::seconds(1),
            })
            .await
        else {
            panic!("redemption insert failed");
        };
        let Ok(()) = fx.service.finalize(&fx.merchant, redemption.id).await else {
            panic!("finalize failed");
        };

        // Already-redeemed wins over expiry in the decision order, so
        // the answer stays the same no matter how stale the code is.
        let result = fx.service.verify_code(&fx.merchant, &code).await;
        assert!(matches!(result, Err(ApiError::AlreadyRedeemed)));
    }

    #[tokio::test]
    async fn finalize_marks_redeemed_and_increments_counter() {
        let fx = fixture().await;
        let deal = seed_deal(&fx, Some(5)).await;
        let Ok(ticket) = fx
            .service
            .request_code(&fx.customer, deal.id, fx.business_id)
            .await
        else {
            panic!("request_code failed");
        };

        let Ok(()) = fx.service.finalize(&fx.merchant, ticket.redemption_id).await else {
            panic!("finalize failed");
        };

        assert_eq!(deal_counter(&fx, deal.id).await, 1);
        let Ok(Some(lookup)) = fx
            .store
            .find_redemption_by_code(&ticket.code, fx.business_id)
            .await
        else {
            panic!("lookup failed");
        };
        assert_eq!(lookup.status, RedemptionStatus::Redeemed);
    }

    #[tokio::test]
    async fn second_finalize_does_not_double_increment() {
        let fx = fixture().await;
        let deal = seed_deal(&fx, None).await;
        let Ok(ticket) = fx
            .service
            .request_code(&fx.customer, deal.id, fx.business_id)
            .await
        else {
            panic!("request_code failed");
        };

        let Ok(()) = fx.service.finalize(&fx.merchant, ticket.redemption_id).await else {
            panic!("finalize failed");
        };
        let second = fx.service.finalize(&fx.merchant, ticket.redemption_id).await;

        assert!(matches!(second, Err(ApiError::AlreadyRedeemed)));
        assert_eq!(deal_counter(&fx, deal.id).await, 1);
    }

    #[tokio::test]
    async fn cap_binds_at_finalize_but_not_at_verify() {
        let fx = fixture().await;
        let deal = seed_deal(&fx, Some(1)).await;

        // First customer redeems the only slot.
        let Ok(first) = fx
            .service
            .request_code(&fx.customer, deal.id, fx.business_id)
            .await
        else {
            panic!("request_code failed");
        };
        let Ok(_) = fx.service.verify_code(&fx.merchant, &first.code).await else {
            panic!("verify failed");
        };
        let Ok(()) = fx.service.finalize(&fx.merchant, first.redemption_id).await else {
            panic!("finalize failed");
        };

        // A second customer can still request and verify; the cap is
        // not consulted at verify time.
        let other = seed_profile(&fx.store, UserType::Customer, "Bob").await;
        let Ok(second) = fx
            .service
            .request_code(&other, deal.id, fx.business_id)
            .await
        else {
            panic!("request_code failed");
        };
        let Ok(details) = fx.service.verify_code(&fx.merchant, &second.code).await else {
            panic!("verify past cap failed");
        };
        assert_eq!(details.customer_name, "Bob");

        // Finalize is where the cap binds; the redemption stays pending.
        let result = fx.service.finalize(&fx.merchant, second.redemption_id).await;
        assert!(matches!(result, Err(ApiError::DealFullyRedeemed)));
        assert_eq!(deal_counter(&fx, deal.id).await, 1);

        let Ok(Some(lookup)) = fx
            .store
            .find_redemption_by_code(&second.code, fx.business_id)
            .await
        else {
            panic!("lookup failed");
        };
        assert_eq!(lookup.status, RedemptionStatus::Pending);
    }

    #[tokio::test]
    async fn history_lists_own_redemptions_newest_first() {
        let fx = fixture().await;
        let deal = seed_deal(&fx, None).await;

        for _ in 0..2 {
            let Ok(_) = fx
                .service
                .request_code(&fx.customer, deal.id, fx.business_id)
                .await
            else {
                panic!("request_code failed");
            };
        }
        let other = seed_profile(&fx.store, UserType::Customer, "Bob").await;
        let Ok(_) = fx
            .service
            .request_code(&other, deal.id, fx.business_id)
            .await
        else {
            panic!("request_code failed");
        };

        let Ok(entries) = fx.service.history(&fx.customer).await else {
            panic!("history failed");
        };
        assert_eq!(entries.len(), 2);
        for pair in entries.windows(2) {
            let Some(older) = pair.get(1) else {
                panic!("missing pair element");
            };
            let Some(newer) = pair.first() else {
                panic!("missing pair element");
            };
            assert!(newer.created_at >= older.created_at);
        }
    }
}
