//! Persistence layer: the data-access boundary of the service.
//!
//! [`MarketStore`] is the only interface the service layer talks to.
//! The production implementation is [`postgres::PostgresStore`] over
//! `sqlx::PgPool`; [`memory::MemoryStore`] backs the unit tests and
//! local development.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::RedemptionCode;
use crate::error::ApiError;
use models::{
    Business, Deal, DealCounts, DealWithBusiness, NewBusiness, NewDeal, NewRedemption, Profile,
    RecentRedemption, Redemption, RedemptionHistoryEntry, RedemptionLookup,
};

/// Data-access interface over the marketplace tables.
///
/// Point lookups, equality/range filters, ordering, limits, and shallow
/// joins; nothing richer. Operations that must be atomic
/// ([`MarketStore::finalize_redemption`]) are expressed as single store
/// calls so each implementation can use its own transaction mechanism.
#[async_trait]
pub trait MarketStore: std::fmt::Debug + Send + Sync {
    /// Fetches a profile by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, ApiError>;

    /// Lists active, non-expired deals joined with business metadata,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn list_active_deals(&self, now: DateTime<Utc>)
    -> Result<Vec<DealWithBusiness>, ApiError>;

    /// Lists the deal IDs a user has favorited.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn list_favorite_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, ApiError>;

    /// Adds a favorite; a duplicate add is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn insert_favorite(&self, user_id: Uuid, deal_id: Uuid) -> Result<(), ApiError>;

    /// Removes a favorite, returning whether a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn delete_favorite(&self, user_id: Uuid, deal_id: Uuid) -> Result<bool, ApiError>;

    /// Lists a user's favorited deals that are still active and
    /// non-expired.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn list_favorite_deals(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<DealWithBusiness>, ApiError>;

    /// Finds the business owned by a profile, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn find_business_by_owner(&self, owner_id: Uuid) -> Result<Option<Business>, ApiError>;

    /// Inserts a business row.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn insert_business(&self, new: NewBusiness) -> Result<Business, ApiError>;

    /// Lists every deal of a business (active or not), newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn list_deals_for_business(&self, business_id: Uuid) -> Result<Vec<Deal>, ApiError>;

    /// Inserts a deal row (`is_active = true`, counter at zero).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn insert_deal(&self, new: NewDeal) -> Result<Deal, ApiError>;

    /// Sets a deal's active flag, scoped to the owning business.
    /// Returns whether a row matched.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn set_deal_active(
        &self,
        business_id: Uuid,
        deal_id: Uuid,
        active: bool,
    ) -> Result<bool, ApiError>;

    /// Inserts a pending redemption row.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn insert_redemption(&self, new: NewRedemption) -> Result<Redemption, ApiError>;

    /// Looks up a redemption by exact code, scoped to the scanning
    /// business, joined with deal and customer details.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn find_redemption_by_code(
        &self,
        code: &RedemptionCode,
        business_id: Uuid,
    ) -> Result<Option<RedemptionLookup>, ApiError>;

    /// Transitions a redemption `pending → expired`. The update is
    /// conditional on the current status, so it happens at most once.
    /// Returns whether this call performed the transition.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn expire_redemption(&self, redemption_id: Uuid) -> Result<bool, ApiError>;

    /// Atomically marks a pending redemption `redeemed` and increments
    /// the deal's redemption counter, subject to the deal's cap. Either
    /// both writes land or neither does.
    ///
    /// # Errors
    ///
    /// - [`ApiError::RedemptionNotFound`] if no row matches the ID and
    ///   business.
    /// - [`ApiError::AlreadyRedeemed`] if the row is already `redeemed`.
    /// - [`ApiError::CodeExpired`] if the row is already `expired`.
    /// - [`ApiError::DealFullyRedeemed`] if the counter guard fails; the
    ///   redemption is left `pending`.
    /// - [`ApiError::PersistenceError`] on backend failure.
    async fn finalize_redemption(
        &self,
        redemption_id: Uuid,
        business_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError>;

    /// Lists a customer's redemptions, newest first, joined with deal
    /// and business names.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn list_redemptions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RedemptionHistoryEntry>, ApiError>;

    /// Counts a business's total and active deals.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn count_deals(&self, business_id: Uuid) -> Result<DealCounts, ApiError>;

    /// Counts a business's finalized redemptions.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn count_redeemed(&self, business_id: Uuid) -> Result<i64, ApiError>;

    /// Lists a business's most recent finalized redemptions, newest
    /// first, joined with deal and customer details.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    async fn recent_redemptions(
        &self,
        business_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RecentRedemption>, ApiError>;
}
