//! Per-user favorites: a set of deal IDs with a toggle operation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::SessionContext;
use crate::error::ApiError;
use crate::persistence::MarketStore;
use crate::persistence::models::DealWithBusiness;

/// Manages the per-user favorite set.
#[derive(Debug, Clone)]
pub struct FavoriteService {
    store: Arc<dyn MarketStore>,
}

impl FavoriteService {
    /// Creates a new favorites service.
    #[must_use]
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Flips membership of `deal_id` in the session user's favorite
    /// set and returns the new membership. Delete-first keeps the
    /// operation a pure set flip: toggling twice restores the original
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for non-customer sessions, or
    /// [`ApiError::PersistenceError`] on backend failure.
    pub async fn toggle(
        &self,
        session: &SessionContext,
        deal_id: Uuid,
    ) -> Result<bool, ApiError> {
        session.require_customer()?;

        if self.store.delete_favorite(session.user_id, deal_id).await? {
            return Ok(false);
        }
        self.store.insert_favorite(session.user_id, deal_id).await?;
        Ok(true)
    }

    /// The session user's favorited deal IDs.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for non-customer sessions, or
    /// [`ApiError::PersistenceError`] on backend failure.
    pub async fn favorite_ids(
        &self,
        session: &SessionContext,
    ) -> Result<HashSet<Uuid>, ApiError> {
        session.require_customer()?;
        let ids = self.store.list_favorite_ids(session.user_id).await?;
        Ok(ids.into_iter().collect())
    }

    /// The session user's favorited deals that are still displayable
    /// (active and non-expired), newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for non-customer sessions, or
    /// [`ApiError::PersistenceError`] on backend failure.
    pub async fn favorite_deals(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<DealWithBusiness>, ApiError> {
        session.require_customer()?;
        self.store
            .list_favorite_deals(session.user_id, Utc::now())
            .await
    }
}
