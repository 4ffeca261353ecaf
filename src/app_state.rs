//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::MarketStore;
use crate::service::{
    AnalyticsService, BusinessService, CatalogService, FavoriteService, RedemptionService,
};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Store handle, used directly by the session extractor.
    pub store: Arc<dyn MarketStore>,
    /// Catalog reads.
    pub catalog: Arc<CatalogService>,
    /// Favorite set operations.
    pub favorites: Arc<FavoriteService>,
    /// Redemption-code lifecycle.
    pub redemptions: Arc<RedemptionService>,
    /// Business and deal management.
    pub business: Arc<BusinessService>,
    /// Analytics aggregation.
    pub analytics: Arc<AnalyticsService>,
}
