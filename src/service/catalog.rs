//! Catalog reader: active, non-expired deals with in-process filtering.

use std::sync::Arc;

use chrono::Utc;

use crate::error::ApiError;
use crate::persistence::MarketStore;
use crate::persistence::models::DealWithBusiness;

/// Optional filters applied over the fetched catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Case-insensitive substring match over title, description, and
    /// business name.
    pub search: Option<String>,
    /// Exact business-category match.
    pub category: Option<String>,
}

/// Read-only catalog over displayable deals.
#[derive(Debug, Clone)]
pub struct CatalogService {
    store: Arc<dyn MarketStore>,
}

impl CatalogService {
    /// Creates a new catalog service.
    #[must_use]
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Lists displayable deals (`is_active` and not yet expired),
    /// newest first, with the filters applied in-process over the
    /// fetched set.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PersistenceError`] on backend failure.
    pub async fn list_deals(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<DealWithBusiness>, ApiError> {
        let deals = self.store.list_active_deals(Utc::now()).await?;
        Ok(deals.into_iter().filter(|d| matches(d, filter)).collect())
    }
}

fn matches(entry: &DealWithBusiness, filter: &CatalogFilter) -> bool {
    let matches_search = match filter.search.as_deref() {
        None | Some("") => true,
        Some(query) => {
            let query = query.to_lowercase();
            entry.deal.title.to_lowercase().contains(&query)
                || entry.deal.description.to_lowercase().contains(&query)
                || entry.business_name.to_lowercase().contains(&query)
        }
    };

    let matches_category = match filter.category.as_deref() {
        None | Some("") => true,
        Some(category) => entry.business_category == category,
    };

    matches_search && matches_category
}
