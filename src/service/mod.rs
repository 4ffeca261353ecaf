//! Service layer: orchestration between the REST handlers and the store.
//!
//! Each service is a thin coordinator over [`crate::persistence::MarketStore`];
//! the redemption service carries the code lifecycle, the rest are
//! filtered reads and single-row writes.

pub mod analytics;
pub mod business;
pub mod catalog;
pub mod favorites;
pub mod redemption;

pub use analytics::AnalyticsService;
pub use business::BusinessService;
pub use catalog::CatalogService;
pub use favorites::FavoriteService;
pub use redemption::RedemptionService;
