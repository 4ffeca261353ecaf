//! Data Transfer Objects for REST request/response serialization.

pub mod analytics_dto;
pub mod business_dto;
pub mod deal_dto;
pub mod redemption_dto;

pub use analytics_dto::*;
pub use business_dto::*;
pub use deal_dto::*;
pub use redemption_dto::*;
