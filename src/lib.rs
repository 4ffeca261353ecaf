//! # dealspot
//!
//! REST API backend for a local deals and coupons marketplace.
//!
//! Businesses publish time-limited discount offers; customers browse,
//! favorite, and redeem them via a generated one-time code rendered
//! client-side as a QR image; businesses verify and finalize redemptions
//! through a manual code-entry scanner flow. Identity is owned by an
//! external provider: requests arrive already authenticated and this
//! service only resolves the profile behind them.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── Session Extraction (api/auth)
//!     │
//!     ├── RedemptionService (service/)   ← code lifecycle
//!     ├── Catalog / Favorites / Business / Analytics (service/)
//!     │
//!     ├── MarketStore (persistence/)
//!     │
//!     └── PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
