//! Per-request session context.
//!
//! Identity is owned by an external provider; every operation in this
//! service receives the authenticated caller as an explicit
//! [`SessionContext`] value rather than reading ambient global state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Account type fixed at sign-up; selects which operations a session
/// may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Browses, favorites, and redeems deals.
    Customer,
    /// Publishes deals and operates the scanner.
    Business,
}

impl UserType {
    /// Returns the canonical storage string for this account type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Business => "business",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "business" => Ok(Self::Business),
            other => Err(format!("unknown user type: {other}")),
        }
    }
}

/// The authenticated caller of a request.
///
/// Built by the session extractor from the profile row behind the
/// upstream identity header. Absence of a session means no operation
/// may proceed.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Profile ID of the caller.
    pub user_id: Uuid,
    /// Account type of the caller.
    pub user_type: UserType,
    /// Display name from the profile.
    pub name: String,
    /// Email from the profile.
    pub email: String,
}

impl SessionContext {
    /// Ensures the session belongs to a customer account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for business sessions.
    pub const fn require_customer(&self) -> Result<(), ApiError> {
        match self.user_type {
            UserType::Customer => Ok(()),
            UserType::Business => Err(ApiError::Forbidden),
        }
    }

    /// Ensures the session belongs to a business account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for customer sessions.
    pub const fn require_business(&self) -> Result<(), ApiError> {
        match self.user_type {
            UserType::Business => Ok(()),
            UserType::Customer => Err(ApiError::Forbidden),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn session(user_type: UserType) -> SessionContext {
        SessionContext {
            user_id: Uuid::new_v4(),
            user_type,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn customer_guard_rejects_business_sessions() {
        assert!(session(UserType::Customer).require_customer().is_ok());
        assert!(session(UserType::Business).require_customer().is_err());
    }

    #[test]
    fn business_guard_rejects_customer_sessions() {
        assert!(session(UserType::Business).require_business().is_ok());
        assert!(session(UserType::Customer).require_business().is_err());
    }

    #[test]
    fn user_type_round_trip() {
        for t in [UserType::Customer, UserType::Business] {
            let Ok(parsed) = t.as_str().parse::<UserType>() else {
                panic!("parse failed for {t}");
            };
            assert_eq!(parsed, t);
        }
    }
}
