//! Redemption status state machine.
//!
//! A redemption is created `pending` and advances to exactly one of the
//! terminal states `redeemed` or `expired`. No other transition is legal
//! and terminal states never revert.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of a redemption row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    /// Code issued, not yet consumed or expired.
    Pending,
    /// Code consumed by the business (terminal, success).
    Redeemed,
    /// Validity window elapsed before consumption (terminal, failure).
    Expired,
}

impl RedemptionStatus {
    /// Returns the canonical storage string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Redeemed => "redeemed",
            Self::Expired => "expired",
        }
    }

    /// Returns `true` for states that never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Redeemed | Self::Expired)
    }

    /// Returns `true` if advancing `self → next` is a legal transition.
    ///
    /// Only `pending → redeemed` and `pending → expired` are legal.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Redeemed) | (Self::Pending, Self::Expired)
        )
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RedemptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "redeemed" => Ok(Self::Redeemed),
            "expired" => Ok(Self::Expired),
            other => Err(format!("unknown redemption status: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn pending_may_advance_to_either_terminal_state() {
        assert!(RedemptionStatus::Pending.can_transition_to(RedemptionStatus::Redeemed));
        assert!(RedemptionStatus::Pending.can_transition_to(RedemptionStatus::Expired));
    }

    #[test]
    fn terminal_states_never_revert() {
        for terminal in [RedemptionStatus::Redeemed, RedemptionStatus::Expired] {
            assert!(terminal.is_terminal());
            for next in [
                RedemptionStatus::Pending,
                RedemptionStatus::Redeemed,
                RedemptionStatus::Expired,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn storage_string_round_trip() {
        for status in [
            RedemptionStatus::Pending,
            RedemptionStatus::Redeemed,
            RedemptionStatus::Expired,
        ] {
            let Ok(parsed) = status.as_str().parse::<RedemptionStatus>() else {
                panic!("parse failed for {status}");
            };
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        assert!("refunded".parse::<RedemptionStatus>().is_err());
    }
}
