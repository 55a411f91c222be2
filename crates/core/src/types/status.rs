//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Reachability of the backend API as last observed by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApiStatus {
    /// No probe has completed yet.
    #[default]
    Checking,
    Online,
    /// Non-success response or transport failure.
    Offline,
}

impl std::fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Checking => write!(f, "checking"),
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Lifecycle of a remote order waiting for cashier approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PendingOrderStatus {
    #[default]
    Pending,
    /// Approved and sent to the kitchen.
    Accepted,
    Cancelled,
}

impl std::fmt::Display for PendingOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}
