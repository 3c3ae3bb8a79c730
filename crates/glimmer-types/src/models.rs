use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Users --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub phone: String,
    pub username: Option<String>,
    pub coin_balance: i64,
    pub is_vip: bool,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when inserting a user. Unset balance and VIP flag
/// default to 0 and false.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub phone: String,
    pub username: Option<String>,
    pub coin_balance: Option<i64>,
    pub is_vip: Option<bool>,
    pub avatar: Option<String>,
}

// -- Hosts --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub id: i64,
    /// Soft link to the owning user account; never validated.
    pub user_id: Option<i64>,
    pub name: String,
    pub bio: Option<String>,
    /// Two-decimal rating kept as text, e.g. "4.80".
    pub rating: String,
    /// Coins charged per minute of call time.
    pub coin_rate: i64,
    pub is_online: bool,
    pub is_verified: bool,
    pub total_earnings: i64,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHost {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    pub bio: Option<String>,
    pub rating: Option<String>,
    pub coin_rate: Option<i64>,
    pub is_online: Option<bool>,
    pub is_verified: Option<bool>,
    pub total_earnings: Option<i64>,
    pub avatar: Option<String>,
}

impl NewHost {
    pub const DEFAULT_RATING: &'static str = "0.00";
    pub const DEFAULT_COIN_RATE: i64 = 50;
}

// -- Gifts --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    pub coin_cost: i64,
    /// Client-side effect tag ("float", "sparkle", ...).
    pub animation: Option<String>,
}

// -- Transactions --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Purchase,
    Call,
    Gift,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Purchase => "purchase",
            TransactionKind::Call => "call",
            TransactionKind::Gift => "gift",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Active,
    Ended,
    Declined,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Active => "active",
            CallStatus::Ended => "ended",
            CallStatus::Declined => "declined",
        }
    }
}

/// Returned when a stored or submitted enum tag is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for TransactionKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase" => Ok(TransactionKind::Purchase),
            "call" => Ok(TransactionKind::Call),
            "gift" => Ok(TransactionKind::Gift),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl FromStr for CallStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CallStatus::Active),
            "ended" => Ok(CallStatus::Ended),
            "declined" => Ok(CallStatus::Declined),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Currency units.
    pub amount: i64,
    /// Signed: positive credits, negative debits.
    pub coin_amount: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i64,
    pub kind: TransactionKind,
    pub amount: i64,
    pub coin_amount: i64,
    pub description: Option<String>,
}

// -- Calls --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub id: i64,
    pub user_id: Option<i64>,
    pub host_id: Option<i64>,
    /// Seconds.
    pub duration: Option<i64>,
    pub coin_cost: Option<i64>,
    pub status: CallStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCall {
    pub user_id: Option<i64>,
    pub host_id: Option<i64>,
    pub duration: Option<i64>,
    pub coin_cost: Option<i64>,
    pub status: CallStatus,
}
