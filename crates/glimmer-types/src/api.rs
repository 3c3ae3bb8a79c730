use serde::{Deserialize, Serialize};

use crate::models::{TransactionKind, User};
use crate::packages::CoinPackage;

// -- Errors --

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

// -- Auth --

/// Fields are optional so a missing phone surfaces as a 400 with a message
/// rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
}

// -- Coins --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdjustCoinsRequest {
    pub amount: Option<i64>,
    pub transaction_type: Option<TransactionKind>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPackageResponse {
    #[serde(flatten)]
    pub package: CoinPackage,
    pub total_coins: i64,
}

impl From<&CoinPackage> for CoinPackageResponse {
    fn from(package: &CoinPackage) -> Self {
        Self {
            package: *package,
            total_coins: package.total_coins(),
        }
    }
}

// -- Hosts --

#[derive(Debug, Default, Deserialize)]
pub struct HostQuery {
    pub online: Option<String>,
}

impl HostQuery {
    /// `true`/`false` filter by presence; anything else (or nothing) means
    /// no filtering.
    pub fn online_filter(&self) -> Option<bool> {
        match self.online.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HostStatusRequest {
    pub is_online: Option<bool>,
}
