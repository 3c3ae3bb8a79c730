pub mod error;
pub mod fixtures;
pub mod memory;
pub mod migrations;
pub mod sqlite;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use glimmer_types::models::{
    Call, Gift, Host, NewCall, NewHost, NewTransaction, NewUser, Transaction, TransactionKind,
    User,
};
use tracing::info;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage operations behind the HTTP layer. Lookups that miss return
/// `Ok(None)`; `Err` is reserved for store failures and write-time
/// uniqueness violations.
///
/// `user_id`/`host_id` fields on transactions, calls and hosts are soft
/// references: nothing checks that the referenced record exists.
pub trait Repository: Send + Sync {
    // -- Users --

    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>>;
    fn create_user(&self, user: NewUser) -> Result<User>;
    /// Adds `delta` to the balance without any floor; balances may go
    /// negative. A sum outside `i64` fails with `BalanceOverflow` and leaves
    /// the row untouched.
    fn update_user_coins(&self, id: i64, delta: i64) -> Result<Option<User>>;
    /// Applies `delta` and appends the matching transaction (see
    /// [`coin_transaction`]) as one unit: either both are stored or
    /// neither is.
    fn adjust_coins(&self, id: i64, delta: i64, kind: TransactionKind) -> Result<Option<User>>;

    // -- Hosts --

    fn get_host(&self, id: i64) -> Result<Option<Host>>;
    /// `None` returns every host, `Some(flag)` only those whose
    /// `is_online` matches.
    fn get_hosts(&self, online: Option<bool>) -> Result<Vec<Host>>;
    fn create_host(&self, host: NewHost) -> Result<Host>;
    fn update_host_status(&self, id: i64, is_online: bool) -> Result<Option<Host>>;

    // -- Gifts --

    fn get_gifts(&self) -> Result<Vec<Gift>>;
    fn get_gift(&self, id: i64) -> Result<Option<Gift>>;

    // -- Transactions --

    fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction>;
    /// Newest first.
    fn get_user_transactions(&self, user_id: i64) -> Result<Vec<Transaction>>;

    // -- Calls --

    fn create_call(&self, call: NewCall) -> Result<Call>;
    /// Newest first.
    fn get_user_calls(&self, user_id: i64) -> Result<Vec<Call>>;
    /// Newest first.
    fn get_host_calls(&self, host_id: i64) -> Result<Vec<Call>>;
}

/// Picks a store from a database URL.
///
/// Unset, empty, `memory` or `:memory:` selects the in-memory store.
/// `file:<path>` and `sqlite://<path>` open an SQLite file.
pub fn open(url: Option<&str>) -> Result<Arc<dyn Repository>> {
    match url.map(str::trim).filter(|u| !u.is_empty()) {
        None | Some("memory") | Some(":memory:") => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        Some(url) => {
            let path = url
                .strip_prefix("file:")
                .or_else(|| url.strip_prefix("sqlite://"))
                .ok_or_else(|| StoreError::UnsupportedUrl(url.to_string()))?;
            Ok(Arc::new(SqliteStore::open(Path::new(path))?))
        }
    }
}

/// Sorts by creation time descending; equal timestamps fall back to id
/// descending so later inserts still come first.
pub(crate) fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

/// `"User" + last four characters of the phone`, the username given to
/// accounts created at login.
pub fn default_username(phone: &str) -> String {
    let tail = phone
        .char_indices()
        .rev()
        .nth(3)
        .map_or(phone, |(i, _)| &phone[i..]);
    format!("User{}", tail)
}

/// Currency units per coin.
const COIN_PRICE: i64 = 1;

/// The log entry for a coin adjustment. Only credits carry a currency
/// amount; debits record 0.
pub fn coin_transaction(user_id: i64, kind: TransactionKind, coin_amount: i64) -> NewTransaction {
    let (amount, description) = if coin_amount > 0 {
        (coin_amount.abs() * COIN_PRICE, "Coin purchase")
    } else {
        (0, "Coin deduction")
    };

    NewTransaction {
        user_id,
        kind,
        amount,
        coin_amount,
        description: Some(description.to_string()),
    }
}
