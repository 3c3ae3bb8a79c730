use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use glimmer_types::models::{
    Call, Gift, Host, NewCall, NewHost, NewTransaction, NewUser, Transaction, TransactionKind,
    User,
};
use tracing::info;

use crate::{Repository, Result, StoreError, coin_transaction, fixtures, newest_first};

/// One collection: rows keyed by id plus the id counter.
///
/// Ids are drawn while the write lock is held, so map order is insertion
/// order and read-modify-write updates never interleave.
struct Table<T> {
    rows: RwLock<BTreeMap<i64, T>>,
    next_id: AtomicI64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    fn with_rows(rows: Vec<(i64, T)>) -> Self {
        let next_id = rows.iter().map(|(id, _)| *id).max().unwrap_or(0) + 1;
        Self {
            rows: RwLock::new(rows.into_iter().collect()),
            next_id: AtomicI64::new(next_id),
        }
    }

    fn get(&self, id: i64) -> Result<Option<T>> {
        Ok(self.rows.read()?.get(&id).cloned())
    }

    fn find(&self, pred: impl Fn(&T) -> bool) -> Result<Option<T>> {
        Ok(self.rows.read()?.values().find(|r| pred(*r)).cloned())
    }

    fn filter(&self, pred: impl Fn(&T) -> bool) -> Result<Vec<T>> {
        Ok(self.rows.read()?.values().filter(|r| pred(*r)).cloned().collect())
    }

    /// Inserts the row built from a fresh id. `check` runs first under the
    /// same write lock and can veto the insert.
    fn insert_checked(
        &self,
        check: impl FnOnce(&BTreeMap<i64, T>) -> Result<()>,
        build: impl FnOnce(i64) -> T,
    ) -> Result<T> {
        let mut rows = self.rows.write()?;
        check(&*rows)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = build(id);
        rows.insert(id, row.clone());
        Ok(row)
    }

    fn insert(&self, build: impl FnOnce(i64) -> T) -> Result<T> {
        self.insert_checked(|_| Ok(()), build)
    }

    fn update(&self, id: i64, apply: impl FnOnce(&mut T)) -> Result<Option<T>> {
        self.try_update(id, |row| {
            apply(row);
            Ok(())
        })
    }

    /// Like `update`, but `apply` may refuse. It must only write to the row
    /// once it can no longer fail.
    fn try_update(&self, id: i64, apply: impl FnOnce(&mut T) -> Result<()>) -> Result<Option<T>> {
        let mut rows = self.rows.write()?;
        match rows.get_mut(&id) {
            Some(row) => {
                apply(row)?;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }
}

fn checked_balance(user: &User, delta: i64) -> Result<i64> {
    user.coin_balance
        .checked_add(delta)
        .ok_or(StoreError::BalanceOverflow(user.id))
}

fn stamp_transaction(id: i64, tx: NewTransaction) -> Transaction {
    Transaction {
        id,
        user_id: tx.user_id,
        kind: tx.kind,
        amount: tx.amount,
        coin_amount: tx.coin_amount,
        description: tx.description,
        created_at: Utc::now(),
    }
}

/// Process-lifetime store backed by ordered maps. Every instance is
/// independent, so tests can build a fresh one each.
pub struct MemoryStore {
    users: Table<User>,
    hosts: Table<Host>,
    gifts: Table<Gift>,
    transactions: Table<Transaction>,
    calls: Table<Call>,
}

impl MemoryStore {
    /// A store seeded with the gift catalog and starter hosts.
    pub fn new() -> Self {
        let gifts = fixtures::gifts();
        let hosts = fixtures::hosts(Utc::now());
        info!("Seeded {} gifts and {} hosts", gifts.len(), hosts.len());

        Self {
            users: Table::new(),
            hosts: Table::with_rows(hosts.into_iter().map(|h| (h.id, h)).collect()),
            gifts: Table::with_rows(gifts.into_iter().map(|g| (g.id, g)).collect()),
            transactions: Table::new(),
            calls: Table::new(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MemoryStore {
    // -- Users --

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.users.get(id)
    }

    fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        self.users.find(|u| u.phone == phone)
    }

    fn create_user(&self, user: NewUser) -> Result<User> {
        self.users.insert_checked(
            |rows| {
                if rows.values().any(|u| u.phone == user.phone) {
                    return Err(StoreError::DuplicatePhone(user.phone.clone()));
                }
                Ok(())
            },
            |id| User {
                id,
                phone: user.phone.clone(),
                username: user.username.clone(),
                coin_balance: user.coin_balance.unwrap_or(0),
                is_vip: user.is_vip.unwrap_or(false),
                avatar: user.avatar.clone(),
                created_at: Utc::now(),
            },
        )
    }

    fn update_user_coins(&self, id: i64, delta: i64) -> Result<Option<User>> {
        self.users.try_update(id, |u| {
            u.coin_balance = checked_balance(u, delta)?;
            Ok(())
        })
    }

    fn adjust_coins(&self, id: i64, delta: i64, kind: TransactionKind) -> Result<Option<User>> {
        // The users write lock is held across the log insert, so the balance
        // and its transaction land together.
        self.users.try_update(id, |u| {
            let balance = checked_balance(u, delta)?;
            self.transactions
                .insert(|tx_id| stamp_transaction(tx_id, coin_transaction(id, kind, delta)))?;
            u.coin_balance = balance;
            Ok(())
        })
    }

    // -- Hosts --

    fn get_host(&self, id: i64) -> Result<Option<Host>> {
        self.hosts.get(id)
    }

    fn get_hosts(&self, online: Option<bool>) -> Result<Vec<Host>> {
        self.hosts
            .filter(|h| online.is_none_or(|flag| h.is_online == flag))
    }

    fn create_host(&self, host: NewHost) -> Result<Host> {
        self.hosts.insert(|id| Host {
            id,
            user_id: host.user_id,
            name: host.name,
            bio: host.bio,
            rating: host
                .rating
                .unwrap_or_else(|| NewHost::DEFAULT_RATING.to_string()),
            coin_rate: host.coin_rate.unwrap_or(NewHost::DEFAULT_COIN_RATE),
            is_online: host.is_online.unwrap_or(false),
            is_verified: host.is_verified.unwrap_or(false),
            total_earnings: host.total_earnings.unwrap_or(0),
            avatar: host.avatar,
            created_at: Utc::now(),
        })
    }

    fn update_host_status(&self, id: i64, is_online: bool) -> Result<Option<Host>> {
        self.hosts.update(id, |h| h.is_online = is_online)
    }

    // -- Gifts --

    fn get_gifts(&self) -> Result<Vec<Gift>> {
        self.gifts.filter(|_| true)
    }

    fn get_gift(&self, id: i64) -> Result<Option<Gift>> {
        self.gifts.get(id)
    }

    // -- Transactions --

    fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction> {
        self.transactions.insert(|id| stamp_transaction(id, tx))
    }

    fn get_user_transactions(&self, user_id: i64) -> Result<Vec<Transaction>> {
        let mut rows = self.transactions.filter(|t| t.user_id == user_id)?;
        newest_first(&mut rows, |t| (t.created_at, t.id));
        Ok(rows)
    }

    // -- Calls --

    fn create_call(&self, call: NewCall) -> Result<Call> {
        self.calls.insert(|id| Call {
            id,
            user_id: call.user_id,
            host_id: call.host_id,
            duration: call.duration,
            coin_cost: call.coin_cost,
            status: call.status,
            created_at: Utc::now(),
        })
    }

    fn get_user_calls(&self, user_id: i64) -> Result<Vec<Call>> {
        let mut rows = self.calls.filter(|c| c.user_id == Some(user_id))?;
        newest_first(&mut rows, |c| (c.created_at, c.id));
        Ok(rows)
    }

    fn get_host_calls(&self, host_id: i64) -> Result<Vec<Call>> {
        let mut rows = self.calls.filter(|c| c.host_id == Some(host_id))?;
        newest_first(&mut rows, |c| (c.created_at, c.id));
        Ok(rows)
    }
}
