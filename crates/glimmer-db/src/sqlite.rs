use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::Utc;
use glimmer_types::models::{
    Call, Gift, Host, NewCall, NewHost, NewTransaction, NewUser, Transaction, TransactionKind,
    User,
};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Params, Row, params};
use tracing::info;

use crate::{Repository, Result, StoreError, coin_transaction, fixtures, migrations};

const USER_COLUMNS: &str = "id, phone, username, coin_balance, is_vip, avatar, created_at";
const HOST_COLUMNS: &str = "id, user_id, name, bio, rating, coin_rate, is_online, is_verified, \
                            total_earnings, avatar, created_at";
const GIFT_COLUMNS: &str = "id, name, emoji, coin_cost, animation";
const TRANSACTION_COLUMNS: &str =
    "id, user_id, type, amount, coin_amount, description, created_at";
const CALL_COLUMNS: &str = "id, user_id, host_id, duration, coin_cost, status, created_at";

/// File-backed store for deployments that want data to survive restarts.
/// A single connection behind a mutex; every operation holds the lock for
/// its full read-modify-write.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;
        seed_if_empty(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock()?;
        f(&conn)
    }
}

fn seed_if_empty(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM gifts", [], |r| r.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let gifts = fixtures::gifts();
    let hosts = fixtures::hosts(Utc::now());

    let tx = conn.unchecked_transaction()?;
    for g in &gifts {
        tx.execute(
            "INSERT INTO gifts (id, name, emoji, coin_cost, animation) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![g.id, g.name, g.emoji, g.coin_cost, g.animation],
        )?;
    }
    for h in &hosts {
        tx.execute(
            "INSERT INTO hosts (id, user_id, name, bio, rating, coin_rate, is_online, is_verified,
                                total_earnings, avatar, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                h.id,
                h.user_id,
                h.name,
                h.bio,
                h.rating,
                h.coin_rate,
                h.is_online,
                h.is_verified,
                h.total_earnings,
                h.avatar,
                h.created_at,
            ],
        )?;
    }
    tx.commit()?;

    info!("Seeded {} gifts and {} hosts", gifts.len(), hosts.len());
    Ok(())
}

impl Repository for SqliteStore {
    // -- Users --

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, id))
    }

    fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        self.with_conn(|conn| {
            query_one(
                conn,
                &format!("SELECT {USER_COLUMNS} FROM users WHERE phone = ?1"),
                [phone],
                user_from_row,
            )
        })
    }

    fn create_user(&self, user: NewUser) -> Result<User> {
        self.with_conn(|conn| {
            let taken: Option<i64> = conn
                .query_row("SELECT id FROM users WHERE phone = ?1", [&user.phone], |r| {
                    r.get(0)
                })
                .optional()?;
            if taken.is_some() {
                return Err(StoreError::DuplicatePhone(user.phone));
            }

            let coin_balance = user.coin_balance.unwrap_or(0);
            let is_vip = user.is_vip.unwrap_or(false);
            let created_at = Utc::now();
            conn.execute(
                "INSERT INTO users (phone, username, coin_balance, is_vip, avatar, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![user.phone, user.username, coin_balance, is_vip, user.avatar, created_at],
            )?;

            Ok(User {
                id: conn.last_insert_rowid(),
                phone: user.phone,
                username: user.username,
                coin_balance,
                is_vip,
                avatar: user.avatar,
                created_at,
            })
        })
    }

    fn update_user_coins(&self, id: i64, delta: i64) -> Result<Option<User>> {
        self.with_conn(|conn| {
            if !apply_coin_delta(conn, id, delta)? {
                return Ok(None);
            }
            query_user(conn, id)
        })
    }

    fn adjust_coins(&self, id: i64, delta: i64, kind: TransactionKind) -> Result<Option<User>> {
        self.with_conn(|conn| {
            // Dropping `tx` without commit rolls back both statements.
            let tx = conn.unchecked_transaction()?;
            if !apply_coin_delta(&tx, id, delta)? {
                return Ok(None);
            }
            insert_transaction(&tx, coin_transaction(id, kind, delta))?;
            let user = query_user(&tx, id)?;
            tx.commit()?;
            Ok(user)
        })
    }

    // -- Hosts --

    fn get_host(&self, id: i64) -> Result<Option<Host>> {
        self.with_conn(|conn| query_host(conn, id))
    }

    fn get_hosts(&self, online: Option<bool>) -> Result<Vec<Host>> {
        self.with_conn(|conn| match online {
            None => query_all(
                conn,
                &format!("SELECT {HOST_COLUMNS} FROM hosts ORDER BY id"),
                [],
                host_from_row,
            ),
            Some(flag) => query_all(
                conn,
                &format!("SELECT {HOST_COLUMNS} FROM hosts WHERE is_online = ?1 ORDER BY id"),
                [flag],
                host_from_row,
            ),
        })
    }

    fn create_host(&self, host: NewHost) -> Result<Host> {
        self.with_conn(|conn| {
            let rating = host
                .rating
                .unwrap_or_else(|| NewHost::DEFAULT_RATING.to_string());
            let coin_rate = host.coin_rate.unwrap_or(NewHost::DEFAULT_COIN_RATE);
            let is_online = host.is_online.unwrap_or(false);
            let is_verified = host.is_verified.unwrap_or(false);
            let total_earnings = host.total_earnings.unwrap_or(0);
            let created_at = Utc::now();

            conn.execute(
                "INSERT INTO hosts (user_id, name, bio, rating, coin_rate, is_online, is_verified,
                                    total_earnings, avatar, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    host.user_id,
                    host.name,
                    host.bio,
                    rating,
                    coin_rate,
                    is_online,
                    is_verified,
                    total_earnings,
                    host.avatar,
                    created_at,
                ],
            )?;

            Ok(Host {
                id: conn.last_insert_rowid(),
                user_id: host.user_id,
                name: host.name,
                bio: host.bio,
                rating,
                coin_rate,
                is_online,
                is_verified,
                total_earnings,
                avatar: host.avatar,
                created_at,
            })
        })
    }

    fn update_host_status(&self, id: i64, is_online: bool) -> Result<Option<Host>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE hosts SET is_online = ?1 WHERE id = ?2",
                params![is_online, id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_host(conn, id)
        })
    }

    // -- Gifts --

    fn get_gifts(&self) -> Result<Vec<Gift>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                &format!("SELECT {GIFT_COLUMNS} FROM gifts ORDER BY id"),
                [],
                gift_from_row,
            )
        })
    }

    fn get_gift(&self, id: i64) -> Result<Option<Gift>> {
        self.with_conn(|conn| {
            query_one(
                conn,
                &format!("SELECT {GIFT_COLUMNS} FROM gifts WHERE id = ?1"),
                [id],
                gift_from_row,
            )
        })
    }

    // -- Transactions --

    fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction> {
        self.with_conn(|conn| insert_transaction(conn, tx))
    }

    fn get_user_transactions(&self, user_id: i64) -> Result<Vec<Transaction>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                &format!(
                    "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id = ?1
                     ORDER BY created_at DESC, id DESC"
                ),
                [user_id],
                transaction_from_row,
            )
        })
    }

    // -- Calls --

    fn create_call(&self, call: NewCall) -> Result<Call> {
        self.with_conn(|conn| {
            let created_at = Utc::now();
            conn.execute(
                "INSERT INTO calls (user_id, host_id, duration, coin_cost, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    call.user_id,
                    call.host_id,
                    call.duration,
                    call.coin_cost,
                    call.status.as_str(),
                    created_at,
                ],
            )?;

            Ok(Call {
                id: conn.last_insert_rowid(),
                user_id: call.user_id,
                host_id: call.host_id,
                duration: call.duration,
                coin_cost: call.coin_cost,
                status: call.status,
                created_at,
            })
        })
    }

    fn get_user_calls(&self, user_id: i64) -> Result<Vec<Call>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                &format!(
                    "SELECT {CALL_COLUMNS} FROM calls WHERE user_id = ?1
                     ORDER BY created_at DESC, id DESC"
                ),
                [user_id],
                call_from_row,
            )
        })
    }

    fn get_host_calls(&self, host_id: i64) -> Result<Vec<Call>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                &format!(
                    "SELECT {CALL_COLUMNS} FROM calls WHERE host_id = ?1
                     ORDER BY created_at DESC, id DESC"
                ),
                [host_id],
                call_from_row,
            )
        })
    }
}

// -- Write helpers --

/// Reads, checks and writes the balance. SQLite would otherwise promote an
/// overflowing `coin_balance + ?` to REAL. Returns false for an unknown id.
fn apply_coin_delta(conn: &Connection, id: i64, delta: i64) -> Result<bool> {
    let balance: Option<i64> = conn
        .query_row("SELECT coin_balance FROM users WHERE id = ?1", [id], |r| r.get(0))
        .optional()?;
    let Some(balance) = balance else {
        return Ok(false);
    };

    let next = balance
        .checked_add(delta)
        .ok_or(StoreError::BalanceOverflow(id))?;
    conn.execute(
        "UPDATE users SET coin_balance = ?1 WHERE id = ?2",
        params![next, id],
    )?;
    Ok(true)
}

fn insert_transaction(conn: &Connection, tx: NewTransaction) -> Result<Transaction> {
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO transactions (user_id, type, amount, coin_amount, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            tx.user_id,
            tx.kind.as_str(),
            tx.amount,
            tx.coin_amount,
            tx.description,
            created_at,
        ],
    )?;

    Ok(Transaction {
        id: conn.last_insert_rowid(),
        user_id: tx.user_id,
        kind: tx.kind,
        amount: tx.amount,
        coin_amount: tx.coin_amount,
        description: tx.description,
        created_at,
    })
}

// -- Query helpers --

fn query_one<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Option<T>> {
    Ok(conn.query_row(sql, params, map).optional()?)
}

fn query_all<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, map)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        [id],
        user_from_row,
    )
}

fn query_host(conn: &Connection, id: i64) -> Result<Option<Host>> {
    query_one(
        conn,
        &format!("SELECT {HOST_COLUMNS} FROM hosts WHERE id = ?1"),
        [id],
        host_from_row,
    )
}

/// Reads a text column holding an enum tag.
fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        phone: row.get(1)?,
        username: row.get(2)?,
        coin_balance: row.get(3)?,
        is_vip: row.get(4)?,
        avatar: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn host_from_row(row: &Row<'_>) -> rusqlite::Result<Host> {
    Ok(Host {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        bio: row.get(3)?,
        rating: row.get(4)?,
        coin_rate: row.get(5)?,
        is_online: row.get(6)?,
        is_verified: row.get(7)?,
        total_earnings: row.get(8)?,
        avatar: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn gift_from_row(row: &Row<'_>) -> rusqlite::Result<Gift> {
    Ok(Gift {
        id: row.get(0)?,
        name: row.get(1)?,
        emoji: row.get(2)?,
        coin_cost: row.get(3)?,
        animation: row.get(4)?,
    })
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: parse_column(row, 2)?,
        amount: row.get(3)?,
        coin_amount: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn call_from_row(row: &Row<'_>) -> rusqlite::Result<Call> {
    Ok(Call {
        id: row.get(0)?,
        user_id: row.get(1)?,
        host_id: row.get(2)?,
        duration: row.get(3)?,
        coin_cost: row.get(4)?,
        status: parse_column(row, 5)?,
        created_at: row.get(6)?,
    })
}
