use rusqlite::Connection;
use tracing::info;

use crate::Result;

/// Creates the schema on first open. Foreign-key columns carry no
/// REFERENCES clause: they are soft links and are never enforced.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                phone           TEXT NOT NULL UNIQUE,
                username        TEXT,
                coin_balance    INTEGER NOT NULL DEFAULT 0,
                is_vip          INTEGER NOT NULL DEFAULT 0,
                avatar          TEXT,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE hosts (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id         INTEGER,
                name            TEXT NOT NULL,
                bio             TEXT,
                rating          TEXT NOT NULL DEFAULT '0.00',
                coin_rate       INTEGER NOT NULL DEFAULT 50,
                is_online       INTEGER NOT NULL DEFAULT 0,
                is_verified     INTEGER NOT NULL DEFAULT 0,
                total_earnings  INTEGER NOT NULL DEFAULT 0,
                avatar          TEXT,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE gifts (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                emoji           TEXT NOT NULL,
                coin_cost       INTEGER NOT NULL,
                animation       TEXT
            );

            CREATE TABLE transactions (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id         INTEGER NOT NULL,
                type            TEXT NOT NULL,
                amount          INTEGER NOT NULL,
                coin_amount     INTEGER NOT NULL,
                description     TEXT,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_transactions_user
                ON transactions(user_id, created_at);

            CREATE TABLE calls (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id         INTEGER,
                host_id         INTEGER,
                duration        INTEGER,
                coin_cost       INTEGER,
                status          TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_calls_user ON calls(user_id, created_at);
            CREATE INDEX idx_calls_host ON calls(host_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
