use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a user with phone {0} already exists")]
    DuplicatePhone(String),

    #[error("coin balance of user {0} would overflow")]
    BalanceOverflow(i64),

    #[error("unsupported database url: {0}")]
    UnsupportedUrl(String),

    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        StoreError::LockPoisoned(e.to_string())
    }
}
