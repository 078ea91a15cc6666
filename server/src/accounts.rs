//! Account storage behind a trait so the protocol loop never cares where
//! records live. The in-memory store backs tests and single-node runs.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use proto::PlayerStats;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("the user does not exist")]
    UnknownUser,
    #[error("the password is incorrect")]
    WrongPassword,
    #[error("the user name is taken")]
    NameTaken,
}

#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub user: String,
    pub pass: String,
    pub stats: PlayerStats,
}

/// Account operations the server needs. Implementations must be cheap to
/// call from async context.
pub trait AccountStore: Send + Sync {
    fn lookup(&self, user: &str) -> Option<AccountRecord>;

    fn create(&self, user: &str, pass: &str) -> Result<(), AccountError>;

    /// Fold a finished game into both players' lifetime records. Unknown
    /// users are skipped.
    fn record_result(&self, winner: &str, loser: &str);

    fn stats(&self, user: &str) -> Result<PlayerStats, AccountError>;

    fn authenticate(&self, user: &str, pass: &str) -> Result<(), AccountError> {
        let record = self.lookup(user).ok_or(AccountError::UnknownUser)?;
        if record.pass == pass {
            Ok(())
        } else {
            Err(AccountError::WrongPassword)
        }
    }
}

#[derive(Default)]
pub struct MemoryAccounts {
    inner: RwLock<HashMap<String, AccountRecord>>,
}

impl MemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryAccounts {
    fn lookup(&self, user: &str) -> Option<AccountRecord> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(user).cloned()
    }

    fn create(&self, user: &str, pass: &str) -> Result<(), AccountError> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if map.contains_key(user) {
            return Err(AccountError::NameTaken);
        }
        map.insert(
            user.to_string(),
            AccountRecord {
                user: user.to_string(),
                pass: pass.to_string(),
                stats: PlayerStats::default(),
            },
        );
        Ok(())
    }

    fn record_result(&self, winner: &str, loser: &str) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(record) = map.get_mut(winner) {
            record.stats.played += 1;
            record.stats.won += 1;
        }
        if let Some(record) = map.get_mut(loser) {
            record.stats.played += 1;
            record.stats.lost += 1;
        }
    }

    fn stats(&self, user: &str) -> Result<PlayerStats, AccountError> {
        self.lookup(user)
            .map(|r| r.stats)
            .ok_or(AccountError::UnknownUser)
    }
}
