//! Board snapshot and persistence collaborator contract.
//!
//! # Responsibility
//! - Define the full persisted image of a board.
//! - Define the load/save hooks a storage backend implements.
//!
//! # Invariants
//! - A snapshot round-trips losslessly: category order, task
//!   `created_seq`, and the next sequence value are all preserved.

use crate::db::DbError;
use crate::model::category::Category;
use crate::model::task::Task;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PersistResult<T> = Result<T, PersistError>;

/// Failure reported by a persistence backend.
#[derive(Debug)]
pub enum PersistError {
    Db(DbError),
    /// Stored data cannot be turned into a valid board.
    InvalidData(String),
    /// Backend-specific failure that is not a database error.
    Backend(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted board data: {message}"),
            Self::Backend(message) => write!(f, "persistence backend failed: {message}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::Backend(_) => None,
        }
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Full persisted image of one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Categories in insertion order.
    pub categories: Vec<Category>,
    /// Tasks; order is not significant, `created_seq` is.
    pub tasks: Vec<Task>,
    /// Sequence value the next created task receives.
    pub next_seq: u64,
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            tasks: Vec::new(),
            next_seq: 1,
        }
    }
}

/// Storage collaborator notified after every successful mutation.
///
/// `save` runs while the board write lock is held, so implementations see
/// snapshots in mutation order and never concurrently.
pub trait BoardPersistence: Send + Sync {
    /// Loads the stored board, or an empty snapshot for fresh storage.
    fn load_all(&self) -> PersistResult<BoardSnapshot>;
    /// Replaces the stored board with `snapshot`.
    fn save(&self, snapshot: &BoardSnapshot) -> PersistResult<()>;
}
