//! Shared board state and its single writer lock.
//!
//! # Responsibility
//! - Own the task store, category store, and creation sequence together.
//! - Serialize mutations and notify the persistence collaborator.
//!
//! # Invariants
//! - Every mutation runs under one write lock from validation to save.
//! - A failed mutation (validation, store, or save) leaves the state exactly
//!   as it was before the call.
//! - Loaded snapshots must satisfy all board invariants.

use crate::model::category::MAX_CATEGORIES;
use crate::repo::snapshot::{BoardPersistence, BoardSnapshot, PersistError, PersistResult};
use crate::repo::store::{CategoryStore, StoreError, StoreResult, TaskStore};
use crate::service::error::{ServiceError, ServiceResult};
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Store pair plus sequence counter guarded by the board lock.
#[derive(Debug, Clone)]
pub(crate) struct BoardState {
    pub(crate) tasks: TaskStore,
    pub(crate) categories: CategoryStore,
    next_seq: u64,
}

impl BoardState {
    fn empty() -> Self {
        Self {
            tasks: TaskStore::new(),
            categories: CategoryStore::new(),
            next_seq: 1,
        }
    }

    /// Returns the next creation sequence value and advances the counter.
    pub(crate) fn allocate_seq(&mut self) -> StoreResult<u64> {
        let seq = self.next_seq;
        self.next_seq = seq
            .checked_add(1)
            .ok_or(StoreError::SequenceExhausted)?;
        Ok(seq)
    }

    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            categories: self.categories.list(),
            tasks: self.tasks.list(),
            next_seq: self.next_seq,
        }
    }

    fn from_snapshot(snapshot: BoardSnapshot) -> PersistResult<Self> {
        let invalid = PersistError::InvalidData;
        if snapshot.categories.len() > MAX_CATEGORIES {
            return Err(invalid(format!(
                "{} categories stored, at most {MAX_CATEGORIES} allowed",
                snapshot.categories.len()
            )));
        }

        let mut state = Self::empty();
        for category in snapshot.categories {
            if !is_trimmed_non_empty(&category.name) {
                return Err(invalid(format!(
                    "category {} has a blank or untrimmed name",
                    category.id
                )));
            }
            if state
                .categories
                .iter()
                .any(|existing| existing.matches_name(&category.name))
            {
                return Err(invalid(format!(
                    "category {} duplicates an existing name",
                    category.id
                )));
            }
            let id = category.id;
            state
                .categories
                .insert(category)
                .map_err(|_| invalid(format!("duplicate category id {id}")))?;
        }

        let mut tasks = snapshot.tasks;
        tasks.sort_by_key(|task| task.created_seq);
        let mut seen_seq = HashSet::new();
        for task in tasks {
            if !is_trimmed_non_empty(&task.title) {
                return Err(invalid(format!(
                    "task {} has a blank or untrimmed title",
                    task.id
                )));
            }
            if let Some(category_id) = task.category_id {
                if !state.categories.contains(category_id) {
                    return Err(invalid(format!(
                        "task {} references missing category {category_id}",
                        task.id
                    )));
                }
            }
            if task.created_seq >= snapshot.next_seq || !seen_seq.insert(task.created_seq) {
                return Err(invalid(format!(
                    "task {} has out-of-range or duplicate created_seq {}",
                    task.id, task.created_seq
                )));
            }
            let id = task.id;
            state
                .tasks
                .insert(task)
                .map_err(|_| invalid(format!("duplicate task id {id}")))?;
        }

        if snapshot.next_seq == 0 {
            return Err(invalid("next_seq must be at least 1".to_string()));
        }
        state.next_seq = snapshot.next_seq;
        Ok(state)
    }
}

fn is_trimmed_non_empty(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed.len() == value.len()
}

struct BoardInner {
    state: RwLock<BoardState>,
    persistence: Option<Box<dyn BoardPersistence>>,
}

/// Handle to one task board.
///
/// Cloning is cheap and yields a handle to the same board; `TaskService` and
/// `CategoryService` built from clones share one lock.
#[derive(Clone)]
pub struct Board {
    inner: Arc<BoardInner>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Creates an empty board with no persistence.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BoardInner {
                state: RwLock::new(BoardState::empty()),
                persistence: None,
            }),
        }
    }

    /// Loads a board from `persistence` and saves every later mutation to it.
    ///
    /// # Errors
    /// - Returns load failures from the backend unchanged.
    /// - Returns `PersistError::InvalidData` when the stored board breaks
    ///   any board invariant.
    pub fn with_persistence(persistence: impl BoardPersistence + 'static) -> PersistResult<Self> {
        let snapshot = persistence.load_all()?;
        let state = BoardState::from_snapshot(snapshot).map_err(|err| {
            error!("event=board_open module=service status=error error={err}");
            err
        })?;
        info!(
            "event=board_open module=service status=ok categories={} tasks={}",
            state.categories.len(),
            state.tasks.len()
        );
        Ok(Self {
            inner: Arc::new(BoardInner {
                state: RwLock::new(state),
                persistence: Some(Box::new(persistence)),
            }),
        })
    }

    /// Returns a consistent copy of the whole board.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.inner.state.read().snapshot()
    }

    pub(crate) fn read<T>(&self, f: impl FnOnce(&BoardState) -> T) -> T {
        let state = self.inner.state.read();
        f(&*state)
    }

    /// Runs one mutation under the write lock.
    ///
    /// The closure must validate before it writes; on any error the state is
    /// restored from a copy taken before the closure ran.
    pub(crate) fn mutate<T>(
        &self,
        event: &'static str,
        f: impl FnOnce(&mut BoardState) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let started_at = Instant::now();
        let mut state = self.inner.state.write();
        let before = state.clone();

        let value = match f(&mut *state) {
            Ok(value) => value,
            Err(err) => {
                *state = before;
                debug!(
                    "event={event} module=service status=rejected duration_ms={} error_code={}",
                    started_at.elapsed().as_millis(),
                    err.code()
                );
                return Err(err);
            }
        };

        if let Some(persistence) = &self.inner.persistence {
            if let Err(err) = persistence.save(&state.snapshot()) {
                *state = before;
                warn!(
                    "event={event} module=service status=error duration_ms={} error_code=save_failed error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(ServiceError::Persistence(err));
            }
        }

        debug!(
            "event={event} module=service status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::BoardState;
    use crate::model::category::Category;
    use crate::model::task::Task;
    use crate::repo::snapshot::{BoardSnapshot, PersistError};
    use crate::repo::store::StoreError;
    use uuid::Uuid;

    #[test]
    fn allocate_seq_is_strictly_increasing() {
        let mut state = BoardState::empty();
        assert_eq!(state.allocate_seq().unwrap(), 1);
        assert_eq!(state.allocate_seq().unwrap(), 2);
        assert_eq!(state.snapshot().next_seq, 3);
    }

    #[test]
    fn allocate_seq_reports_exhaustion_instead_of_wrapping() {
        let mut state = BoardState::from_snapshot(BoardSnapshot {
            next_seq: u64::MAX - 1,
            ..BoardSnapshot::default()
        })
        .unwrap();

        assert_eq!(state.allocate_seq().unwrap(), u64::MAX - 1);
        assert_eq!(state.allocate_seq(), Err(StoreError::SequenceExhausted));
        assert_eq!(state.snapshot().next_seq, u64::MAX);
    }

    #[test]
    fn from_snapshot_rejects_dangling_category_reference() {
        let mut task = Task::new(Uuid::new_v4(), "orphan", 1);
        task.category_id = Some(Uuid::new_v4());
        let snapshot = BoardSnapshot {
            categories: Vec::new(),
            tasks: vec![task],
            next_seq: 2,
        };

        let err = BoardState::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, PersistError::InvalidData(message) if message.contains("missing category")));
    }

    #[test]
    fn from_snapshot_rejects_case_insensitive_duplicate_names() {
        let snapshot = BoardSnapshot {
            categories: vec![Category::new("Work"), Category::new("WORK")],
            ..BoardSnapshot::default()
        };
        assert!(BoardState::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn from_snapshot_rejects_sequence_at_or_past_next_seq() {
        let snapshot = BoardSnapshot {
            categories: Vec::new(),
            tasks: vec![Task::new(Uuid::new_v4(), "late", 5)],
            next_seq: 5,
        };
        assert!(BoardState::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn from_snapshot_orders_tasks_by_created_seq() {
        let first = Task::new(Uuid::new_v4(), "first", 1);
        let second = Task::new(Uuid::new_v4(), "second", 2);
        let snapshot = BoardSnapshot {
            categories: Vec::new(),
            tasks: vec![second.clone(), first.clone()],
            next_seq: 3,
        };

        let state = BoardState::from_snapshot(snapshot).unwrap();
        assert_eq!(state.tasks.list(), vec![first, second]);
    }
}
