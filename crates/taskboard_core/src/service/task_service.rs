//! Task use-case service.
//!
//! # Responsibility
//! - Create, edit, toggle, delete and filter tasks.
//! - Check category references against the shared category store.
//!
//! # Invariants
//! - Titles are trimmed and never blank.
//! - A task's category, when set, exists at the moment the write commits.
//! - Listing is ordered by `created_seq` and never mutates state.

use crate::adapter::external::{ExternalTodoItem, TaskAdapter};
use crate::model::category::CategoryId;
use crate::model::task::{normalize_title, Task, TaskId, TaskPriority, TaskStatus};
use crate::model::EntityKind;
use crate::service::board::{Board, BoardState};
use crate::service::error::{ServiceError, ServiceResult, ValidationError};
use chrono::NaiveDate;
use log::info;
use uuid::Uuid;

/// Request model for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    /// Raw title; trimmed before validation.
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub category_id: Option<CategoryId>,
    pub priority: Option<TaskPriority>,
}

impl NewTask {
    /// Request with only a title set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Change to one optional task field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Leave the current value untouched.
    Keep,
    Set(T),
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<T> FieldUpdate<T> {
    fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Keep => current,
            Self::Set(value) => Some(value),
            Self::Clear => None,
        }
    }
}

/// Partial edit; unset fields keep their prior value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub due_date: FieldUpdate<NaiveDate>,
    pub category_id: FieldUpdate<CategoryId>,
    pub priority: FieldUpdate<TaskPriority>,
}

/// Completion filter for task listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Open,
    Done,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Open => task.status() == TaskStatus::Open,
            Self::Done => task.status() == TaskStatus::Done,
        }
    }
}

/// Category filter for task listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No category restriction.
    #[default]
    Any,
    /// Only tasks without a category.
    Uncategorized,
    Category(CategoryId),
}

impl CategoryFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::Any => true,
            Self::Uncategorized => task.is_uncategorized(),
            Self::Category(id) => task.category_id == Some(id),
        }
    }
}

/// Combined listing filter; both parts must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub category: CategoryFilter,
}

impl TaskFilter {
    pub fn status(status: StatusFilter) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task) && self.category.matches(task)
    }
}

/// Task totals for filter badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub all: usize,
    pub open: usize,
    pub done: usize,
}

/// Task service facade over a shared board.
#[derive(Clone)]
pub struct TaskService {
    board: Board,
}

impl TaskService {
    pub fn new(board: Board) -> Self {
        Self { board }
    }

    /// Creates one open task.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is blank after trimming.
    /// - `NotFound(Category)` when `category_id` does not exist.
    pub fn create_task(&self, request: NewTask) -> ServiceResult<Task> {
        self.board.mutate("task_create", |state| {
            let task = build_task(state, request)?;
            state.tasks.insert(task.clone())?;
            info!(
                "event=task_create module=service status=ok task_id={} created_seq={}",
                task.id, task.created_seq
            );
            Ok(task)
        })
    }

    /// Applies a partial edit.
    ///
    /// All supplied fields are validated before any of them is written.
    pub fn edit_task(&self, id: TaskId, patch: TaskPatch) -> ServiceResult<Task> {
        self.board.mutate("task_edit", |state| {
            let mut task = state.tasks.get(id)?.clone();

            let title = match patch.title {
                Some(title) => Some(normalize_title(&title).ok_or(ValidationError::EmptyTitle)?),
                None => None,
            };
            if let FieldUpdate::Set(category_id) = patch.category_id {
                ensure_category_exists(state, category_id)?;
            }

            if let Some(title) = title {
                task.title = title;
            }
            task.due_date = patch.due_date.apply(task.due_date);
            task.category_id = patch.category_id.apply(task.category_id);
            task.priority = patch.priority.apply(task.priority);

            state.tasks.update(id, task.clone())?;
            info!("event=task_edit module=service status=ok task_id={id}");
            Ok(task)
        })
    }

    /// Flips the completion flag. Applying it twice restores the original.
    pub fn toggle_complete(&self, id: TaskId) -> ServiceResult<Task> {
        self.board.mutate("task_toggle", |state| {
            let mut task = state.tasks.get(id)?.clone();
            task.completed = !task.completed;
            state.tasks.update(id, task.clone())?;
            info!(
                "event=task_toggle module=service status=ok task_id={id} completed={}",
                task.completed
            );
            Ok(task)
        })
    }

    /// Sets the completion flag explicitly; idempotent.
    pub fn set_completed(&self, id: TaskId, completed: bool) -> ServiceResult<Task> {
        self.board.mutate("task_set_completed", |state| {
            let mut task = state.tasks.get(id)?.clone();
            task.completed = completed;
            state.tasks.update(id, task.clone())?;
            info!(
                "event=task_set_completed module=service status=ok task_id={id} completed={completed}"
            );
            Ok(task)
        })
    }

    /// Removes one task. Other entities are untouched.
    pub fn delete_task(&self, id: TaskId) -> ServiceResult<Task> {
        self.board.mutate("task_delete", |state| {
            let removed = state.tasks.remove(id)?;
            info!("event=task_delete module=service status=ok task_id={id}");
            Ok(removed)
        })
    }

    /// Gets one task by ID.
    pub fn get_task(&self, id: TaskId) -> ServiceResult<Task> {
        self.board
            .read(|state| state.tasks.get(id).cloned())
            .map_err(Into::into)
    }

    /// Lists tasks matching `filter`, oldest first.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.board.read(|state| {
            state
                .tasks
                .iter()
                .filter(|task| filter.matches(task))
                .cloned()
                .collect()
        });
        tasks.sort_by_key(|task| task.created_seq);
        tasks
    }

    /// Counts all, open and done tasks.
    pub fn task_counts(&self) -> TaskCounts {
        self.board.read(|state| {
            let all = state.tasks.len();
            let done = state.tasks.iter().filter(|task| task.completed).count();
            TaskCounts {
                all,
                open: all - done,
                done,
            }
        })
    }

    /// Imports a batch of external items as one mutation.
    ///
    /// Either every item becomes a task or, on the first invalid item, none
    /// does.
    pub fn import_external(&self, items: &[ExternalTodoItem]) -> ServiceResult<Vec<Task>> {
        let adapter = TaskAdapter::new();
        self.board.mutate("task_import", |state| {
            let categories = state.categories.list();
            let mut imported = Vec::with_capacity(items.len());
            for item in items {
                let adapted = adapter.adapt(item, &categories);
                let mut task = build_task(state, adapted.request)?;
                task.completed = adapted.completed;
                state.tasks.insert(task.clone())?;
                imported.push(task);
            }
            info!(
                "event=task_import module=service status=ok count={}",
                imported.len()
            );
            Ok(imported)
        })
    }
}

/// Validates a creation request and assembles the task without inserting it.
fn build_task(state: &mut BoardState, request: NewTask) -> ServiceResult<Task> {
    let title = normalize_title(&request.title).ok_or(ValidationError::EmptyTitle)?;
    if let Some(category_id) = request.category_id {
        ensure_category_exists(state, category_id)?;
    }

    let mut task = Task::new(Uuid::new_v4(), title, state.allocate_seq()?);
    task.due_date = request.due_date;
    task.category_id = request.category_id;
    task.priority = request.priority;
    Ok(task)
}

fn ensure_category_exists(state: &BoardState, category_id: CategoryId) -> ServiceResult<()> {
    if !state.categories.contains(category_id) {
        return Err(ServiceError::NotFound {
            kind: EntityKind::Category,
            id: category_id,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CategoryFilter, FieldUpdate, StatusFilter, TaskFilter};
    use crate::model::task::Task;
    use uuid::Uuid;

    #[test]
    fn field_update_apply_covers_keep_set_clear() {
        assert_eq!(FieldUpdate::Keep.apply(Some(1)), Some(1));
        assert_eq!(FieldUpdate::Set(2).apply(Some(1)), Some(2));
        assert_eq!(FieldUpdate::<i32>::Clear.apply(Some(1)), None);
    }

    #[test]
    fn filter_requires_both_status_and_category() {
        let category_id = Uuid::new_v4();
        let mut task = Task::new(Uuid::new_v4(), "t", 1);
        task.category_id = Some(category_id);

        let open_in_category = TaskFilter {
            status: StatusFilter::Open,
            category: CategoryFilter::Category(category_id),
        };
        assert!(open_in_category.matches(&task));

        task.completed = true;
        assert!(!open_in_category.matches(&task));
        assert!(TaskFilter::status(StatusFilter::Done).matches(&task));
        assert!(!TaskFilter {
            category: CategoryFilter::Uncategorized,
            ..TaskFilter::default()
        }
        .matches(&task));
    }
}
