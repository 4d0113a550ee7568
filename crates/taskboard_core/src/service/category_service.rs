//! Category use-case service.
//!
//! # Responsibility
//! - Create, rename, delete and list categories.
//! - Own the cascade that uncategorizes tasks when a category is deleted.
//!
//! # Invariants
//! - At most `MAX_CATEGORIES` categories exist.
//! - Category names are unique case-insensitively.
//! - No task references a deleted category, at any observable point.

use crate::model::category::{normalize_category_name, Category, CategoryId, MAX_CATEGORIES};
use crate::repo::store::CategoryStore;
use crate::service::board::Board;
use crate::service::error::{ServiceResult, ValidationError};
use log::info;

/// Category service facade over a shared board.
#[derive(Clone)]
pub struct CategoryService {
    board: Board,
}

impl CategoryService {
    pub fn new(board: Board) -> Self {
        Self { board }
    }

    /// Creates one category.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank after trimming.
    /// - `DuplicateName` when another category has the same name ignoring case.
    /// - `CategoryLimit` when `MAX_CATEGORIES` already exist.
    pub fn create_category(&self, name: impl Into<String>) -> ServiceResult<Category> {
        let name = name.into();
        self.board.mutate("category_create", |state| {
            let name = normalize_category_name(&name).ok_or(ValidationError::EmptyName)?;
            ensure_name_available(&state.categories, &name, None)?;
            if state.categories.len() >= MAX_CATEGORIES {
                return Err(ValidationError::CategoryLimit {
                    max: MAX_CATEGORIES,
                }
                .into());
            }

            let category = Category::new(name);
            state.categories.insert(category.clone())?;
            info!(
                "event=category_create module=service status=ok category_id={} total={}",
                category.id,
                state.categories.len()
            );
            Ok(category)
        })
    }

    /// Renames one category in place.
    ///
    /// The category being renamed is excluded from the duplicate check, so a
    /// case-only change of its own name is accepted.
    pub fn rename_category(
        &self,
        id: CategoryId,
        new_name: impl Into<String>,
    ) -> ServiceResult<Category> {
        let new_name = new_name.into();
        self.board.mutate("category_rename", |state| {
            let mut category = state.categories.get(id)?.clone();
            let name = normalize_category_name(&new_name).ok_or(ValidationError::EmptyName)?;
            ensure_name_available(&state.categories, &name, Some(id))?;

            category.name = name;
            state.categories.update(id, category.clone())?;
            info!("event=category_rename module=service status=ok category_id={id}");
            Ok(category)
        })
    }

    /// Deletes one category and uncategorizes every task that used it.
    ///
    /// Both steps run under the same board write lock and are rolled back
    /// together if either fails, so no caller observes a half-applied cascade.
    pub fn delete_category(&self, id: CategoryId) -> ServiceResult<Category> {
        self.board.mutate("category_delete", |state| {
            state.categories.get(id)?;

            let affected: Vec<_> = state
                .tasks
                .iter()
                .filter(|task| task.category_id == Some(id))
                .map(|task| task.id)
                .collect();
            for task_id in &affected {
                let mut task = state.tasks.get(*task_id)?.clone();
                task.category_id = None;
                state.tasks.update(*task_id, task)?;
            }

            let removed = state.categories.remove(id)?;
            info!(
                "event=category_delete module=service status=ok category_id={id} uncategorized_tasks={}",
                affected.len()
            );
            Ok(removed)
        })
    }

    /// Lists all categories in insertion order.
    pub fn list_categories(&self) -> Vec<Category> {
        self.board.read(|state| state.categories.list())
    }

    /// Gets one category by ID.
    pub fn get_category(&self, id: CategoryId) -> ServiceResult<Category> {
        self.board
            .read(|state| state.categories.get(id).cloned())
            .map_err(Into::into)
    }

    /// Returns whether another category can be created right now.
    pub fn can_add_category(&self) -> bool {
        self.board
            .read(|state| state.categories.len() < MAX_CATEGORIES)
    }
}

fn ensure_name_available(
    categories: &CategoryStore,
    name: &str,
    exclude: Option<CategoryId>,
) -> Result<(), ValidationError> {
    let taken = categories
        .iter()
        .filter(|category| Some(category.id) != exclude)
        .any(|category| category.matches_name(name));
    if taken {
        return Err(ValidationError::DuplicateName {
            name: name.to_string(),
        });
    }
    Ok(())
}
