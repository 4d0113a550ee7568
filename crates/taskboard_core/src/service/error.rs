//! Service-level error kinds.
//!
//! # Invariants
//! - `Validation` is always caused by caller input and leaves state unchanged.
//! - `NotFound` names the entity kind and ID so stale views can be refreshed.

use crate::model::EntityKind;
use crate::repo::snapshot::PersistError;
use crate::repo::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Rejected caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task title is empty after trimming.
    EmptyTitle,
    /// Category name is empty after trimming.
    EmptyName,
    /// Another category already uses this name (case-insensitive).
    DuplicateName { name: String },
    /// The category cap is reached.
    CategoryLimit { max: usize },
}

impl ValidationError {
    /// Stable reason code for UI message lookup.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "empty-title",
            Self::EmptyName => "empty-name",
            Self::DuplicateName { .. } => "duplicate-name",
            Self::CategoryLimit { .. } => "category-limit",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be blank"),
            Self::EmptyName => write!(f, "category name must not be blank"),
            Self::DuplicateName { name } => {
                write!(f, "a category named `{name}` already exists")
            }
            Self::CategoryLimit { max } => {
                write!(f, "at most {max} categories can exist at the same time")
            }
        }
    }
}

impl Error for ValidationError {}

/// Errors returned by `TaskService` and `CategoryService`.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    NotFound { kind: EntityKind, id: Uuid },
    /// Storage collaborator rejected the new state; the mutation was undone.
    Persistence(PersistError),
    /// Store-level failure with no domain meaning (e.g. ID collision).
    Store(StoreError),
}

impl ServiceError {
    /// Metadata-only code for logs; never includes user text.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.reason(),
            Self::NotFound { .. } => "not-found",
            Self::Persistence(_) => "persistence",
            Self::Store(_) => "store",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Persistence(err) => write!(f, "failed to save board: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Persistence(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Store(other),
        }
    }
}

impl From<PersistError> for ServiceError {
    fn from(value: PersistError) -> Self {
        Self::Persistence(value)
    }
}
