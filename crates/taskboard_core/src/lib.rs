//! Core domain logic for Taskboard.
//! This crate is the single source of truth for task and category invariants.

pub mod adapter;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use adapter::external::{AdaptedTask, ExternalTodoItem, TaskAdapter};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{Category, CategoryId, MAX_CATEGORIES};
pub use model::task::{Task, TaskId, TaskPriority, TaskStatus};
pub use model::EntityKind;
pub use repo::snapshot::{BoardPersistence, BoardSnapshot, PersistError, PersistResult};
pub use repo::sqlite_board::SqliteBoardStore;
pub use repo::store::{CategoryStore, EntityStore, StoreError, StoreResult, TaskStore};
pub use service::board::Board;
pub use service::category_service::CategoryService;
pub use service::error::{ServiceError, ServiceResult, ValidationError};
pub use service::task_service::{
    CategoryFilter, FieldUpdate, NewTask, StatusFilter, TaskCounts, TaskFilter, TaskPatch,
    TaskService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
