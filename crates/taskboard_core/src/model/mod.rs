//! Domain model for tasks and categories.
//!
//! # Responsibility
//! - Define the value records handled by stores and services.
//! - Provide input normalization shared by create/edit paths.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID that is never reused.
//! - Records are plain data; cross-entity rules live in `service`.

use std::fmt::{Display, Formatter};

pub mod category;
pub mod task;

/// Entity families tracked by the board.
///
/// Carried by not-found errors so callers can phrase which record vanished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Task,
    Category,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Category => "category",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
