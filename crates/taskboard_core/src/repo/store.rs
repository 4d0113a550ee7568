//! In-memory keyed entity stores.
//!
//! # Responsibility
//! - Provide CRUD primitives over tasks and categories keyed by UUID.
//! - Preserve insertion order for listing.
//!
//! # Invariants
//! - Stores check key existence only; they know nothing about
//!   cross-entity rules.
//! - `update` keeps the entity at its original position.

use crate::model::category::Category;
use crate::model::task::Task;
use crate::model::EntityKind;
use indexmap::IndexMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Key-level store failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    AlreadyExists { kind: EntityKind, id: Uuid },
    NotFound { kind: EntityKind, id: Uuid },
    /// No creation sequence value is left to hand out.
    SequenceExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists { kind, id } => write!(f, "{kind} already exists: {id}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::SequenceExhausted => write!(f, "task creation sequence exhausted"),
        }
    }
}

impl Error for StoreError {}

/// Record type that can live in an [`EntityStore`].
pub trait StoredEntity: Clone {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;
}

impl StoredEntity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl StoredEntity for Category {
    const KIND: EntityKind = EntityKind::Category;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Insertion-ordered collection keyed by entity ID.
#[derive(Debug, Clone)]
pub struct EntityStore<T> {
    items: IndexMap<Uuid, T>,
}

pub type TaskStore = EntityStore<Task>;
pub type CategoryStore = EntityStore<Category>;

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }
}

impl<T: StoredEntity> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new entity at the end of the list.
    pub fn insert(&mut self, entity: T) -> StoreResult<()> {
        let id = entity.id();
        if self.items.contains_key(&id) {
            return Err(StoreError::AlreadyExists { kind: T::KIND, id });
        }
        self.items.insert(id, entity);
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> StoreResult<&T> {
        self.items.get(&id).ok_or(StoreError::NotFound { kind: T::KIND, id })
    }

    /// Replaces the entity stored under `id`.
    pub fn update(&mut self, id: Uuid, entity: T) -> StoreResult<()> {
        let slot = self
            .items
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: T::KIND, id })?;
        *slot = entity;
        Ok(())
    }

    /// Removes and returns the entity, shifting later entries up.
    pub fn remove(&mut self, id: Uuid) -> StoreResult<T> {
        self.items
            .shift_remove(&id)
            .ok_or(StoreError::NotFound { kind: T::KIND, id })
    }

    /// Returns all entities in insertion order.
    pub fn list(&self) -> Vec<T> {
        self.items.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
