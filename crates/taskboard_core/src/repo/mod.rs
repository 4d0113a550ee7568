//! Store layer and persistence implementations.
//!
//! # Responsibility
//! - Provide keyed in-memory stores with CRUD primitives.
//! - Define the persistence collaborator contract and its SQLite backend.
//!
//! # Invariants
//! - Stores return semantic `NotFound` errors and apply no business rules.
//! - Persistence backends store and return whole-board snapshots.

pub mod snapshot;
pub mod sqlite_board;
pub mod store;
