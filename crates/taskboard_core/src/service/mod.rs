//! Core use-case services.
//!
//! # Responsibility
//! - Enforce task and category rules above the stores.
//! - Keep UI/controller layers decoupled from store internals.
//!
//! # Invariants
//! - Services share one `Board`; every mutation is serialized by its lock.
//! - Validation happens before any store write.

pub mod board;
pub mod category_service;
pub mod error;
pub mod task_service;
