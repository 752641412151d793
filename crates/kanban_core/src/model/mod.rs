//! Task board domain model.
//!
//! # Responsibility
//! - Define the task record, board columns and reminder tiers.
//! - Own the wall-clock timestamp conventions shared by write and read paths.
//!
//! # Invariants
//! - Every task is identified by a store-assigned, immutable `TaskId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod task;
pub mod timestamp;
