//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the task store contract used by the board and the scheduler.
//! - Isolate SQLite query details from service/scheduling orchestration.
//!
//! # Invariants
//! - Repository writes validate task fields before any SQL mutation.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod task_repo;
