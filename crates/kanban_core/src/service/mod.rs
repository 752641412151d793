//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the board's user-facing commands and
//!   queries.
//! - Keep callers (CLI, any UI) decoupled from storage details.

pub mod board_service;
