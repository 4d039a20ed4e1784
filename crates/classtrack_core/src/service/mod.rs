//! Command-shaped use-case services.
//!
//! # Responsibility
//! - Implement the command execution contract over the versioned roster:
//!   validate, build replacement values, install, commit exactly once.
//! - Resolve 1-based display indices coming from the command layer.
//!
//! # Invariants
//! - Mutating operations commit exactly once, after all checks pass.
//! - Undo/redo, listing and find operations never commit.

pub mod roster_service;
