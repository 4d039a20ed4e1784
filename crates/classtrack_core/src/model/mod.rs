//! Domain model for the class roster.
//!
//! # Responsibility
//! - Define the immutable value types owned by the root aggregate.
//! - Keep "same entity" identity predicates next to the types they compare.
//!
//! # Invariants
//! - Every student is identified by a stable `StudentId`.
//! - Entities are value objects; editing means building a replacement copy.

pub mod attendance;
pub mod lesson;
pub mod module_class;
pub mod student;
