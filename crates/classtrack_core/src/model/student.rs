//! Student domain model.
//!
//! # Responsibility
//! - Define the student value object and its stable identifier.
//! - Keep the "same student" predicate used for duplicate detection.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes across edits.
//! - "Same student" compares contact details, never the id, so the id can
//!   be used for linkage without affecting duplicate detection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable identifier for a student.
///
/// Classes reference students by this id instead of holding references,
/// so a student can be replaced with an edited copy without breaking links.
pub type StudentId = Uuid;

/// Immutable student value object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    id: StudentId,
    name: String,
    telegram: String,
    email: String,
    tags: BTreeSet<String>,
}

impl Student {
    /// Creates a student with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        telegram: impl Into<String>,
        email: impl Into<String>,
        tags: impl IntoIterator<Item = String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, telegram, email, tags)
    }

    /// Creates a student with a caller-provided id.
    ///
    /// Used by the storage layer where identity already exists on disk.
    pub fn with_id(
        id: StudentId,
        name: impl Into<String>,
        telegram: impl Into<String>,
        email: impl Into<String>,
        tags: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            telegram: telegram.into(),
            email: email.into(),
            tags: normalize_tags(tags),
        }
    }

    pub fn id(&self) -> StudentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn telegram(&self) -> &str {
        &self.telegram
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Builds an edited copy, keeping the id.
    ///
    /// `None` fields keep their current value.
    pub fn with_details(
        &self,
        name: Option<String>,
        telegram: Option<String>,
        email: Option<String>,
        tags: Option<BTreeSet<String>>,
    ) -> Self {
        Self {
            id: self.id,
            name: name.unwrap_or_else(|| self.name.clone()),
            telegram: telegram.unwrap_or_else(|| self.telegram.clone()),
            email: email.unwrap_or_else(|| self.email.clone()),
            tags: tags
                .map(normalize_tags)
                .unwrap_or_else(|| self.tags.clone()),
        }
    }

    /// Duplicate-detection identity: contact details, not the id.
    pub fn is_same_student(&self, other: &Student) -> bool {
        self.name == other.name && self.telegram == other.telegram && self.email == other.email
    }
}

/// Trims tags and drops empties; set semantics deduplicate.
fn normalize_tags(tags: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}
