//! Versioned roster: linear undo/redo snapshot log.
//!
//! # Responsibility
//! - Keep an ordered list of immutable roster snapshots plus a cursor.
//! - Provide commit/undo/redo transitions and the history projection.
//!
//! # Invariants
//! - The initial snapshot is never discarded; the cursor stays in bounds.
//! - A commit truncates everything past the cursor: redoing into an
//!   abandoned branch is impossible, matching editor undo semantics.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::roster::ClassRoster;

/// Label attached to the permanent first snapshot.
pub const INITIAL_STATE_LABEL: &str = "Initial state";

pub type HistoryResult<T> = Result<T, HistoryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    /// Cursor is at the initial snapshot; nothing to undo.
    NoPreviousState,
    /// Cursor is at the newest snapshot; nothing to redo.
    NoNextState,
}

impl Display for HistoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPreviousState => write!(f, "no earlier state to undo to"),
            Self::NoNextState => write!(f, "no later state to redo to"),
        }
    }
}

impl Error for HistoryError {}

/// One history entry from the [`VersionedRoster::history`] projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub label: String,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    label: String,
    roster: ClassRoster,
}

/// Snapshot log with a cursor; the aggregate store all commands go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedRoster {
    snapshots: Vec<Snapshot>,
    cursor: usize,
}

impl VersionedRoster {
    /// Starts a log whose permanent first snapshot is `initial`.
    pub fn new(initial: ClassRoster) -> Self {
        Self {
            snapshots: vec![Snapshot {
                label: INITIAL_STATE_LABEL.to_string(),
                roster: initial,
            }],
            cursor: 0,
        }
    }

    /// The roster at the cursor: the current working state.
    pub fn current(&self) -> &ClassRoster {
        &self.snapshots[self.cursor].roster
    }

    /// The label of the snapshot at the cursor.
    pub fn current_label(&self) -> &str {
        &self.snapshots[self.cursor].label
    }

    /// Records `roster` as the new newest snapshot.
    ///
    /// Any snapshots past the cursor are discarded first; a commit after an
    /// undo irrevocably abandons the redo branch.
    pub fn commit(&mut self, roster: ClassRoster, label: impl Into<String>) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(Snapshot {
            label: label.into(),
            roster,
        });
        self.cursor += 1;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.snapshots.len() - 1
    }

    /// Moves the cursor one snapshot back and returns the restored roster.
    pub fn undo(&mut self) -> HistoryResult<&ClassRoster> {
        if !self.can_undo() {
            return Err(HistoryError::NoPreviousState);
        }
        self.cursor -= 1;
        Ok(self.current())
    }

    /// Moves the cursor one snapshot forward and returns the restored roster.
    pub fn redo(&mut self) -> HistoryResult<&ClassRoster> {
        if !self.can_redo() {
            return Err(HistoryError::NoNextState);
        }
        self.cursor += 1;
        Ok(self.current())
    }

    /// Chronological labels with the cursor position marked.
    ///
    /// Ordering is a projection; presentation may reverse it.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.snapshots
            .iter()
            .enumerate()
            .map(|(index, snapshot)| HistoryEntry {
                label: snapshot.label.clone(),
                is_current: index == self.cursor,
            })
            .collect()
    }

    /// Discards the whole log and starts over from `initial`.
    ///
    /// Used when a saved roster is loaded: loaded state is the new origin.
    pub fn reset(&mut self, initial: ClassRoster) {
        *self = Self::new(initial);
    }
}

#[cfg(test)]
mod tests {
    use super::{HistoryError, VersionedRoster, INITIAL_STATE_LABEL};
    use crate::model::student::Student;
    use crate::roster::ClassRoster;

    fn roster_with(name: &str) -> ClassRoster {
        let mut roster = ClassRoster::new();
        roster
            .add_student(Student::new(name, format!("@{name}"), format!("{name}@x.com"), []))
            .unwrap();
        roster
    }

    #[test]
    fn undo_at_initial_state_fails() {
        let mut versioned = VersionedRoster::new(ClassRoster::new());
        assert!(!versioned.can_undo());
        assert_eq!(versioned.undo().unwrap_err(), HistoryError::NoPreviousState);
    }

    #[test]
    fn commit_then_undo_restores_previous_snapshot() {
        let committed = roster_with("alex");
        let mut versioned = VersionedRoster::new(ClassRoster::new());
        versioned.commit(committed.clone(), "Added student alex");

        assert!(versioned.can_undo());
        assert_eq!(versioned.undo().unwrap(), &ClassRoster::new());
        assert_eq!(versioned.redo().unwrap(), &committed);
        assert_eq!(versioned.redo().unwrap_err(), HistoryError::NoNextState);
    }

    #[test]
    fn commit_after_undo_discards_the_redo_branch() {
        let mut versioned = VersionedRoster::new(ClassRoster::new());
        versioned.commit(roster_with("alex"), "Added student alex");
        versioned.undo().unwrap();
        versioned.commit(roster_with("bee"), "Added student bee");

        assert_eq!(versioned.redo().unwrap_err(), HistoryError::NoNextState);
        let labels: Vec<_> = versioned
            .history()
            .into_iter()
            .map(|entry| entry.label)
            .collect();
        assert_eq!(labels, vec![INITIAL_STATE_LABEL, "Added student bee"]);
    }

    #[test]
    fn history_marks_the_cursor() {
        let mut versioned = VersionedRoster::new(ClassRoster::new());
        versioned.commit(roster_with("alex"), "Added student alex");
        versioned.undo().unwrap();

        let entries = versioned.history();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_current);
        assert!(!entries[1].is_current);
    }
}
