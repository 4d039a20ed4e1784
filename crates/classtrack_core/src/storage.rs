//! JSON snapshot codec for the roster.
//!
//! # Responsibility
//! - Encode the committed roster for on-disk persistence.
//! - Decode and fully validate saved data before anything is installed.
//!
//! # Invariants
//! - Decoding rejects invalid persisted state instead of masking it: a
//!   roster that fails any consistency check is never returned.
//! - Load either fully succeeds or the caller's in-memory state stays put;
//!   this module never installs anything itself.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

use crate::roster::ClassRoster;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    /// Underlying file read/write failure.
    Io(std::io::Error),
    /// Saved data is malformed or violates a roster invariant.
    Corrupt(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Corrupt(message) => write!(f, "corrupt roster data: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Corrupt(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Encodes the roster as pretty-printed JSON.
pub fn encode_roster(roster: &ClassRoster) -> StorageResult<String> {
    serde_json::to_string_pretty(roster)
        .map_err(|err| StorageError::Corrupt(format!("failed to encode roster: {err}")))
}

/// Decodes a roster and runs the full consistency pass.
///
/// Out-of-range scores are already rejected inside deserialization by the
/// `Attendance` wire conversion; everything structural is checked here.
pub fn decode_roster(json: &str) -> StorageResult<ClassRoster> {
    let roster: ClassRoster = serde_json::from_str(json)
        .map_err(|err| StorageError::Corrupt(format!("malformed roster data: {err}")))?;
    validate_roster(&roster).map_err(StorageError::Corrupt)?;
    Ok(roster)
}

/// Writes the roster to `path` as JSON.
pub fn save_roster(path: &Path, roster: &ClassRoster) -> StorageResult<()> {
    let json = encode_roster(roster)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Reads and validates a roster from `path`.
pub fn load_roster(path: &Path) -> StorageResult<ClassRoster> {
    let json = std::fs::read_to_string(path)?;
    decode_roster(&json)
}

/// Checks every aggregate invariant a decoded roster must satisfy.
fn validate_roster(roster: &ClassRoster) -> Result<(), String> {
    let students = roster.students();
    for (index, student) in students.iter().enumerate() {
        if students[..index]
            .iter()
            .any(|earlier| earlier.is_same_student(student))
        {
            return Err(format!("duplicate student entry: {}", student.name()));
        }
        if students[..index].iter().any(|earlier| earlier.id() == student.id()) {
            return Err(format!("duplicate student id: {}", student.id()));
        }
    }

    let classes = roster.module_classes();
    for (index, class) in classes.iter().enumerate() {
        if classes[..index]
            .iter()
            .any(|earlier| earlier.is_same_class(class))
        {
            return Err(format!("duplicate class entry: {}", class.name()));
        }

        for id in class.student_ids() {
            if roster.student_by_id(id).is_none() {
                return Err(format!(
                    "class {} references unknown student id {id}",
                    class.name()
                ));
            }
        }

        for (lesson_index, lesson) in class.lessons().iter().enumerate() {
            if class.lessons()[..lesson_index]
                .iter()
                .any(|earlier| earlier.is_same_lesson(lesson))
            {
                return Err(format!(
                    "duplicate lesson entry in class {}",
                    class.name()
                ));
            }
            lesson
                .validate()
                .map_err(|err| format!("class {}: {err}", class.name()))?;
            for record in lesson.attendance().records() {
                for id in record.student_ids() {
                    if roster.student_by_id(id).is_none() {
                        return Err(format!(
                            "attendance in class {} references unknown student id {id}",
                            class.name()
                        ));
                    }
                }
            }
        }
    }

    Ok(())
}
