//! Week-indexed attendance records.
//!
//! # Responsibility
//! - Define the bounded `Attendance` score and 1-based `Week` index.
//! - Provide the fixed-length per-lesson record list with distinct
//!   insert-if-absent and upsert operations.
//!
//! # Invariants
//! - Scores outside 0..=100 never exist, not even transiently.
//! - An `AttendanceRecordList` keeps its length for its whole lifetime.
//! - Enrollment membership is not checked here; the service layer checks it
//!   against the owning class before mutating.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::student::StudentId;

/// Highest attendance score accepted by [`Attendance::new`].
pub const MAX_ATTENDANCE_SCORE: u8 = 100;

pub type AttendanceResult<T> = Result<T, AttendanceError>;

/// Validation and lookup errors for attendance values and record lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceError {
    /// Score above [`MAX_ATTENDANCE_SCORE`].
    ScoreOutOfRange(u8),
    /// Week numbers are 1-based; zero is never valid.
    InvalidWeek(u32),
    /// Week index past the end of the owning lesson's timeline.
    WeekOutOfRange { week: u32, occurrences: usize },
    /// An entry already exists for this student and week.
    DuplicateAttendance { week: u32 },
    /// No entry exists for this student and week.
    AttendanceNotFound { week: u32 },
}

impl Display for AttendanceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScoreOutOfRange(score) => {
                write!(f, "attendance score {score} is out of range 0..={MAX_ATTENDANCE_SCORE}")
            }
            Self::InvalidWeek(week) => write!(f, "week {week} is invalid; weeks are numbered from 1"),
            Self::WeekOutOfRange { week, occurrences } => write!(
                f,
                "week {week} is out of range for a lesson with {occurrences} occurrence(s)"
            ),
            Self::DuplicateAttendance { week } => {
                write!(f, "attendance for week {week} already exists for this student")
            }
            Self::AttendanceNotFound { week } => {
                write!(f, "no attendance for week {week} exists for this student")
            }
        }
    }
}

impl Error for AttendanceError {}

/// Attendance score for one student in one week, bounded to 0..=100.
///
/// Uses `try_from`/`into` on the wire so a corrupted score is rejected
/// during deserialization instead of by a later sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Attendance(u8);

impl Attendance {
    /// Creates a score, rejecting values above [`MAX_ATTENDANCE_SCORE`].
    pub fn new(score: u8) -> AttendanceResult<Self> {
        if score > MAX_ATTENDANCE_SCORE {
            return Err(AttendanceError::ScoreOutOfRange(score));
        }
        Ok(Self(score))
    }

    pub fn score(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Attendance {
    type Error = AttendanceError;

    fn try_from(value: u8) -> AttendanceResult<Self> {
        Self::new(value)
    }
}

impl From<Attendance> for u8 {
    fn from(value: Attendance) -> Self {
        value.0
    }
}

impl Display for Attendance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1-based index into a lesson's attendance timeline.
///
/// Only zero is rejected here; the upper bound depends on the owning
/// lesson and is checked by [`AttendanceRecordList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Week(u32);

impl Week {
    pub fn new(week: u32) -> AttendanceResult<Self> {
        if week == 0 {
            return Err(AttendanceError::InvalidWeek(week));
        }
        Ok(Self(week))
    }

    pub fn number(self) -> u32 {
        self.0
    }
}

impl Display for Week {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attendance entries for exactly one week, keyed by student id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceRecord {
    entries: BTreeMap<StudentId, Attendance>,
}

impl AttendanceRecord {
    pub fn get(&self, student_id: &StudentId) -> Option<Attendance> {
        self.entries.get(student_id).copied()
    }

    pub fn contains(&self, student_id: &StudentId) -> bool {
        self.entries.contains_key(student_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of every student with an entry for this week.
    pub fn student_ids(&self) -> impl Iterator<Item = &StudentId> {
        self.entries.keys()
    }

    /// Returns a copy with the entry set, overwriting any existing entry.
    fn inserted(&self, student_id: StudentId, attendance: Attendance) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(student_id, attendance);
        Self { entries }
    }

    /// Returns a copy without the entry, or `None` if it was absent.
    pub(crate) fn removed_entry(&self, student_id: &StudentId) -> Option<Self> {
        if !self.entries.contains_key(student_id) {
            return None;
        }
        let mut entries = self.entries.clone();
        entries.remove(student_id);
        Some(Self { entries })
    }
}

/// Fixed-length timeline of attendance records, one per lesson occurrence.
///
/// Length is set at lesson creation and never changes; every operation
/// returns an edited copy of the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceRecordList {
    records: Vec<AttendanceRecord>,
}

impl AttendanceRecordList {
    /// Creates an empty timeline with one record per occurrence.
    pub fn new(occurrences: usize) -> Self {
        Self {
            records: vec![AttendanceRecord::default(); occurrences],
        }
    }

    /// Wraps an existing ordered sequence of records.
    ///
    /// Crate-internal: callers outside the lesson boundary must not build
    /// timelines of arbitrary length.
    pub(crate) fn from_records(records: Vec<AttendanceRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    /// Resolves a 1-based week to a record index.
    fn index_of(&self, week: Week) -> AttendanceResult<usize> {
        let index = week.number() as usize - 1;
        if index >= self.records.len() {
            return Err(AttendanceError::WeekOutOfRange {
                week: week.number(),
                occurrences: self.records.len(),
            });
        }
        Ok(index)
    }

    /// Looks up one student's score for a week.
    ///
    /// A missing entry is `Ok(None)` ("absent"), distinct from a week past
    /// the end of the timeline, which is an error.
    pub fn get(&self, week: Week, student_id: &StudentId) -> AttendanceResult<Option<Attendance>> {
        let index = self.index_of(week)?;
        Ok(self.records[index].get(student_id))
    }

    /// Insert-if-absent: fails with `DuplicateAttendance` when an entry for
    /// this student and week already exists.
    pub fn with_added(
        &self,
        week: Week,
        student_id: StudentId,
        attendance: Attendance,
    ) -> AttendanceResult<Self> {
        let index = self.index_of(week)?;
        if self.records[index].contains(&student_id) {
            return Err(AttendanceError::DuplicateAttendance {
                week: week.number(),
            });
        }
        Ok(self.replaced_at(index, self.records[index].inserted(student_id, attendance)))
    }

    /// Upsert: sets the entry regardless of whether one already exists.
    pub fn with_set(
        &self,
        week: Week,
        student_id: StudentId,
        attendance: Attendance,
    ) -> AttendanceResult<Self> {
        let index = self.index_of(week)?;
        Ok(self.replaced_at(index, self.records[index].inserted(student_id, attendance)))
    }

    /// Removes the entry, failing with `AttendanceNotFound` when absent.
    pub fn with_removed(&self, week: Week, student_id: &StudentId) -> AttendanceResult<Self> {
        let index = self.index_of(week)?;
        let record = self.records[index]
            .removed_entry(student_id)
            .ok_or(AttendanceError::AttendanceNotFound {
                week: week.number(),
            })?;
        Ok(self.replaced_at(index, record))
    }

    /// Mean score over the weeks where the student has an entry.
    ///
    /// Returns `None` when the student has no entries at all.
    pub fn average_for(&self, student_id: &StudentId) -> Option<f64> {
        let scores: Vec<u8> = self
            .records
            .iter()
            .filter_map(|record| record.get(student_id))
            .map(Attendance::score)
            .collect();
        if scores.is_empty() {
            return None;
        }
        let total: u32 = scores.iter().map(|score| u32::from(*score)).sum();
        Some(f64::from(total) / scores.len() as f64)
    }

    fn replaced_at(&self, index: usize, record: AttendanceRecord) -> Self {
        let mut records = self.records.clone();
        records[index] = record;
        Self { records }
    }
}
