//! Lesson domain model.
//!
//! # Responsibility
//! - Define the recurring lesson value object and its schedule fields.
//! - Own the fixed-length attendance timeline, one record per occurrence.
//!
//! # Invariants
//! - `start_time < end_time`.
//! - `attendance.len() == number_of_occurrences` for the lesson's lifetime.
//! - "Same lesson" compares schedule and venue only, never attendance, so a
//!   lesson does not stop being itself when scores are recorded.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::attendance::{
    Attendance, AttendanceRecordList, AttendanceResult, Week,
};
use crate::model::student::StudentId;

pub type LessonResult<T> = Result<T, LessonError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonError {
    /// `start_time` is not strictly before `end_time`.
    InvalidTimeRange { start: NaiveTime, end: NaiveTime },
    /// Attendance timeline length differs from the occurrence count.
    OccurrenceMismatch { expected: usize, actual: usize },
}

impl Display for LessonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimeRange { start, end } => {
                write!(f, "lesson start time {start} must be before end time {end}")
            }
            Self::OccurrenceMismatch { expected, actual } => write!(
                f,
                "attendance timeline has {actual} record(s) for a lesson with {expected} occurrence(s)"
            ),
        }
    }
}

impl Error for LessonError {}

/// Recurring weekly lesson with a fixed number of occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    day: Weekday,
    start_time: NaiveTime,
    end_time: NaiveTime,
    number_of_occurrences: usize,
    venue: String,
    attendance: AttendanceRecordList,
}

impl Lesson {
    /// Creates a lesson with an empty attendance timeline.
    pub fn new(
        day: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        number_of_occurrences: usize,
        venue: impl Into<String>,
    ) -> LessonResult<Self> {
        let lesson = Self {
            day,
            start_time,
            end_time,
            number_of_occurrences,
            venue: venue.into(),
            attendance: AttendanceRecordList::new(number_of_occurrences),
        };
        lesson.validate()?;
        Ok(lesson)
    }

    /// Checks the lesson's own invariants.
    ///
    /// Storage calls this on decoded lessons, which bypass [`Lesson::new`].
    pub fn validate(&self) -> LessonResult<()> {
        if self.start_time >= self.end_time {
            return Err(LessonError::InvalidTimeRange {
                start: self.start_time,
                end: self.end_time,
            });
        }
        if self.attendance.len() != self.number_of_occurrences {
            return Err(LessonError::OccurrenceMismatch {
                expected: self.number_of_occurrences,
                actual: self.attendance.len(),
            });
        }
        Ok(())
    }

    pub fn day(&self) -> Weekday {
        self.day
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn number_of_occurrences(&self) -> usize {
        self.number_of_occurrences
    }

    pub fn venue(&self) -> &str {
        &self.venue
    }

    pub fn attendance(&self) -> &AttendanceRecordList {
        &self.attendance
    }

    /// Duplicate-detection identity: schedule and venue, not attendance.
    pub fn is_same_lesson(&self, other: &Lesson) -> bool {
        self.day == other.day
            && self.start_time == other.start_time
            && self.end_time == other.end_time
            && self.venue == other.venue
    }

    /// Looks up one student's score for a week of this lesson.
    pub fn get_attendance(
        &self,
        week: Week,
        student_id: &StudentId,
    ) -> AttendanceResult<Option<Attendance>> {
        self.attendance.get(week, student_id)
    }

    /// Insert-if-absent; see [`AttendanceRecordList::with_added`].
    pub fn with_attendance_added(
        &self,
        week: Week,
        student_id: StudentId,
        attendance: Attendance,
    ) -> AttendanceResult<Self> {
        Ok(self.replacing(self.attendance.with_added(week, student_id, attendance)?))
    }

    /// Upsert; see [`AttendanceRecordList::with_set`].
    pub fn with_attendance_set(
        &self,
        week: Week,
        student_id: StudentId,
        attendance: Attendance,
    ) -> AttendanceResult<Self> {
        Ok(self.replacing(self.attendance.with_set(week, student_id, attendance)?))
    }

    /// Removal; see [`AttendanceRecordList::with_removed`].
    pub fn with_attendance_removed(
        &self,
        week: Week,
        student_id: &StudentId,
    ) -> AttendanceResult<Self> {
        Ok(self.replacing(self.attendance.with_removed(week, student_id)?))
    }

    /// Drops every attendance entry for the student, keeping timeline length.
    ///
    /// Used by the roster's cascade when a student is deleted.
    pub fn without_student(&self, student_id: &StudentId) -> Self {
        let records = self
            .attendance
            .records()
            .iter()
            .map(|record| match record.removed_entry(student_id) {
                Some(updated) => updated,
                None => record.clone(),
            })
            .collect();
        self.replacing(AttendanceRecordList::from_records(records))
    }

    fn replacing(&self, attendance: AttendanceRecordList) -> Self {
        Self {
            day: self.day,
            start_time: self.start_time,
            end_time: self.end_time,
            number_of_occurrences: self.number_of_occurrences,
            venue: self.venue.clone(),
            attendance,
        }
    }
}
