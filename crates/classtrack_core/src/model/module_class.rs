//! Module class domain model.
//!
//! # Responsibility
//! - Define the class value object: name, enrolled student ids, lessons.
//! - Provide edit operations that return a replacement copy.
//!
//! # Invariants
//! - `student_ids` is the only student↔class linkage in the system; there is
//!   no back-pointer on `Student`, so the root aggregate owns link integrity.
//! - No two lessons in one class are "same lesson".
//! - "Same class" compares names case-insensitively.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::lesson::Lesson;
use crate::model::student::StudentId;

pub type ClassResult<T> = Result<T, ClassError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassError {
    /// The student id is already in `student_ids`.
    AlreadyLinked(StudentId),
    /// The student id is not in `student_ids`.
    NotLinked(StudentId),
    /// The lesson collides ("same lesson") with a different existing lesson.
    DuplicateLesson,
    /// No lesson in this class matches ("same lesson") the target.
    LessonNotFound,
}

impl Display for ClassError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyLinked(id) => write!(f, "student {id} is already in this class"),
            Self::NotLinked(id) => write!(f, "student {id} is not in this class"),
            Self::DuplicateLesson => write!(f, "an equivalent lesson already exists in this class"),
            Self::LessonNotFound => write!(f, "no such lesson exists in this class"),
        }
    }
}

impl Error for ClassError {}

/// Immutable module class value object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleClass {
    name: String,
    student_ids: BTreeSet<StudentId>,
    lessons: Vec<Lesson>,
}

impl ModuleClass {
    /// Creates an empty class with no enrolled students or lessons.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            student_ids: BTreeSet::new(),
            lessons: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn student_ids(&self) -> &BTreeSet<StudentId> {
        &self.student_ids
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn has_student(&self, student_id: &StudentId) -> bool {
        self.student_ids.contains(student_id)
    }

    /// Duplicate-detection identity: case-insensitive name.
    pub fn is_same_class(&self, other: &ModuleClass) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }

    /// Builds a renamed copy, keeping enrollment and lessons.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            student_ids: self.student_ids.clone(),
            lessons: self.lessons.clone(),
        }
    }

    /// Adds a student id, failing with `AlreadyLinked` when present.
    pub fn with_student_linked(&self, student_id: StudentId) -> ClassResult<Self> {
        if self.student_ids.contains(&student_id) {
            return Err(ClassError::AlreadyLinked(student_id));
        }
        let mut student_ids = self.student_ids.clone();
        student_ids.insert(student_id);
        Ok(Self {
            name: self.name.clone(),
            student_ids,
            lessons: self.lessons.clone(),
        })
    }

    /// Removes a student id, failing with `NotLinked` when absent.
    pub fn with_student_unlinked(&self, student_id: &StudentId) -> ClassResult<Self> {
        if !self.student_ids.contains(student_id) {
            return Err(ClassError::NotLinked(*student_id));
        }
        let mut student_ids = self.student_ids.clone();
        student_ids.remove(student_id);
        Ok(Self {
            name: self.name.clone(),
            student_ids,
            lessons: self.lessons.clone(),
        })
    }

    /// Removes a student id and every attendance entry recorded for it.
    ///
    /// Cannot fail: used by the roster's deletion cascade, which must never
    /// leave a partially updated class behind.
    pub fn without_student(&self, student_id: &StudentId) -> Self {
        let mut student_ids = self.student_ids.clone();
        student_ids.remove(student_id);
        let lessons = self
            .lessons
            .iter()
            .map(|lesson| lesson.without_student(student_id))
            .collect();
        Self {
            name: self.name.clone(),
            student_ids,
            lessons,
        }
    }

    /// Appends a lesson, failing with `DuplicateLesson` on a "same lesson"
    /// collision.
    pub fn with_lesson_added(&self, lesson: Lesson) -> ClassResult<Self> {
        if self.lessons.iter().any(|own| own.is_same_lesson(&lesson)) {
            return Err(ClassError::DuplicateLesson);
        }
        let mut lessons = self.lessons.clone();
        lessons.push(lesson);
        Ok(Self {
            name: self.name.clone(),
            student_ids: self.student_ids.clone(),
            lessons,
        })
    }

    /// Replaces `old` with `new`, scanning by "same lesson".
    ///
    /// Fails with `LessonNotFound` when `old` is absent, and with
    /// `DuplicateLesson` when `new` collides with a different lesson.
    pub fn with_lesson_replaced(&self, old: &Lesson, new: Lesson) -> ClassResult<Self> {
        let position = self
            .lessons
            .iter()
            .position(|own| own.is_same_lesson(old))
            .ok_or(ClassError::LessonNotFound)?;

        let collision = self
            .lessons
            .iter()
            .enumerate()
            .any(|(index, own)| index != position && own.is_same_lesson(&new));
        if collision {
            return Err(ClassError::DuplicateLesson);
        }

        let mut lessons = self.lessons.clone();
        lessons[position] = new;
        Ok(Self {
            name: self.name.clone(),
            student_ids: self.student_ids.clone(),
            lessons,
        })
    }

    /// Removes the lesson matching ("same lesson") the target.
    pub fn with_lesson_removed(&self, lesson: &Lesson) -> ClassResult<Self> {
        let position = self
            .lessons
            .iter()
            .position(|own| own.is_same_lesson(lesson))
            .ok_or(ClassError::LessonNotFound)?;
        let mut lessons = self.lessons.clone();
        lessons.remove(position);
        Ok(Self {
            name: self.name.clone(),
            student_ids: self.student_ids.clone(),
            lessons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ClassError, ModuleClass};
    use crate::model::lesson::Lesson;
    use chrono::{NaiveTime, Weekday};
    use uuid::Uuid;

    fn lesson(venue: &str) -> Lesson {
        Lesson::new(
            Weekday::Mon,
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            10,
            venue,
        )
        .unwrap()
    }

    #[test]
    fn same_class_is_case_insensitive() {
        let first = ModuleClass::new("CS2103T Tutorial");
        let second = ModuleClass::new("cs2103t tutorial");
        assert!(first.is_same_class(&second));
    }

    #[test]
    fn link_twice_fails_and_leaves_original_untouched() {
        let student = Uuid::new_v4();
        let class = ModuleClass::new("CS2103T Tutorial");

        let linked = class.with_student_linked(student).expect("first link works");
        assert!(linked.has_student(&student));
        assert!(!class.has_student(&student));

        let err = linked
            .with_student_linked(student)
            .expect_err("second link must fail");
        assert_eq!(err, ClassError::AlreadyLinked(student));
    }

    #[test]
    fn unlink_requires_existing_link() {
        let student = Uuid::new_v4();
        let class = ModuleClass::new("CS2103T Tutorial");
        let err = class
            .with_student_unlinked(&student)
            .expect_err("unlink without link must fail");
        assert_eq!(err, ClassError::NotLinked(student));
    }

    #[test]
    fn lesson_replace_detects_collisions_with_other_lessons() {
        let class = ModuleClass::new("CS2103T Tutorial")
            .with_lesson_added(lesson("COM1-0211"))
            .unwrap()
            .with_lesson_added(lesson("COM1-B103"))
            .unwrap();

        let err = class
            .with_lesson_replaced(&lesson("COM1-0211"), lesson("COM1-B103"))
            .expect_err("replacement colliding with another lesson must fail");
        assert_eq!(err, ClassError::DuplicateLesson);

        let err = class
            .with_lesson_replaced(&lesson("Nowhere"), lesson("COM1-0420"))
            .expect_err("replacing a missing lesson must fail");
        assert_eq!(err, ClassError::LessonNotFound);
    }
}
