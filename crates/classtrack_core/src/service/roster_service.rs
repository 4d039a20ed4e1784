//! Roster use-case service.
//!
//! # Responsibility
//! - Provide the command entry points the UI layer calls, one per user
//!   action, each returning a human-readable result message.
//! - Tie every successful mutation to exactly one history commit, labelled
//!   with the same message.
//!
//! # Invariants
//! - A failed operation leaves the committed roster value-identical to
//!   before: mutations are applied to a clone and installed only on success.
//! - Enrollment is checked here, against the owning class, before any
//!   attendance mutation; the record store itself does not know about it.

use log::{debug, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::history::{HistoryEntry, HistoryError, VersionedRoster};
use crate::model::attendance::{Attendance, AttendanceError, Week};
use crate::model::lesson::Lesson;
use crate::model::module_class::{ClassError, ModuleClass};
use crate::model::student::Student;
use crate::roster::{ClassRoster, RosterError};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error surface of the command entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// 1-based student display index outside the current list.
    InvalidStudentIndex(usize),
    /// 1-based class display index outside the current list.
    InvalidClassIndex(usize),
    /// 1-based lesson display index outside the class's lesson list.
    InvalidLessonIndex(usize),
    /// Aggregate-level failure (duplicates, unknown references).
    Roster(RosterError),
    /// Class-level failure (link state, lesson collisions).
    Class(ClassError),
    /// Attendance-level failure (bounds, duplicates, missing entries).
    Attendance(AttendanceError),
    /// History navigation failure.
    History(HistoryError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStudentIndex(index) => write!(f, "no student at index {index}"),
            Self::InvalidClassIndex(index) => write!(f, "no class at index {index}"),
            Self::InvalidLessonIndex(index) => write!(f, "no lesson at index {index}"),
            Self::Roster(err) => write!(f, "{err}"),
            Self::Class(err) => write!(f, "{err}"),
            Self::Attendance(err) => write!(f, "{err}"),
            Self::History(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Roster(err) => Some(err),
            Self::Class(err) => Some(err),
            Self::Attendance(err) => Some(err),
            Self::History(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RosterError> for ServiceError {
    fn from(value: RosterError) -> Self {
        // class-level failures bubble up unchanged
        match value {
            RosterError::Class(err) => Self::Class(err),
            other => Self::Roster(other),
        }
    }
}

impl From<ClassError> for ServiceError {
    fn from(value: ClassError) -> Self {
        Self::Class(value)
    }
}

impl From<AttendanceError> for ServiceError {
    fn from(value: AttendanceError) -> Self {
        Self::Attendance(value)
    }
}

impl From<HistoryError> for ServiceError {
    fn from(value: HistoryError) -> Self {
        Self::History(value)
    }
}

/// Edit request for a student; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentEdit {
    pub name: Option<String>,
    pub telegram: Option<String>,
    pub email: Option<String>,
    pub tags: Option<BTreeSet<String>>,
}

/// Command facade over the versioned roster.
pub struct RosterService {
    versioned: VersionedRoster,
}

impl Default for RosterService {
    fn default() -> Self {
        Self::new(ClassRoster::new())
    }
}

impl RosterService {
    pub fn new(initial: ClassRoster) -> Self {
        Self {
            versioned: VersionedRoster::new(initial),
        }
    }

    /// The committed roster at the history cursor.
    pub fn roster(&self) -> &ClassRoster {
        self.versioned.current()
    }

    // ---- students ----------------------------------------------------

    pub fn add_student(&mut self, student: Student) -> ServiceResult<String> {
        self.logged("add_student", move |service| {
            let mut next = service.roster().clone();
            let message = format!("Added student {}", student.name());
            next.add_student(student)?;
            service.install(next, &message);
            Ok(message)
        })
    }

    pub fn edit_student(&mut self, index: usize, edit: StudentEdit) -> ServiceResult<String> {
        self.logged("edit_student", move |service| {
            let mut next = service.roster().clone();
            let current = Self::student_at(&next, index)?.clone();
            let edited = current.with_details(edit.name, edit.telegram, edit.email, edit.tags);
            let message = format!("Edited student {}", edited.name());
            next.set_student(edited)?;
            service.install(next, &message);
            Ok(message)
        })
    }

    pub fn delete_student(&mut self, index: usize) -> ServiceResult<String> {
        self.logged("delete_student", move |service| {
            let mut next = service.roster().clone();
            let student = Self::student_at(&next, index)?.clone();
            next.delete_student(&student.id())?;
            let message = format!("Deleted student {}", student.name());
            service.install(next, &message);
            Ok(message)
        })
    }

    // ---- classes -----------------------------------------------------

    pub fn add_class(&mut self, name: impl Into<String>) -> ServiceResult<String> {
        let class = ModuleClass::new(name);
        self.logged("add_class", move |service| {
            let mut next = service.roster().clone();
            let message = format!("Added class {}", class.name());
            next.add_module_class(class)?;
            service.install(next, &message);
            Ok(message)
        })
    }

    pub fn rename_class(&mut self, index: usize, name: impl Into<String>) -> ServiceResult<String> {
        let name = name.into();
        self.logged("rename_class", move |service| {
            let mut next = service.roster().clone();
            let current = Self::class_at(&next, index)?.clone();
            let renamed = current.with_name(name);
            let message = format!("Renamed class {} to {}", current.name(), renamed.name());
            next.set_module_class(current.name(), renamed)?;
            service.install(next, &message);
            Ok(message)
        })
    }

    /// Deleting a class never touches students: nothing in a `Student`
    /// references classes.
    pub fn delete_class(&mut self, index: usize) -> ServiceResult<String> {
        self.logged("delete_class", move |service| {
            let mut next = service.roster().clone();
            let class = Self::class_at(&next, index)?.clone();
            next.delete_module_class(class.name())?;
            let message = format!("Deleted class {}", class.name());
            service.install(next, &message);
            Ok(message)
        })
    }

    // ---- links -------------------------------------------------------

    pub fn link_student(&mut self, class_index: usize, student_index: usize) -> ServiceResult<String> {
        self.logged("link_student", move |service| {
            let mut next = service.roster().clone();
            let class_name = Self::class_at(&next, class_index)?.name().to_string();
            let student = Self::student_at(&next, student_index)?.clone();
            next.link_student(&class_name, student.id())?;
            let message = format!("Linked {} to {class_name}", student.name());
            service.install(next, &message);
            Ok(message)
        })
    }

    pub fn unlink_student(
        &mut self,
        class_index: usize,
        student_index: usize,
    ) -> ServiceResult<String> {
        self.logged("unlink_student", move |service| {
            let mut next = service.roster().clone();
            let class_name = Self::class_at(&next, class_index)?.name().to_string();
            let student = Self::student_at(&next, student_index)?.clone();
            next.unlink_student(&class_name, &student.id())?;
            let message = format!("Unlinked {} from {class_name}", student.name());
            service.install(next, &message);
            Ok(message)
        })
    }

    // ---- lessons -----------------------------------------------------

    pub fn add_lesson(&mut self, class_index: usize, lesson: Lesson) -> ServiceResult<String> {
        self.logged("add_lesson", move |service| {
            let mut next = service.roster().clone();
            let class = Self::class_at(&next, class_index)?.clone();
            let message = format!(
                "Added lesson {} {}-{} @ {} to {}",
                lesson.day(),
                lesson.start_time().format("%H:%M"),
                lesson.end_time().format("%H:%M"),
                lesson.venue(),
                class.name()
            );
            let updated = class.with_lesson_added(lesson)?;
            next.set_module_class(class.name(), updated)?;
            service.install(next, &message);
            Ok(message)
        })
    }

    pub fn delete_lesson(&mut self, class_index: usize, lesson_index: usize) -> ServiceResult<String> {
        self.logged("delete_lesson", move |service| {
            let mut next = service.roster().clone();
            let class = Self::class_at(&next, class_index)?.clone();
            let lesson = Self::lesson_at(&class, lesson_index)?.clone();
            let message = format!(
                "Deleted lesson {} {}-{} @ {} from {}",
                lesson.day(),
                lesson.start_time().format("%H:%M"),
                lesson.end_time().format("%H:%M"),
                lesson.venue(),
                class.name()
            );
            let updated = class.with_lesson_removed(&lesson)?;
            next.set_module_class(class.name(), updated)?;
            service.install(next, &message);
            Ok(message)
        })
    }

    // ---- attendance --------------------------------------------------

    /// Records a score for a student who has none yet for that week.
    pub fn add_attendance(
        &mut self,
        class_index: usize,
        lesson_index: usize,
        student_index: usize,
        week: Week,
        attendance: Attendance,
    ) -> ServiceResult<String> {
        self.logged("add_attendance", move |service| {
            let mut next = service.roster().clone();
            let class = Self::class_at(&next, class_index)?.clone();
            let student = Self::enrolled_student_at(&next, &class, student_index)?;
            let lesson = Self::lesson_at(&class, lesson_index)?.clone();

            let updated_lesson = lesson.with_attendance_added(week, student.id(), attendance)?;
            let updated_class = class.with_lesson_replaced(&lesson, updated_lesson)?;
            next.set_module_class(class.name(), updated_class)?;

            let message = format!(
                "Added attendance {attendance} for {} in week {week}",
                student.name()
            );
            service.install(next, &message);
            Ok(message)
        })
    }

    /// Overwrites an existing score; fails with `AttendanceNotFound` when
    /// the student has no entry for that week.
    pub fn edit_attendance(
        &mut self,
        class_index: usize,
        lesson_index: usize,
        student_index: usize,
        week: Week,
        attendance: Attendance,
    ) -> ServiceResult<String> {
        self.logged("edit_attendance", move |service| {
            let mut next = service.roster().clone();
            let class = Self::class_at(&next, class_index)?.clone();
            let student = Self::enrolled_student_at(&next, &class, student_index)?;
            let lesson = Self::lesson_at(&class, lesson_index)?.clone();

            if lesson.get_attendance(week, &student.id())?.is_none() {
                return Err(AttendanceError::AttendanceNotFound {
                    week: week.number(),
                }
                .into());
            }
            let updated_lesson = lesson.with_attendance_set(week, student.id(), attendance)?;
            let updated_class = class.with_lesson_replaced(&lesson, updated_lesson)?;
            next.set_module_class(class.name(), updated_class)?;

            let message = format!(
                "Edited attendance to {attendance} for {} in week {week}",
                student.name()
            );
            service.install(next, &message);
            Ok(message)
        })
    }

    pub fn delete_attendance(
        &mut self,
        class_index: usize,
        lesson_index: usize,
        student_index: usize,
        week: Week,
    ) -> ServiceResult<String> {
        self.logged("delete_attendance", move |service| {
            let mut next = service.roster().clone();
            let class = Self::class_at(&next, class_index)?.clone();
            let student = Self::enrolled_student_at(&next, &class, student_index)?;
            let lesson = Self::lesson_at(&class, lesson_index)?.clone();

            let updated_lesson = lesson.with_attendance_removed(week, &student.id())?;
            let updated_class = class.with_lesson_replaced(&lesson, updated_lesson)?;
            next.set_module_class(class.name(), updated_class)?;

            let message = format!("Deleted attendance for {} in week {week}", student.name());
            service.install(next, &message);
            Ok(message)
        })
    }

    /// Read-only score lookup; never commits.
    pub fn attendance_of(
        &self,
        class_index: usize,
        lesson_index: usize,
        student_index: usize,
        week: Week,
    ) -> ServiceResult<Option<Attendance>> {
        let roster = self.roster();
        let class = Self::class_at(roster, class_index)?;
        let student = Self::student_at(roster, student_index)?;
        let lesson = Self::lesson_at(class, lesson_index)?;
        Ok(lesson.get_attendance(week, &student.id())?)
    }

    // ---- history navigation (never commits) --------------------------

    pub fn undo(&mut self) -> ServiceResult<String> {
        self.logged("undo", |service| {
            let label = service.versioned.current_label().to_string();
            service.versioned.undo()?;
            info!("event=undo status=ok label={label}");
            Ok(format!("Undone: {label}"))
        })
    }

    pub fn redo(&mut self) -> ServiceResult<String> {
        self.logged("redo", |service| {
            service.versioned.redo()?;
            let label = service.versioned.current_label().to_string();
            info!("event=redo status=ok label={label}");
            Ok(format!("Redone: {label}"))
        })
    }

    pub fn can_undo(&self) -> bool {
        self.versioned.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.versioned.can_redo()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.versioned.history()
    }

    // ---- projections (never commit) -----------------------------------

    /// Case-insensitive name search over students.
    pub fn find_students(&self, keyword: &str) -> Vec<Student> {
        let needle = keyword.to_lowercase();
        self.roster()
            .filter_students(move |student| student.name().to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Case-insensitive name search over classes.
    pub fn find_classes(&self, keyword: &str) -> Vec<ModuleClass> {
        let needle = keyword.to_lowercase();
        self.roster()
            .filter_classes(move |class| class.name().to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    // ---- load boundary -----------------------------------------------

    /// Installs a fully-validated roster as the new initial state.
    ///
    /// The existing history is discarded; the caller must have run the
    /// storage consistency pass first, so a broken roster never gets here.
    pub fn reload(&mut self, roster: ClassRoster) -> String {
        self.versioned.reset(roster);
        info!("event=reload status=ok");
        "Loaded saved data".to_string()
    }

    // ---- internals ---------------------------------------------------

    /// Runs one command, logging rejections at debug.
    ///
    /// The result is passed through unchanged; only the diagnostics differ
    /// between the success and failure paths.
    fn logged(
        &mut self,
        event: &'static str,
        op: impl FnOnce(&mut Self) -> ServiceResult<String>,
    ) -> ServiceResult<String> {
        let result = op(self);
        if let Err(err) = &result {
            debug!("event={event} status=rejected reason={err}");
        }
        result
    }

    fn install(&mut self, next: ClassRoster, message: &str) {
        info!("event=commit status=ok label={message}");
        self.versioned.commit(next, message);
    }

    fn student_at(roster: &ClassRoster, index: usize) -> ServiceResult<&Student> {
        index
            .checked_sub(1)
            .and_then(|zero_based| roster.students().get(zero_based))
            .ok_or(ServiceError::InvalidStudentIndex(index))
    }

    fn class_at(roster: &ClassRoster, index: usize) -> ServiceResult<&ModuleClass> {
        index
            .checked_sub(1)
            .and_then(|zero_based| roster.module_classes().get(zero_based))
            .ok_or(ServiceError::InvalidClassIndex(index))
    }

    fn lesson_at(class: &ModuleClass, index: usize) -> ServiceResult<&Lesson> {
        index
            .checked_sub(1)
            .and_then(|zero_based| class.lessons().get(zero_based))
            .ok_or(ServiceError::InvalidLessonIndex(index))
    }

    /// Resolves a student index and checks enrollment in `class`.
    fn enrolled_student_at(
        roster: &ClassRoster,
        class: &ModuleClass,
        index: usize,
    ) -> ServiceResult<Student> {
        let student = Self::student_at(roster, index)?.clone();
        if !class.has_student(&student.id()) {
            return Err(ClassError::NotLinked(student.id()).into());
        }
        Ok(student)
    }
}
