//! Root aggregate owning all students and module classes.
//!
//! # Responsibility
//! - Enforce student and class uniqueness across the whole dataset.
//! - Maintain link integrity: every id referenced by a class belongs to a
//!   student currently in the roster, kept true by cascading deletion.
//!
//! # Invariants
//! - No two students are "same student"; no two classes are "same class".
//! - Every mutator validates fully before touching state, so a failed
//!   operation leaves the roster value-identical to before.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::module_class::{ClassError, ModuleClass};
use crate::model::student::{Student, StudentId};

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// An existing student is "same student" as the candidate.
    DuplicateStudent,
    /// An existing class is "same class" as the candidate.
    DuplicateClass,
    /// No student with this id is in the roster.
    StudentNotFound(StudentId),
    /// No class with this name is in the roster.
    ClassNotFound(String),
    /// Class-level failure bubbled up unchanged.
    Class(ClassError),
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateStudent => write!(f, "an equivalent student already exists"),
            Self::DuplicateClass => write!(f, "a class with this name already exists"),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::ClassNotFound(name) => write!(f, "class not found: {name}"),
            Self::Class(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RosterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Class(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ClassError> for RosterError {
    fn from(value: ClassError) -> Self {
        Self::Class(value)
    }
}

/// The whole in-memory dataset: the unit of snapshotting for undo/redo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRoster {
    students: Vec<Student>,
    module_classes: Vec<ModuleClass>,
}

impl ClassRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn module_classes(&self) -> &[ModuleClass] {
        &self.module_classes
    }

    pub fn student_by_id(&self, id: &StudentId) -> Option<&Student> {
        self.students.iter().find(|student| student.id() == *id)
    }

    pub fn class_by_name(&self, name: &str) -> Option<&ModuleClass> {
        self.module_classes
            .iter()
            .find(|class| class.name().eq_ignore_ascii_case(name))
    }

    /// Appends a student, rejecting "same student" duplicates.
    pub fn add_student(&mut self, student: Student) -> RosterResult<()> {
        if self.students.iter().any(|own| own.is_same_student(&student)) {
            return Err(RosterError::DuplicateStudent);
        }
        self.students.push(student);
        Ok(())
    }

    /// Removes a student and cascades: every class loses the id from its
    /// enrollment set and every attendance entry recorded for it.
    ///
    /// The cascade itself cannot fail, so no partial state is possible.
    pub fn delete_student(&mut self, id: &StudentId) -> RosterResult<()> {
        let position = self
            .students
            .iter()
            .position(|student| student.id() == *id)
            .ok_or(RosterError::StudentNotFound(*id))?;
        self.students.remove(position);
        for class in &mut self.module_classes {
            if class.has_student(id) {
                *class = class.without_student(id);
            }
        }
        Ok(())
    }

    /// Replaces the student with the same id as `new`.
    ///
    /// The id is preserved by the edit builder, never user-supplied, so
    /// lookup by `new.id()` finds the entry being edited.
    pub fn set_student(&mut self, new: Student) -> RosterResult<()> {
        let position = self
            .students
            .iter()
            .position(|student| student.id() == new.id())
            .ok_or(RosterError::StudentNotFound(new.id()))?;
        let collision = self
            .students
            .iter()
            .enumerate()
            .any(|(index, own)| index != position && own.is_same_student(&new));
        if collision {
            return Err(RosterError::DuplicateStudent);
        }
        self.students[position] = new;
        Ok(())
    }

    /// Appends a class, rejecting "same class" duplicates and enrollment
    /// ids that do not belong to any student in the roster.
    pub fn add_module_class(&mut self, class: ModuleClass) -> RosterResult<()> {
        if self
            .module_classes
            .iter()
            .any(|own| own.is_same_class(&class))
        {
            return Err(RosterError::DuplicateClass);
        }
        self.check_links(&class)?;
        self.module_classes.push(class);
        Ok(())
    }

    /// Removes a class by name. Students are never affected: nothing in a
    /// `Student` references classes.
    pub fn delete_module_class(&mut self, name: &str) -> RosterResult<()> {
        let position = self
            .module_classes
            .iter()
            .position(|class| class.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| RosterError::ClassNotFound(name.to_string()))?;
        self.module_classes.remove(position);
        Ok(())
    }

    /// Replaces the class currently named `old_name`.
    pub fn set_module_class(&mut self, old_name: &str, new: ModuleClass) -> RosterResult<()> {
        let position = self
            .module_classes
            .iter()
            .position(|class| class.name().eq_ignore_ascii_case(old_name))
            .ok_or_else(|| RosterError::ClassNotFound(old_name.to_string()))?;
        let collision = self
            .module_classes
            .iter()
            .enumerate()
            .any(|(index, own)| index != position && own.is_same_class(&new));
        if collision {
            return Err(RosterError::DuplicateClass);
        }
        self.check_links(&new)?;
        self.module_classes[position] = new;
        Ok(())
    }

    /// Links a student into a class's enrollment set.
    ///
    /// Class-level failures (`AlreadyLinked`) bubble up unchanged.
    pub fn link_student(&mut self, class_name: &str, student_id: StudentId) -> RosterResult<()> {
        if self.student_by_id(&student_id).is_none() {
            return Err(RosterError::StudentNotFound(student_id));
        }
        let position = self
            .module_classes
            .iter()
            .position(|class| class.name().eq_ignore_ascii_case(class_name))
            .ok_or_else(|| RosterError::ClassNotFound(class_name.to_string()))?;
        let updated = self.module_classes[position].with_student_linked(student_id)?;
        self.module_classes[position] = updated;
        Ok(())
    }

    /// Removes a student from a class's enrollment set (`NotLinked` when
    /// absent). Recorded attendance is untouched; only deletion cascades.
    pub fn unlink_student(&mut self, class_name: &str, student_id: &StudentId) -> RosterResult<()> {
        let position = self
            .module_classes
            .iter()
            .position(|class| class.name().eq_ignore_ascii_case(class_name))
            .ok_or_else(|| RosterError::ClassNotFound(class_name.to_string()))?;
        let updated = self.module_classes[position].with_student_unlinked(student_id)?;
        self.module_classes[position] = updated;
        Ok(())
    }

    /// Filtered read-only projection of the student list.
    pub fn filter_students<'a>(
        &'a self,
        predicate: impl Fn(&Student) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Student> {
        self.students.iter().filter(move |student| predicate(student))
    }

    /// Filtered read-only projection of the class list.
    pub fn filter_classes<'a>(
        &'a self,
        predicate: impl Fn(&ModuleClass) -> bool + 'a,
    ) -> impl Iterator<Item = &'a ModuleClass> {
        self.module_classes.iter().filter(move |class| predicate(class))
    }

    fn check_links(&self, class: &ModuleClass) -> RosterResult<()> {
        for id in class.student_ids() {
            if self.student_by_id(id).is_none() {
                return Err(RosterError::StudentNotFound(*id));
            }
        }
        Ok(())
    }
}
