//! Core domain logic for ClassTrack.
//! This crate is the single source of truth for roster invariants and the
//! undo/redo history every command goes through.

pub mod history;
pub mod logging;
pub mod model;
pub mod roster;
pub mod service;
pub mod storage;

pub use history::{
    HistoryEntry, HistoryError, HistoryResult, VersionedRoster, INITIAL_STATE_LABEL,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attendance::{
    Attendance, AttendanceError, AttendanceRecord, AttendanceRecordList, AttendanceResult, Week,
    MAX_ATTENDANCE_SCORE,
};
pub use model::lesson::{Lesson, LessonError, LessonResult};
pub use model::module_class::{ClassError, ClassResult, ModuleClass};
pub use model::student::{Student, StudentId};
pub use roster::{ClassRoster, RosterError, RosterResult};
pub use service::roster_service::{RosterService, ServiceError, ServiceResult, StudentEdit};
pub use storage::{
    decode_roster, encode_roster, load_roster, save_roster, StorageError, StorageResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
