use crate::data::LockRecord;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Why a lock cannot be pinned to any variable of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockConflict {
    NotInDemand,
    TeacherIneligible,
    UnknownTeacher,
    UnknownRoom,
    OutsideGrid,
    TeacherUnavailable,
    RoomUnavailable,
    TeacherLockedTwice,
    RoomLockedTwice,
    ClassLockedTwice,
}

impl fmt::Display for LockConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            LockConflict::NotInDemand => "class has no demand for the locked subject",
            LockConflict::TeacherIneligible => "teacher is not eligible for the locked subject",
            LockConflict::UnknownTeacher => "teacher is not part of the request",
            LockConflict::UnknownRoom => "room is not part of the request",
            LockConflict::OutsideGrid => "slot lies outside the weekly grid",
            LockConflict::TeacherUnavailable => "teacher is unavailable in the locked slot",
            LockConflict::RoomUnavailable => "room is unavailable in the locked slot",
            LockConflict::TeacherLockedTwice => "teacher is locked into another class in this slot",
            LockConflict::RoomLockedTwice => "room is locked for another class in this slot",
            LockConflict::ClassLockedTwice => "class already has a different lock in this slot",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Configuration conflict for lock ({lock}): {reason}")]
    ConfigurationConflict {
        lock: LockRecord,
        reason: LockConflict,
    },
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Solution not found: {0}")]
    NotFound(Uuid),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
