use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// Type aliases for clarity
pub type ClassId = u32;
pub type SubjectId = u32;
pub type TeacherId = u32;
pub type RoomId = u32;
pub type Day = u32;
pub type Period = u32;

/// Days in the weekly grid.
pub const DAYS: Day = 5;
/// Teaching periods per day.
pub const PERIODS: Period = 8;

/// Accepts either a JSON boolean or a 0/1 integer.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Int(i64),
    }

    Ok(match RawFlag::deserialize(deserializer)? {
        RawFlag::Bool(value) => value,
        RawFlag::Int(value) => value != 0,
    })
}

fn available_by_default() -> bool {
    true
}

fn strict_by_default() -> bool {
    true
}

/// A class (cohort of students) that consumes teaching periods.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Class {
    pub id: ClassId,
}

/// A subject; lab subjects prefer lab rooms.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Subject {
    pub id: SubjectId,
    #[serde(default, deserialize_with = "flag")]
    pub is_lab: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Teacher {
    pub id: TeacherId,
}

/// Represents a physical room, optionally equipped as a lab.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    #[serde(default, deserialize_with = "flag")]
    pub is_lab: bool,
}

/// A teacher is qualified to teach a subject.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct TeacherSubject {
    pub teacher_id: TeacherId,
    pub subject_id: SubjectId,
}

/// One cell of a teacher's or room's weekly availability mask.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct AvailabilityRecord {
    #[serde(alias = "teacher_id", alias = "room_id")]
    pub entity_id: u32,
    pub day: Day,
    pub period: Period,
    #[serde(default = "available_by_default", deserialize_with = "flag")]
    pub available: bool,
}

/// Weekly periods a class needs for a subject.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct DemandRecord {
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    pub periods_required: u32,
}

/// Pins one class slot to a fixed subject, teacher and room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LockRecord {
    pub class_id: ClassId,
    pub day: Day,
    pub period: Period,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub room_id: RoomId,
}

impl fmt::Display for LockRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "class {} at day {} period {} -> subject {}, teacher {}, room {}",
            self.class_id, self.day, self.period, self.subject_id, self.teacher_id, self.room_id
        )
    }
}

/// The complete input for one weekly solve.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SolveRequest {
    pub week_start: String,
    #[serde(default = "strict_by_default")]
    pub strict: bool,
    #[serde(default)]
    pub classes: Vec<Class>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub teacher_subjects: Vec<TeacherSubject>,
    #[serde(default)]
    pub availability_teacher: Vec<AvailabilityRecord>,
    #[serde(default)]
    pub availability_room: Vec<AvailabilityRecord>,
    #[serde(default)]
    pub demand: Vec<DemandRecord>,
    #[serde(default)]
    pub locks: Vec<LockRecord>,
    #[serde(default)]
    pub penalties: BTreeMap<String, serde_json::Value>,
}

/// Represents a single, scheduled lesson.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub room_id: RoomId,
    pub day: Day,
    pub period: Period,
    pub hard_lock: bool,
}

/// How the backend's answer was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    InfeasibleOrUnknown,
}

/// Describes a soft constraint that was not met in the final schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmetSoftConstraint {
    pub constraint_type: String,
    pub description: String,
}

impl fmt::Display for UnmetSoftConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.constraint_type, self.description)
    }
}

/// The final output of a solve request.
///
/// `solution_id` and `objective` are null, and `assignments` empty, when no
/// schedule was found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    pub solution_id: Option<Uuid>,
    pub week_start: String,
    pub status: SolveStatus,
    pub assignments: Vec<Assignment>,
    pub objective: Option<i64>,
    pub unmet_soft_constraints: Vec<UnmetSoftConstraint>,
}

/// A stored solution, either in full or filtered to one teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionView {
    pub assignments: Vec<Assignment>,
    pub objective: i64,
}
