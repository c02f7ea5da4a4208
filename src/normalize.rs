//! Turns a raw solve request into the indexed lookups the model builder reads.
//!
//! Defaulting happens here and nowhere else: a missing `available` flag means
//! available, a missing `is_lab` flag means not a lab, and a missing
//! `room_mismatch` weight falls back to the configured default. A grid cell
//! with no availability row at all is unavailable.

use crate::data::{
    AvailabilityRecord, ClassId, DAYS, Day, LockRecord, PERIODS, Period, RoomId, SolveRequest,
    SubjectId, TeacherId,
};
use crate::error::{LockConflict, Result, ScheduleError};
use itertools::Itertools;
use log::debug;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

pub const ROOM_MISMATCH: &str = "room_mismatch";

/// Weights of the soft criteria in the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyWeights {
    pub room_mismatch: i64,
}

/// Request data after indexing, ready for model construction.
#[derive(Debug, Clone)]
pub struct NormalizedInput {
    pub strict: bool,
    pub teacher_ids: Vec<TeacherId>,
    pub room_ids: Vec<RoomId>,
    pub lab_subjects: HashSet<SubjectId>,
    pub lab_rooms: HashSet<RoomId>,
    pub eligibility: HashSet<(TeacherId, SubjectId)>,
    pub teacher_availability: HashSet<(TeacherId, Day, Period)>,
    pub room_availability: HashSet<(RoomId, Day, Period)>,
    pub demand: BTreeMap<(ClassId, SubjectId), u32>,
    pub locks: BTreeMap<(ClassId, Day, Period), LockRecord>,
    pub penalties: PenaltyWeights,
}

impl NormalizedInput {
    pub fn from_request(request: &SolveRequest, default_room_mismatch: i64) -> Result<Self> {
        let teacher_ids = request.teachers.iter().map(|t| t.id).unique().collect();
        let room_ids = request.rooms.iter().map(|r| r.id).unique().collect();
        let lab_subjects = request
            .subjects
            .iter()
            .filter(|s| s.is_lab)
            .map(|s| s.id)
            .collect();
        let lab_rooms = request
            .rooms
            .iter()
            .filter(|r| r.is_lab)
            .map(|r| r.id)
            .collect();
        let eligibility = request
            .teacher_subjects
            .iter()
            .map(|ts| (ts.teacher_id, ts.subject_id))
            .collect();

        let teacher_availability = availability_set("teacher", &request.availability_teacher)?;
        let room_availability = availability_set("room", &request.availability_room)?;

        // later demand rows for the same pair win
        let demand = request
            .demand
            .iter()
            .map(|d| ((d.class_id, d.subject_id), d.periods_required))
            .collect();
        let locks = lock_map(&request.locks)?;

        let penalties = penalty_weights(&request.penalties, default_room_mismatch)?;

        let input = NormalizedInput {
            strict: request.strict,
            teacher_ids,
            room_ids,
            lab_subjects,
            lab_rooms,
            eligibility,
            teacher_availability,
            room_availability,
            demand,
            locks,
            penalties,
        };
        debug!(
            "Normalized week {}: {} demand pairs, {} eligibility pairs, {} locks, strict={}",
            request.week_start,
            input.demand.len(),
            input.eligibility.len(),
            input.locks.len(),
            input.strict
        );
        Ok(input)
    }

    pub fn is_eligible(&self, teacher_id: TeacherId, subject_id: SubjectId) -> bool {
        self.eligibility.contains(&(teacher_id, subject_id))
    }

    pub fn teacher_available(&self, teacher_id: TeacherId, day: Day, period: Period) -> bool {
        self.teacher_availability.contains(&(teacher_id, day, period))
    }

    pub fn room_available(&self, room_id: RoomId, day: Day, period: Period) -> bool {
        self.room_availability.contains(&(room_id, day, period))
    }

    /// A lab subject taught outside a lab room.
    pub fn is_lab_mismatch(&self, subject_id: SubjectId, room_id: RoomId) -> bool {
        self.lab_subjects.contains(&subject_id) && !self.lab_rooms.contains(&room_id)
    }
}

pub fn in_grid(day: Day, period: Period) -> bool {
    day < DAYS && period < PERIODS
}

fn availability_set(
    kind: &str,
    records: &[AvailabilityRecord],
) -> Result<HashSet<(u32, Day, Period)>> {
    if let Some(bad) = records.iter().find(|a| !in_grid(a.day, a.period)) {
        return Err(ScheduleError::MalformedInput(format!(
            "{} {} availability at day {} period {} is outside the {}x{} grid",
            kind, bad.entity_id, bad.day, bad.period, DAYS, PERIODS
        )));
    }
    Ok(records
        .iter()
        .filter(|a| a.available)
        .map(|a| (a.entity_id, a.day, a.period))
        .collect())
}

/// Repeated identical locks collapse into one; two different locks on the
/// same class slot cannot both hold.
fn lock_map(records: &[LockRecord]) -> Result<BTreeMap<(ClassId, Day, Period), LockRecord>> {
    let mut locks = BTreeMap::new();
    for lock in records {
        match locks.insert((lock.class_id, lock.day, lock.period), *lock) {
            Some(previous) if previous != *lock => {
                return Err(ScheduleError::ConfigurationConflict {
                    lock: *lock,
                    reason: LockConflict::ClassLockedTwice,
                });
            }
            _ => {}
        }
    }
    Ok(locks)
}

/// Callers may send their whole stored penalty record, bookkeeping fields
/// included, so only known weights are interpreted.
fn penalty_weights(
    penalties: &BTreeMap<String, Value>,
    default_room_mismatch: i64,
) -> Result<PenaltyWeights> {
    for name in penalties.keys().filter(|name| name.as_str() != ROOM_MISMATCH) {
        debug!("Ignoring unknown penalty weight '{}'", name);
    }
    let room_mismatch = match penalties.get(ROOM_MISMATCH) {
        None => default_room_mismatch,
        Some(value) => whole_number(value).ok_or_else(|| {
            ScheduleError::MalformedInput(format!(
                "penalty weight '{}' must be a whole number, got {}",
                ROOM_MISMATCH, value
            ))
        })?,
    };
    if room_mismatch < 0 {
        return Err(ScheduleError::MalformedInput(format!(
            "penalty weight '{}' must not be negative, got {}",
            ROOM_MISMATCH, room_mismatch
        )));
    }
    Ok(PenaltyWeights { room_mismatch })
}

/// An integer, or a float with no fractional part.
fn whole_number(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|w| w.fract() == 0.0 && w.abs() < i64::MAX as f64)
            .map(|w| w as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> SolveRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn indexes_eligibility_labs_and_availability() {
        let req = request(json!({
            "week_start": "2025-09-01",
            "subjects": [{"id": 10}, {"id": 11, "is_lab": 1}],
            "teachers": [{"id": 100}, {"id": 100}, {"id": 101}],
            "rooms": [{"id": 200, "is_lab": 0}, {"id": 201, "is_lab": 1}],
            "teacher_subjects": [{"teacher_id": 100, "subject_id": 10}],
            "availability_teacher": [
                {"teacher_id": 100, "day": 0, "period": 0},
                {"teacher_id": 100, "day": 0, "period": 1, "available": 0}
            ],
            "availability_room": [{"room_id": 201, "day": 4, "period": 7, "available": 1}]
        }));
        let input = NormalizedInput::from_request(&req, 4).unwrap();

        assert_eq!(input.teacher_ids, vec![100, 101]);
        assert!(input.is_eligible(100, 10));
        assert!(!input.is_eligible(101, 10));
        assert!(input.teacher_available(100, 0, 0));
        assert!(!input.teacher_available(100, 0, 1));
        assert!(!input.teacher_available(101, 0, 0));
        assert!(input.room_available(201, 4, 7));
        assert!(input.is_lab_mismatch(11, 200));
        assert!(!input.is_lab_mismatch(11, 201));
        assert!(!input.is_lab_mismatch(10, 200));
    }

    #[test]
    fn later_demand_rows_win_and_repeated_locks_collapse() {
        let req = request(json!({
            "week_start": "2025-09-01",
            "demand": [
                {"class_id": 1, "subject_id": 10, "periods_required": 3},
                {"class_id": 1, "subject_id": 10, "periods_required": 5}
            ],
            "locks": [
                {"class_id": 1, "day": 0, "period": 0, "subject_id": 10, "teacher_id": 100, "room_id": 200},
                {"class_id": 1, "day": 0, "period": 0, "subject_id": 10, "teacher_id": 100, "room_id": 200}
            ]
        }));
        let input = NormalizedInput::from_request(&req, 4).unwrap();

        assert_eq!(input.demand.get(&(1, 10)), Some(&5));
        assert_eq!(input.locks.len(), 1);
        assert_eq!(input.locks[&(1, 0, 0)].teacher_id, 100);
    }

    #[test]
    fn different_locks_on_one_class_slot_conflict() {
        let req = request(json!({
            "week_start": "2025-09-01",
            "locks": [
                {"class_id": 1, "day": 0, "period": 0, "subject_id": 10, "teacher_id": 101, "room_id": 200},
                {"class_id": 1, "day": 0, "period": 0, "subject_id": 10, "teacher_id": 100, "room_id": 201}
            ]
        }));

        match NormalizedInput::from_request(&req, 4) {
            Err(ScheduleError::ConfigurationConflict { lock, reason }) => {
                assert_eq!(reason, LockConflict::ClassLockedTwice);
                assert_eq!((lock.teacher_id, lock.room_id), (100, 201));
            }
            other => panic!("expected a configuration conflict, got {:?}", other),
        }
    }

    #[test]
    fn penalty_weight_falls_back_to_default() {
        let req = request(json!({"week_start": "w"}));
        let input = NormalizedInput::from_request(&req, 7).unwrap();
        assert_eq!(input.penalties.room_mismatch, 7);

        let req = request(json!({"week_start": "w", "penalties": {"room_mismatch": 2, "gaps": 1}}));
        let input = NormalizedInput::from_request(&req, 7).unwrap();
        assert_eq!(input.penalties.room_mismatch, 2);
    }

    #[test]
    fn penalty_record_bookkeeping_fields_are_ignored() {
        let req = request(json!({
            "week_start": "w",
            "penalties": {
                "_id": "66f0",
                "tenant_slug": "demo",
                "teacher_gap": 1.5,
                "room_mismatch": 3
            }
        }));
        let input = NormalizedInput::from_request(&req, 7).unwrap();
        assert_eq!(input.penalties.room_mismatch, 3);

        let req = request(json!({"week_start": "w", "penalties": {"room_mismatch": 4.0}}));
        let input = NormalizedInput::from_request(&req, 7).unwrap();
        assert_eq!(input.penalties.room_mismatch, 4);
    }

    #[test]
    fn rejects_non_numeric_or_fractional_room_mismatch() {
        for weight in [json!("high"), json!(2.5), json!(null)] {
            let req = request(json!({"week_start": "w", "penalties": {"room_mismatch": weight}}));
            assert!(matches!(
                NormalizedInput::from_request(&req, 4),
                Err(ScheduleError::MalformedInput(_))
            ));
        }
    }

    #[test]
    fn rejects_negative_penalty_and_off_grid_availability() {
        let req = request(json!({"week_start": "w", "penalties": {"room_mismatch": -1}}));
        assert!(matches!(
            NormalizedInput::from_request(&req, 4),
            Err(ScheduleError::MalformedInput(_))
        ));

        let req = request(json!({
            "week_start": "w",
            "availability_room": [{"room_id": 200, "day": 5, "period": 0}]
        }));
        assert!(matches!(
            NormalizedInput::from_request(&req, 4),
            Err(ScheduleError::MalformedInput(_))
        ));
    }
}
