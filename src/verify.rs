//! Hard-constraint audit of an assignment set.
//!
//! The orchestrator uses it to reject time-limited backend answers that carry
//! no real incumbent; tests use it to check schedule properties.

use crate::data::{Assignment, ClassId, Day, LockRecord, Period, RoomId, SubjectId, TeacherId};
use crate::normalize::NormalizedInput;
use itertools::Itertools;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("class {class_id} is double-booked at day {day} period {period}")]
    ClassDoubleBooked {
        class_id: ClassId,
        day: Day,
        period: Period,
    },
    #[error("teacher {teacher_id} is double-booked at day {day} period {period}")]
    TeacherDoubleBooked {
        teacher_id: TeacherId,
        day: Day,
        period: Period,
    },
    #[error("room {room_id} is double-booked at day {day} period {period}")]
    RoomDoubleBooked {
        room_id: RoomId,
        day: Day,
        period: Period,
    },
    #[error("teacher {teacher_id} is not eligible for subject {subject_id}")]
    Ineligible {
        teacher_id: TeacherId,
        subject_id: SubjectId,
    },
    #[error("teacher {teacher_id} is unavailable at day {day} period {period}")]
    TeacherUnavailable {
        teacher_id: TeacherId,
        day: Day,
        period: Period,
    },
    #[error("room {room_id} is unavailable at day {day} period {period}")]
    RoomUnavailable {
        room_id: RoomId,
        day: Day,
        period: Period,
    },
    #[error("class {class_id} subject {subject_id} has {placed} periods, {required} required")]
    Coverage {
        class_id: ClassId,
        subject_id: SubjectId,
        required: u32,
        placed: u32,
    },
    #[error("lock not honoured: {0}")]
    LockMissing(LockRecord),
}

fn clashes<F>(assignments: &[Assignment], key: F) -> Vec<(u32, Day, Period)>
where
    F: Fn(&Assignment) -> (u32, Day, Period),
{
    assignments
        .iter()
        .map(key)
        .counts()
        .into_iter()
        .filter(|&(_, n)| n > 1)
        .map(|(k, _)| k)
        .sorted()
        .collect()
}

pub fn audit(assignments: &[Assignment], input: &NormalizedInput) -> Vec<Violation> {
    let mut violations = Vec::new();

    violations.extend(
        clashes(assignments, |a| (a.class_id, a.day, a.period))
            .into_iter()
            .map(|(class_id, day, period)| Violation::ClassDoubleBooked { class_id, day, period }),
    );
    violations.extend(
        clashes(assignments, |a| (a.teacher_id, a.day, a.period))
            .into_iter()
            .map(|(teacher_id, day, period)| Violation::TeacherDoubleBooked {
                teacher_id,
                day,
                period,
            }),
    );
    violations.extend(
        clashes(assignments, |a| (a.room_id, a.day, a.period))
            .into_iter()
            .map(|(room_id, day, period)| Violation::RoomDoubleBooked { room_id, day, period }),
    );

    for a in assignments {
        if !input.is_eligible(a.teacher_id, a.subject_id) {
            violations.push(Violation::Ineligible {
                teacher_id: a.teacher_id,
                subject_id: a.subject_id,
            });
        }
        if !input.teacher_available(a.teacher_id, a.day, a.period) {
            violations.push(Violation::TeacherUnavailable {
                teacher_id: a.teacher_id,
                day: a.day,
                period: a.period,
            });
        }
        if !input.room_available(a.room_id, a.day, a.period) {
            violations.push(Violation::RoomUnavailable {
                room_id: a.room_id,
                day: a.day,
                period: a.period,
            });
        }
    }

    let placed: HashMap<(ClassId, SubjectId), usize> = assignments
        .iter()
        .map(|a| (a.class_id, a.subject_id))
        .counts();
    for (&(class_id, subject_id), &required) in &input.demand {
        let count = placed.get(&(class_id, subject_id)).copied().unwrap_or(0) as u32;
        let covered = if input.strict {
            count == required
        } else {
            count >= required
        };
        if !covered {
            violations.push(Violation::Coverage {
                class_id,
                subject_id,
                required,
                placed: count,
            });
        }
    }

    for lock in input.locks.values() {
        let honoured = assignments.iter().any(|a| {
            a.hard_lock
                && a.class_id == lock.class_id
                && a.day == lock.day
                && a.period == lock.period
                && a.subject_id == lock.subject_id
                && a.teacher_id == lock.teacher_id
                && a.room_id == lock.room_id
        });
        if !honoured {
            violations.push(Violation::LockMissing(*lock));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SolveRequest;
    use serde_json::json;

    fn input(strict: bool) -> NormalizedInput {
        let request: SolveRequest = serde_json::from_value(json!({
            "week_start": "2025-09-01",
            "strict": strict,
            "teachers": [{"id": 100}, {"id": 101}],
            "rooms": [{"id": 200}],
            "teacher_subjects": [{"teacher_id": 100, "subject_id": 10}],
            "availability_teacher": [
                {"teacher_id": 100, "day": 0, "period": 0},
                {"teacher_id": 100, "day": 0, "period": 1}
            ],
            "availability_room": [
                {"room_id": 200, "day": 0, "period": 0},
                {"room_id": 200, "day": 0, "period": 1}
            ],
            "demand": [{"class_id": 1, "subject_id": 10, "periods_required": 1}],
            "locks": [{"class_id": 1, "day": 0, "period": 1, "subject_id": 10, "teacher_id": 100, "room_id": 200}]
        }))
        .unwrap();
        NormalizedInput::from_request(&request, 4).unwrap()
    }

    fn lesson(teacher_id: u32, period: u32, hard_lock: bool) -> Assignment {
        Assignment {
            class_id: 1,
            subject_id: 10,
            teacher_id,
            room_id: 200,
            day: 0,
            period,
            hard_lock,
        }
    }

    #[test]
    fn clean_schedule_has_no_violations() {
        assert!(audit(&[lesson(100, 1, true)], &input(true)).is_empty());
    }

    #[test]
    fn relaxed_mode_accepts_over_coverage() {
        let schedule = [lesson(100, 0, false), lesson(100, 1, true)];
        assert!(audit(&schedule, &input(false)).is_empty());
        assert_eq!(
            audit(&schedule, &input(true)),
            vec![Violation::Coverage {
                class_id: 1,
                subject_id: 10,
                required: 1,
                placed: 2
            }]
        );
    }

    #[test]
    fn reports_clashes_eligibility_availability_and_locks() {
        let violations = audit(&[lesson(101, 1, false), lesson(101, 1, false)], &input(false));

        assert!(violations.contains(&Violation::ClassDoubleBooked {
            class_id: 1,
            day: 0,
            period: 1
        }));
        assert!(violations.contains(&Violation::TeacherDoubleBooked {
            teacher_id: 101,
            day: 0,
            period: 1
        }));
        assert!(violations.contains(&Violation::RoomDoubleBooked {
            room_id: 200,
            day: 0,
            period: 1
        }));
        assert!(violations.contains(&Violation::Ineligible {
            teacher_id: 101,
            subject_id: 10
        }));
        assert!(violations.contains(&Violation::TeacherUnavailable {
            teacher_id: 101,
            day: 0,
            period: 1
        }));
        assert!(violations.iter().any(|v| matches!(v, Violation::LockMissing(_))));
    }

    #[test]
    fn empty_schedule_fails_coverage() {
        let violations = audit(&[], &input(true));
        assert!(violations.iter().any(|v| matches!(v, Violation::Coverage { placed: 0, .. })));
    }
}
