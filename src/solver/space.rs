use crate::data::{
    ClassId, DAYS, Day, LockRecord, PERIODS, Period, RoomId, SubjectId, TeacherId,
};
use crate::normalize::NormalizedInput;
use good_lp::{ProblemVariables, Variable, variable};
use itertools::Itertools;
use log::{trace, warn};
use std::collections::HashMap;

/// One candidate lesson: class `c` learns subject `s` from teacher `t` in
/// room `r` at (`day`, `period`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssignmentKey {
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub room_id: RoomId,
    pub day: Day,
    pub period: Period,
}

impl From<&LockRecord> for AssignmentKey {
    fn from(lock: &LockRecord) -> Self {
        AssignmentKey {
            class_id: lock.class_id,
            subject_id: lock.subject_id,
            teacher_id: lock.teacher_id,
            room_id: lock.room_id,
            day: lock.day,
            period: lock.period,
        }
    }
}

/// The binary decision variables of the model, keyed by assignment.
pub struct VariableSpace {
    keys: Vec<AssignmentKey>,
    vars: Vec<Variable>,
    index: HashMap<AssignmentKey, usize>,
}

impl VariableSpace {
    /// Every structurally possible assignment.
    ///
    /// Only eligibility prunes the product; rooms and availability are left
    /// to the constraint encoder.
    pub fn enumerate(input: &NormalizedInput) -> Vec<AssignmentKey> {
        let mut keys = Vec::new();
        for &(class_id, subject_id) in input.demand.keys() {
            for &teacher_id in &input.teacher_ids {
                if !input.is_eligible(teacher_id, subject_id) {
                    continue;
                }
                for &room_id in &input.room_ids {
                    for day in 0..DAYS {
                        for period in 0..PERIODS {
                            keys.push(AssignmentKey {
                                class_id,
                                subject_id,
                                teacher_id,
                                room_id,
                                day,
                                period,
                            });
                        }
                    }
                }
            }
        }
        keys
    }

    pub fn build(
        problem: &mut ProblemVariables,
        input: &NormalizedInput,
        warning_threshold: usize,
    ) -> Self {
        let keys = Self::enumerate(input);
        trace!(
            "Generated {} assignment variables out of a theoretical maximum of {}.",
            keys.len(),
            input.demand.len()
                * input.teacher_ids.len()
                * input.room_ids.len()
                * (DAYS * PERIODS) as usize
        );
        if keys.len() > warning_threshold {
            warn!(
                "Model has {} assignment variables (threshold {}); expect slow solves and high memory use.",
                keys.len(),
                warning_threshold
            );
        }

        let vars = problem.add_vector(variable().binary(), keys.len());
        let index = keys.iter().enumerate().map(|(i, key)| (*key, i)).collect();
        VariableSpace { keys, vars, index }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, key: &AssignmentKey) -> Option<Variable> {
        self.index.get(key).map(|&i| self.vars[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssignmentKey, Variable)> + '_ {
        self.keys.iter().zip(self.vars.iter().copied())
    }

    /// Number of variables per demand pair. Pairs without any are absent.
    pub fn pair_counts(&self) -> HashMap<(ClassId, SubjectId), usize> {
        self.keys
            .iter()
            .map(|k| (k.class_id, k.subject_id))
            .counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SolveRequest;
    use serde_json::json;

    fn input() -> NormalizedInput {
        let request: SolveRequest = serde_json::from_value(json!({
            "week_start": "2025-09-01",
            "teachers": [{"id": 100}, {"id": 101}],
            "rooms": [{"id": 200}, {"id": 201, "is_lab": 1}],
            "teacher_subjects": [
                {"teacher_id": 100, "subject_id": 10},
                {"teacher_id": 101, "subject_id": 10},
                {"teacher_id": 101, "subject_id": 11}
            ],
            "demand": [
                {"class_id": 1, "subject_id": 10, "periods_required": 3},
                {"class_id": 2, "subject_id": 11, "periods_required": 2},
                {"class_id": 2, "subject_id": 12, "periods_required": 1}
            ]
        }))
        .unwrap();
        NormalizedInput::from_request(&request, 4).unwrap()
    }

    #[test]
    fn enumerates_only_eligible_teachers() {
        let keys = VariableSpace::enumerate(&input());
        let slots = (DAYS * PERIODS) as usize;

        // (1,10): two teachers, (2,11): one teacher, (2,12): nobody
        assert_eq!(keys.len(), (2 + 1) * 2 * slots);
        assert!(keys.iter().all(|k| k.subject_id != 12));
        assert!(
            keys.iter()
                .filter(|k| k.subject_id == 11)
                .all(|k| k.teacher_id == 101)
        );
    }

    #[test]
    fn build_indexes_every_key() {
        let input = input();
        let mut problem = ProblemVariables::new();
        let space = VariableSpace::build(&mut problem, &input, usize::MAX);

        assert_eq!(space.len(), VariableSpace::enumerate(&input).len());
        let counts = space.pair_counts();
        assert!(!counts.contains_key(&(2, 12)));
        assert_eq!(counts[&(2, 11)], 2 * (DAYS * PERIODS) as usize);
        assert_eq!(counts[&(1, 10)], 2 * 2 * (DAYS * PERIODS) as usize);

        let key = AssignmentKey {
            class_id: 1,
            subject_id: 10,
            teacher_id: 100,
            room_id: 201,
            day: 4,
            period: 7,
        };
        assert!(space.get(&key).is_some());
        assert!(space.get(&AssignmentKey { teacher_id: 102, ..key }).is_none());
    }
}
