use super::space::{AssignmentKey, VariableSpace};
use crate::data::{ClassId, Day, LockRecord, Period};
use crate::error::{LockConflict, Result, ScheduleError};
use crate::normalize::{NormalizedInput, in_grid};
use good_lp::{Constraint, Expression, Variable, constraint};
use itertools::Itertools;
use log::info;
use std::collections::HashMap;

/// Rejects any lock that cannot be pinned to an available variable.
///
/// Runs before the backend is invoked; the first offending lock in
/// (class, day, period) order is reported.
pub fn check_locks(input: &NormalizedInput) -> Result<()> {
    let mut teacher_slots: HashMap<(u32, Day, Period), ClassId> = HashMap::new();
    let mut room_slots: HashMap<(u32, Day, Period), ClassId> = HashMap::new();

    for lock in input.locks.values() {
        if let Some(reason) = lock_conflict(lock, input) {
            return Err(ScheduleError::ConfigurationConflict { lock: *lock, reason });
        }
        if teacher_slots
            .insert((lock.teacher_id, lock.day, lock.period), lock.class_id)
            .is_some()
        {
            return Err(ScheduleError::ConfigurationConflict {
                lock: *lock,
                reason: LockConflict::TeacherLockedTwice,
            });
        }
        if room_slots
            .insert((lock.room_id, lock.day, lock.period), lock.class_id)
            .is_some()
        {
            return Err(ScheduleError::ConfigurationConflict {
                lock: *lock,
                reason: LockConflict::RoomLockedTwice,
            });
        }
    }
    Ok(())
}

/// Mirrors the enumeration in [`VariableSpace::enumerate`] plus availability.
fn lock_conflict(lock: &LockRecord, input: &NormalizedInput) -> Option<LockConflict> {
    if !in_grid(lock.day, lock.period) {
        Some(LockConflict::OutsideGrid)
    } else if !input.demand.contains_key(&(lock.class_id, lock.subject_id)) {
        Some(LockConflict::NotInDemand)
    } else if !input.teacher_ids.contains(&lock.teacher_id) {
        Some(LockConflict::UnknownTeacher)
    } else if !input.is_eligible(lock.teacher_id, lock.subject_id) {
        Some(LockConflict::TeacherIneligible)
    } else if !input.room_ids.contains(&lock.room_id) {
        Some(LockConflict::UnknownRoom)
    } else if !input.teacher_available(lock.teacher_id, lock.day, lock.period) {
        Some(LockConflict::TeacherUnavailable)
    } else if !input.room_available(lock.room_id, lock.day, lock.period) {
        Some(LockConflict::RoomUnavailable)
    } else {
        None
    }
}

/// All hard constraints of the model.
pub fn encode(input: &NormalizedInput, space: &VariableSpace) -> Vec<Constraint> {
    let mut constraints = Vec::new();

    info!("Adding 'no double-booking' constraints...");
    constraints.extend(exclusivity(space, |k| (k.class_id, k.day, k.period)));
    constraints.extend(exclusivity(space, |k| (k.teacher_id, k.day, k.period)));
    constraints.extend(exclusivity(space, |k| (k.room_id, k.day, k.period)));

    info!("Adding 'availability' constraints...");
    constraints.extend(availability(input, space));

    info!(
        "Adding '{}' demand coverage constraints...",
        if input.strict { "exact" } else { "at least" }
    );
    constraints.extend(coverage(input, space));

    info!("Adding 'lock' constraints...");
    constraints.extend(locks(input, space));

    info!("Encoded {} hard constraints.", constraints.len());
    constraints
}

/// At most one true variable per group; singleton groups need no row.
fn exclusivity<F>(space: &VariableSpace, group: F) -> Vec<Constraint>
where
    F: Fn(&AssignmentKey) -> (u32, Day, Period),
{
    space
        .iter()
        .map(|(key, var)| (group(key), var))
        .into_group_map()
        .into_values()
        .filter(|vars| vars.len() > 1)
        .map(|vars| {
            let occupied: Expression = vars.into_iter().sum();
            constraint!(occupied <= 1)
        })
        .collect()
}

fn availability(input: &NormalizedInput, space: &VariableSpace) -> Vec<Constraint> {
    space
        .iter()
        .filter(|(key, _)| {
            !input.teacher_available(key.teacher_id, key.day, key.period)
                || !input.room_available(key.room_id, key.day, key.period)
        })
        .map(|(_, var)| constraint!(var == 0))
        .collect()
}

fn coverage(input: &NormalizedInput, space: &VariableSpace) -> Vec<Constraint> {
    let by_pair: HashMap<(ClassId, u32), Vec<Variable>> = space
        .iter()
        .map(|(key, var)| ((key.class_id, key.subject_id), var))
        .into_group_map();

    input
        .demand
        .iter()
        .filter_map(|(pair, &required)| {
            let vars = by_pair.get(pair)?;
            let placed: Expression = vars.iter().copied().sum();
            let required = f64::from(required);
            Some(if input.strict {
                constraint!(placed == required)
            } else {
                constraint!(placed >= required)
            })
        })
        .collect()
}

fn locks(input: &NormalizedInput, space: &VariableSpace) -> Vec<Constraint> {
    input
        .locks
        .values()
        .filter_map(|lock| space.get(&AssignmentKey::from(lock)))
        .map(|var| constraint!(var == 1))
        .collect()
}
