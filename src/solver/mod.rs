//! Timetable model formulation and solving.
//!
//! x[c,s,t,r,d,p] = 1 if class c is taught subject s by teacher t in room r
//! at day d, period p. Hard constraints keep every class, teacher and room in
//! at most one place per slot and cover each class's weekly demand; the
//! objective counts lab subjects placed in non-lab rooms.

pub mod constraints;
pub mod objective;
pub mod space;

use crate::config::SolverSettings;
use crate::data::{Assignment, SolveStatus};
use crate::error::Result;
use crate::normalize::NormalizedInput;
use crate::verify;
use good_lp::solvers::{ResolutionError, SolutionStatus};
use good_lp::{ProblemVariables, Solution, SolverModel, default_solver};
use log::{info, warn};
use objective::Objective;
use space::VariableSpace;
use std::time::Instant;

/// An accepted schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub status: SolveStatus,
    pub assignments: Vec<Assignment>,
    pub objective: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Scheduled(Schedule),
    /// Infeasible, or the time budget ran out before any schedule was found.
    NoSchedule,
}

/// Solves one week using the HiGHS ILP solver.
///
/// Lock conflicts abort before the backend is invoked. Infeasibility is an
/// ordinary [`SolveOutcome::NoSchedule`], not an error.
pub fn solve(input: &NormalizedInput, settings: &SolverSettings) -> Result<SolveOutcome> {
    let start_time = Instant::now();
    constraints::check_locks(input)?;

    info!(
        "Setting up ILP model with {} demand pairs, {} teachers and {} rooms...",
        input.demand.len(),
        input.teacher_ids.len(),
        input.room_ids.len()
    );
    let mut problem = ProblemVariables::new();
    let space = VariableSpace::build(&mut problem, input, settings.variable_warning_threshold);

    let candidates = space.pair_counts();
    if let Some((class_id, subject_id)) = input
        .demand
        .iter()
        .filter(|&(_, &required)| required > 0)
        .map(|(&pair, _)| pair)
        .find(|pair| !candidates.contains_key(pair))
    {
        info!(
            "Class {} subject {} has demand but no eligible teacher or room; no schedule.",
            class_id, subject_id
        );
        return Ok(SolveOutcome::NoSchedule);
    }
    if space.is_empty() {
        info!("Nothing to schedule.");
        return Ok(SolveOutcome::Scheduled(Schedule {
            status: SolveStatus::Optimal,
            assignments: Vec::new(),
            objective: 0,
        }));
    }

    let objective = Objective::build(&mut problem, input, &space);
    let mut model = problem
        .minimise(objective.expression())
        .using(default_solver)
        .set_option("time_limit", settings.time_limit_secs)
        .set_option("threads", settings.workers as i32)
        .set_option("random_seed", settings.random_seed)
        .set_option("log_to_console", settings.log_to_console);

    for hard in constraints::encode(input, &space) {
        model.add_constraint(hard);
    }
    for link in objective.link_constraints() {
        model.add_constraint(link);
    }

    info!(
        "Starting ILP solver ({} variables, {:.1}s budget, {} workers)...",
        space.len() + objective.indicator_count(),
        settings.time_limit_secs,
        settings.workers
    );
    let solution = match model.solve() {
        Ok(s) => s,
        Err(ResolutionError::Infeasible) => {
            info!("Model is infeasible after {:.2?}.", start_time.elapsed());
            return Ok(SolveOutcome::NoSchedule);
        }
        Err(e) => {
            warn!("Solver returned no schedule: {}", e);
            return Ok(SolveOutcome::NoSchedule);
        }
    };
    let assignments = extract_assignments(input, &space, &solution);
    let violations = verify::audit(&assignments, input);
    let Some(status) = classify(solution.status(), &violations) else {
        return Ok(SolveOutcome::NoSchedule);
    };

    let objective = objective::objective_value(&assignments, input);
    info!(
        "{:?} schedule with {} assignments and objective {} found in {:.2?}",
        status,
        assignments.len(),
        objective,
        start_time.elapsed()
    );
    Ok(SolveOutcome::Scheduled(Schedule {
        status,
        assignments,
        objective,
    }))
}

/// Maps a backend answer to a response status.
///
/// An answer that breaks a hard constraint is no schedule at all, whatever
/// the backend reported; this happens when the time limit hits before any
/// incumbent exists.
fn classify(status: SolutionStatus, violations: &[verify::Violation]) -> Option<SolveStatus> {
    if let Some(first) = violations.first() {
        warn!(
            "Solver stopped without a valid schedule ({} violations, first: {}).",
            violations.len(),
            first
        );
        return None;
    }
    match status {
        SolutionStatus::Optimal => Some(SolveStatus::Optimal),
        _ => Some(SolveStatus::Feasible),
    }
}

fn extract_assignments(
    input: &NormalizedInput,
    space: &VariableSpace,
    solution: &impl Solution,
) -> Vec<Assignment> {
    let mut assignments: Vec<Assignment> = space
        .iter()
        .filter(|&(_, var)| solution.value(var) > 0.5)
        .map(|(key, _)| {
            let hard_lock = input
                .locks
                .get(&(key.class_id, key.day, key.period))
                .is_some_and(|lock| {
                    lock.subject_id == key.subject_id
                        && lock.teacher_id == key.teacher_id
                        && lock.room_id == key.room_id
                });
            Assignment {
                class_id: key.class_id,
                subject_id: key.subject_id,
                teacher_id: key.teacher_id,
                room_id: key.room_id,
                day: key.day,
                period: key.period,
                hard_lock,
            }
        })
        .collect();
    assignments.sort_by_key(|a| (a.day, a.period, a.class_id));
    assignments
}
