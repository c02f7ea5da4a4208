use crate::config::AppConfig;
use crate::data::{SolveRequest, SolveResponse, SolveStatus};
use crate::error::Result;
use crate::normalize::NormalizedInput;
use crate::solver::{self, SolveOutcome, objective};
use crate::store::{SolutionStore, StoredSolution};
use log::info;

/// Runs one synchronous solve and stores an accepted schedule.
pub fn solve_and_store(
    request: &SolveRequest,
    config: &AppConfig,
    store: &SolutionStore,
) -> Result<SolveResponse> {
    let input = NormalizedInput::from_request(request, config.penalties.room_mismatch)?;

    let schedule = match solver::solve(&input, &config.solver)? {
        SolveOutcome::Scheduled(schedule) => schedule,
        SolveOutcome::NoSchedule => {
            info!("No schedule for week {}", request.week_start);
            return Ok(SolveResponse {
                solution_id: None,
                week_start: request.week_start.clone(),
                status: SolveStatus::InfeasibleOrUnknown,
                assignments: Vec::new(),
                objective: None,
                unmet_soft_constraints: Vec::new(),
            });
        }
    };

    let unmet_soft_constraints = objective::unmet_soft_constraints(&schedule.assignments, &input);
    let solution_id = store.insert(StoredSolution {
        week_start: request.week_start.clone(),
        status: schedule.status,
        assignments: schedule.assignments.clone(),
        objective: schedule.objective,
    });
    info!(
        "Stored solution {} for week {} ({} assignments)",
        solution_id,
        request.week_start,
        schedule.assignments.len()
    );

    Ok(SolveResponse {
        solution_id: Some(solution_id),
        week_start: request.week_start.clone(),
        status: schedule.status,
        assignments: schedule.assignments,
        objective: Some(schedule.objective),
        unmet_soft_constraints,
    })
}
