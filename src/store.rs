use crate::data::{Assignment, SolutionView, SolveStatus, TeacherId};
use crate::error::{Result, ScheduleError};
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// A solution as persisted after an accepted solve.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSolution {
    pub week_start: String,
    pub status: SolveStatus,
    pub assignments: Vec<Assignment>,
    pub objective: i64,
}

#[derive(Debug, Default)]
struct Entries {
    by_id: HashMap<Uuid, StoredSolution>,
    order: VecDeque<Uuid>,
}

/// Process-scoped store of accepted solutions.
///
/// Created once at start-up and shared by reference; entries live until
/// [`SolutionStore::clear`] or, when a cap is configured, until they are the
/// oldest past it.
#[derive(Debug, Default)]
pub struct SolutionStore {
    entries: RwLock<Entries>,
    max_solutions: Option<usize>,
}

impl SolutionStore {
    pub fn new(max_solutions: Option<usize>) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            max_solutions,
        }
    }

    /// Stores a solution under a fresh identifier.
    pub fn insert(&self, solution: StoredSolution) -> Uuid {
        let id = Uuid::new_v4();
        let mut entries = self.entries.write();
        entries.by_id.insert(id, solution);
        entries.order.push_back(id);

        if let Some(cap) = self.max_solutions {
            while entries.order.len() > cap {
                if let Some(oldest) = entries.order.pop_front() {
                    entries.by_id.remove(&oldest);
                    debug!("Evicted solution {}", oldest);
                }
            }
        }
        id
    }

    pub fn get(&self, id: &Uuid) -> Result<StoredSolution> {
        self.entries
            .read()
            .by_id
            .get(id)
            .cloned()
            .ok_or(ScheduleError::NotFound(*id))
    }

    pub fn view(&self, id: &Uuid) -> Result<SolutionView> {
        let solution = self.get(id)?;
        Ok(SolutionView {
            assignments: solution.assignments,
            objective: solution.objective,
        })
    }

    /// The assignments of one teacher, in stored order, with the unfiltered
    /// objective. An unknown teacher yields an empty list.
    pub fn view_for_teacher(&self, id: &Uuid, teacher_id: TeacherId) -> Result<SolutionView> {
        let entries = self.entries.read();
        let solution = entries.by_id.get(id).ok_or(ScheduleError::NotFound(*id))?;
        Ok(SolutionView {
            assignments: solution
                .assignments
                .iter()
                .filter(|a| a.teacher_id == teacher_id)
                .cloned()
                .collect(),
            objective: solution.objective,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every stored solution.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let removed = entries.by_id.len();
        entries.by_id.clear();
        entries.order.clear();
        info!("Cleared {} stored solutions", removed);
        removed
    }
}
