use super::space::VariableSpace;
use crate::data::{Assignment, UnmetSoftConstraint};
use crate::normalize::NormalizedInput;
use good_lp::{Constraint, Expression, ProblemVariables, Variable, constraint, variable};
use log::info;

const LAB_MISMATCH: &str = "Lab Subject In Non-Lab Room";

/// A weighted family of penalty indicators. Each link `(x, m)` carries the
/// constraint `x <= m`, so `m` is 1 whenever the penalised assignment `x` is.
struct IndicatorFamily {
    name: &'static str,
    weight: i64,
    links: Vec<(Variable, Variable)>,
}

/// Minimisation objective built from soft preferences.
pub struct Objective {
    families: Vec<IndicatorFamily>,
}

impl Objective {
    pub fn build(
        problem: &mut ProblemVariables,
        input: &NormalizedInput,
        space: &VariableSpace,
    ) -> Self {
        let links: Vec<(Variable, Variable)> = space
            .iter()
            .filter(|(key, _)| input.is_lab_mismatch(key.subject_id, key.room_id))
            .map(|(_, var)| (var, problem.add(variable().binary())))
            .collect();

        let family = IndicatorFamily {
            name: LAB_MISMATCH,
            weight: input.penalties.room_mismatch,
            links,
        };
        info!(
            "Objective defined with {} '{}' indicators at weight {}.",
            family.links.len(),
            family.name,
            family.weight
        );
        Objective {
            families: vec![family],
        }
    }

    pub fn indicator_count(&self) -> usize {
        self.families.iter().map(|f| f.links.len()).sum()
    }

    pub fn expression(&self) -> Expression {
        self.families
            .iter()
            .map(|family| {
                let hits: Expression = family.links.iter().map(|&(_, m)| m).sum();
                family.weight as f64 * hits
            })
            .sum()
    }

    pub fn link_constraints(&self) -> Vec<Constraint> {
        self.families
            .iter()
            .flat_map(|family| family.links.iter())
            .map(|&(x, m)| constraint!(x <= m))
            .collect()
    }
}

/// Objective value of an accepted assignment set.
pub fn objective_value(assignments: &[Assignment], input: &NormalizedInput) -> i64 {
    let mismatches = assignments
        .iter()
        .filter(|a| input.is_lab_mismatch(a.subject_id, a.room_id))
        .count() as i64;
    mismatches * input.penalties.room_mismatch
}

pub fn unmet_soft_constraints(
    assignments: &[Assignment],
    input: &NormalizedInput,
) -> Vec<UnmetSoftConstraint> {
    assignments
        .iter()
        .filter(|a| input.is_lab_mismatch(a.subject_id, a.room_id))
        .map(|a| UnmetSoftConstraint {
            constraint_type: LAB_MISMATCH.to_string(),
            description: format!(
                "Class {} has lab subject {} in non-lab room {} on day {} period {} (penalty {}).",
                a.class_id, a.subject_id, a.room_id, a.day, a.period, input.penalties.room_mismatch
            ),
        })
        .collect()
}
