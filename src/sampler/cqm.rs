//! Local CQM sampler.
//!
//! Integer variables are searched (exhaustively or by annealing) and every
//! binary is set greedily after each move. Constraint violations are priced
//! into the energy with a fixed penalty weight; a sample is feasible when all
//! violations are within tolerance.

use super::{
    beta_range, beta_schedule, Retained, SampleParams, SampleSet, Sampler, SolveStatus, SolverError, TimeBudget,
    BUDGET_CHECK_INTERVAL, EXHAUSTIVE_LIMIT,
};
use crate::model::cqm::FEASIBILITY_TOLERANCE;
use crate::model::{ConstrainedQuadraticModel, Vartype};
use log::{debug, info};
use rand::Rng;
use std::borrow::Cow;

/// Default weight on total constraint violation.
pub const DEFAULT_PENALTY: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct LocalCqmSampler {
    /// Sweeps over the searched variables in one annealing read.
    pub sweeps_per_read: usize,
    /// Enumerate every integer assignment when there are at most this many.
    pub exhaustive_limit: u128,
    /// Weight on total constraint violation.
    pub penalty: f64,
}

impl Default for LocalCqmSampler {
    fn default() -> Self {
        Self { sweeps_per_read: 1000, exhaustive_limit: EXHAUSTIVE_LIMIT, penalty: DEFAULT_PENALTY }
    }
}

impl Sampler<ConstrainedQuadraticModel> for LocalCqmSampler {
    fn sample(&self, model: &ConstrainedQuadraticModel, params: &SampleParams) -> Result<SampleSet, SolverError> {
        if model.num_variables() == 0 {
            return Err(SolverError::EmptyModel);
        }
        let budget = TimeBudget::new(params.time_limit);
        let model: Cow<'_, ConstrainedQuadraticModel> = if params.compress {
            let mut compacted = model.clone();
            compacted.compact();
            Cow::Owned(compacted)
        } else {
            Cow::Borrowed(model)
        };

        let mut search = Search::new(&model, self.penalty);
        let space = search.space();
        info!(
            "sampling CQM with {} variables and {} constraints ({} searched assignments)...",
            model.num_variables(),
            model.num_constraints(),
            space.map_or_else(|| String::from("too many"), |s| s.to_string())
        );

        let (retained, status) = match space {
            Some(s) if s <= self.exhaustive_limit => search.enumerate(params, &budget),
            _ => self.anneal(&mut search, params, &budget),
        };
        debug!("CQM sampler stopped: {status:?}");
        Ok(SampleSet::new(retained.into_samples(), status, params.label.clone(), budget.elapsed()))
    }
}

impl LocalCqmSampler {
    fn anneal(&self, search: &mut Search<'_>, params: &SampleParams, budget: &TimeBudget) -> (Retained, SolveStatus) {
        let (hot, cold) = beta_range(search.smallest_gap(), search.largest_gap());
        let betas = beta_schedule(hot, cold, self.sweeps_per_read);
        let mut rng = params.rng();
        let mut retained = Retained::default();
        let mut reads = 0usize;

        loop {
            if params.num_reads.is_some_and(|limit| reads >= limit) {
                return (retained, SolveStatus::ReadsCompleted);
            }
            if budget.expired() {
                return (retained, budget.timed_out());
            }

            for idx in 0..search.movable.len() {
                let var = search.movable[idx];
                let (lower, upper) = search.bounds(var);
                search.set(var, rng.gen_range(lower..=upper));
            }
            search.repair_all();

            for &beta in &betas {
                for idx in 0..search.movable.len() {
                    let var = search.movable[idx];
                    let (lower, upper) = search.bounds(var);
                    if lower == upper {
                        continue;
                    }
                    let current = search.values[var];
                    let mut proposed = rng.gen_range(lower..upper);
                    if proposed >= current {
                        proposed += 1;
                    }

                    let before = search.energy();
                    let undo = search.apply(var, proposed);
                    let delta = search.energy() - before;
                    if delta > 0.0 && rng.gen::<f64>() >= (-beta * delta).exp() {
                        search.revert(undo);
                    }
                }
                if search.is_feasible() && params.reached_target(search.energy(), true) {
                    break;
                }
                if budget.expired() {
                    break;
                }
            }
            reads += 1;

            let (energy, feasible) = (search.energy(), search.is_feasible());
            retained.offer(&search.values, energy, feasible);
            if params.reached_target(energy, feasible) {
                debug!("target energy reached after {reads} reads");
                return (retained, SolveStatus::TargetReached);
            }
        }
    }
}

/// Previous values of everything a move touched, most recent last.
type Undo = Vec<(usize, i64)>;

/// Incrementally maintained assignment with per-constraint activities.
struct Search<'m> {
    model: &'m ConstrainedQuadraticModel,
    penalty: f64,
    // var -> (constraint, weight)
    touches: Vec<Vec<(usize, f64)>>,
    objective_weights: Vec<f64>,
    // searched variables, in model order
    movable: Vec<usize>,
    // binaries set greedily after each move
    repaired: Vec<usize>,
    // var -> repaired binaries sharing a constraint with it
    repaired_near: Vec<Vec<usize>>,
    values: Vec<i64>,
    activity: Vec<f64>,
    violation: Vec<f64>,
    total_violation: f64,
    objective: f64,
}

impl<'m> Search<'m> {
    fn new(model: &'m ConstrainedQuadraticModel, penalty: f64) -> Self {
        let n = model.num_variables();
        let mut touches = vec![Vec::new(); n];
        for (k, constraint) in model.constraints().iter().enumerate() {
            for &(var, weight) in &constraint.lhs.terms {
                touches[var].push((k, weight));
            }
        }
        let mut objective_weights = vec![0.0; n];
        for &(var, weight) in &model.objective().terms {
            objective_weights[var] += weight;
        }

        let (integers, binaries): (Vec<usize>, Vec<usize>) =
            (0..n).partition(|&v| matches!(model.variables()[v].vartype, Vartype::Integer { .. }));
        let (movable, repaired) = if integers.is_empty() { (binaries, Vec::new()) } else { (integers, binaries) };

        let mut is_repaired = vec![false; n];
        for &b in &repaired {
            is_repaired[b] = true;
        }
        let repaired_near = (0..n)
            .map(|var| {
                let mut near: Vec<usize> = touches[var]
                    .iter()
                    .flat_map(|&(k, _)| model.constraints()[k].lhs.terms.iter().map(|&(other, _)| other))
                    .filter(|&other| other != var && is_repaired[other])
                    .collect();
                near.sort_unstable();
                near.dedup();
                near
            })
            .collect();

        let values: Vec<i64> = model.variables().iter().map(|v| v.vartype.bounds().0).collect();
        let activity: Vec<f64> = model.constraints().iter().map(|c| c.lhs.evaluate(&values)).collect();
        let violation: Vec<f64> = model
            .constraints()
            .iter()
            .zip(&activity)
            .map(|(c, &a)| c.violation_at(a))
            .collect();
        let total_violation = violation.iter().sum();
        let objective = model.objective_value(&values);

        Self {
            model,
            penalty,
            touches,
            objective_weights,
            movable,
            repaired,
            repaired_near,
            values,
            activity,
            violation,
            total_violation,
            objective,
        }
    }

    fn bounds(&self, var: usize) -> (i64, i64) {
        self.model.variables()[var].vartype.bounds()
    }

    fn energy(&self) -> f64 {
        self.objective + self.penalty * self.total_violation
    }

    fn is_feasible(&self) -> bool {
        self.violation.iter().all(|&v| v <= FEASIBILITY_TOLERANCE)
    }

    fn set(&mut self, var: usize, value: i64) {
        let step = (value - self.values[var]) as f64;
        if step == 0.0 {
            return;
        }
        for &(k, weight) in &self.touches[var] {
            self.activity[k] += weight * step;
            let updated = self.model.constraints()[k].violation_at(self.activity[k]);
            self.total_violation += updated - self.violation[k];
            self.violation[k] = updated;
        }
        self.objective += self.objective_weights[var] * step;
        self.values[var] = value;
    }

    /// Flip binary `b` if that lowers the energy. Returns whether it flipped.
    fn repair(&mut self, b: usize) -> bool {
        let old = self.values[b];
        let before = self.energy();
        self.set(b, 1 - old);
        if self.energy() < before {
            true
        } else {
            self.set(b, old);
            false
        }
    }

    fn repair_all(&mut self) {
        for idx in 0..self.repaired.len() {
            let b = self.repaired[idx];
            self.repair(b);
        }
    }

    /// Set `var` and repair the binaries around it, recording what changed.
    fn apply(&mut self, var: usize, value: i64) -> Undo {
        let mut undo = vec![(var, self.values[var])];
        self.set(var, value);
        for idx in 0..self.repaired_near[var].len() {
            let b = self.repaired_near[var][idx];
            let old = self.values[b];
            if self.repair(b) {
                undo.push((b, old));
            }
        }
        undo
    }

    fn revert(&mut self, undo: Undo) {
        for (var, old) in undo.into_iter().rev() {
            self.set(var, old);
        }
    }

    /// Number of assignments to the searched variables.
    fn space(&self) -> Option<u128> {
        self.movable.iter().try_fold(1u128, |acc, &var| {
            let (lower, upper) = self.bounds(var);
            let width = u128::try_from(upper - lower + 1).unwrap_or(0);
            acc.checked_mul(width)
        })
    }

    fn smallest_gap(&self) -> f64 {
        let weights = self.touches.iter().flatten().map(|&(_, w)| self.penalty * w.abs());
        weights
            .chain(self.objective_weights.iter().map(|w| w.abs()))
            .filter(|&w| w > 0.0)
            .fold(f64::INFINITY, f64::min)
    }

    fn largest_gap(&self) -> f64 {
        self.movable
            .iter()
            .map(|&var| {
                let (lower, upper) = self.bounds(var);
                let width = (upper - lower) as f64;
                let constraints: f64 = self.touches[var].iter().map(|&(_, w)| w.abs()).sum();
                width * (self.penalty * constraints + self.objective_weights[var].abs())
            })
            .fold(0.0, f64::max)
    }

    fn enumerate(&mut self, params: &SampleParams, budget: &TimeBudget) -> (Retained, SolveStatus) {
        let mut retained = Retained::default();
        if self.space() == Some(0) {
            return (retained, SolveStatus::Exhausted);
        }
        for idx in 0..self.movable.len() {
            let var = self.movable[idx];
            let (lower, _) = self.bounds(var);
            self.set(var, lower);
        }
        self.repair_all();
        let mut steps = 0usize;

        loop {
            let (energy, feasible) = (self.energy(), self.is_feasible());
            retained.offer(&self.values, energy, feasible);
            if params.reached_target(energy, feasible) {
                return (retained, SolveStatus::TargetReached);
            }

            // odometer step, first searched variable fastest
            let mut idx = 0;
            loop {
                if idx == self.movable.len() {
                    return (retained, SolveStatus::Exhausted);
                }
                let var = self.movable[idx];
                let (lower, upper) = self.bounds(var);
                if self.values[var] < upper {
                    self.apply(var, self.values[var] + 1);
                    break;
                }
                self.apply(var, lower);
                idx += 1;
            }

            steps += 1;
            if steps % BUDGET_CHECK_INTERVAL == 0 && budget.expired() {
                return (retained, budget.timed_out());
            }
        }
    }
}
