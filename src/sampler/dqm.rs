//! Local DQM sampler: exhaustive enumeration for small search spaces,
//! simulated annealing otherwise.

use super::{
    beta_range, beta_schedule, Retained, SampleParams, SampleSet, Sampler, SolveStatus, SolverError, TimeBudget,
    BUDGET_CHECK_INTERVAL, EXHAUSTIVE_LIMIT,
};
use crate::model::DiscreteQuadraticModel;
use log::{debug, info};
use rand::Rng;
use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct LocalDqmSampler {
    /// Metropolis sweeps in one annealing read.
    pub sweeps_per_read: usize,
    /// Enumerate every assignment when the search space is at most this large.
    pub exhaustive_limit: u128,
}

impl Default for LocalDqmSampler {
    fn default() -> Self {
        Self { sweeps_per_read: 1000, exhaustive_limit: EXHAUSTIVE_LIMIT }
    }
}

impl Sampler<DiscreteQuadraticModel> for LocalDqmSampler {
    fn sample(&self, model: &DiscreteQuadraticModel, params: &SampleParams) -> Result<SampleSet, SolverError> {
        if model.num_variables() == 0 {
            return Err(SolverError::EmptyModel);
        }
        let budget = TimeBudget::new(params.time_limit);
        let model: Cow<'_, DiscreteQuadraticModel> = if params.compress {
            let mut compacted = model.clone();
            compacted.compact();
            Cow::Owned(compacted)
        } else {
            Cow::Borrowed(model)
        };

        let space = search_space(&model);
        info!(
            "sampling DQM with {} variables ({} assignments)...",
            model.num_variables(),
            space.map_or_else(|| String::from("too many"), |s| s.to_string())
        );

        let (retained, status) = match space {
            Some(0) => (Retained::default(), SolveStatus::Exhausted),
            Some(s) if s <= self.exhaustive_limit => enumerate(&model, params, &budget),
            _ => self.anneal(&model, params, &budget),
        };
        debug!("DQM sampler stopped: {status:?}");
        Ok(SampleSet::new(retained.into_samples(), status, params.label.clone(), budget.elapsed()))
    }
}

impl LocalDqmSampler {
    fn anneal(&self, model: &DiscreteQuadraticModel, params: &SampleParams, budget: &TimeBudget) -> (Retained, SolveStatus) {
        let n = model.num_variables();
        let adjacency = Adjacency::new(model);
        let (hot, cold) = beta_range(smallest_gap(model), adjacency.largest_gap(model));
        let betas = beta_schedule(hot, cold, self.sweeps_per_read);
        let mut rng = params.rng();
        let mut retained = Retained::default();
        let mut state = vec![0usize; n];
        let mut values = vec![0i64; n];
        let mut reads = 0usize;

        loop {
            if params.num_reads.is_some_and(|limit| reads >= limit) {
                return (retained, SolveStatus::ReadsCompleted);
            }
            if budget.expired() {
                return (retained, budget.timed_out());
            }

            for (var, case) in state.iter_mut().enumerate() {
                *case = rng.gen_range(0..model.num_cases(var));
            }
            for &beta in &betas {
                for var in 0..n {
                    let num_cases = model.num_cases(var);
                    if num_cases < 2 {
                        continue;
                    }
                    let current = state[var];
                    // uniform over the other cases
                    let mut proposed = rng.gen_range(0..num_cases - 1);
                    if proposed >= current {
                        proposed += 1;
                    }
                    let delta = adjacency.local_field(model, &state, var, proposed)
                        - adjacency.local_field(model, &state, var, current);
                    if delta <= 0.0 || rng.gen::<f64>() < (-beta * delta).exp() {
                        state[var] = proposed;
                    }
                }
                if budget.expired() {
                    break;
                }
            }
            adjacency.descend(model, &mut state);
            reads += 1;

            let energy = model.energy(&state);
            fill_values(&state, &mut values);
            retained.offer(&values, energy, true);
            if params.reached_target(energy, true) {
                debug!("target energy reached after {reads} reads");
                return (retained, SolveStatus::TargetReached);
            }
        }
    }
}

fn enumerate(model: &DiscreteQuadraticModel, params: &SampleParams, budget: &TimeBudget) -> (Retained, SolveStatus) {
    let n = model.num_variables();
    let mut retained = Retained::default();
    let mut state = vec![0usize; n];
    let mut values = vec![0i64; n];
    let mut steps = 0usize;

    loop {
        let energy = model.energy(&state);
        fill_values(&state, &mut values);
        retained.offer(&values, energy, true);
        if params.reached_target(energy, true) {
            return (retained, SolveStatus::TargetReached);
        }

        // odometer step, variable 0 fastest
        let mut var = 0;
        loop {
            if var == n {
                return (retained, SolveStatus::Exhausted);
            }
            state[var] += 1;
            if state[var] < model.num_cases(var) {
                break;
            }
            state[var] = 0;
            var += 1;
        }

        steps += 1;
        if steps % BUDGET_CHECK_INTERVAL == 0 && budget.expired() {
            return (retained, budget.timed_out());
        }
    }
}

/// Number of assignments, or `None` if it does not fit in a `u128`.
fn search_space(model: &DiscreteQuadraticModel) -> Option<u128> {
    (0..model.num_variables()).try_fold(1u128, |acc, v| acc.checked_mul(model.num_cases(v) as u128))
}

fn fill_values(state: &[usize], values: &mut [i64]) {
    for (value, &case) in values.iter_mut().zip(state) {
        *value = case as i64;
    }
}

/// Smallest nonzero absolute bias in the model.
fn smallest_gap(model: &DiscreteQuadraticModel) -> f64 {
    let linear = (0..model.num_variables()).flat_map(|v| model.linear_biases(v).iter().copied());
    let quadratic = model.interactions().flat_map(|(_, _, block)| block.iter().copied());
    linear
        .chain(quadratic)
        .map(f64::abs)
        .filter(|&b| b > 0.0)
        .fold(f64::INFINITY, f64::min)
}

#[derive(Debug, Clone, Copy)]
struct Neighbor {
    other: usize,
    block: usize,
    // true when this variable indexes the block's rows
    row: bool,
}

/// Per-variable view of the interaction blocks.
struct Adjacency<'m> {
    blocks: Vec<(usize, &'m [f64])>,
    neighbors: Vec<Vec<Neighbor>>,
}

impl<'m> Adjacency<'m> {
    fn new(model: &'m DiscreteQuadraticModel) -> Self {
        let mut blocks = Vec::with_capacity(model.num_interactions());
        let mut neighbors = vec![Vec::new(); model.num_variables()];
        for (u, v, biases) in model.interactions() {
            let block = blocks.len();
            blocks.push((model.num_cases(v), biases));
            neighbors[u].push(Neighbor { other: v, block, row: true });
            neighbors[v].push(Neighbor { other: u, block, row: false });
        }
        Self { blocks, neighbors }
    }

    /// Energy contribution of `var` taking `case`, with every other variable as in `state`.
    fn local_field(&self, model: &DiscreteQuadraticModel, state: &[usize], var: usize, case: usize) -> f64 {
        let quadratic: f64 = self.neighbors[var]
            .iter()
            .map(|nb| {
                let (cols, biases) = self.blocks[nb.block];
                let other = state[nb.other];
                if nb.row {
                    biases[case * cols + other]
                } else {
                    biases[other * cols + case]
                }
            })
            .sum();
        model.get_linear_case(var, case) + quadratic
    }

    /// Upper bound on the energy change of any single-variable move.
    fn largest_gap(&self, model: &DiscreteQuadraticModel) -> f64 {
        let spread = |biases: &[f64]| {
            let (lo, hi) = biases
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &b| (lo.min(b), hi.max(b)));
            if lo.is_finite() { hi - lo } else { 0.0 }
        };
        (0..model.num_variables())
            .map(|v| {
                spread(model.linear_biases(v))
                    + self.neighbors[v].iter().map(|nb| spread(self.blocks[nb.block].1)).sum::<f64>()
            })
            .fold(0.0, f64::max)
    }

    /// Move single variables to their best case until nothing improves.
    fn descend(&self, model: &DiscreteQuadraticModel, state: &mut [usize]) {
        loop {
            let mut improved = false;
            for var in 0..state.len() {
                let current = self.local_field(model, state, var, state[var]);
                let best = (0..model.num_cases(var))
                    .map(|case| (case, self.local_field(model, state, var, case)))
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                if let Some((case, field)) = best {
                    if field < current {
                        state[var] = case;
                        improved = true;
                    }
                }
            }
            if !improved {
                return;
            }
        }
    }
}
