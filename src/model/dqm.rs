//! Discrete quadratic model (DQM) and the cryptarithm DQM builder.
//!
//! A DQM has discrete variables, each taking one of `num_cases` cases. The
//! energy of an assignment is the sum of the chosen cases' linear biases plus,
//! for every pair of variables, the quadratic bias of their chosen case pair.
//!
//! # Examples
//!
//! ```
//! use cryptarithm::coefficients::LetterTally;
//! use cryptarithm::model::build_dqm;
//! use cryptarithm::parser::Puzzle;
//! use cryptarithm::variable::build_variable_list;
//!
//! let puzzle: Puzzle = "A + B = C".parse()?;
//! let tally = LetterTally::from_puzzle(&puzzle);
//! let variables = build_variable_list(&tally);
//! let dqm = build_dqm(&variables, tally.coefficient_map());
//!
//! assert_eq!(dqm.num_variables(), 3);
//! // A=1, B=2, C=3 balances the sum and uses distinct digits
//! assert_eq!(dqm.energy(&[1, 2, 3]), 0.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::variable::LetterVariable;
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};

/// Dense case-by-case bias block between two variables `u < v`,
/// stored row-major: `biases[cu * num_cases(v) + cv]`.
#[derive(Debug, Clone, PartialEq)]
struct Interaction {
    biases: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiscreteQuadraticModel {
    labels: Vec<String>,
    index: HashMap<String, usize>,
    linear: Vec<Vec<f64>>,
    quadratic: BTreeMap<(usize, usize), Interaction>,
}

impl DiscreteQuadraticModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable with `num_cases` cases, returning its index.
    ///
    /// Adding a label twice returns the existing index unchanged.
    pub fn add_variable(&mut self, num_cases: usize, label: impl Into<String>) -> usize {
        let label = label.into();
        if let Some(&existing) = self.index.get(&label) {
            debug_assert_eq!(self.linear[existing].len(), num_cases, "variable {label} re-added with a different case count");
            return existing;
        }
        let v = self.labels.len();
        self.index.insert(label.clone(), v);
        self.labels.push(label);
        self.linear.push(vec![0.0; num_cases]);
        v
    }

    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn num_cases(&self, v: usize) -> usize {
        self.linear[v].len()
    }

    /// Number of stored interaction blocks.
    #[must_use]
    pub fn num_interactions(&self) -> usize {
        self.quadratic.len()
    }

    #[must_use]
    pub fn variable_index(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    #[must_use]
    pub fn label(&self, v: usize) -> &str {
        &self.labels[v]
    }

    pub fn set_linear_case(&mut self, v: usize, case: usize, bias: f64) {
        self.linear[v][case] = bias;
    }

    #[must_use]
    pub fn get_linear_case(&self, v: usize, case: usize) -> f64 {
        self.linear[v][case]
    }

    /// All linear biases of variable `v`, indexed by case.
    #[must_use]
    pub fn linear_biases(&self, v: usize) -> &[f64] {
        &self.linear[v]
    }

    /// Set the bias for `u` in case `cu` together with `v` in case `cv`.
    ///
    /// # Panics
    /// Panics if `u == v`; a variable cannot interact with itself.
    pub fn set_quadratic_case(&mut self, u: usize, cu: usize, v: usize, cv: usize, bias: f64) {
        assert_ne!(u, v, "a variable cannot interact with itself");
        let (u, cu, v, cv) = if u < v { (u, cu, v, cv) } else { (v, cv, u, cu) };
        let rows = self.num_cases(u);
        let cols = self.num_cases(v);
        let block = self
            .quadratic
            .entry((u, v))
            .or_insert_with(|| Interaction { biases: vec![0.0; rows * cols] });
        block.biases[cu * cols + cv] = bias;
    }

    /// Bias for `u` in case `cu` together with `v` in case `cv` (0 if never set).
    #[must_use]
    pub fn get_quadratic_case(&self, u: usize, cu: usize, v: usize, cv: usize) -> f64 {
        let (u, cu, v, cv) = if u < v { (u, cu, v, cv) } else { (v, cv, u, cu) };
        self.quadratic
            .get(&(u, v))
            .map_or(0.0, |block| block.biases[cu * self.num_cases(v) + cv])
    }

    /// Iterate over `(u, v, block)` with `u < v` and `block` row-major in `u`'s cases.
    pub fn interactions(&self) -> impl Iterator<Item = (usize, usize, &[f64])> + '_ {
        self.quadratic.iter().map(|(&(u, v), block)| (u, v, block.biases.as_slice()))
    }

    /// Largest absolute quadratic bias, or 0 for a model without interactions.
    #[must_use]
    pub fn max_abs_quadratic(&self) -> f64 {
        self.quadratic
            .values()
            .flat_map(|block| block.biases.iter())
            .fold(0.0_f64, |acc, b| acc.max(b.abs()))
    }

    /// Energy of an assignment of one case index per variable.
    ///
    /// # Panics
    /// Panics if `sample` does not have one entry per variable.
    #[must_use]
    pub fn energy(&self, sample: &[usize]) -> f64 {
        assert_eq!(sample.len(), self.num_variables(), "sample must assign every variable");
        let linear: f64 = sample.iter().enumerate().map(|(v, &c)| self.linear[v][c]).sum();
        let quadratic: f64 = self
            .quadratic
            .iter()
            .map(|(&(u, v), block)| block.biases[sample[u] * self.num_cases(v) + sample[v]])
            .sum();
        linear + quadratic
    }

    /// Drop interaction blocks whose biases are all zero. Energies are unchanged.
    pub fn compact(&mut self) {
        let before = self.quadratic.len();
        self.quadratic.retain(|_, block| block.biases.iter().any(|&b| b != 0.0));
        debug!("compact: dropped {} of {before} interaction blocks", before - self.quadratic.len());
    }
}

/// Build the cryptarithm DQM from the letter variables.
///
/// The objective is `scale · (Σ coefficient_i · digit_i)²`, expanded into linear
/// and pairwise terms, with `scale = 1 / 2^(#letters)`. On top of that every
/// pair of letters pays `scale · max|quadratic bias|` for sharing a digit.
///
/// When the two domains differ in size (one starts at 1, the other at 0), the
/// shorter domain's case `i` is paired with the longer domain's case `i + 1`.
#[must_use]
pub fn build_dqm(variable_list: &[LetterVariable], coefficient_map: &HashMap<char, i64>) -> DiscreteQuadraticModel {
    let mut dqm = DiscreteQuadraticModel::new();

    // Tames energies for larger puzzles.
    let eq_constr_scale = 1.0 / 2f64.powi(i32::try_from(coefficient_map.len()).unwrap_or(i32::MAX));
    let coefficient = |var: &LetterVariable| coefficient_map.get(&var.name).copied().unwrap_or(var.coefficient) as f64;

    info!("setting linear biases...");
    let indices: Vec<usize> = variable_list
        .iter()
        .map(|var| {
            let v = dqm.add_variable(var.domain_len(), var.name.to_string());
            for (case, digit) in var.domain().enumerate() {
                let term = coefficient(var) * f64::from(digit);
                dqm.set_linear_case(v, case, eq_constr_scale * term * term);
            }
            v
        })
        .collect();

    info!("setting quadratic biases...");
    for (i, var1) in variable_list.iter().enumerate() {
        for (j, var2) in variable_list.iter().enumerate().skip(i + 1) {
            let pair_coefficient = 2.0 * eq_constr_scale * coefficient(var1) * coefficient(var2);
            for (ci, d1) in var1.domain().enumerate() {
                for (cj, d2) in var2.domain().enumerate() {
                    let bias = pair_coefficient * f64::from(d1) * f64::from(d2);
                    dqm.set_quadratic_case(indices[i], ci, indices[j], cj, bias);
                }
            }
        }
    }

    // Large enough to dominate any equality-term interaction.
    let quad_penalty = eq_constr_scale * dqm.max_abs_quadratic();
    debug!("distinctness penalty: {quad_penalty}");

    info!("adding penalty biases...");
    for (i, var1) in variable_list.iter().enumerate() {
        for (j, var2) in variable_list.iter().enumerate().skip(i + 1) {
            let (u, v) = (indices[i], indices[j]);
            let (len1, len2) = (var1.domain_len(), var2.domain_len());
            let aligned: Vec<(usize, usize)> = if len1 < len2 {
                (0..len1).map(|c| (c, c + 1)).collect()
            } else if len1 > len2 {
                (0..len2).map(|c| (c + 1, c)).collect()
            } else {
                (0..len1).map(|c| (c, c)).collect()
            };
            for (cu, cv) in aligned {
                let bias = dqm.get_quadratic_case(u, cu, v, cv);
                dqm.set_quadratic_case(u, cu, v, cv, bias + quad_penalty);
            }
        }
    }

    info!(
        "built DQM with {} variables and {} interactions",
        dqm.num_variables(),
        dqm.num_interactions()
    );
    dqm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::LetterTally;
    use crate::parser::Puzzle;
    use crate::variable::build_variable_list;

    fn abc() -> (Vec<LetterVariable>, HashMap<char, i64>) {
        let variable_list = vec![
            LetterVariable::new('A', 1, false),
            LetterVariable::new('B', 1, false),
            LetterVariable::new('C', -1, false),
        ];
        let coeff_map = HashMap::from([('A', 1), ('B', 1), ('C', -1)]);
        (variable_list, coeff_map)
    }

    fn send_more_money() -> (Vec<LetterVariable>, LetterTally) {
        let puzzle = "SEND + MORE = MONEY".parse::<Puzzle>().unwrap();
        let tally = LetterTally::from_puzzle(&puzzle);
        (build_variable_list(&tally), tally)
    }

    #[test]
    fn test_build_dqm_linear_cases() {
        let (variable_list, coeff_map) = abc();
        let dqm = build_dqm(&variable_list, &coeff_map);

        let scale_factor = 1.0 / 2f64.powi(3);
        assert_eq!(dqm.num_variables(), 3);
        for (v, var) in variable_list.iter().enumerate() {
            for (case, digit) in var.domain().enumerate() {
                let expected = scale_factor * (coeff_map[&var.name] as f64 * f64::from(digit)).powi(2);
                assert_eq!(dqm.get_linear_case(v, case), expected);
            }
        }
    }

    #[test]
    fn test_build_dqm_linear_cases_with_leading_letters() {
        let (variable_list, tally) = send_more_money();
        let dqm = build_dqm(&variable_list, tally.coefficient_map());
        let scale = 1.0 / 256.0;
        for (v, var) in variable_list.iter().enumerate() {
            assert_eq!(dqm.num_cases(v), var.domain_len());
            for (case, digit) in var.domain().enumerate() {
                let expected = scale * (var.coefficient as f64 * f64::from(digit)).powi(2);
                assert_eq!(dqm.get_linear_case(v, case), expected, "letter {} digit {}", var.name, digit);
            }
        }
    }

    #[test]
    fn test_quadratic_cases_and_penalty() {
        let (variable_list, coeff_map) = abc();
        let dqm = build_dqm(&variable_list, &coeff_map);
        let scale = 1.0 / 8.0;
        // max |2·scale·d1·d2·c1·c2| = 2·(1/8)·81
        let penalty = scale * (2.0 * scale * 81.0);

        // A=2, B=3: no shared digit, pure equality term
        assert_eq!(dqm.get_quadratic_case(0, 2, 1, 3), 2.0 * scale * 6.0);
        // A=4, B=4: equality term plus penalty
        assert_eq!(dqm.get_quadratic_case(0, 4, 1, 4), 2.0 * scale * 16.0 + penalty);
        // symmetric access
        assert_eq!(dqm.get_quadratic_case(1, 4, 0, 4), dqm.get_quadratic_case(0, 4, 1, 4));
    }

    #[test]
    fn test_penalty_alignment_for_narrow_domain() {
        // X leads a word (1..=9), Y does not (0..=9)
        let variable_list = vec![LetterVariable::new('X', 1, true), LetterVariable::new('Y', 1, false)];
        let coeff_map = HashMap::from([('X', 1), ('Y', 1)]);
        let dqm = build_dqm(&variable_list, &coeff_map);
        let scale = 0.25;
        let eq = |d1: f64, d2: f64| 2.0 * scale * d1 * d2;
        let penalty = scale * eq(9.0, 9.0);
        // X case 0 is digit 1, Y case 1 is digit 1: penalised
        assert_eq!(dqm.get_quadratic_case(0, 0, 1, 1), eq(1.0, 1.0) + penalty);
        // X case 0 (digit 1) against Y case 0 (digit 0): not penalised
        assert_eq!(dqm.get_quadratic_case(0, 0, 1, 0), eq(1.0, 0.0));
        // X case 8 is digit 9, Y case 9 is digit 9
        assert_eq!(dqm.get_quadratic_case(0, 8, 1, 9), eq(9.0, 9.0) + penalty);
    }

    #[test]
    fn test_penalty_alignment_for_wide_first_domain() {
        let variable_list = vec![LetterVariable::new('Y', 1, false), LetterVariable::new('X', 1, true)];
        let coeff_map = HashMap::from([('X', 1), ('Y', 1)]);
        let dqm = build_dqm(&variable_list, &coeff_map);
        let scale = 0.25;
        let penalty = scale * (2.0 * scale * 81.0);
        // Y case 3 is digit 3, X case 2 is digit 3
        assert_eq!(dqm.get_quadratic_case(0, 3, 1, 2), 2.0 * scale * 9.0 + penalty);
        assert_eq!(dqm.get_quadratic_case(0, 3, 1, 3), 2.0 * scale * 12.0);
    }

    #[test]
    fn test_known_solution_has_zero_energy() {
        let (variable_list, tally) = send_more_money();
        let dqm = build_dqm(&variable_list, tally.coefficient_map());
        let digits = HashMap::from([('S', 9), ('E', 5), ('N', 6), ('D', 7), ('M', 1), ('O', 0), ('R', 8), ('Y', 2)]);
        let sample: Vec<usize> = variable_list
            .iter()
            .map(|var| var.case_of(digits[&var.name]).unwrap())
            .collect();
        assert_eq!(dqm.energy(&sample), 0.0);
    }

    #[test]
    fn test_repeated_digit_is_penalised() {
        let (variable_list, coeff_map) = abc();
        let dqm = build_dqm(&variable_list, &coeff_map);
        // A=0, B=0, C=0 balances the sum but repeats a digit
        assert!(dqm.energy(&[0, 0, 0]) > 0.0);
        // A=1, B=2, C=4 uses distinct digits but does not balance
        assert!(dqm.energy(&[1, 2, 4]) > 0.0);
        assert_eq!(dqm.energy(&[1, 2, 3]), 0.0);
    }

    #[test]
    fn test_build_is_idempotent() {
        let (variable_list, tally) = send_more_money();
        let first = build_dqm(&variable_list, tally.coefficient_map());
        let second = build_dqm(&variable_list, tally.coefficient_map());
        assert_eq!(first, second);
    }

    #[test]
    fn test_pairwise_blocks() {
        let (variable_list, tally) = send_more_money();
        let dqm = build_dqm(&variable_list, tally.coefficient_map());
        assert_eq!(dqm.num_interactions(), 8 * 7 / 2);
        for (u, v, block) in dqm.interactions() {
            assert!(u < v);
            assert_eq!(block.len(), dqm.num_cases(u) * dqm.num_cases(v));
        }
    }

    #[test]
    fn test_add_variable_twice() {
        let mut dqm = DiscreteQuadraticModel::new();
        let a = dqm.add_variable(3, "a");
        let b = dqm.add_variable(2, "b");
        assert_eq!(dqm.add_variable(3, "a"), a);
        assert_eq!(dqm.num_variables(), 2);
        assert_eq!(dqm.variable_index("b"), Some(b));
        assert_eq!(dqm.label(b), "b");
        assert_eq!(dqm.variable_index("c"), None);
    }

    #[test]
    fn test_compact_keeps_energy() {
        let mut dqm = DiscreteQuadraticModel::new();
        let a = dqm.add_variable(2, "a");
        let b = dqm.add_variable(2, "b");
        let c = dqm.add_variable(2, "c");
        dqm.set_linear_case(a, 1, 1.5);
        dqm.set_quadratic_case(a, 1, b, 1, -2.0);
        dqm.set_quadratic_case(b, 0, c, 0, 0.0);
        assert_eq!(dqm.num_interactions(), 2);

        let before = dqm.energy(&[1, 1, 0]);
        dqm.compact();
        assert_eq!(dqm.num_interactions(), 1);
        assert_eq!(dqm.energy(&[1, 1, 0]), before);
        assert_eq!(before, -0.5);
    }

    #[test]
    #[should_panic(expected = "cannot interact with itself")]
    fn test_self_interaction_panics() {
        let mut dqm = DiscreteQuadraticModel::new();
        let a = dqm.add_variable(2, "a");
        dqm.set_quadratic_case(a, 0, a, 1, 1.0);
    }
}
