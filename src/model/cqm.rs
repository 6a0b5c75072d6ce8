//! Constrained quadratic model (CQM) and the cryptarithm CQM builder.
//!
//! The model holds typed decision variables (bounded integers and binaries),
//! a linear objective, and labelled linear constraints. The cryptarithm
//! builder leaves the objective empty: any feasible assignment is a solution.

use crate::model::cqm::Sense::{EQ, GE, LE};
use crate::variable::LetterVariable;
use log::info;
use std::fmt;

/// Absolute slack allowed when checking a constraint.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vartype {
    Binary,
    Integer { lower: i64, upper: i64 },
}

impl Vartype {
    #[must_use]
    pub fn bounds(self) -> (i64, i64) {
        match self {
            Vartype::Binary => (0, 1),
            Vartype::Integer { lower, upper } => (lower, upper),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CqmVariable {
    pub label: String,
    pub vartype: Vartype,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    EQ,
    LE,
    GE,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            EQ => "==",
            LE => "<=",
            GE => ">=",
        };
        write!(f, "{s}")
    }
}

/// `Σ weight · x_var + offset`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearExpr {
    pub terms: Vec<(usize, f64)>,
    pub offset: f64,
}

impl LinearExpr {
    #[must_use]
    pub fn new(terms: Vec<(usize, f64)>) -> Self {
        Self { terms, offset: 0.0 }
    }

    #[must_use]
    pub fn evaluate(&self, values: &[i64]) -> f64 {
        self.terms.iter().map(|&(v, w)| w * values[v] as f64).sum::<f64>() + self.offset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub label: String,
    pub lhs: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    /// How far `activity` (the evaluated left-hand side) is from satisfying the constraint.
    #[must_use]
    pub fn violation_at(&self, activity: f64) -> f64 {
        match self.sense {
            EQ => (activity - self.rhs).abs(),
            LE => (activity - self.rhs).max(0.0),
            GE => (self.rhs - activity).max(0.0),
        }
    }

    #[must_use]
    pub fn violation(&self, values: &[i64]) -> f64 {
        self.violation_at(self.lhs.evaluate(values))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let terms: Vec<String> = self.lhs.terms.iter().map(|(v, w)| format!("{w}·x{v}")).collect();
        write!(f, "{}: {} {} {}", self.label, terms.join(" + "), self.sense, self.rhs)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstrainedQuadraticModel {
    variables: Vec<CqmVariable>,
    objective: LinearExpr,
    constraints: Vec<Constraint>,
}

impl ConstrainedQuadraticModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, label: impl Into<String>, vartype: Vartype) -> usize {
        self.variables.push(CqmVariable { label: label.into(), vartype });
        self.variables.len() - 1
    }

    pub fn add_constraint(&mut self, label: impl Into<String>, lhs: LinearExpr, sense: Sense, rhs: f64) -> usize {
        debug_assert!(
            lhs.terms.iter().all(|&(v, _)| v < self.variables.len()),
            "constraints may only reference existing variables"
        );
        self.constraints.push(Constraint { label: label.into(), lhs, sense, rhs });
        self.constraints.len() - 1
    }

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    #[must_use]
    pub fn variables(&self) -> &[CqmVariable] {
        &self.variables
    }

    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[must_use]
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    #[must_use]
    pub fn objective_value(&self, values: &[i64]) -> f64 {
        self.objective.evaluate(values)
    }

    /// Violation of each constraint, in constraint order.
    #[must_use]
    pub fn violations(&self, values: &[i64]) -> Vec<f64> {
        self.constraints.iter().map(|c| c.violation(values)).collect()
    }

    /// True when every value is within its bounds and every constraint holds.
    #[must_use]
    pub fn check_feasible(&self, values: &[i64]) -> bool {
        values.len() == self.variables.len()
            && self.variables.iter().zip(values).all(|(var, &x)| {
                let (lower, upper) = var.vartype.bounds();
                (lower..=upper).contains(&x)
            })
            && self.violations(values).iter().all(|&v| v <= FEASIBILITY_TOLERANCE)
    }

    /// Drop zero-weight terms from the objective and every constraint.
    pub fn compact(&mut self) {
        self.objective.terms.retain(|&(_, w)| w != 0.0);
        for constraint in &mut self.constraints {
            constraint.lhs.terms.retain(|&(_, w)| w != 0.0);
        }
    }
}

/// Build the cryptarithm CQM from the letter variables.
///
/// Variables `0..n` are the letters (bounded integers, in `variable_list`
/// order), followed by one binary indicator per unordered letter pair. The
/// constraints are `Σ coefficient · letter == 0`, then two big-M inequalities
/// per pair that together force the pair's values at least 1 apart.
///
/// The big-M constants come from the integer bounds, which are assumed to lie
/// within `0..=9`.
#[must_use]
pub fn build_cqm(variable_list: &[LetterVariable]) -> ConstrainedQuadraticModel {
    let mut cqm = ConstrainedQuadraticModel::new();

    let letters: Vec<(usize, i64, i64)> = variable_list
        .iter()
        .map(|var| {
            let domain = var.domain();
            let (lower, upper) = (i64::from(*domain.start()), i64::from(*domain.end()));
            let v = cqm.add_variable(var.name.to_string(), Vartype::Integer { lower, upper });
            (v, lower, upper)
        })
        .collect();

    info!("adding equality constraint...");
    let sum = LinearExpr::new(
        letters
            .iter()
            .zip(variable_list)
            .map(|(&(v, _, _), var)| (v, var.coefficient as f64))
            .collect(),
    );
    cqm.add_constraint("sum", sum, EQ, 0.0);

    info!("adding distinctness constraints...");
    for (i, var1) in variable_list.iter().enumerate() {
        for (j, var2) in variable_list.iter().enumerate().skip(i + 1) {
            let (xi, lb_i, ub_i) = letters[i];
            let (xj, lb_j, ub_j) = letters[j];
            let y = cqm.add_variable(format!("y_{}_{}", var1.name, var2.name), Vartype::Binary);

            // y = 1 forces x_i >= x_j + 1; slack when y = 0
            let m_a = (ub_j - lb_i + 1) as f64;
            cqm.add_constraint(
                format!("{}_gt_{}", var1.name, var2.name),
                LinearExpr::new(vec![(xj, 1.0), (xi, -1.0), (y, m_a)]),
                LE,
                m_a - 1.0,
            );

            // y = 0 forces x_j >= x_i + 1; slack when y = 1
            let m_b = (ub_i - lb_j + 1) as f64;
            cqm.add_constraint(
                format!("{}_lt_{}", var1.name, var2.name),
                LinearExpr::new(vec![(xi, 1.0), (xj, -1.0), (y, -m_b)]),
                LE,
                -1.0,
            );
        }
    }

    info!(
        "built CQM with {} variables and {} constraints",
        cqm.num_variables(),
        cqm.num_constraints()
    );
    cqm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::LetterTally;
    use crate::parser::Puzzle;
    use crate::variable::build_variable_list;

    fn variables_for(statement: &str) -> Vec<LetterVariable> {
        let puzzle = statement.parse::<Puzzle>().unwrap();
        build_variable_list(&LetterTally::from_puzzle(&puzzle))
    }

    /// Letter values followed by the indicator each pair needs.
    fn with_indicators(letter_values: &[i64]) -> Vec<i64> {
        let mut values = letter_values.to_vec();
        for i in 0..letter_values.len() {
            for j in (i + 1)..letter_values.len() {
                values.push(i64::from(letter_values[i] > letter_values[j]));
            }
        }
        values
    }

    #[test]
    fn test_variable_and_constraint_counts() {
        for n in 1..=10usize {
            let variable_list: Vec<LetterVariable> = (0..n)
                .map(|k| LetterVariable::new(char::from(b'A' + k as u8), 1, k % 2 == 0))
                .collect();
            let cqm = build_cqm(&variable_list);
            assert_eq!(cqm.num_variables(), n + n * (n - 1) / 2);
            assert_eq!(cqm.num_constraints(), 1 + n * (n - 1));
        }
    }

    #[test]
    fn test_variable_types() {
        let cqm = build_cqm(&variables_for("SEND + MORE = MONEY"));
        let vars = cqm.variables();
        assert_eq!(vars[0].label, "D");
        assert_eq!(vars[0].vartype, Vartype::Integer { lower: 0, upper: 9 });
        assert_eq!(vars[3].label, "S");
        assert_eq!(vars[3].vartype, Vartype::Integer { lower: 1, upper: 9 });
        assert!(vars[8..].iter().all(|v| v.vartype == Vartype::Binary));
        assert_eq!(vars[8].label, "y_D_N");
    }

    #[test]
    fn test_equality_constraint() {
        let variable_list = variables_for("SEND + MORE = MONEY");
        let cqm = build_cqm(&variable_list);
        let sum = &cqm.constraints()[0];
        assert_eq!(sum.label, "sum");
        assert_eq!(sum.sense, Sense::EQ);
        assert_eq!(sum.rhs, 0.0);
        let weights: Vec<f64> = sum.lhs.terms.iter().map(|&(_, w)| w).collect();
        let expected: Vec<f64> = variable_list.iter().map(|v| v.coefficient as f64).collect();
        assert_eq!(weights, expected);
    }

    #[test]
    fn test_known_solution_is_feasible() {
        let variable_list = variables_for("SEND + MORE = MONEY");
        let cqm = build_cqm(&variable_list);
        // order: D N E S R O M Y
        let values = with_indicators(&[7, 6, 5, 9, 8, 0, 1, 2]);
        assert!(cqm.check_feasible(&values));
        assert_eq!(cqm.objective_value(&values), 0.0);
    }

    #[test]
    fn test_repeated_digit_is_infeasible_for_either_indicator() {
        let cqm = build_cqm(&variables_for("A + B = C"));
        // A=B=0, C=0 balances but repeats; no indicator choice can satisfy both gadgets
        for y_ab in 0..=1 {
            let values = vec![0, 0, 0, y_ab, 0, 0];
            assert!(!cqm.check_feasible(&values));
        }
    }

    #[test]
    fn test_wrong_indicator_is_infeasible() {
        let cqm = build_cqm(&variables_for("A + B = C"));
        let mut values = with_indicators(&[1, 2, 3]);
        assert!(cqm.check_feasible(&values));
        // flip y_A_B: claims A > B
        values[3] = 1;
        assert!(!cqm.check_feasible(&values));
    }

    #[test]
    fn test_inactive_branch_is_slack_at_extremes() {
        let variable_list = vec![LetterVariable::new('P', 0, true), LetterVariable::new('Q', 0, false)];
        let cqm = build_cqm(&variable_list);
        for p in 1..=9 {
            for q in 0..=9 {
                if p == q {
                    continue;
                }
                let values = with_indicators(&[p, q]);
                assert!(cqm.check_feasible(&values), "P={p} Q={q} should be feasible");
            }
        }
    }

    #[test]
    fn test_out_of_bounds_is_infeasible() {
        let cqm = build_cqm(&variables_for("AB + C = DE"));
        let mut values = with_indicators(&[0, 1, 2, 3, 4]);
        values[1] = 10;
        assert!(!cqm.check_feasible(&values));
        assert!(!cqm.check_feasible(&values[..3]));
    }

    #[test]
    fn test_violations() {
        let cqm = build_cqm(&variables_for("A + B = C"));
        let values = with_indicators(&[1, 2, 4]);
        let violations = cqm.violations(&values);
        assert_eq!(violations.len(), 7);
        assert_eq!(violations[0], 1.0);
        assert!(violations[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_build_is_idempotent() {
        let variable_list = variables_for("SEND + MORE = MONEY");
        assert_eq!(build_cqm(&variable_list), build_cqm(&variable_list));
    }

    #[test]
    fn test_compact_drops_zero_terms() {
        let variable_list = vec![LetterVariable::new('A', 0, false), LetterVariable::new('B', 1, false)];
        let mut cqm = build_cqm(&variable_list);
        assert_eq!(cqm.constraints()[0].lhs.terms.len(), 2);
        cqm.compact();
        assert_eq!(cqm.constraints()[0].lhs.terms, vec![(1, 1.0)]);
        assert_eq!(cqm.num_constraints(), 3);
    }

    #[test]
    fn test_sense_and_constraint_display() {
        assert_eq!(Sense::EQ.to_string(), "==");
        assert_eq!(Sense::LE.to_string(), "<=");
        assert_eq!(Sense::GE.to_string(), ">=");
        let c = Constraint { label: "c".into(), lhs: LinearExpr::new(vec![(0, 2.0)]), sense: GE, rhs: 1.0 };
        assert_eq!(c.to_string(), "c: 2·x0 >= 1");
        assert_eq!(c.violation(&[0]), 1.0);
        assert_eq!(c.violation(&[1]), 0.0);
    }
}
