use crate::coefficients::LetterTally;
use crate::puzzle_char::{DIGITS, NONZERO_DIGITS};
use std::fmt;
use std::ops::RangeInclusive;

/// One distinct letter of a puzzle with its aggregated coefficient.
///
/// Letters that lead a multi-letter word may not be zero, so their domain is
/// `1..=9`; every other letter ranges over `0..=9`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterVariable {
    pub name: char,
    pub coefficient: i64,
    pub first_letter: bool,
}

impl LetterVariable {
    #[must_use]
    pub fn new(name: char, coefficient: i64, first_letter: bool) -> Self {
        Self { name, coefficient, first_letter }
    }

    /// Digit values this letter may take.
    #[must_use]
    pub fn domain(&self) -> RangeInclusive<u8> {
        if self.first_letter {
            NONZERO_DIGITS
        } else {
            DIGITS
        }
    }

    /// Number of values in the domain (9 or 10).
    #[must_use]
    pub fn domain_len(&self) -> usize {
        self.domain().count()
    }

    /// Digit for case index `idx`, i.e. `domain[idx]`.
    #[must_use]
    pub fn digit_at(&self, idx: usize) -> Option<u8> {
        self.domain().nth(idx)
    }

    /// Case index of `digit`, if it is in the domain.
    #[must_use]
    pub fn case_of(&self, digit: u8) -> Option<usize> {
        let domain = self.domain();
        domain.contains(&digit).then(|| usize::from(digit - domain.start()))
    }
}

impl fmt::Display for LetterVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let domain = self.domain();
        write!(
            f,
            "(name: {}, coefficient: {}, domain: {}..={})",
            self.name,
            self.coefficient,
            domain.start(),
            domain.end()
        )
    }
}

/// Build the variable list for a tally, in order of first appearance.
#[must_use]
pub fn build_variable_list(tally: &LetterTally) -> Vec<LetterVariable> {
    tally
        .letters()
        .iter()
        .map(|&name| LetterVariable::new(name, tally.coefficient(name), tally.is_first_letter(name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::side::Side;

    #[test]
    fn test_domains() {
        let first_letter = LetterVariable::new('V', 7, true);
        let not_first_letter = LetterVariable::new('W', 42, false);

        assert_eq!(first_letter.domain().collect::<Vec<_>>(), (1..10).collect::<Vec<u8>>());
        assert_eq!(not_first_letter.domain().collect::<Vec<_>>(), (0..10).collect::<Vec<u8>>());
        assert_eq!(first_letter.domain_len(), 9);
        assert_eq!(not_first_letter.domain_len(), 10);
    }

    #[test]
    fn test_digit_at_and_case_of() {
        let leading = LetterVariable::new('S', 1000, true);
        assert_eq!(leading.digit_at(0), Some(1));
        assert_eq!(leading.digit_at(8), Some(9));
        assert_eq!(leading.digit_at(9), None);
        assert_eq!(leading.case_of(0), None);
        assert_eq!(leading.case_of(9), Some(8));

        let other = LetterVariable::new('E', 91, false);
        assert_eq!(other.digit_at(0), Some(0));
        assert_eq!(other.case_of(5), Some(5));
        assert_eq!(other.case_of(10), None);
    }

    #[test]
    fn test_display() {
        let v = LetterVariable::new('S', 1000, true);
        assert_eq!(v.to_string(), "(name: S, coefficient: 1000, domain: 1..=9)");
    }

    #[test]
    fn test_build_variable_list() {
        let mut tally = LetterTally::new();
        tally.update(&["AB"], Side::Left);
        tally.update(&["C"], Side::Right);
        let vars = build_variable_list(&tally);
        assert_eq!(
            vars,
            vec![
                LetterVariable::new('B', 1, false),
                LetterVariable::new('A', 10, true),
                LetterVariable::new('C', -1, false),
            ]
        );
    }
}
