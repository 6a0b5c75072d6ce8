//! Per-letter positional weights for a puzzle.
//!
//! Every letter gets one signed integer coefficient: the sum of `10^p` over each
//! occurrence, where `p` counts from the units digit of the word it sits in.
//! Words on the right-hand side contribute with a negative sign, so a digit
//! assignment solves the puzzle exactly when `Σ coefficient · digit == 0`.

use crate::parser::Puzzle;
use crate::side::Side;
use std::collections::{HashMap, HashSet};

/// Running coefficient map plus the set of letters that lead a multi-letter word.
///
/// Letters are remembered in order of first appearance so that variable lists
/// (and therefore model indices and printed output) are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterTally {
    order: Vec<char>,
    coefficients: HashMap<char, i64>,
    first_letters: HashSet<char>,
}

impl LetterTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally both sides of a parsed puzzle, left-hand side first.
    #[must_use]
    pub fn from_puzzle(puzzle: &Puzzle) -> Self {
        let mut tally = Self::new();
        tally.update(&puzzle.lhs, Side::Left);
        tally.update(&puzzle.rhs, Side::Right);
        tally
    }

    /// Add the positional weights of `words` (signed by `side`) and record leading letters.
    ///
    /// Single-letter words never restrict their letter from being zero.
    /// Sums saturate at the `i64` bounds; parsed puzzles are checked never to reach them.
    pub fn update<S: AsRef<str>>(&mut self, words: &[S], side: Side) {
        let sign = side.sign();
        for word in words {
            let word = word.as_ref();
            let len = word.chars().count();
            let mut weight = 1i64;
            for (power, letter) in word.chars().rev().enumerate() {
                if !self.coefficients.contains_key(&letter) {
                    self.order.push(letter);
                }
                let coefficient = self.coefficients.entry(letter).or_insert(0);
                *coefficient = coefficient.saturating_add(sign.saturating_mul(weight));
                if power == len - 1 && len > 1 {
                    self.first_letters.insert(letter);
                }
                weight = weight.saturating_mul(10);
            }
        }
    }

    /// Coefficient for `letter`, or 0 if it never appeared.
    #[must_use]
    pub fn coefficient(&self, letter: char) -> i64 {
        self.coefficients.get(&letter).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_first_letter(&self, letter: char) -> bool {
        self.first_letters.contains(&letter)
    }

    /// Letters in order of first appearance.
    #[must_use]
    pub fn letters(&self) -> &[char] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Read-only view of the coefficient map.
    #[must_use]
    pub fn coefficient_map(&self) -> &HashMap<char, i64> {
        &self.coefficients
    }

    #[must_use]
    pub fn first_letters(&self) -> &HashSet<char> {
        &self.first_letters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_cat_dog() {
        let mut tally = LetterTally::new();
        tally.update(&["CAT", "DOG"], Side::Left);

        assert!(tally.is_first_letter('C'));
        assert!(tally.is_first_letter('D'));
        assert!(!tally.is_first_letter('A'));
        assert_eq!(tally.coefficient('C'), 100);
        assert_eq!(tally.coefficient('A'), 10);
        assert_eq!(tally.coefficient('T'), 1);
        assert_eq!(tally.coefficient('D'), 100);
        assert_eq!(tally.coefficient('O'), 10);
        assert_eq!(tally.coefficient('G'), 1);
    }

    #[test]
    fn test_send_more_money_coefficients() {
        let puzzle = "SEND + MORE = MONEY".parse::<Puzzle>().unwrap();
        let tally = LetterTally::from_puzzle(&puzzle);

        assert_eq!(tally.coefficient('S'), 1000);
        assert_eq!(tally.coefficient('E'), 100 + 1 - 10);
        assert_eq!(tally.coefficient('N'), 10 - 100);
        assert_eq!(tally.coefficient('D'), 1);
        assert_eq!(tally.coefficient('M'), 1000 - 10000);
        assert_eq!(tally.coefficient('O'), 100 - 1000);
        assert_eq!(tally.coefficient('R'), 10);
        assert_eq!(tally.coefficient('Y'), -1);

        let mut firsts: Vec<_> = tally.first_letters().iter().copied().collect();
        firsts.sort_unstable();
        assert_eq!(firsts, vec!['M', 'S']);
    }

    #[test]
    fn test_order_of_first_appearance() {
        let puzzle = "SEND + MORE = MONEY".parse::<Puzzle>().unwrap();
        let tally = LetterTally::from_puzzle(&puzzle);
        // each word is walked from the units digit upward
        assert_eq!(tally.letters(), &['D', 'N', 'E', 'S', 'R', 'O', 'M', 'Y']);
        assert_eq!(tally.len(), 8);
    }

    #[test]
    fn test_single_letter_words_are_not_leading() {
        let mut tally = LetterTally::new();
        tally.update(&["A", "B"], Side::Left);
        tally.update(&["C"], Side::Right);
        assert!(tally.first_letters().is_empty());
        assert_eq!(tally.coefficient('C'), -1);
    }

    #[test]
    fn test_letter_leading_in_one_word_only() {
        let mut tally = LetterTally::new();
        tally.update(&["AB", "BA"], Side::Left);
        assert!(tally.is_first_letter('A'));
        assert!(tally.is_first_letter('B'));
        assert_eq!(tally.coefficient('A'), 11);
        assert_eq!(tally.coefficient('B'), 11);
    }

    #[test]
    fn test_unknown_letter_has_zero_coefficient() {
        let tally = LetterTally::new();
        assert!(tally.is_empty());
        assert_eq!(tally.coefficient('Q'), 0);
    }

    #[test]
    fn test_coefficients_cancel() {
        let mut tally = LetterTally::new();
        tally.update(&["AB"], Side::Left);
        tally.update(&["AB"], Side::Right);
        assert_eq!(tally.coefficient('A'), 0);
        assert_eq!(tally.coefficient('B'), 0);
        assert_eq!(tally.letters(), &['B', 'A']);
    }

    #[test]
    fn test_update_saturates_instead_of_overflowing() {
        let word = "A".repeat(18);
        let words = vec![word; 90];
        let mut tally = LetterTally::new();
        tally.update(&words, Side::Left);
        assert_eq!(tally.coefficient('A'), i64::MAX);
        tally.update(&words, Side::Right);
        tally.update(&words, Side::Right);
        assert!(tally.coefficient('A') < 0);
    }
}
