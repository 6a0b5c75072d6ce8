use std::ops::RangeInclusive;

// Digit and word-size constants
pub const NUM_DIGITS: usize = 10;
pub(crate) const DIGITS: RangeInclusive<u8> = 0..=9;
pub(crate) const NONZERO_DIGITS: RangeInclusive<u8> = 1..=9;

/// Longest word the parser accepts; `10^(MAX_WORD_LEN - 1)` still fits an `i64`
/// with room for summing a handful of words.
pub const MAX_WORD_LEN: usize = 18;

/// Operators that may never appear in a puzzle line.
pub(crate) const EXCLUDED_OPERATORS: [char; 4] = ['*', '-', '^', '%'];

pub(crate) const PLUS: char = '+';
pub(crate) const EQUALS: char = '=';

pub(crate) trait PuzzleChar {
    fn is_puzzle_letter(&self) -> bool;
    fn is_excluded_operator(&self) -> bool;
}

impl PuzzleChar for char {
    fn is_puzzle_letter(&self) -> bool {
        self.is_ascii_alphabetic()
    }
    fn is_excluded_operator(&self) -> bool {
        EXCLUDED_OPERATORS.contains(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_puzzle_letter() {
        assert!('A'.is_puzzle_letter());
        assert!('Z'.is_puzzle_letter());
        assert!('m'.is_puzzle_letter()); // normalised to uppercase by the parser
    }

    #[test]
    fn test_is_not_puzzle_letter() {
        assert!(!'1'.is_puzzle_letter());
        assert!(!'+'.is_puzzle_letter());
        assert!(!'É'.is_puzzle_letter());
        assert!(!' '.is_puzzle_letter());
    }

    #[test]
    fn test_excluded_operators() {
        for op in ['*', '-', '^', '%'] {
            assert!(op.is_excluded_operator(), "'{}' should be excluded", op);
        }
        assert!(!PLUS.is_excluded_operator());
        assert!(!EQUALS.is_excluded_operator());
    }

    #[test]
    fn test_digit_ranges() {
        assert_eq!(DIGITS.count(), NUM_DIGITS);
        assert_eq!(NONZERO_DIGITS.count(), NUM_DIGITS - 1);
    }

    #[test]
    fn test_max_word_len_fits_i64() {
        let top = 10i64.checked_pow(MAX_WORD_LEN as u32 - 1);
        assert!(top.is_some());
        assert!(top.unwrap().checked_mul(9).is_some());
    }
}
