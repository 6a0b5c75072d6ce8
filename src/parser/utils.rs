use crate::errors::ParseError;
use crate::puzzle_char::{PuzzleChar, MAX_WORD_LEN};
use crate::side::Side;
use std::collections::{HashMap, HashSet};

/// Validate a raw token from one side of the statement and normalise it to uppercase.
pub(crate) fn normalize_word(raw: &str, side: Side) -> Result<String, Box<ParseError>> {
    if raw.is_empty() {
        return Err(Box::new(ParseError::EmptyWord { side }));
    }
    if let Some(invalid_char) = raw.chars().find(|c| !c.is_puzzle_letter()) {
        return Err(Box::new(ParseError::InvalidCharacter { word: raw.to_string(), invalid_char }));
    }
    if raw.len() > MAX_WORD_LEN {
        return Err(Box::new(ParseError::WordTooLong { word: raw.to_string(), max: MAX_WORD_LEN }));
    }
    Ok(raw.to_ascii_uppercase())
}

/// Number of distinct letters across all words.
pub(crate) fn count_distinct_letters<'a>(words: impl IntoIterator<Item = &'a String>) -> usize {
    words
        .into_iter()
        .flat_map(|w| w.chars())
        .collect::<HashSet<char>>()
        .len()
}

/// First letter whose summed positional weights, ignoring sign, leave the `i64` range.
///
/// Signed partial sums never exceed the unsigned total, so a `None` here means
/// coefficient aggregation cannot overflow in any order.
pub(crate) fn overflowing_letter<'a>(words: impl IntoIterator<Item = &'a String>) -> Option<char> {
    let mut totals: HashMap<char, i64> = HashMap::new();
    for word in words {
        let mut weight = Some(1i64);
        for letter in word.chars().rev() {
            let total = totals.entry(letter).or_insert(0);
            match weight.and_then(|w| total.checked_add(w)) {
                Some(sum) => *total = sum,
                None => return Some(letter),
            }
            weight = weight.and_then(|w| w.checked_mul(10));
        }
    }
    None
}
