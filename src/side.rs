use crate::side::Side::{Left, Right};
use std::fmt;

/// Which side of the `=` a word sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Sign a word on this side contributes to its letters' coefficients.
    #[must_use]
    pub fn sign(self) -> i64 {
        match self {
            Left => 1,
            Right => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Left => "left-hand side",
            Right => "right-hand side",
        };
        write!(f, "{s}")
    }
}
