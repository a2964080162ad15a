// matrix-data - a reader for matrix-material data files.
// Copyright (C) 2025 Free Software Foundation, Inc.
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <http://www.gnu.org/licenses/>.

//! Individual pieces of data.
//!
//! [Datum] is the value of one [Variable].  A [Case] is one output row, with
//! one [Datum] per variable in the corresponding [Dictionary], in the same
//! order.
//!
//! [Variable]: crate::dictionary::Variable
//! [Dictionary]: crate::dictionary::Dictionary

use std::{
    cmp::Ordering,
    fmt::{Debug, Formatter},
    hash::Hash,
};

use ordered_float::OrderedFloat;
use thiserror::Error as ThisError;

/// The value of a [Variable](crate::dictionary::Variable).
#[derive(Clone)]
pub enum Datum {
    /// A numeric value.
    Number(
        /// A number, or `None` for the system-missing value.
        Option<f64>,
    ),
    /// A string value.
    String(String),
}

impl Debug for Datum {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Datum::Number(Some(number)) => write!(f, "{number:?}"),
            Datum::Number(None) => write!(f, "SYSMIS"),
            Datum::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(Some(l0)), Self::Number(Some(r0))) => {
                OrderedFloat(*l0) == OrderedFloat(*r0)
            }
            (Self::Number(None), Self::Number(None)) => true,
            (Self::String(l0), Self::String(r0)) => l0 == r0,
            _ => false,
        }
    }
}

impl Eq for Datum {}

impl PartialOrd for Datum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Datum {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Datum::Number(a), Datum::Number(b)) => match (a, b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.total_cmp(b),
            },
            (Datum::Number(_), Datum::String(_)) => Ordering::Less,
            (Datum::String(_), Datum::Number(_)) => Ordering::Greater,
            (Datum::String(a), Datum::String(b)) => a.cmp(b),
        }
    }
}

impl Hash for Datum {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Datum::Number(number) => number.map(OrderedFloat).hash(state),
            Datum::String(string) => string.hash(state),
        }
    }
}

impl Datum {
    /// Constructs a new numerical [Datum] for the system-missing value.
    pub const fn sysmis() -> Self {
        Self::Number(None)
    }
}

impl From<f64> for Datum {
    fn from(number: f64) -> Self {
        Some(number).into()
    }
}

impl From<Option<f64>> for Datum {
    fn from(value: Option<f64>) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

/// A case in a data set.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Case(
    /// One [Datum] per variable in the corresponding [Dictionary], in the same
    /// order.
    ///
    /// [Dictionary]: crate::dictionary::Dictionary
    pub Vec<Datum>,
);

/// Error from a [CaseSink].
#[derive(Debug, ThisError)]
pub enum SinkError {
    #[error("I/O error writing case: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Downstream consumer of completed cases.
///
/// A sink failure aborts the whole command.
pub trait CaseSink {
    fn receive(&mut self, case: Case) -> Result<(), SinkError>;
}

/// A [CaseSink] that collects cases in memory.
#[derive(Debug, Default)]
pub struct CaseCollector(pub Vec<Case>);

impl CaseSink for CaseCollector {
    fn receive(&mut self, case: Case) -> Result<(), SinkError> {
        self.0.push(case);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datum_ordering() {
        let mut data = [
            Datum::from(2.0),
            Datum::sysmis(),
            Datum::from(-1.0),
            Datum::from("A"),
        ];
        data.sort();
        assert_eq!(
            data,
            [
                Datum::sysmis(),
                Datum::from(-1.0),
                Datum::from(2.0),
                Datum::from("A"),
            ]
        );
    }

    #[test]
    fn datum_equality() {
        assert_eq!(Datum::from(1.0), Datum::from(1.0));
        assert_ne!(Datum::from(1.0), Datum::sysmis());
        assert_eq!(Datum::sysmis(), Datum::sysmis());
        assert_ne!(Datum::from("X"), Datum::from(1.0));
    }
}
