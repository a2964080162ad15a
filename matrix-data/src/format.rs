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

//! Display formats for variables.
//!
//! Matrix-material variables only ever receive a fixed format chosen by the
//! role they play, so this module covers just the basic numeric format and
//! the string format.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::dictionary::VarWidth;

/// Format type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// Basic numeric format.
    F,

    /// String format.
    A,
}

impl Type {
    pub fn as_str(&self) -> &'static str {
        match self {
            Type::F => "F",
            Type::A => "A",
        }
    }
}

pub type Width = u16;
pub type Decimals = u8;

/// A display format, e.g. `F10.4` or `A8`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Format {
    pub type_: Type,
    pub w: Width,
    pub d: Decimals,
}

impl Format {
    /// Format for split and factor variables.
    pub const F4_0: Format = Format {
        type_: Type::F,
        w: 4,
        d: 0,
    };

    /// Format for continuous variables.
    pub const F10_4: Format = Format {
        type_: Type::F,
        w: 10,
        d: 4,
    };

    /// Format for the row-type and variable-name marker variables.
    pub const A8: Format = Format {
        type_: Type::A,
        w: 8,
        d: 0,
    };

    pub fn var_width(&self) -> VarWidth {
        match self.type_ {
            Type::F => VarWidth::Numeric,
            Type::A => VarWidth::String(self.w),
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}", self.type_.as_str(), self.w)?;
        if self.type_ == Type::F {
            write!(f, ".{}", self.d)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Format::F4_0.to_string(), "F4.0");
        assert_eq!(Format::F10_4.to_string(), "F10.4");
        assert_eq!(Format::A8.to_string(), "A8");
    }
}
