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

//! Dictionaries.
//!
//! A [Dictionary] collects the [Variable]s that describe the columns of the
//! output cases.  For matrix materials, every variable carries a [Role] that
//! says which of the five column groups it belongs to; the dictionary's
//! variable order is the output wire order (split variables, row-type marker,
//! factor variables, variable-name marker, continuous variables).

use std::ops::Index;

use indexmap::IndexSet;
use thiserror::Error as ThisError;
use unicase::UniCase;

use crate::{
    format::Format,
    identifier::{ByIdentifier, HasIdentifier, Identifier},
};

/// An index within [Dictionary::variables].
pub type DictIndex = usize;

/// A variable's width: numeric, or string with a character width.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum VarWidth {
    /// A numeric variable.
    Numeric,

    /// A string variable with the given width.
    String(u16),
}

impl VarWidth {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }
}

/// The role a variable plays in matrix-material input.
///
/// Each role carries its role-local sub-index, which is the variable's sort
/// key within its role and, for split and factor variables, says which column
/// of the split or factor tuple the variable's value maps to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    /// A split-file variable.
    Split(usize),

    /// The 8-character row-type marker (`ROWTYPE_`).
    RowType,

    /// A factor variable.
    Factor(usize),

    /// The 8-character variable-name marker (`VARNAME_`).
    VarName,

    /// A data-bearing variable.
    Continuous(usize),
}

impl Role {
    /// Major sort key that puts roles into wire order.
    pub fn rank(&self) -> usize {
        match self {
            Role::Split(_) => 0,
            Role::RowType => 1,
            Role::Factor(_) => 2,
            Role::VarName => 3,
            Role::Continuous(_) => 4,
        }
    }

    /// Sub-index within the role.
    pub fn sub_index(&self) -> usize {
        match self {
            Role::Split(index) | Role::Factor(index) | Role::Continuous(index) => *index,
            Role::RowType | Role::VarName => 0,
        }
    }

    /// The display format a variable with this role receives.
    pub fn format(&self) -> Format {
        match self {
            Role::Split(_) | Role::Factor(_) => Format::F4_0,
            Role::RowType | Role::VarName => Format::A8,
            Role::Continuous(_) => Format::F10_4,
        }
    }
}

/// A variable, usually inside a [Dictionary].
#[derive(Clone, Debug)]
pub struct Variable {
    /// The variable's name.
    ///
    /// Variable names are case-insensitive.
    pub name: Identifier,

    /// Variable width.
    pub width: VarWidth,

    /// Output format.
    pub print_format: Format,

    /// The variable's role in matrix-material input, if assigned.
    pub role: Option<Role>,
}

impl Variable {
    /// Creates a variable whose width and format follow from `role`.
    pub fn with_role(name: Identifier, role: Role) -> Self {
        let format = role.format();
        Self {
            name,
            width: format.var_width(),
            print_format: format,
            role: Some(role),
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.width.is_numeric()
    }

    pub fn is_string(&self) -> bool {
        self.width.is_string()
    }
}

impl HasIdentifier for Variable {
    fn identifier(&self) -> &UniCase<String> {
        &self.name.0
    }
}

#[derive(Debug, ThisError)]
pub enum AddVarError {
    #[error("Duplicate variable name {0}.")]
    DuplicateVariableName(Identifier),
}

/// A collection of variables.
#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    /// The variables, in output order.
    pub variables: IndexSet<ByIdentifier<Variable>>,
}

impl Dictionary {
    /// Creates a new, empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `variable` at the end of the dictionary and returns its index.
    ///
    /// The operation fails if the dictionary already contains a variable with
    /// the same name (or a variant with different case).
    pub fn add_var(&mut self, variable: Variable) -> Result<DictIndex, AddVarError> {
        match self.variables.insert_full(ByIdentifier::new(variable)) {
            (index, true) => Ok(index),
            (index, false) => Err(AddVarError::DuplicateVariableName(
                self.variables[index].name.clone(),
            )),
        }
    }

    /// Iterates over the variables whose role satisfies `predicate`, in
    /// dictionary order.
    pub fn vars_with_role<'a>(
        &'a self,
        predicate: impl Fn(&Role) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Variable> + 'a {
        self.variables
            .iter()
            .map(|v| &v.0)
            .filter(move |v| v.role.as_ref().is_some_and(&predicate))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl Index<DictIndex> for Dictionary {
    type Output = Variable;

    fn index(&self, index: DictIndex) -> &Self::Output {
        &self.variables[index].0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identifier {
        Identifier::new(s).unwrap()
    }

    #[test]
    fn duplicate_names_rejected() {
        // Variable names are case-insensitive.
        let mut dictionary = Dictionary::new();
        dictionary
            .add_var(Variable::with_role(id("abc"), Role::Continuous(0)))
            .unwrap();
        assert!(matches!(
            dictionary.add_var(Variable::with_role(id("ABC"), Role::Continuous(1))),
            Err(AddVarError::DuplicateVariableName(_))
        ));
    }

    #[test]
    fn role_formats() {
        let split = Variable::with_role(id("s"), Role::Split(0));
        assert_eq!(split.print_format, Format::F4_0);
        assert!(split.is_numeric());

        let rowtype = Variable::with_role(id("ROWTYPE_"), Role::RowType);
        assert_eq!(rowtype.print_format, Format::A8);
        assert_eq!(rowtype.width, VarWidth::String(8));

        let continuous = Variable::with_role(id("x"), Role::Continuous(3));
        assert_eq!(continuous.print_format, Format::F10_4);
        assert_eq!(continuous.role.unwrap().sub_index(), 3);
    }

}
