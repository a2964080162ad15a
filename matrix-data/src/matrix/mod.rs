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

//! The matrix-data command.
//!
//! [MatrixData] is the immutable configuration built from the command's
//! subcommands.  [MatrixData::decode] then reads the matrix materials and
//! writes output cases to a sink, choosing between two decoding strategies
//! depending on whether `ROWTYPE_` was named on `VARIABLES`: without it, the
//! `CONTENTS` list dictates exactly what the data holds; with it, each data
//! row announces its own content type.

use std::{io::BufRead, ops::Range};

use enum_iterator::{Sequence, all};
use enum_map::Enum;

use crate::{
    data::CaseSink,
    dictionary::{DictIndex, Dictionary, Role, Variable},
    identifier::Identifier,
    message::{Category, Diagnostic},
    reader::LineReader,
    syntax::{Punct, Token, TokenCursor, tokenize},
};

mod decode;
pub mod fill;
pub mod scan;
#[cfg(test)]
mod tests;

/// Which triangle of a matrix the data supplies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Triangle {
    /// Row `i` carries values for columns `0..=i`.
    Lower,

    /// Row `i` carries values for columns `i..n`.
    Upper,

    /// Every row carries all `n` values.
    Full,
}

/// Free-form versus line-per-row input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// Each matrix row begins a new line and must end its line.
    List,

    /// Values flow freely across lines.
    Free,
}

/// Physical arrangement of matrix content in the data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub triangle: Triangle,

    /// Whether the data includes the diagonal.
    pub diagonal: bool,

    pub input: InputMode,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            triangle: Triangle::Lower,
            diagonal: true,
            input: InputMode::List,
        }
    }
}

impl Layout {
    /// Number of data rows that `shape` content occupies with `n` continuous
    /// variables.
    pub fn physical_rows(&self, shape: Shape, n: usize) -> usize {
        match shape {
            Shape::Matrix if self.triangle != Triangle::Full && !self.diagonal => n - 1,
            Shape::Matrix => n,
            Shape::Vector | Shape::Scalar => 1,
        }
    }

    /// Maps physical matrix row `row` to the matrix row index it fills and
    /// the range of columns it carries.
    pub fn row_range(&self, n: usize, row: usize) -> (usize, Range<usize>) {
        match (self.triangle, self.diagonal) {
            (Triangle::Full, _) => (row, 0..n),
            (Triangle::Lower, true) => (row, 0..row + 1),
            (Triangle::Lower, false) => (row + 1, 0..row + 1),
            (Triangle::Upper, true) => (row, row..n),
            (Triangle::Upper, false) => (row, row + 1..n),
        }
    }
}

/// The shape of one content type's data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// `n`×`n` values.
    Matrix,

    /// One value per continuous variable.
    Vector,

    /// A single value that applies to every continuous variable.
    Scalar,
}

/// One of the fixed statistic kinds the `CONTENTS` subcommand can select.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Enum, Sequence)]
pub enum ContentType {
    /// Count vector (`N` or `N_VECTOR`).
    N,

    /// Count scalar (`N_SCALAR`).
    NScalar,

    /// Count matrix (`N_MATRIX`).
    NMatrix,

    /// Means vector.
    Mean,

    /// Standard-deviation vector (`STDDEV` or `SD`).
    StdDev,

    /// Count vector used with unequal cell sizes.
    Count,

    /// Mean squared error scalar.
    Mse,

    /// Degrees-of-freedom scalar.
    Dfe,

    /// General matrix.
    Mat,

    /// Covariance matrix.
    Cov,

    /// Correlation matrix.
    Corr,

    /// Proximity matrix.
    Prox,
}

impl ContentType {
    pub fn shape(self) -> Shape {
        match self {
            Self::N | Self::Mean | Self::StdDev | Self::Count => Shape::Vector,
            Self::NScalar | Self::Mse | Self::Dfe => Shape::Scalar,
            Self::NMatrix | Self::Mat | Self::Cov | Self::Corr | Self::Prox => Shape::Matrix,
        }
    }

    /// The keywords that select this content type on `CONTENTS`.  The first
    /// one is canonical.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::N => &["N", "N_VECTOR"],
            Self::NScalar => &["N_SCALAR"],
            Self::NMatrix => &["N_MATRIX"],
            Self::Mean => &["MEAN"],
            Self::StdDev => &["STDDEV", "SD"],
            Self::Count => &["COUNT"],
            Self::Mse => &["MSE"],
            Self::Dfe => &["DFE"],
            Self::Mat => &["MAT"],
            Self::Cov => &["COV"],
            Self::Corr => &["CORR"],
            Self::Prox => &["PROX"],
        }
    }

    /// The canonical name written into the row-type column.
    pub fn rowtype(self) -> &'static str {
        match self {
            Self::N | Self::NScalar => "N",
            other => other.keywords()[0],
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        all::<Self>().find(|content| {
            content
                .keywords()
                .iter()
                .any(|k| k.eq_ignore_ascii_case(keyword))
        })
    }

    /// Recognizes a row-type string read from the data: case-insensitive,
    /// considering only the first 8 characters.
    pub fn from_rowtype(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = match s.char_indices().nth(8) {
            Some((index, _)) => &s[..index],
            None => s,
        };
        Self::from_keyword(s)
    }

    /// Number of slots in this content's buffer for `n` continuous variables.
    ///
    /// Scalar content also gets `n` slots because its single value is
    /// broadcast across all continuous variables.
    pub fn buffer_len(self, n: usize) -> usize {
        match self.shape() {
            Shape::Matrix => n * n,
            Shape::Vector | Shape::Scalar => n,
        }
    }
}

/// One entry in the `CONTENTS` list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ContentItem {
    pub content: ContentType,

    /// True if the entry was parenthesized, meaning it repeats once per cell
    /// rather than once per split group.
    pub per_cell: bool,
}

/// How split-variable values are obtained.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Split {
    /// No split variables.
    None,

    /// A single split variable whose value is generated, starting from 1 and
    /// incrementing for each group of input.
    Generated,

    /// Split values read from the data, one per split variable, at the start
    /// of each group.
    Read,
}

/// Source of the matrix data.
#[derive(Clone, Debug, PartialEq)]
pub enum FileSpec {
    /// `FILE=*`, the active dataset.
    ActiveFile,

    /// A quoted file name.
    Name(String),

    /// A file handle.
    Handle(Identifier),
}

/// The matrix-data command's configuration, immutable once built.
#[derive(Clone, Debug)]
pub struct MatrixData {
    /// Output dictionary, in wire order: split variables, `ROWTYPE_`, factor
    /// variables, `VARNAME_`, continuous variables.
    pub dictionary: Dictionary,

    pub layout: Layout,

    /// Whether `ROWTYPE_` was named on `VARIABLES`, so that the data itself
    /// announces each row's content type.
    pub explicit_rowtype: bool,

    pub split: Split,
    pub n_splits: usize,
    pub n_factors: usize,

    /// Number of factor-value combinations, when `FACTORS` is given.
    pub cells: Option<usize>,

    /// Population size from the `N` subcommand.
    pub population: Option<u64>,

    pub contents: Vec<ContentItem>,

    pub n_continuous: usize,

    /// Dictionary index of the first continuous variable.
    pub first_continuous: DictIndex,

    pub file: Option<FileSpec>,
}

fn syntax_error(text: impl Into<String>) -> Diagnostic {
    Diagnostic::error(Category::Syntax, text)
}

fn syntax_warning(text: impl Into<String>) -> Diagnostic {
    Diagnostic::warning(Category::Syntax, text)
}

fn parse_name_list(cursor: &mut TokenCursor) -> Result<Vec<Identifier>, Diagnostic> {
    let mut names = Vec::new();
    loop {
        cursor.take_punct(Punct::Comma);
        match cursor.take_id() {
            Some(id) => names.push(id.clone()),
            None if names.is_empty() || !cursor.is_empty() => {
                return Err(syntax_error("Syntax error expecting variable name."));
            }
            None => return Ok(names),
        }
    }
}

fn parse_positive_integer(cursor: &mut TokenCursor, subcommand: &str) -> Result<u64, Diagnostic> {
    match cursor.take_number() {
        Some(number) if number > 0.0 && number == number.floor() && cursor.is_empty() => {
            Ok(number as u64)
        }
        _ => Err(syntax_error(format!(
            "Syntax error expecting positive integer on {subcommand}."
        ))),
    }
}

fn parse_contents(cursor: &mut TokenCursor) -> Result<Vec<ContentItem>, Diagnostic> {
    let mut contents = Vec::new();
    let mut in_group = false;
    let mut group_len = 0;
    loop {
        if cursor.take_punct(Punct::LParen) {
            if in_group {
                return Err(syntax_error("CONTENTS groups may not be nested."));
            }
            in_group = true;
            group_len = 0;
        } else if cursor.take_punct(Punct::RParen) {
            if !in_group {
                return Err(syntax_error("Syntax error expecting content keyword."));
            }
            if group_len == 0 {
                return Err(syntax_error("CONTENTS group may not be empty."));
            }
            in_group = false;
        } else if let Some(id) = cursor.take_id() {
            let Some(content) = ContentType::from_keyword(id.as_str()) else {
                return Err(syntax_error(format!(
                    "{id} is not a recognized matrix content type."
                )));
            };
            if contents.iter().any(|item: &ContentItem| item.content == content) {
                return Err(syntax_error(format!(
                    "Content type {} appears twice on CONTENTS.",
                    content.keywords()[0]
                )));
            }
            contents.push(ContentItem {
                content,
                per_cell: in_group,
            });
            group_len += 1;
        } else if cursor.is_empty() {
            break;
        } else {
            return Err(syntax_error("Syntax error expecting content keyword."));
        }
    }
    if in_group {
        return Err(syntax_error("Syntax error expecting `)` on CONTENTS."));
    }
    if contents.is_empty() {
        return Err(syntax_error("CONTENTS subcommand may not be empty."));
    }
    Ok(contents)
}

fn parse_file(cursor: &mut TokenCursor) -> Result<FileSpec, Diagnostic> {
    if cursor.take_punct(Punct::Asterisk) {
        Ok(FileSpec::ActiveFile)
    } else if let Some(Token::String(name)) = cursor.peek() {
        cursor.advance();
        Ok(FileSpec::Name(name.clone()))
    } else if let Some(id) = cursor.take_id() {
        Ok(FileSpec::Handle(id.clone()))
    } else {
        Err(syntax_error("Syntax error expecting file name on FILE."))
    }
}

impl MatrixData {
    /// Tokenizes `syntax` (the command's subcommands, without the command name
    /// itself) and parses it into a configuration.
    pub fn from_syntax(
        syntax: &str,
        warn: &mut dyn FnMut(Diagnostic),
    ) -> Result<Self, Diagnostic> {
        let tokens = tokenize(syntax).map_err(|e| syntax_error(e.to_string()))?;
        Self::parse(&tokens, warn)
    }

    /// Parses the subcommand token stream into a configuration.
    pub fn parse(tokens: &[Token], warn: &mut dyn FnMut(Diagnostic)) -> Result<Self, Diagnostic> {
        let mut variables: Option<Vec<Identifier>> = None;
        let mut file: Option<FileSpec> = None;
        let mut layout: Option<Layout> = None;
        let mut split_names: Option<Vec<Identifier>> = None;
        let mut factor_names: Option<Vec<Identifier>> = None;
        let mut cells: Option<usize> = None;
        let mut population: Option<u64> = None;
        let mut contents: Option<Vec<ContentItem>> = None;
        let mut explicit_rowtype = false;

        for subcommand in tokens.split(|token| token == &Token::Punct(Punct::Slash)) {
            if subcommand.is_empty() {
                continue;
            }
            let mut cursor = TokenCursor::new(subcommand);
            let Some(name) = cursor.take_id().cloned() else {
                return Err(syntax_error("Syntax error expecting subcommand name."));
            };
            cursor.take_punct(Punct::Equals);

            fn check_duplicate<T>(
                slot: &Option<T>,
                subcommand: &'static str,
            ) -> Result<(), Diagnostic> {
                if slot.is_some() {
                    Err(syntax_error(format!(
                        "Subcommand {subcommand} may only be specified once."
                    )))
                } else {
                    Ok(())
                }
            }

            if name.matches_keyword("VARIABLES") {
                check_duplicate(&variables, "VARIABLES")?;
                let mut names = parse_name_list(&mut cursor)?;
                if names.iter().any(|name| *name == "VARNAME_") {
                    return Err(syntax_error(
                        "VARNAME_ cannot be explicitly specified on VARIABLES.",
                    ));
                }
                if let Some(index) = names.iter().position(|name| *name == "ROWTYPE_") {
                    explicit_rowtype = true;
                    names.remove(index);
                }
                variables = Some(names);
            } else if name.matches_keyword("FILE") {
                check_duplicate(&file, "FILE")?;
                file = Some(parse_file(&mut cursor)?);
            } else if name.matches_keyword("FORMAT") {
                check_duplicate(&layout, "FORMAT")?;
                let mut new = Layout::default();
                while !cursor.is_empty() {
                    if cursor.take_keyword("LIST") {
                        new.input = InputMode::List;
                    } else if cursor.take_keyword("FREE") {
                        new.input = InputMode::Free;
                    } else if cursor.take_keyword("LOWER") {
                        new.triangle = Triangle::Lower;
                    } else if cursor.take_keyword("UPPER") {
                        new.triangle = Triangle::Upper;
                    } else if cursor.take_keyword("FULL") {
                        new.triangle = Triangle::Full;
                    } else if cursor.take_keyword("DIAGONAL") {
                        new.diagonal = true;
                    } else if cursor.take_keyword("NODIAGONAL") {
                        new.diagonal = false;
                    } else {
                        return Err(syntax_error("Syntax error expecting FORMAT keyword."));
                    }
                }
                layout = Some(new);
            } else if name.matches_keyword("SPLIT") {
                check_duplicate(&split_names, "SPLIT")?;
                split_names = Some(parse_name_list(&mut cursor)?);
            } else if name.matches_keyword("FACTORS") {
                check_duplicate(&factor_names, "FACTORS")?;
                factor_names = Some(parse_name_list(&mut cursor)?);
            } else if name.matches_keyword("CELLS") {
                check_duplicate(&cells, "CELLS")?;
                cells = Some(parse_positive_integer(&mut cursor, "CELLS")? as usize);
            } else if name == "N" {
                check_duplicate(&population, "N")?;
                population = Some(parse_positive_integer(&mut cursor, "N")?);
            } else if name.matches_keyword("CONTENTS") {
                check_duplicate(&contents, "CONTENTS")?;
                contents = Some(parse_contents(&mut cursor)?);
            } else {
                return Err(syntax_error(format!("Unknown subcommand {name}.")));
            }

            if !cursor.is_empty() && !name.matches_keyword("VARIABLES") {
                return Err(syntax_error(format!(
                    "Syntax error expecting end of {name} subcommand."
                )));
            }
        }

        let Some(variables) = variables else {
            return Err(syntax_error("VARIABLES subcommand is required."));
        };

        // Split handling: a single name absent from VARIABLES means the split
        // variable is created and its values generated per group.
        let (split, split_vars) = match split_names {
            None => (Split::None, Vec::new()),
            Some(names) => {
                let all_declared = names
                    .iter()
                    .all(|name| variables.iter().any(|v| v == name));
                if all_declared {
                    (Split::Read, names)
                } else if names.len() == 1 {
                    if explicit_rowtype {
                        return Err(syntax_error(
                            "SPLIT cannot create a new variable when ROWTYPE_ appears on VARIABLES.",
                        ));
                    }
                    (Split::Generated, names)
                } else {
                    return Err(syntax_error(
                        "SPLIT variables must all appear on VARIABLES.",
                    ));
                }
            }
        };

        let factor_vars = factor_names.unwrap_or_default();
        for name in &factor_vars {
            if !variables.iter().any(|v| v == name) {
                return Err(syntax_error(format!(
                    "FACTORS variable {name} must appear on VARIABLES."
                )));
            }
            if split == Split::Read && split_vars.iter().any(|v| v == name) {
                return Err(syntax_error(format!(
                    "{name} cannot be both a SPLIT and a FACTORS variable."
                )));
            }
        }

        let contents = match contents {
            Some(_) if explicit_rowtype => {
                warn(syntax_warning(
                    "CONTENTS is ignored when ROWTYPE_ appears on VARIABLES.",
                ));
                Vec::new()
            }
            Some(contents) => contents,
            None if explicit_rowtype => Vec::new(),
            None => {
                warn(syntax_warning(
                    "CONTENTS subcommand omitted; assuming CONTENTS=CORR.",
                ));
                vec![ContentItem {
                    content: ContentType::Corr,
                    per_cell: false,
                }]
            }
        };

        if !factor_vars.is_empty() && !explicit_rowtype && cells.is_none() {
            return Err(syntax_error(
                "CELLS subcommand is required when FACTORS is specified without ROWTYPE_.",
            ));
        }
        if factor_vars.is_empty() {
            if cells.is_some() {
                warn(syntax_warning("CELLS subcommand is ignored without FACTORS."));
                cells = None;
            }
            if let Some(item) = contents.iter().find(|item| item.per_cell) {
                return Err(syntax_error(format!(
                    "Parenthesized content type {} requires FACTORS.",
                    item.content.keywords()[0]
                )));
            }
        }
        if population.is_some()
            && contents
                .iter()
                .any(|item| matches!(item.content, ContentType::N | ContentType::NScalar | ContentType::NMatrix))
        {
            return Err(syntax_error(
                "N subcommand may not be combined with an N content type on CONTENTS.",
            ));
        }

        let mut dictionary = Dictionary::new();
        let mut add = |variable: Variable| {
            dictionary
                .add_var(variable)
                .map_err(|e| syntax_error(e.to_string()))
        };
        for (index, name) in split_vars.iter().enumerate() {
            add(Variable::with_role(name.clone(), Role::Split(index)))?;
        }
        add(Variable::with_role(
            Identifier::new("ROWTYPE_").unwrap(),
            Role::RowType,
        ))?;
        for (index, name) in factor_vars.iter().enumerate() {
            add(Variable::with_role(name.clone(), Role::Factor(index)))?;
        }
        add(Variable::with_role(
            Identifier::new("VARNAME_").unwrap(),
            Role::VarName,
        ))?;
        let mut n_continuous = 0;
        for name in &variables {
            let is_split = split == Split::Read && split_vars.iter().any(|v| v == name);
            let is_factor = factor_vars.iter().any(|v| v == name);
            if !is_split && !is_factor {
                add(Variable::with_role(
                    name.clone(),
                    Role::Continuous(n_continuous),
                ))?;
                n_continuous += 1;
            }
        }
        if n_continuous == 0 {
            return Err(syntax_error("At least one continuous variable is required."));
        }

        let n_splits = split_vars.len();
        let n_factors = factor_vars.len();
        Ok(MatrixData {
            first_continuous: n_splits + 1 + n_factors + 1,
            dictionary,
            layout: layout.unwrap_or_default(),
            explicit_rowtype,
            split,
            n_splits,
            n_factors,
            cells,
            population,
            contents,
            n_continuous,
            file,
        })
    }

    /// Reads matrix materials from `reader` and writes output cases to
    /// `sink`.  Non-fatal problems go to `warn`; any error aborts the whole
    /// command.
    pub fn decode<R>(
        &self,
        reader: LineReader<R>,
        sink: &mut dyn CaseSink,
        warn: &mut dyn FnMut(Diagnostic),
    ) -> Result<(), Diagnostic>
    where
        R: BufRead,
    {
        if self.explicit_rowtype {
            decode::read_with_rowtype(self, reader, sink, warn)
        } else {
            decode::read_without_rowtype(self, reader, sink, warn)
        }
    }

    /// The continuous variables' names, in wire order.
    pub fn continuous_names(&self) -> impl Iterator<Item = &Identifier> + '_ {
        self.dictionary
            .vars_with_role(|role| matches!(role, Role::Continuous(_)))
            .map(|variable| &variable.name)
    }
}
