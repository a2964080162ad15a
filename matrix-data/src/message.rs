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

//! Diagnostic messages with source locations.

use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    ops::Range,
    sync::Arc,
};

use unicode_width::UnicodeWidthStr;

/// A line number and optional column number within a source file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Point {
    /// 1-based line number.
    pub line: i32,

    /// 1-based column number.
    ///
    /// Column numbers are measured according to the width of characters as
    /// shown in a typical fixed-width font, in which CJK characters have width
    /// 2 and combining characters have width 0, as measured by the
    /// `unicode_width` crate.
    pub column: Option<i32>,
}

impl Point {
    /// Takes `point`, adds to it the text in `text`, incrementing the line
    /// number for each new-line in `text` and the column number for each
    /// column, and returns the result.
    pub fn advance(&self, text: &str) -> Self {
        let mut result = *self;
        for line in text.split_inclusive('\n') {
            if line.ends_with('\n') {
                result.line += 1;
                result.column = Some(1);
            } else {
                result.column = result.column.map(|column| column + line.width() as i32);
            }
        }
        result
    }
}

/// Location relevant to a diagnostic message.
#[derive(Clone, Debug, Default)]
pub struct Location {
    /// File name, if any.
    pub file_name: Option<Arc<String>>,

    /// Starting and ending point, if any.
    pub span: Option<Range<Point>>,
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if let Some(file_name) = &self.file_name {
            write!(f, "{}", file_name)?;
        }

        if let Some(span) = &self.span {
            if self.file_name.is_some() {
                write!(f, ":")?;
            }
            let l1 = span.start.line;
            let l2 = span.end.line;
            match (span.start.column.zip(span.end.column), l2 > l1) {
                (Some((c1, c2)), true) => write!(f, "{l1}.{c1}-{l2}.{}", c2 - 1)?,
                (Some((c1, c2)), false) if c2 > c1 + 1 => write!(f, "{l1}.{c1}-{}", c2 - 1)?,
                (Some((c1, _)), false) => write!(f, "{l1}.{c1}")?,
                (None, true) => write!(f, "{l1}-{l2}")?,
                (None, false) => write!(f, "{l1}")?,
            }
        }
        Ok(())
    }
}

impl Location {
    pub fn is_empty(&self) -> bool {
        self.file_name.is_none() && self.span.is_none()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Category {
    General,
    Syntax,
    Data,
}

/// One error, warning, or note.
#[derive(Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: Category,
    pub location: Location,
    pub text: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, category: Category, text: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            location: Location::default(),
            text: text.into(),
        }
    }

    pub fn error(category: Category, text: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, text)
    }

    pub fn warning(category: Category, text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, text)
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.category != Category::General && !self.location.is_empty() {
            write!(f, "{}: ", self.location)?;
        }

        write!(f, "{}: {}", self.severity, self.text)
    }
}

impl Debug for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_advance() {
        let point = Point {
            line: 1,
            column: Some(1),
        };
        assert_eq!(point.advance("abc"), Point { line: 1, column: Some(4) });
        assert_eq!(point.advance("abc\nd"), Point { line: 2, column: Some(2) });
    }

    #[test]
    fn display() {
        let diagnostic = Diagnostic::error(Category::Data, "Syntax error expecting value.")
            .with_location(Location {
                file_name: Some(Arc::new(String::from("matrix.dat"))),
                span: Some(
                    Point {
                        line: 3,
                        column: Some(7),
                    }..Point {
                        line: 3,
                        column: Some(8),
                    },
                ),
            });
        assert_eq!(
            diagnostic.to_string(),
            "matrix.dat:3.7: error: Syntax error expecting value."
        );
    }
}
