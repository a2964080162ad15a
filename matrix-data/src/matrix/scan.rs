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

//! Tokenization of matrix data lines.
//!
//! Matrix data is a sequence of fields separated by blanks and commas.  A
//! field that contains a digit or starts with `.` is a number; `.` by itself
//! is the system-missing value.  A `+` or `-` begins a new field unless it
//! immediately follows an exponent marker (`d`, `D`, `e`, or `E`), so
//! `1.5e+2` is one field but `1.5-2.5` is two.  Quoted fields extend to the
//! matching quote; a missing closing quote draws a warning and the field ends
//! at the line.

use std::{borrow::Cow, io::BufRead};

use crate::{
    message::{Category, Diagnostic, Location, Point},
    reader::LineReader,
};

/// One field of matrix data.
#[derive(Debug, PartialEq)]
pub enum MatrixToken<'a> {
    /// A numeric field; `None` is the system-missing value.
    Number(Option<f64>),

    /// A character field, borrowed from the scanner's current line.  Copy it
    /// before reading further.
    Span(&'a str),
}

/// Returns the length of the unquoted field at the start of `rest`.
fn field_len(rest: &str) -> usize {
    let mut prev = None;
    for (index, c) in rest.char_indices() {
        let terminates = match c {
            c if c.is_whitespace() => true,
            ',' => true,
            '+' | '-' => index > 0 && !matches!(prev, Some('d' | 'D' | 'e' | 'E')),
            _ => false,
        };
        if terminates {
            return index;
        }
        prev = Some(c);
    }
    rest.len()
}

/// Parses a numeric field with the fixed-width rule: the field's own length
/// as the width and no implied decimals.
fn parse_number(field: &str) -> Result<Option<f64>, ()> {
    if field == "." {
        return Ok(None);
    }
    let normalized = if field.contains(['d', 'D']) {
        Cow::Owned(field.replace(['d', 'D'], "e"))
    } else {
        Cow::Borrowed(field)
    };
    normalized.parse::<f64>().map(Some).map_err(|_| ())
}

/// A stream of [MatrixToken]s over a [LineReader].
pub struct Scanner<R> {
    reader: LineReader<R>,
    line: Option<String>,

    /// Byte offset of the unconsumed remainder of `line`.
    offset: usize,

    /// Position of `offset` for diagnostics, advanced by the display width of
    /// consumed text.
    point: Point,
}

impl<R> Scanner<R>
where
    R: BufRead,
{
    pub fn new(reader: LineReader<R>) -> Self {
        Self {
            reader,
            line: None,
            offset: 0,
            point: Point {
                line: 1,
                column: Some(1),
            },
        }
    }

    fn io_error(&self, error: std::io::Error) -> Diagnostic {
        Diagnostic::error(
            Category::Data,
            format!("I/O error reading matrix data: {error}"),
        )
        .with_location(self.location())
    }

    /// Skips blanks and commas, advancing to new lines as needed.  Returns
    /// false at end of input.
    fn skip_blanks(&mut self) -> Result<bool, Diagnostic> {
        loop {
            if self.line.is_none() {
                match self.reader.read_line() {
                    Ok(Some(line)) => {
                        self.line = Some(line);
                        self.offset = 0;
                        self.point = Point {
                            line: self.reader.line_number(),
                            column: Some(1),
                        };
                    }
                    Ok(None) => return Ok(false),
                    Err(error) => return Err(self.io_error(error)),
                }
            }
            let line = self.line.as_ref().unwrap();
            let rest = &line[self.offset..];
            let skipped = rest
                .char_indices()
                .find(|(_, c)| !c.is_whitespace() && *c != ',')
                .map_or(rest.len(), |(index, _)| index);
            let exhausted = self.offset + skipped >= line.len();
            self.point = self.point.advance(&rest[..skipped]);
            self.offset += skipped;
            if !exhausted {
                return Ok(true);
            }
            self.line = None;
        }
    }

    /// Returns true if no further token is available.
    pub fn at_eof(&mut self) -> Result<bool, Diagnostic> {
        Ok(!self.skip_blanks()?)
    }

    /// Returns the next token, or `None` at end of input.
    pub fn next_token(
        &mut self,
        warn: &mut dyn FnMut(Diagnostic),
    ) -> Result<Option<MatrixToken<'_>>, Diagnostic> {
        if !self.skip_blanks()? {
            return Ok(None);
        }
        let location = self.location();
        let line = self.line.as_ref().unwrap();
        let rest = &line[self.offset..];
        let quote = match rest.chars().next().unwrap() {
            c @ ('\'' | '"') => Some(c),
            _ => None,
        };
        if let Some(quote) = quote {
            let body = &rest[1..];
            let (value, consumed) = match body.find(quote) {
                Some(len) => (&body[..len], len + 2),
                None => {
                    warn(
                        Diagnostic::warning(
                            Category::Data,
                            "Unterminated quoted field; treating end of line as the closing quote.",
                        )
                        .with_location(location),
                    );
                    (body, rest.len())
                }
            };
            self.point = self.point.advance(&rest[..consumed]);
            self.offset += consumed;
            return Ok(Some(MatrixToken::Span(value)));
        }

        let len = field_len(rest);
        let field = &rest[..len];
        self.point = self.point.advance(field);
        self.offset += len;
        if field.starts_with('.') || field.contains(|c: char| c.is_ascii_digit()) {
            match parse_number(field) {
                Ok(value) => Ok(Some(MatrixToken::Number(value))),
                Err(()) => Err(Diagnostic::error(
                    Category::Data,
                    format!("Invalid numeric syntax `{field}`."),
                )
                .with_location(location)),
            }
        } else {
            Ok(Some(MatrixToken::Span(field)))
        }
    }

    /// Reads a numeric token, failing with a message that names `what` if the
    /// next token is not a number or the input is exhausted.
    pub fn read_number(
        &mut self,
        what: &str,
        warn: &mut dyn FnMut(Diagnostic),
    ) -> Result<Option<f64>, Diagnostic> {
        let number = match self.next_token(warn)? {
            Some(MatrixToken::Number(value)) => Some(value),
            _ => None,
        };
        number.ok_or_else(|| self.error_expecting(what))
    }

    /// Reads a character token, failing with a message that names `what`
    /// otherwise.
    pub fn read_string(
        &mut self,
        what: &str,
        warn: &mut dyn FnMut(Diagnostic),
    ) -> Result<String, Diagnostic> {
        let string = match self.next_token(warn)? {
            Some(MatrixToken::Span(s)) => Some(s.to_string()),
            _ => None,
        };
        string.ok_or_else(|| self.error_expecting(what))
    }

    /// Requires the rest of the current line to be blank and discards it, so
    /// that the next token starts a new line.  Used in `LIST` format after
    /// each matrix row.
    pub fn expect_eol(&mut self, what: &str) -> Result<(), Diagnostic> {
        if let Some(line) = self.line.as_ref() {
            let rest = &line[self.offset..];
            if !rest.chars().all(|c| c.is_whitespace() || c == ',') {
                return Err(self.error_expecting(&format!("end of line after {what}")));
            }
            self.line = None;
        }
        Ok(())
    }

    /// The current position for diagnostics.
    pub fn location(&self) -> Location {
        Location {
            file_name: Some(self.reader.file_name().clone()),
            span: Some(self.point..self.point),
        }
    }

    /// A short preview of the upcoming unconsumed text, if any.
    fn preview(&self) -> Option<String> {
        let line = self.line.as_ref()?;
        let rest = line[self.offset..].trim();
        if rest.is_empty() {
            None
        } else {
            Some(rest.chars().take(24).collect())
        }
    }

    /// An error diagnostic naming `what` was expected at the current
    /// position.
    pub fn error_expecting(&self, what: &str) -> Diagnostic {
        let text = match self.preview() {
            Some(preview) => format!("Syntax error expecting {what} before `{preview}`."),
            None => format!("Syntax error expecting {what} at end of input."),
        };
        Diagnostic::error(Category::Data, text).with_location(self.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner(text: &str) -> Scanner<std::io::Cursor<Vec<u8>>> {
        Scanner::new(LineReader::from_text(text, "test.dat"))
    }

    fn no_warnings(diagnostic: Diagnostic) {
        panic!("unexpected warning: {diagnostic}");
    }

    fn all_tokens(text: &str) -> Vec<String> {
        let mut scanner = scanner(text);
        let mut tokens = Vec::new();
        while let Some(token) = scanner.next_token(&mut no_warnings).unwrap() {
            tokens.push(match token {
                MatrixToken::Number(Some(number)) => number.to_string(),
                MatrixToken::Number(None) => String::from("SYSMIS"),
                MatrixToken::Span(s) => format!("{s:?}"),
            });
        }
        tokens
    }

    #[test]
    fn numbers_and_spans() {
        assert_eq!(
            all_tokens("1 2.5, .75\n.  CORR"),
            ["1", "2.5", "0.75", "SYSMIS", "\"CORR\""]
        );
    }

    #[test]
    fn exponents() {
        assert_eq!(all_tokens("1.5e+2 2D-1"), ["150", "0.2"]);
        // A sign not preceded by an exponent marker splits the field.
        assert_eq!(all_tokens("1.5-2.5"), ["1.5", "-2.5"]);
    }

    #[test]
    fn quoted_fields() {
        assert_eq!(all_tokens("'MEAN' \"a b\""), ["\"MEAN\"", "\"a b\""]);
    }

    #[test]
    fn unterminated_quote_warns() {
        let mut scanner = scanner("'MEAN");
        let mut warnings = Vec::new();
        let token = scanner.next_token(&mut |d| warnings.push(d)).unwrap();
        assert_eq!(token, Some(MatrixToken::Span("MEAN")));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn bad_number() {
        let mut scanner = scanner("1.2.3");
        let error = scanner.next_token(&mut no_warnings).unwrap_err();
        assert!(error.to_string().contains("Invalid numeric syntax"));
    }

    #[test]
    fn read_number_mismatch() {
        let mut scanner = scanner("CORR");
        let error = scanner
            .read_number("value for A", &mut no_warnings)
            .unwrap_err();
        assert!(error.to_string().contains("value for A"), "{error}");
    }

    #[test]
    fn end_of_line_enforcement() {
        let mut scanner = scanner("1 2\n3");
        assert_eq!(
            scanner.next_token(&mut no_warnings).unwrap(),
            Some(MatrixToken::Number(Some(1.0)))
        );
        let error = scanner.expect_eol("row 1").unwrap_err();
        assert!(error.to_string().contains("end of line"), "{error}");

        let mut scanner = self::scanner("1\n2");
        scanner.next_token(&mut no_warnings).unwrap();
        scanner.expect_eol("row 1").unwrap();
        assert_eq!(
            scanner.next_token(&mut no_warnings).unwrap(),
            Some(MatrixToken::Number(Some(2.0)))
        );
    }

    #[test]
    fn location_tracks_consumed_width() {
        let mut scanner = scanner(" 12 ab\n5");
        scanner.next_token(&mut no_warnings).unwrap();
        assert_eq!(scanner.location().to_string(), "test.dat:1.4");
        scanner.next_token(&mut no_warnings).unwrap();
        assert_eq!(scanner.location().to_string(), "test.dat:1.7");
        scanner.next_token(&mut no_warnings).unwrap();
        assert_eq!(scanner.location().to_string(), "test.dat:2.2");

        // Columns count display width, so CJK characters advance by two.
        let mut scanner = self::scanner("统计 1");
        scanner.next_token(&mut no_warnings).unwrap();
        assert_eq!(scanner.location().to_string(), "test.dat:1.5");
    }

    #[test]
    fn eof_detection() {
        let mut scanner = scanner("  \n\n 1 ");
        assert!(!scanner.at_eof().unwrap());
        scanner.next_token(&mut no_warnings).unwrap();
        assert!(scanner.at_eof().unwrap());
    }
}
