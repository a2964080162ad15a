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

//! Lexical analysis for the subcommand sub-language.
//!
//! The host command language recognizes the matrix command itself and hands
//! the rest of the command over for subcommand parsing.  This module turns
//! that text into a stream of typed [Token]s that the configurator consumes.

use std::fmt::{Display, Formatter, Result as FmtResult};

use thiserror::Error as ThisError;

use crate::identifier::{Identifier, IdentifierChar};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Punct {
    /// `=`.
    Equals,

    /// `/`, the subcommand separator.
    Slash,

    /// `(`.
    LParen,

    /// `)`.
    RParen,

    /// `,`.
    Comma,

    /// `*`, the active-file marker on `FILE`.
    Asterisk,
}

impl Punct {
    pub fn as_str(&self) -> &'static str {
        match self {
            Punct::Equals => "=",
            Punct::Slash => "/",
            Punct::LParen => "(",
            Punct::RParen => ")",
            Punct::Comma => ",",
            Punct::Asterisk => "*",
        }
    }
}

impl Display for Punct {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// Identifier or keyword.
    Id(Identifier),

    /// Number.
    Number(f64),

    /// Quoted string.
    String(String),

    /// Operators and punctuators.
    Punct(Punct),
}

impl Token {
    pub fn as_id(&self) -> Option<&Identifier> {
        match self {
            Self::Id(id) => Some(id),
            _ => None,
        }
    }

    pub fn matches_keyword(&self, keyword: &str) -> bool {
        self.as_id().is_some_and(|id| id.matches_keyword(keyword))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Token::Id(id) => write!(f, "{id}"),
            Token::Number(number) => write!(f, "{number}"),
            Token::String(s) => write!(f, "{s:?}"),
            Token::Punct(punct) => write!(f, "{punct}"),
        }
    }
}

#[derive(Clone, Debug, ThisError, PartialEq)]
pub enum ScanError {
    /// Unterminated string constant.
    #[error("Unterminated string constant.")]
    ExpectedQuote,

    /// Malformed number.
    #[error("Invalid number `{0}`.")]
    BadNumber(String),

    /// Invalid identifier.
    #[error("{0}")]
    BadIdentifier(#[from] crate::identifier::Error),

    /// Unexpected character.
    #[error("Unexpected character {0:?} in input.")]
    UnexpectedChar(char),
}

/// Divides `input` into [Token]s.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ScanError> {
    let mut tokens = Vec::new();
    let mut rest = input;
    loop {
        rest = rest.trim_start();
        let Some(c) = rest.chars().next() else {
            return Ok(tokens);
        };
        let punct = match c {
            '=' => Some(Punct::Equals),
            '/' => Some(Punct::Slash),
            '(' => Some(Punct::LParen),
            ')' => Some(Punct::RParen),
            ',' => Some(Punct::Comma),
            '*' => Some(Punct::Asterisk),
            _ => None,
        };
        if let Some(punct) = punct {
            tokens.push(Token::Punct(punct));
            rest = &rest[1..];
        } else if c == '\'' || c == '"' {
            let body = &rest[1..];
            let Some(len) = body.find(c) else {
                return Err(ScanError::ExpectedQuote);
            };
            tokens.push(Token::String(body[..len].into()));
            rest = &body[len + 1..];
        } else if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' {
            let len = rest
                .char_indices()
                .find(|(index, c)| {
                    !(c.is_ascii_digit()
                        || *c == '.'
                        || matches!(c, 'e' | 'E')
                        || ((*c == '-' || *c == '+')
                            && (*index == 0
                                || rest[..*index].ends_with(['e', 'E']))))
                })
                .map_or(rest.len(), |(index, _)| index);
            let (field, remainder) = rest.split_at(len);
            tokens.push(Token::Number(
                field
                    .parse()
                    .map_err(|_| ScanError::BadNumber(field.into()))?,
            ));
            rest = remainder;
        } else if c.may_start_id() {
            let len = rest
                .char_indices()
                .find(|(_, c)| !c.may_continue_id())
                .map_or(rest.len(), |(index, _)| index);
            let (field, remainder) = rest.split_at(len);
            tokens.push(Token::Id(Identifier::new(field)?));
            rest = remainder;
        } else {
            return Err(ScanError::UnexpectedChar(c));
        }
    }
}

/// A cursor over a slice of [Token]s.
#[derive(Clone, Debug)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Consumes the next token if it is `punct`.
    pub fn take_punct(&mut self, punct: Punct) -> bool {
        if self.peek() == Some(&Token::Punct(punct)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes the next token if it is an identifier matching `keyword` with
    /// the usual 3-character abbreviation rule.
    pub fn take_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|token| token.matches_keyword(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes the next token if it is an identifier.
    pub fn take_id(&mut self) -> Option<&'a Identifier> {
        let id = self.peek()?.as_id()?;
        self.pos += 1;
        Some(id)
    }

    /// Consumes the next token if it is a number.
    pub fn take_number(&mut self) -> Option<f64> {
        let number = self.peek()?.as_number()?;
        self.pos += 1;
        Some(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(tokens: &[Token]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn basics() {
        let tokens = tokenize("VARIABLES=A B/CONTENTS=(MEAN SD) CORR").unwrap();
        assert_eq!(
            ids(&tokens),
            ["VARIABLES", "=", "A", "B", "/", "CONTENTS", "=", "(", "MEAN", "SD", ")", "CORR"]
        );
    }

    #[test]
    fn numbers_and_strings() {
        let tokens = tokenize("CELLS=2/N=100/FILE='matrix.dat'").unwrap();
        assert!(tokens.contains(&Token::Number(2.0)));
        assert!(tokens.contains(&Token::Number(100.0)));
        assert!(tokens.contains(&Token::String("matrix.dat".into())));
    }

    #[test]
    fn errors() {
        assert_eq!(tokenize("FILE='oops"), Err(ScanError::ExpectedQuote));
        assert!(matches!(tokenize("A %"), Err(ScanError::UnexpectedChar('%'))));
        assert!(matches!(tokenize("1.2.3"), Err(ScanError::BadNumber(_))));
    }

    #[test]
    fn cursor() {
        let tokens = tokenize("FORMAT=LOWER NODIAGONAL").unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        assert!(cursor.take_keyword("FORMAT"));
        assert!(cursor.take_punct(Punct::Equals));
        assert!(!cursor.take_keyword("UPPER"));
        assert!(cursor.take_keyword("LOWER"));
        assert!(cursor.take_keyword("NODIAGONAL"));
        assert!(cursor.is_empty());
    }
}
