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

//! Line-oriented input.
//!
//! Matrix data arrives as text lines.  [LineReader] wraps any [BufRead]
//! source, strips line terminators, and tracks the 1-based line number for
//! diagnostics.

use std::{
    io::{BufRead, Cursor},
    sync::Arc,
};

/// A source of text lines with a name and a line counter.
pub struct LineReader<R> {
    source: R,
    file_name: Arc<String>,
    line_number: i32,
}

impl<R> LineReader<R>
where
    R: BufRead,
{
    pub fn new(source: R, file_name: impl Into<String>) -> Self {
        Self {
            source,
            file_name: Arc::new(file_name.into()),
            line_number: 0,
        }
    }

    /// Reads the next line, without its terminator, or returns `None` at end
    /// of input.
    pub fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if self.source.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        self.line_number += 1;
        Ok(Some(line))
    }

    /// 1-based number of the line most recently returned by [Self::read_line],
    /// or 0 before the first read.
    pub fn line_number(&self) -> i32 {
        self.line_number
    }

    pub fn file_name(&self) -> &Arc<String> {
        &self.file_name
    }
}

impl LineReader<Cursor<Vec<u8>>> {
    /// Creates a reader over in-memory `text`, mainly for tests.
    pub fn from_text(text: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self::new(Cursor::new(text.into().into_bytes()), file_name)
    }
}
