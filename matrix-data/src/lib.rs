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

//! Reader for matrix-material data.
//!
//! Multivariate statistics procedures accept pre-computed matrix materials:
//! correlation or covariance matrices together with vectors of means,
//! standard deviations, counts, and so on.  This crate parses the matrix
//! command's subcommands into a [MatrixData] configuration and decodes the
//! associated data into a stream of output cases with a fixed column layout:
//! split variables, an 8-character row-type string, factor variables, an
//! 8-character variable-name string, and one numeric column per continuous
//! variable.
//!
//! [MatrixData]: crate::matrix::MatrixData

pub mod data;
pub mod dictionary;
pub mod format;
pub mod identifier;
pub mod matrix;
pub mod message;
pub mod reader;
pub mod syntax;
