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

//! The two matrix-data decoding strategies.
//!
//! [read_without_rowtype] drives reading from the `CONTENTS` list: the
//! configuration dictates exactly what the data holds and in what order.
//! [read_with_rowtype] lets the data announce itself: each row starts with a
//! row-type string and rows accumulate into per-factor-combination records
//! that are sorted and emitted when their split group ends.

use std::{cmp::Ordering, io::BufRead};

use enum_map::EnumMap;
use itertools::Itertools;
use smallvec::SmallVec;

use super::{ContentType, InputMode, MatrixData, Shape, Split, fill, scan::Scanner};
use crate::{
    data::{Case, CaseSink, Datum, SinkError},
    dictionary::Role,
    identifier::Identifier,
    message::{Category, Diagnostic},
    reader::LineReader,
};

fn sink_error(error: SinkError) -> Diagnostic {
    Diagnostic::error(Category::Data, format!("Error writing matrix row: {error}"))
}

/// Names of the variables with roles accepted by `predicate`, in dictionary
/// order.
fn role_names<'a>(
    config: &'a MatrixData,
    predicate: impl Fn(&Role) -> bool + 'a,
) -> Vec<&'a Identifier> {
    config
        .dictionary
        .vars_with_role(predicate)
        .map(|variable| &variable.name)
        .collect()
}

/// Reads one physical row of `content` into `buffer` (which has
/// [ContentType::buffer_len] slots), at final positions.  `row` is the
/// physical row index, meaningful only for matrix content.
fn read_row<R>(
    scanner: &mut Scanner<R>,
    config: &MatrixData,
    names: &[&Identifier],
    content: ContentType,
    row: usize,
    buffer: &mut [Option<f64>],
    warn: &mut dyn FnMut(Diagnostic),
) -> Result<(), Diagnostic>
where
    R: BufRead,
{
    let n = config.n_continuous;
    let rowtype = content.rowtype();
    match content.shape() {
        Shape::Scalar => {
            buffer[0] = scanner.read_number(&format!("{rowtype} value"), warn)?;
        }
        Shape::Vector => {
            for (index, name) in names.iter().enumerate() {
                buffer[index] =
                    scanner.read_number(&format!("{rowtype} value for {name}"), warn)?;
            }
        }
        Shape::Matrix => {
            let (matrix_row, columns) = config.layout.row_range(n, row);
            for column in columns {
                buffer[matrix_row * n + column] = scanner.read_number(
                    &format!("{rowtype} value for {}", names[column]),
                    warn,
                )?;
            }
        }
    }
    if config.layout.input == InputMode::List {
        scanner.expect_eol(&format!("{rowtype} row"))?;
    }
    Ok(())
}

/// Reads a complete `content` item, all of its physical rows, and completes
/// the buffer with the filler.
fn read_content<R>(
    scanner: &mut Scanner<R>,
    config: &MatrixData,
    names: &[&Identifier],
    content: ContentType,
    warn: &mut dyn FnMut(Diagnostic),
) -> Result<Vec<Option<f64>>, Diagnostic>
where
    R: BufRead,
{
    let n = config.n_continuous;
    let mut buffer = vec![None; content.buffer_len(n)];
    for row in 0..config.layout.physical_rows(content.shape(), n) {
        read_row(scanner, config, names, content, row, &mut buffer, warn)?;
    }
    fill::fill(&config.layout, content, n, &mut buffer);
    Ok(buffer)
}

/// Writes completed buffers to the sink as output cases in dictionary column
/// order: split variables, `ROWTYPE_`, factor variables, `VARNAME_`,
/// continuous variables.
struct RowEmitter<'a> {
    config: &'a MatrixData,
    names: &'a [&'a Identifier],
}

impl RowEmitter<'_> {
    fn case(
        &self,
        splits: &[Option<f64>],
        content: ContentType,
        factors: &[Option<f64>],
        varname: &str,
        values: &[Option<f64>],
    ) -> Case {
        let mut data = Vec::with_capacity(self.config.dictionary.len());
        data.extend(splits.iter().map(|value| Datum::Number(*value)));
        data.push(Datum::String(format!("{:<8}", content.rowtype())));
        data.extend(factors.iter().map(|value| Datum::Number(*value)));
        data.push(Datum::String(format!("{varname:<8}")));
        data.extend(values.iter().map(|value| Datum::Number(*value)));
        Case(data)
    }

    /// Writes `buffer`, a completed buffer for `content`, as one row
    /// (vector/scalar) or one row per continuous variable (matrix).
    fn emit(
        &self,
        splits: &[Option<f64>],
        content: ContentType,
        factors: &[Option<f64>],
        buffer: &[Option<f64>],
        sink: &mut dyn CaseSink,
    ) -> Result<(), Diagnostic> {
        let n = self.config.n_continuous;
        match content.shape() {
            Shape::Matrix => {
                for (index, name) in self.names.iter().enumerate() {
                    let values = &buffer[index * n..(index + 1) * n];
                    sink.receive(self.case(splits, content, factors, name.as_str(), values))
                        .map_err(sink_error)?;
                }
            }
            Shape::Vector | Shape::Scalar => {
                sink.receive(self.case(splits, content, factors, "", &buffer[..n]))
                    .map_err(sink_error)?;
            }
        }
        Ok(())
    }

    /// Writes the vector of counts implied by the `N` subcommand.
    fn emit_population(
        &self,
        splits: &[Option<f64>],
        population: u64,
        sink: &mut dyn CaseSink,
    ) -> Result<(), Diagnostic> {
        let buffer = vec![Some(population as f64); self.config.n_continuous];
        let factors = vec![None; self.config.n_factors];
        self.emit(splits, ContentType::N, &factors, &buffer, sink)
    }
}

/// Decodes data whose contents are dictated by the `CONTENTS` list, with no
/// row-type strings in the data itself.
pub(super) fn read_without_rowtype<R>(
    config: &MatrixData,
    reader: LineReader<R>,
    sink: &mut dyn CaseSink,
    warn: &mut dyn FnMut(Diagnostic),
) -> Result<(), Diagnostic>
where
    R: BufRead,
{
    let mut scanner = Scanner::new(reader);
    let names = role_names(config, |role| matches!(role, Role::Continuous(_)));
    let split_names = role_names(config, |role| matches!(role, Role::Split(_)));
    let factor_names = role_names(config, |role| matches!(role, Role::Factor(_)));
    let emitter = RowEmitter {
        config,
        names: &names,
    };
    let cells = config.cells.unwrap_or(1);

    let mut previous_splits: Option<Vec<Option<f64>>> = None;
    let mut group_number = 0u64;
    while !scanner.at_eof()? {
        group_number += 1;
        let splits = match config.split {
            Split::None => Vec::new(),
            Split::Generated => vec![Some(group_number as f64)],
            Split::Read => {
                let mut values = Vec::with_capacity(config.n_splits);
                for name in &split_names {
                    values.push(
                        scanner.read_number(&format!("value for split variable {name}"), warn)?,
                    );
                }
                if previous_splits.as_ref() == Some(&values) {
                    warn(
                        Diagnostic::warning(
                            Category::Data,
                            "Split values are unchanged from the previous group.",
                        )
                        .with_location(scanner.location()),
                    );
                }
                previous_splits = Some(values.clone());
                values
            }
        };

        // Factor values for each cell, recorded on first read.  Later
        // parenthesized runs must repeat them identically.
        let mut cell_factors: Vec<Vec<Option<f64>>> = Vec::new();

        // One buffer per content item, or one per cell for parenthesized
        // items.
        let mut buffers: Vec<Vec<Vec<Option<f64>>>> = vec![Vec::new(); config.contents.len()];

        for (per_cell, run) in &config
            .contents
            .iter()
            .enumerate()
            .chunk_by(|(_, item)| item.per_cell)
        {
            let run = run.collect::<Vec<_>>();
            if per_cell {
                for cell in 0..cells {
                    let mut factors = Vec::with_capacity(config.n_factors);
                    for name in &factor_names {
                        factors.push(
                            scanner
                                .read_number(&format!("value for factor variable {name}"), warn)?,
                        );
                    }
                    match cell_factors.get(cell) {
                        Some(recorded) if *recorded != factors => {
                            return Err(Diagnostic::error(
                                Category::Data,
                                format!(
                                    "Factor values for cell {} do not match the values given earlier in this group.",
                                    cell + 1
                                ),
                            )
                            .with_location(scanner.location()));
                        }
                        Some(_) => (),
                        None => cell_factors.push(factors),
                    }
                    for (index, item) in &run {
                        buffers[*index]
                            .push(read_content(&mut scanner, config, &names, item.content, warn)?);
                    }
                }
            } else {
                for (index, item) in &run {
                    buffers[*index]
                        .push(read_content(&mut scanner, config, &names, item.content, warn)?);
                }
            }
        }

        if let Some(population) = config.population {
            emitter.emit_population(&splits, population, sink)?;
        }
        if config.n_factors > 0 {
            for cell in 0..cells {
                for (index, item) in config.contents.iter().enumerate() {
                    if item.per_cell {
                        emitter.emit(
                            &splits,
                            item.content,
                            &cell_factors[cell],
                            &buffers[index][cell],
                            sink,
                        )?;
                    }
                }
            }
        }
        let missing_factors = vec![None; config.n_factors];
        for (index, item) in config.contents.iter().enumerate() {
            if !item.per_cell {
                emitter.emit(
                    &splits,
                    item.content,
                    &missing_factors,
                    &buffers[index][0],
                    sink,
                )?;
            }
        }

        if config.split == Split::None {
            if !scanner.at_eof()? {
                warn(
                    Diagnostic::warning(
                        Category::Data,
                        "Ignoring extra data following the matrix.",
                    )
                    .with_location(scanner.location()),
                );
            }
            break;
        }
    }
    Ok(())
}

/// Rows read so far for one content type within one factor record.
struct Accumulator {
    rows_read: usize,
    buffer: Vec<Option<f64>>,
}

/// Accumulating state for one distinct factor-value combination within the
/// current split group.
struct FactorRecord {
    factors: SmallVec<[Option<f64>; 4]>,
    contents: EnumMap<ContentType, Option<Accumulator>>,
}

/// Factor tuples sort numerically, missing values last, lexicographic across
/// the tuple.
fn compare_factors(a: &[Option<f64>], b: &[Option<f64>]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ordering = match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => x.total_cmp(y),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Decodes data in which each row announces its own content with a row-type
/// string.
pub(super) fn read_with_rowtype<R>(
    config: &MatrixData,
    reader: LineReader<R>,
    sink: &mut dyn CaseSink,
    warn: &mut dyn FnMut(Diagnostic),
) -> Result<(), Diagnostic>
where
    R: BufRead,
{
    let mut scanner = Scanner::new(reader);
    let names = role_names(config, |role| matches!(role, Role::Continuous(_)));
    let split_names = role_names(config, |role| matches!(role, Role::Split(_)));
    let factor_names = role_names(config, |role| matches!(role, Role::Factor(_)));
    let emitter = RowEmitter {
        config,
        names: &names,
    };

    let mut records: Vec<FactorRecord> = Vec::new();
    let mut cached: Option<usize> = None;
    let mut group_splits: Option<Vec<Option<f64>>> = None;

    while !scanner.at_eof()? {
        if config.split == Split::Read {
            let mut values = Vec::with_capacity(config.n_splits);
            for name in &split_names {
                values
                    .push(scanner.read_number(&format!("value for split variable {name}"), warn)?);
            }
            if group_splits.as_ref() != Some(&values) {
                if let Some(previous) = group_splits.take() {
                    emit_group(config, &emitter, &mut records, &previous, sink, warn)?;
                    cached = None;
                }
                group_splits = Some(values);
            }
        }

        let mut factors = SmallVec::new();
        for name in &factor_names {
            factors.push(scanner.read_number(&format!("value for factor variable {name}"), warn)?);
        }

        // One-slot cache, then linear scan, then a new record.
        let index = match cached.filter(|index| records[*index].factors[..] == factors[..]) {
            Some(index) => index,
            None => match records
                .iter()
                .position(|record| record.factors[..] == factors[..])
            {
                Some(index) => index,
                None => {
                    records.push(FactorRecord {
                        factors,
                        contents: EnumMap::default(),
                    });
                    records.len() - 1
                }
            },
        };
        cached = Some(index);

        let rowtype = scanner.read_string("row type", warn)?;
        let Some(content) = ContentType::from_rowtype(&rowtype) else {
            return Err(Diagnostic::error(
                Category::Data,
                format!("`{rowtype}` is not a recognized row type."),
            )
            .with_location(scanner.location()));
        };

        let n = config.n_continuous;
        let expected_rows = config.layout.physical_rows(content.shape(), n);
        let accumulator = records[index].contents[content].get_or_insert_with(|| Accumulator {
            rows_read: 0,
            buffer: vec![None; content.buffer_len(n)],
        });
        if accumulator.rows_read >= expected_rows {
            return Err(Diagnostic::error(
                Category::Data,
                format!(
                    "Too many rows of {} data: expected {expected_rows}.",
                    content.rowtype()
                ),
            )
            .with_location(scanner.location()));
        }
        let row = accumulator.rows_read;
        accumulator.rows_read += 1;
        read_row(
            &mut scanner,
            config,
            &names,
            content,
            row,
            &mut accumulator.buffer,
            warn,
        )?;
    }

    let splits = group_splits.unwrap_or_default();
    if !records.is_empty() {
        emit_group(config, &emitter, &mut records, &splits, sink, warn)?;
    }
    Ok(())
}

/// Sorts and writes one split group's accumulated records, then clears them.
fn emit_group(
    config: &MatrixData,
    emitter: &RowEmitter,
    records: &mut Vec<FactorRecord>,
    splits: &[Option<f64>],
    sink: &mut dyn CaseSink,
    warn: &mut dyn FnMut(Diagnostic),
) -> Result<(), Diagnostic> {
    records.sort_by(|a, b| compare_factors(&a.factors, &b.factors));
    if let Some(population) = config.population {
        emitter.emit_population(splits, population, sink)?;
    }
    let n = config.n_continuous;
    for record in records.drain(..) {
        for (content, slot) in record.contents {
            let Some(accumulator) = slot else { continue };
            let expected = config.layout.physical_rows(content.shape(), n);
            if accumulator.rows_read != expected {
                warn(Diagnostic::warning(
                    Category::Data,
                    format!(
                        "Read {} row(s) of {} data where {expected} were expected; skipping this content for the group.",
                        accumulator.rows_read,
                        content.rowtype()
                    ),
                ));
                continue;
            }
            let mut buffer = accumulator.buffer;
            fill::fill(&config.layout, content, n, &mut buffer);
            emitter.emit(splits, content, &record.factors, &buffer, sink)?;
        }
    }
    Ok(())
}
