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

use crate::{
    data::{Case, CaseCollector, Datum},
    matrix::{ContentItem, ContentType, MatrixData, Split},
    reader::LineReader,
};

fn configure(syntax: &str) -> Result<(MatrixData, Vec<String>), String> {
    let mut warnings = Vec::new();
    let config = MatrixData::from_syntax(syntax, &mut |d| warnings.push(d.to_string()))
        .map_err(|e| e.to_string())?;
    Ok((config, warnings))
}

/// Configures and decodes, panicking on any error.  Returns the output cases
/// and all warning texts.
fn decode(syntax: &str, data: &str) -> (Vec<Case>, Vec<String>) {
    let (config, mut warnings) = configure(syntax).unwrap();
    let mut sink = CaseCollector::default();
    config
        .decode(
            LineReader::from_text(data, "matrix.dat"),
            &mut sink,
            &mut |d| warnings.push(d.to_string()),
        )
        .unwrap();
    (sink.0, warnings)
}

fn decode_err(syntax: &str, data: &str) -> String {
    let (config, _) = configure(syntax).unwrap();
    let mut sink = CaseCollector::default();
    config
        .decode(
            LineReader::from_text(data, "matrix.dat"),
            &mut sink,
            &mut |_| (),
        )
        .unwrap_err()
        .to_string()
}

fn num(value: f64) -> Datum {
    Datum::Number(Some(value))
}

fn sysmis() -> Datum {
    Datum::Number(None)
}

/// An 8-character marker value, space-padded like `ROWTYPE_` and `VARNAME_`
/// columns.
fn marker(value: &str) -> Datum {
    Datum::String(format!("{value:<8}"))
}

mod configurator {
    use super::*;

    #[test]
    fn contents_grouping() {
        let (config, _) = configure("VARIABLES=A B F/FACTORS=F/CELLS=2/CONTENTS=(MEAN SD) CORR")
            .unwrap();
        assert_eq!(
            config.contents,
            vec![
                ContentItem {
                    content: ContentType::Mean,
                    per_cell: true
                },
                ContentItem {
                    content: ContentType::StdDev,
                    per_cell: true
                },
                ContentItem {
                    content: ContentType::Corr,
                    per_cell: false
                },
            ]
        );
    }

    #[test]
    fn contents_unterminated_group() {
        let error = configure("VARIABLES=A B F/FACTORS=F/CELLS=2/CONTENTS=(MEAN").unwrap_err();
        assert!(error.contains("expecting `)`"), "{error}");
    }

    #[test]
    fn contents_empty_group() {
        let error = configure("VARIABLES=A B F/FACTORS=F/CELLS=2/CONTENTS=()").unwrap_err();
        assert!(error.contains("may not be empty"), "{error}");
    }

    #[test]
    fn contents_synonym_collision() {
        let error = configure("VARIABLES=A B/CONTENTS=N N_VECTOR").unwrap_err();
        assert!(error.contains("twice"), "{error}");
    }

    #[test]
    fn contents_defaults_to_corr() {
        let (config, warnings) = configure("VARIABLES=A B").unwrap();
        assert_eq!(
            config.contents,
            vec![ContentItem {
                content: ContentType::Corr,
                per_cell: false
            }]
        );
        assert!(warnings.iter().any(|w| w.contains("CONTENTS=CORR")));
    }

    #[test]
    fn factors_require_cells() {
        let error = configure("VARIABLES=A B F/FACTORS=F/CONTENTS=MEAN").unwrap_err();
        assert!(error.contains("CELLS"), "{error}");
    }

    #[test]
    fn cells_without_factors_ignored() {
        let (config, warnings) = configure("VARIABLES=A B/CELLS=2/CONTENTS=MEAN").unwrap();
        assert_eq!(config.cells, None);
        assert!(warnings.iter().any(|w| w.contains("CELLS")));
    }

    #[test]
    fn duplicate_subcommand() {
        let error = configure("VARIABLES=A B/VARIABLES=C/CONTENTS=MEAN").unwrap_err();
        assert!(error.contains("only be specified once"), "{error}");
    }

    #[test]
    fn varname_rejected() {
        let error = configure("VARIABLES=A VARNAME_/CONTENTS=MEAN").unwrap_err();
        assert!(error.contains("VARNAME_"), "{error}");
    }

    #[test]
    fn rowtype_extracted_from_variables() {
        let (config, warnings) = configure("VARIABLES=ROWTYPE_ A B").unwrap();
        assert!(config.explicit_rowtype);
        assert_eq!(config.n_continuous, 2);
        assert_eq!(warnings, Vec::<String>::new());
    }

    #[test]
    fn contents_ignored_with_rowtype() {
        let (config, warnings) = configure("VARIABLES=ROWTYPE_ A B/CONTENTS=MEAN").unwrap();
        assert_eq!(config.contents, vec![]);
        assert!(warnings.iter().any(|w| w.contains("CONTENTS is ignored")));
    }

    #[test]
    fn generated_split_incompatible_with_rowtype() {
        let error = configure("VARIABLES=ROWTYPE_ A B/SPLIT=S").unwrap_err();
        assert!(error.contains("SPLIT"), "{error}");
    }

    #[test]
    fn population_subcommand_name_is_exact() {
        // `N` matches case-insensitively but takes no abbreviation slack, so
        // a longer name is not the same subcommand.
        let (config, _) = configure("VARIABLES=A B/n=50/CONTENTS=MEAN").unwrap();
        assert_eq!(config.population, Some(50));

        let error = configure("VARIABLES=A B/NX=50/CONTENTS=MEAN").unwrap_err();
        assert!(error.contains("Unknown subcommand"), "{error}");
    }

    #[test]
    fn population_collides_with_n_content() {
        let error = configure("VARIABLES=A B/N=50/CONTENTS=N_SCALAR").unwrap_err();
        assert!(error.contains("N subcommand"), "{error}");
    }

    #[test]
    fn wire_order() {
        let (config, _) =
            configure("VARIABLES=S F A B/SPLIT=S/FACTORS=F/CELLS=1/CONTENTS=(MEAN)").unwrap();
        let names = (0..config.dictionary.len())
            .map(|index| config.dictionary[index].name.as_str().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, ["S", "ROWTYPE_", "F", "VARNAME_", "A", "B"]);
        assert_eq!(config.first_continuous, 4);
        assert_eq!(config.split, Split::Read);
    }
}

mod without_rowtype {
    use super::*;

    #[test]
    fn two_by_two_corr_lower_nodiagonal() {
        let (cases, _) = decode(
            "VARIABLES=A B/CONTENTS=CORR/FORMAT=LOWER NODIAGONAL",
            "0.5\n",
        );
        assert_eq!(
            cases,
            vec![
                Case(vec![marker("CORR"), marker("A"), num(1.0), num(0.5)]),
                Case(vec![marker("CORR"), marker("B"), num(0.5), num(1.0)]),
            ]
        );
    }

    #[test]
    fn full_layout_round_trip() {
        let (cases, _) = decode("VARIABLES=A B/CONTENTS=MAT/FORMAT=FULL", "1 2\n3 4\n");
        assert_eq!(
            cases,
            vec![
                Case(vec![marker("MAT"), marker("A"), num(1.0), num(2.0)]),
                Case(vec![marker("MAT"), marker("B"), num(3.0), num(4.0)]),
            ]
        );
    }

    #[test]
    fn read_split_groups() {
        let (cases, warnings) = decode(
            "VARIABLES=S A B/SPLIT=S/CONTENTS=MEAN",
            "1 1 2\n2 3 4\n",
        );
        assert_eq!(
            cases,
            vec![
                Case(vec![num(1.0), marker("MEAN"), marker(""), num(1.0), num(2.0)]),
                Case(vec![num(2.0), marker("MEAN"), marker(""), num(3.0), num(4.0)]),
            ]
        );
        assert_eq!(warnings, Vec::<String>::new());
    }

    #[test]
    fn generated_split_counts_groups() {
        let (cases, _) = decode("VARIABLES=A B/SPLIT=S/CONTENTS=MEAN", "1 2\n3 4\n");
        assert_eq!(
            cases,
            vec![
                Case(vec![num(1.0), marker("MEAN"), marker(""), num(1.0), num(2.0)]),
                Case(vec![num(2.0), marker("MEAN"), marker(""), num(3.0), num(4.0)]),
            ]
        );
    }

    #[test]
    fn unchanged_split_values_warn() {
        let (cases, warnings) = decode(
            "VARIABLES=S A B/SPLIT=S/CONTENTS=MEAN",
            "1 1 2\n1 3 4\n",
        );
        assert_eq!(cases.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("unchanged")), "{warnings:?}");
    }

    #[test]
    fn per_cell_contents_with_factors() {
        let (cases, _) = decode(
            "VARIABLES=A B F/FACTORS=F/CELLS=2/CONTENTS=(MEAN) CORR",
            "1 1 2\n2 3 4\n1\n.5 1\n",
        );
        assert_eq!(
            cases,
            vec![
                Case(vec![marker("MEAN"), num(1.0), marker(""), num(1.0), num(2.0)]),
                Case(vec![marker("MEAN"), num(2.0), marker(""), num(3.0), num(4.0)]),
                Case(vec![marker("CORR"), sysmis(), marker("A"), num(1.0), num(0.5)]),
                Case(vec![marker("CORR"), sysmis(), marker("B"), num(0.5), num(1.0)]),
            ]
        );
    }

    #[test]
    fn mismatched_factor_restatement() {
        // Two parenthesized runs each read the cells' factor values; the
        // second run must restate the same values.
        let error = decode_err(
            "VARIABLES=A B F/FACTORS=F/CELLS=1/CONTENTS=(MEAN) CORR (SD)",
            "1 1 2\n1\n.5 1\n2 3 4\n",
        );
        assert!(error.contains("do not match"), "{error}");
    }

    #[test]
    fn population_vector_emitted_first() {
        let (cases, _) = decode("VARIABLES=A B/N=99/CONTENTS=MEAN", "1 2\n");
        assert_eq!(
            cases,
            vec![
                Case(vec![marker("N"), marker(""), num(99.0), num(99.0)]),
                Case(vec![marker("MEAN"), marker(""), num(1.0), num(2.0)]),
            ]
        );
    }

    #[test]
    fn scalar_content_broadcasts() {
        let (cases, _) = decode("VARIABLES=A B C/CONTENTS=DFE", "12\n");
        assert_eq!(
            cases,
            vec![Case(vec![
                marker("DFE"),
                marker(""),
                num(12.0),
                num(12.0),
                num(12.0)
            ])]
        );
    }

    #[test]
    fn list_mode_requires_end_of_line() {
        let error = decode_err("VARIABLES=A B/CONTENTS=MAT/FORMAT=FULL LIST", "1 2 3 4\n");
        assert!(error.contains("end of line"), "{error}");
    }

    #[test]
    fn free_mode_flows_across_lines() {
        let (cases, _) = decode(
            "VARIABLES=A B/CONTENTS=MAT/FORMAT=FULL FREE",
            "1 2 3\n4\n",
        );
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[1], Case(vec![marker("MAT"), marker("B"), num(3.0), num(4.0)]));
    }

    #[test]
    fn string_where_number_required() {
        let error = decode_err("VARIABLES=A B/CONTENTS=MEAN", "X 2\n");
        assert!(error.contains("MEAN value for A"), "{error}");
    }

    #[test]
    fn truncated_input() {
        let error = decode_err("VARIABLES=A B/CONTENTS=MEAN", "1\n");
        assert!(error.contains("MEAN value for B"), "{error}");
        assert!(error.contains("end of input"), "{error}");
    }
}

mod with_rowtype {
    use super::*;

    #[test]
    fn rows_announce_their_content() {
        let (cases, _) = decode(
            "VARIABLES=ROWTYPE_ A B",
            "MEAN 1 2\nSD 3 4\nCORR 1\nCORR .5 1\n",
        );
        assert_eq!(
            cases,
            vec![
                Case(vec![marker("MEAN"), marker(""), num(1.0), num(2.0)]),
                Case(vec![marker("STDDEV"), marker(""), num(3.0), num(4.0)]),
                Case(vec![marker("CORR"), marker("A"), num(1.0), num(0.5)]),
                Case(vec![marker("CORR"), marker("B"), num(0.5), num(1.0)]),
            ]
        );
    }

    #[test]
    fn factor_records_resolve_and_sort() {
        // The F=2 record's rows arrive apart; both must land in one record.
        // Sorting puts the missing-factor record last.
        let (cases, _) = decode(
            "VARIABLES=ROWTYPE_ F A/FACTORS=F",
            "2 MEAN 5\n. MEAN 9\n1 MEAN 3\n2 SD 1\n",
        );
        assert_eq!(
            cases,
            vec![
                Case(vec![marker("MEAN"), num(1.0), marker(""), num(3.0)]),
                Case(vec![marker("MEAN"), num(2.0), marker(""), num(5.0)]),
                Case(vec![marker("STDDEV"), num(2.0), marker(""), num(1.0)]),
                Case(vec![marker("MEAN"), sysmis(), marker(""), num(9.0)]),
            ]
        );
    }

    #[test]
    fn split_change_emits_previous_group() {
        let (cases, _) = decode(
            "VARIABLES=S ROWTYPE_ A/SPLIT=S",
            "1 MEAN 10\n2 MEAN 20\n",
        );
        assert_eq!(
            cases,
            vec![
                Case(vec![num(1.0), marker("MEAN"), marker(""), num(10.0)]),
                Case(vec![num(2.0), marker("MEAN"), marker(""), num(20.0)]),
            ]
        );
    }

    #[test]
    fn unrecognized_rowtype() {
        let error = decode_err("VARIABLES=ROWTYPE_ A", "BOGUS 1\n");
        assert!(error.contains("BOGUS"), "{error}");
        assert!(error.contains("not a recognized row type"), "{error}");
    }

    #[test]
    fn rowtype_matching_truncates_and_ignores_case() {
        let (cases, _) = decode("VARIABLES=ROWTYPE_ A", "'n_vector12' 7\n");
        assert_eq!(cases, vec![Case(vec![marker("N"), marker(""), num(7.0)])]);
    }

    #[test]
    fn too_many_rows_for_a_type() {
        let error = decode_err("VARIABLES=ROWTYPE_ A B", "MEAN 1 2\nMEAN 3 4\n");
        assert!(error.contains("Too many rows"), "{error}");
    }

    #[test]
    fn row_count_mismatch_skips_type_with_warning() {
        let (cases, warnings) = decode(
            "VARIABLES=ROWTYPE_ A B",
            "MEAN 1 2\nCORR 1\n",
        );
        assert_eq!(
            cases,
            vec![Case(vec![marker("MEAN"), marker(""), num(1.0), num(2.0)])]
        );
        assert!(warnings.iter().any(|w| w.contains("skipping")), "{warnings:?}");
    }

    #[test]
    fn population_vector_per_group() {
        let (cases, _) = decode("VARIABLES=ROWTYPE_ A/N=5", "MEAN 1\n");
        assert_eq!(
            cases,
            vec![
                Case(vec![marker("N"), marker(""), num(5.0)]),
                Case(vec![marker("MEAN"), marker(""), num(1.0)]),
            ]
        );
    }
}
