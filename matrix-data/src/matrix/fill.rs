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

//! Completing partially read content buffers.
//!
//! The decoders store values at their final positions as they read, so a
//! triangular matrix arrives with its other half empty and a scalar occupies
//! only the first slot of its buffer.  [fill] finishes the job: it mirrors
//! triangles, synthesizes excluded diagonals, and broadcasts scalars.

use super::{ContentType, Layout, Shape, Triangle};

/// Completes `buffer`, a [ContentType::buffer_len]-sized buffer for `n`
/// continuous variables whose read-in values are already at their final
/// positions.
pub fn fill(layout: &Layout, content: ContentType, n: usize, buffer: &mut [Option<f64>]) {
    match content.shape() {
        Shape::Matrix => {
            if layout.triangle != Triangle::Full {
                if !layout.diagonal {
                    // Correlation matrices have an implied unit diagonal.
                    // Anything else gets the missing sentinel.
                    let diagonal = (content == ContentType::Corr).then_some(1.0);
                    for i in 0..n {
                        buffer[i * n + i] = diagonal;
                    }
                }
                mirror(layout.triangle, n, buffer);
            }
        }
        Shape::Scalar => {
            let value = buffer[0];
            buffer[1..n].fill(value);
        }
        Shape::Vector => (),
    }
}

/// Copies the filled triangle across the diagonal into the empty half.
fn mirror(triangle: Triangle, n: usize, buffer: &mut [Option<f64>]) {
    for row in 1..n {
        for column in 0..row {
            match triangle {
                Triangle::Lower => buffer[column * n + row] = buffer[row * n + column],
                Triangle::Upper => buffer[row * n + column] = buffer[column * n + row],
                Triangle::Full => unreachable!(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::InputMode;

    fn layout(triangle: Triangle, diagonal: bool) -> Layout {
        Layout {
            triangle,
            diagonal,
            input: InputMode::Free,
        }
    }

    #[test]
    fn lower_nodiagonal_corr() {
        // 3x3 correlation read from a strict lower triangle.
        let mut buffer = vec![None; 9];
        buffer[3] = Some(0.5); // (1,0)
        buffer[6] = Some(0.2); // (2,0)
        buffer[7] = Some(0.8); // (2,1)
        fill(
            &layout(Triangle::Lower, false),
            ContentType::Corr,
            3,
            &mut buffer,
        );
        let expected = [
            Some(1.0),
            Some(0.5),
            Some(0.2),
            Some(0.5),
            Some(1.0),
            Some(0.8),
            Some(0.2),
            Some(0.8),
            Some(1.0),
        ];
        assert_eq!(buffer, expected);
    }

    #[test]
    fn upper_nodiagonal_transpose_matches_lower() {
        // The same values fed as an upper triangle must produce the same
        // symmetric matrix.
        let mut lower = vec![None; 9];
        lower[3] = Some(0.5);
        lower[6] = Some(0.2);
        lower[7] = Some(0.8);
        fill(
            &layout(Triangle::Lower, false),
            ContentType::Corr,
            3,
            &mut lower,
        );

        let mut upper = vec![None; 9];
        upper[1] = Some(0.5); // (0,1)
        upper[2] = Some(0.2); // (0,2)
        upper[5] = Some(0.8); // (1,2)
        fill(
            &layout(Triangle::Upper, false),
            ContentType::Corr,
            3,
            &mut upper,
        );

        assert_eq!(lower, upper);
    }

    #[test]
    fn nodiagonal_noncorrelation_diagonal_is_missing() {
        let mut buffer = vec![None; 4];
        buffer[2] = Some(3.5); // (1,0)
        fill(
            &layout(Triangle::Lower, false),
            ContentType::Cov,
            2,
            &mut buffer,
        );
        assert_eq!(buffer, [None, Some(3.5), Some(3.5), None]);
    }

    #[test]
    fn full_layout_untouched() {
        let mut buffer = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let original = buffer.clone();
        fill(
            &layout(Triangle::Full, true),
            ContentType::Mat,
            2,
            &mut buffer,
        );
        assert_eq!(buffer, original);
    }

    #[test]
    fn lower_with_diagonal_keeps_read_diagonal() {
        let mut buffer = vec![None; 4];
        buffer[0] = Some(4.0); // (0,0)
        buffer[2] = Some(1.5); // (1,0)
        buffer[3] = Some(9.0); // (1,1)
        fill(
            &layout(Triangle::Lower, true),
            ContentType::Cov,
            2,
            &mut buffer,
        );
        assert_eq!(buffer, [Some(4.0), Some(1.5), Some(1.5), Some(9.0)]);
    }

    #[test]
    fn scalar_broadcast() {
        let mut buffer = vec![Some(12.0), None, None];
        fill(
            &layout(Triangle::Lower, true),
            ContentType::Dfe,
            3,
            &mut buffer,
        );
        assert_eq!(buffer, [Some(12.0), Some(12.0), Some(12.0)]);
    }

    #[test]
    fn vector_untouched() {
        let mut buffer = vec![Some(1.0), Some(2.0)];
        fill(
            &layout(Triangle::Lower, true),
            ContentType::Mean,
            2,
            &mut buffer,
        );
        assert_eq!(buffer, [Some(1.0), Some(2.0)]);
    }
}
