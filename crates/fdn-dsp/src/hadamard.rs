//! Hadamard mixing matrices
//!
//! Sylvester construction: `H(2n) = [[H(n), H(n)], [H(n), -H(n)]]`, scaled by
//! a gain. With gain `1/√D` the matrix is orthonormal; [`MATRIX_DAMPING`]
//! pulls the spectral radius below one so the feedback loop always decays.

use std::sync::OnceLock;

use fdn_core::{FdnDimension, Sample};

use crate::Matrix;

/// Overall feedback attenuation applied on top of the orthonormal gain
pub const MATRIX_DAMPING: f32 = 0.97;

/// Square ±gain matrix with mutually orthogonal rows
#[derive(Debug, Clone, PartialEq)]
pub struct HadamardMatrix {
    matrix: Matrix<Sample>,
    gain: Sample,
}

impl HadamardMatrix {
    /// Build a `dimension × dimension` matrix whose entries are `±gain`.
    ///
    /// Panics if `dimension` is not a power of two.
    pub fn new(dimension: usize, gain: Sample) -> Self {
        assert!(
            dimension.is_power_of_two(),
            "Hadamard dimension must be a power of two, got {}",
            dimension
        );

        let mut matrix = Matrix::new(dimension, dimension, 0.0);
        matrix.set(0, 0, gain);

        // Grow the top-left block in place, doubling each pass
        let mut half = 1;
        while half < dimension {
            let size = half * 2;
            for i in half..size {
                for j in 0..half {
                    matrix.set(i, j, matrix.get(i - half, j));
                }
            }
            for i in 0..half {
                for j in half..size {
                    matrix.set(i, j, matrix.get(i, j - half));
                }
            }
            for i in half..size {
                for j in half..size {
                    matrix.set(i, j, -matrix.get(i - half, j - half));
                }
            }
            half = size;
        }

        Self { matrix, gain }
    }

    /// Orthonormal matrix for `dimension`, damped by [`MATRIX_DAMPING`]
    pub fn damped(dimension: FdnDimension) -> Self {
        let lines = dimension.lines();
        Self::new(lines, MATRIX_DAMPING / (lines as Sample).sqrt())
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> Sample {
        self.matrix.get(row, col)
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[Sample] {
        self.matrix.row(row)
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.matrix.rows()
    }

    #[inline]
    pub fn gain(&self) -> Sample {
        self.gain
    }
}

/// Shared, read-only mixing matrix for a network dimension.
///
/// All four matrices are built on first use and live for the whole process.
pub fn mix_matrix(dimension: FdnDimension) -> &'static HadamardMatrix {
    static TABLE: OnceLock<[HadamardMatrix; 4]> = OnceLock::new();
    let table = TABLE.get_or_init(|| FdnDimension::ALL.map(HadamardMatrix::damped));
    &table[dimension.index()]
}
