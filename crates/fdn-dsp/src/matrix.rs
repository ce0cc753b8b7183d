//! Row-major 2D container
//!
//! Indexing outside the current shape is a logic error and panics.

/// Rectangular grid of `rows × cols` values
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    values: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Copy> Matrix<T> {
    pub fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            values: vec![fill; rows * cols],
            rows,
            cols,
        }
    }

    /// Build from explicit rows; all rows must have the same length
    pub fn from_rows(rows: &[Vec<T>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            assert_eq!(row.len(), cols, "ragged rows");
            values.extend_from_slice(row);
        }
        Self {
            values,
            rows: rows.len(),
            cols,
        }
    }

    /// Reallocate to a new shape, discarding every previous value
    pub fn resize(&mut self, rows: usize, cols: usize, fill: T) {
        self.values.clear();
        self.values.resize(rows * cols, fill);
        self.rows = rows;
        self.cols = cols;
    }

    /// Overwrite every cell, keeping the shape
    pub fn fill(&mut self, value: T) {
        self.values.fill(value);
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.values[self.offset(row, col)]
    }

    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let offset = self.offset(row, col);
        self.values[offset] = value;
    }

    /// Replace a whole row; `values.len()` must equal `cols`
    pub fn set_row(&mut self, row: usize, values: &[T]) {
        assert_eq!(values.len(), self.cols, "row length mismatch");
        self.row_mut(row).copy_from_slice(values);
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[T] {
        assert!(row < self.rows, "row {} out of range ({})", row, self.rows);
        &self.values[row * self.cols..(row + 1) * self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        assert!(row < self.rows, "row {} out of range ({})", row, self.rows);
        &mut self.values[row * self.cols..(row + 1) * self.cols]
    }

    /// `(rows, cols)`
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of range ({}x{})",
            row,
            col,
            self.rows,
            self.cols
        );
        row * self.cols + col
    }
}
