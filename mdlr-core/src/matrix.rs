//! Row-oriented numeric matrix used for point lists and transforms

use crate::error::MatrixError;

/// A dense matrix stored row by row.
///
/// Point lists keep one point per row, so the column count is the width of a
/// point and is fixed for the lifetime of the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl PointMatrix {
    /// Zero-filled `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Empty matrix whose rows will be `cols` wide.
    pub fn with_cols(cols: usize) -> Self {
        Self::new(0, cols)
    }

    /// Build from explicit rows; the first row fixes the width.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, MatrixError> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut matrix = Self::with_cols(cols);
        for row in rows {
            matrix.add_row(row.as_ref())?;
        }
        Ok(matrix)
    }

    /// `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut matrix = Self::new(n, n);
        for i in 0..n {
            matrix.data[i * n + i] = 1.0;
        }
        matrix
    }

    /// Overwrite self with the identity. Only square matrices qualify.
    pub fn set_identity(&mut self) -> Result<(), MatrixError> {
        if self.rows != self.cols {
            return Err(MatrixError::SquareRequired {
                rows: self.rows,
                cols: self.cols,
            });
        }
        *self = Self::identity(self.rows);
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// # Panics
    /// Panics if `row` or `col` is out of range.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(col < self.cols, "column {col} out of range");
        self.data[row * self.cols + col]
    }

    /// # Panics
    /// Panics if `row` or `col` is out of range.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(col < self.cols, "column {col} out of range");
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.rows).map(move |r| self.row(r))
    }

    /// Append a row. Its length must match the established width.
    pub fn add_row(&mut self, values: &[f64]) -> Result<(), MatrixError> {
        if values.len() != self.cols {
            return Err(MatrixError::Dimension {
                expected: self.cols,
                found: values.len(),
            });
        }
        self.data.extend_from_slice(values);
        self.rows += 1;
        Ok(())
    }

    /// Append a row the caller already knows to be `cols` wide.
    pub(crate) fn push_row(&mut self, values: &[f64]) {
        debug_assert_eq!(values.len(), self.cols);
        self.data.extend_from_slice(values);
        self.rows += 1;
    }

    /// Standard product `self x other`.
    pub fn multiply(&self, other: &PointMatrix) -> Result<PointMatrix, MatrixError> {
        if self.cols != other.rows {
            return Err(MatrixError::Dimension {
                expected: self.cols,
                found: other.rows,
            });
        }
        let mut result = PointMatrix::new(self.rows, other.cols);
        for i in 0..self.rows {
            let lhs = self.row(i);
            for k in 0..other.cols {
                result.data[i * other.cols + k] = lhs
                    .iter()
                    .enumerate()
                    .map(|(j, value)| value * other.data[j * other.cols + k])
                    .sum();
            }
        }
        Ok(result)
    }

    /// Replace self with `self x other`. Self is untouched on error.
    pub fn multiply_in_place(&mut self, other: &PointMatrix) -> Result<(), MatrixError> {
        *self = self.multiply(other)?;
        Ok(())
    }

    pub fn transpose(&self) -> PointMatrix {
        let mut result = PointMatrix::new(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                result.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        result
    }

    pub fn scalar_multiply(&mut self, s: f64) {
        for value in &mut self.data {
            *value *= s;
        }
    }

    pub fn copy(&self) -> PointMatrix {
        self.clone()
    }

    /// Drop every row; the column width is kept.
    pub fn clear(&mut self) {
        self.data.clear();
        self.rows = 0;
    }

    /// Element-wise comparison within `epsilon`. Shapes must match exactly.
    pub fn approx_eq(&self, other: &PointMatrix, epsilon: f64) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}
