use std::fmt;
use std::io::Write;
use std::ops::{Index, IndexMut};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};
use crate::math::text::LineReader;

/// Dense row-major matrix of `f64`.
///
/// Dimensions are fixed at construction. Algebra operations are pure and
/// return a new matrix; shape violations surface as
/// [`NnError::DimensionMismatch`] instead of panicking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

/// Unvalidated serde form of [`Matrix`].
#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = NnError;

    fn try_from(raw: RawMatrix) -> Result<Matrix> {
        if raw.rows == 0 || raw.cols == 0 {
            return Err(NnError::InvalidShape(format!("{}x{} matrix", raw.rows, raw.cols)));
        }
        if raw.rows.checked_mul(raw.cols) != Some(raw.data.len()) {
            return Err(NnError::InvalidShape(format!(
                "{}x{} matrix with {} values",
                raw.rows, raw.cols, raw.data.len()
            )));
        }
        Ok(Matrix { rows: raw.rows, cols: raw.cols, data: raw.data })
    }
}

impl Matrix {
    /// `rows` and `cols` must both be non-zero.
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        debug_assert!(rows > 0 && cols > 0, "matrix dimensions must be non-zero");
        Matrix { rows, cols, data: vec![0.0; rows * cols] }
    }

    /// Builds a matrix from a list of equally long rows.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(NnError::InvalidShape("matrix must have at least one row and column".into()));
        }
        if let Some(bad) = data.iter().position(|row| row.len() != cols) {
            return Err(NnError::InvalidShape(format!(
                "row {bad} has {} values, expected {cols}",
                data[bad].len()
            )));
        }
        Ok(Matrix { rows, cols, data: data.into_iter().flatten().collect() })
    }

    /// Column vector holding `values`.
    pub fn column(values: &[f64]) -> Result<Matrix> {
        if values.is_empty() {
            return Err(NnError::InvalidShape("column vector must not be empty".into()));
        }
        Ok(Matrix { rows: values.len(), cols: 1, data: values.to_vec() })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Values in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub(crate) fn ensure_same_shape(&self, other: &Matrix, op: &'static str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(NnError::DimensionMismatch { op, left: self.shape(), right: other.shape() });
        }
        Ok(())
    }

    fn zip_with<F>(&self, other: &Matrix, op: &'static str, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.ensure_same_shape(other, op)?;
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&other.data).map(|(&a, &b)| f(a, b)).collect(),
        })
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "subtract", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "hadamard", |a, b| a * b)
    }

    pub fn scale(&self, scalar: f64) -> Matrix {
        self.map(|x| x * scalar)
    }

    /// Matrix product `self · other`.
    pub fn dot(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(NnError::DimensionMismatch {
                op: "dot",
                left: self.shape(),
                right: other.shape(),
            });
        }

        let mut res = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self[(i, k)] * other[(k, j)];
                }
                res[(i, j)] = sum;
            }
        }
        Ok(res)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                res[(j, i)] = self[(i, j)];
            }
        }
        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    /// Overwrites every element with a uniform draw from `[min, max)`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, min: f64, max: f64, rng: &mut R) {
        for value in &mut self.data {
            *value = min + rng.gen::<f64>() * (max - min);
        }
    }

    /// Row index of the largest value in the first column. Ties go to the
    /// lowest index.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for i in 1..self.rows {
            if self[(i, 0)] > self[(best, 0)] {
                best = i;
            }
        }
        best
    }

    /// Writes `rows cols` on one line, then one line of space-separated
    /// values per row. `f64` is printed in its shortest round-trip form, so
    /// reading it back is exact.
    pub fn serialize_text<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{} {}", self.rows, self.cols)?;
        for row in self.data.chunks(self.cols) {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(out, "{}", line.join(" "))?;
        }
        Ok(())
    }

    /// Reads a matrix in the layout written by [`Matrix::serialize_text`].
    pub fn deserialize_text(reader: &mut LineReader<'_>) -> Result<Matrix> {
        let header = reader.next_line("matrix dimensions")?;
        let dims: Vec<usize> = header
            .split_whitespace()
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| NnError::parse(reader.line(), format!("invalid matrix dimensions: {header:?}")))?;
        let (rows, cols) = match dims[..] {
            [rows, cols] if rows > 0 && cols > 0 => (rows, cols),
            _ => return Err(NnError::parse(reader.line(), format!("invalid matrix dimensions: {header:?}"))),
        };
        if rows.checked_mul(cols).is_none() {
            return Err(NnError::parse(reader.line(), format!("matrix dimensions overflow: {header:?}")));
        }

        // Grow from the rows actually read, never from the header.
        let mut data = Vec::new();
        for _ in 0..rows {
            let text = reader.next_line("matrix row")?;
            let row: Vec<f64> = text
                .split_whitespace()
                .map(str::parse)
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| NnError::parse(reader.line(), "invalid number in matrix row"))?;
            if row.len() != cols {
                return Err(NnError::parse(
                    reader.line(),
                    format!("expected {cols} values, found {}", row.len()),
                ));
            }
            data.extend(row);
        }

        Ok(Matrix { rows, cols, data })
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row * self.cols + col]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.chunks(self.cols) {
            for value in row {
                write!(f, "{value} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
