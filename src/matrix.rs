use std::ops::{Index, IndexMut};

use itertools::Itertools;
use rand::Rng;

use crate::{
  error::{Error, Result},
  scalar::{Inner, Numeric, Real},
};


/// Dot product of two equal-length vectors.

pub fn dot<T: Numeric>(a: &[T], b: &[T]) -> Result<T> {
  if a.len() != b.len() {
    return Err(Error::domain(format!(
      "dot product of vectors with lengths {} and {}", a.len(), b.len())));
  }
  Ok(a.iter().zip(b).map(|(&x, &y)| x * y ).sum())
}


/// Two-dimensional array with row-major storage.
///
/// Layer weights are matrices of shape (outputs, inputs); one row holds
/// the incoming weights of a single neuron.

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T: Inner> {
  rows: usize,
  cols: usize,
  data: Vec<T>,
}

impl<T: Numeric> Matrix<T> {
  pub fn zeros(rows: usize, cols: usize) -> Self {
    Self { rows, cols, data: vec![T::zero(); rows * cols] }
  }

  /// Build a matrix from explicit rows. All rows must have equal length.

  pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
    let cols = rows.first()
      .map(|row| row.len() )
      .ok_or_else(|| Error::domain("matrix needs at least one row") )?;
    if let Some(row) = rows.iter().find(|row| row.len() != cols ) {
      return Err(Error::domain(format!(
        "ragged matrix rows: expected length {}, found {}", cols, row.len())));
    }
    Ok(Self { rows: rows.len(), cols, data: rows.concat() })
  }

  pub fn rows(&self) -> usize {
    self.rows
  }

  pub fn cols(&self) -> usize {
    self.cols
  }

  pub fn row(&self, i: usize) -> &[T] {
    &self.data[i * self.cols..(i + 1) * self.cols]
  }

  /// Apply a function to every element, producing a new matrix.

  pub fn map<O: Numeric>(&self, cb: impl FnMut(T) -> O) -> Matrix<O> {
    Matrix {
      rows: self.rows,
      cols: self.cols,
      data: self.data.iter().copied().map(cb).collect(),
    }
  }

  pub fn transposed(&self) -> Self {
    let data = (0..self.cols)
      .cartesian_product(0..self.rows)
      .map(|(j, i)| self[(i, j)] )
      .collect();
    Self { rows: self.cols, cols: self.rows, data }
  }

  /// Matrix-vector product. The vector length must match the column count.

  pub fn matvec(&self, vector: &[T]) -> Result<Vec<T>> {
    if vector.len() != self.cols {
      return Err(Error::domain(format!(
        "{}x{} matrix applied to vector of length {}",
        self.rows, self.cols, vector.len())));
    }
    (0..self.rows).map(|i| dot(self.row(i), vector) ).collect()
  }
}

impl<T: Real> Matrix<T> {
  /// Fill a matrix with independent uniform draws from `[low, high)`.

  pub fn uniform(rows: usize, cols: usize, low: T, high: T, rng: &mut impl Rng) -> Self {
    let data = (0..rows * cols).map(|_| rng.gen_range(low, high) ).collect();
    Self { rows, cols, data }
  }
}

impl<T: Inner> Index<(usize, usize)> for Matrix<T> {
  type Output = T;

  fn index(&self, (i, j): (usize, usize)) -> &T {
    assert!(i < self.rows && j < self.cols,
      "index ({}, {}) out of bounds for {}x{} matrix", i, j, self.rows, self.cols);
    &self.data[i * self.cols + j]
  }
}

impl<T: Inner> IndexMut<(usize, usize)> for Matrix<T> {
  fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
    assert!(i < self.rows && j < self.cols,
      "index ({}, {}) out of bounds for {}x{} matrix", i, j, self.rows, self.cols);
    &mut self.data[i * self.cols + j]
  }
}

impl<T: Numeric> std::fmt::Display for Matrix<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Matrix[{}, {}]\n", self.rows, self.cols)?;
    for i in 0..self.rows {
      write!(f, "{:?}\n", self.row(i))?;
    }
    Ok(())
  }
}
