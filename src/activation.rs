use crate::{
  error::{Error, Result},
  scalar::Real,
};


/// Rectified linear unit, `max(0, x)`.

pub fn relu<T: Real>(x: T) -> T {
  if x > T::zero() { x } else { T::zero() }
}

/// Derivative of [relu]. The subgradient at exactly zero is zero.

pub fn relu_derivative<T: Real>(x: T) -> T {
  if x > T::zero() { T::one() } else { T::zero() }
}

/// Normalize a vector of raw scores into a probability distribution.
///
/// The maximum is subtracted from every element before exponentiating,
/// so large scores cannot overflow. Fails on empty input, for which no
/// maximum exists.

pub fn softmax<T: Real>(scores: &[T]) -> Result<Vec<T>> {
  let max = scores.iter()
    .copied()
    .fold(None, |max: Option<T>, x| Some(max.map_or(x, |m| m.max(x) )) )
    .ok_or_else(|| Error::domain("softmax of an empty vector") )?;
  let exps: Vec<T> = scores.iter().map(|&x| (x - max).exp() ).collect();
  let sum: T = exps.iter().copied().sum();
  Ok(exps.into_iter().map(|e| e / sum ).collect())
}
